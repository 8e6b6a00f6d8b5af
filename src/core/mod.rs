//! Client, data model and derived views for the Flatastic API

pub mod api;
pub mod chores;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod log;
pub mod model;
pub mod snapshot;

// Re-export main types for cleaner imports
pub use api::{Endpoint, FlatasticApi};
pub use error::FetchError;
pub use fetcher::DataFetcher;
pub use snapshot::{FetchOutcome, ShoppingList, Snapshot};
