pub mod flatastic;

pub use flatastic::FlatasticClient;
