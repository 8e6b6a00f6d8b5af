pub mod setup;
pub mod shopping;
pub mod status;
pub mod ui;
pub mod watch;
