#![doc = include_str!("../README.md")]

pub mod errors;
pub mod geo;
pub mod logger;
pub mod memo;
pub mod metrics;
pub mod pubsub;
pub mod records;
pub mod store;
pub mod worker;

/// the current app version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
