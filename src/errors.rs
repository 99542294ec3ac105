/// typed errors surfaced to library clients.  worker handler loops stay on
/// anyhow::Result; these are the kinds a caller is expected to match on.
///
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    /// the provider could not produce a value for the key; nothing was cached
    #[error("computation failed for key {key}: {reason}")]
    ComputationFailed { key: String, reason: String },

    /// the worker's request or response channel is gone, usually after shutdown
    #[error("worker channel closed: {0}")]
    ChannelClosed(String),

    /// a meters registry map was poisoned by a panicking thread
    #[error("meters lock poisoned")]
    LockPoisoned,
}
