//! Error types for policy storage.

use call_core::GuildId;
use thiserror::Error;

/// Errors that can occur while reading or writing policy state.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// Filesystem error.
    #[error("policy store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored document is not valid JSON of the expected shape.
    #[error("policy store JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A mutation could not be flushed to the store and was not applied.
    #[error("failed to persist policy for guild {guild}: {source}")]
    Persist {
        guild: GuildId,
        #[source]
        source: Box<PolicyError>,
    },
}

/// Result type for policy operations.
pub type Result<T> = std::result::Result<T, PolicyError>;
