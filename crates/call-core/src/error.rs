//! Error types for platform collaborators.

use thiserror::Error;

/// Errors reported by the platform adapters (presence, roles, invites, delivery).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlatformError {
    /// The platform is temporarily unavailable.
    #[error("platform unavailable: {0}")]
    Unavailable(String),

    /// The referenced guild, user, role or channel does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The request was rejected or failed in transport.
    #[error("request failed: {0}")]
    Request(String),
}
