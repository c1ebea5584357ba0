//! Error types for call operations.

use call_core::{PlatformError, UserId};
use call_policy::PolicyError;
use thiserror::Error;

use crate::session::CallReport;

/// A guard that forbids a call before it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PolicyViolation {
    /// Calling everyone is disabled in this guild.
    #[error("everyone-not-callable")]
    EveryoneNotCallable,
}

impl PolicyViolation {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EveryoneNotCallable => "everyone-not-callable",
        }
    }
}

/// Errors that can occur while resolving or running a call.
///
/// Errors raised mid-session carry the partial report accumulated up to the
/// failure, so already classified targets are never lost.
#[derive(Debug, Error)]
pub enum CallError {
    /// The caller is not connected to a voice channel. Nothing was sent.
    #[error("caller-not-in-voice")]
    CallerNotInVoice,

    /// A policy guard rejected the call before it started.
    #[error("policy violation: {0}")]
    PolicyViolation(#[from] PolicyViolation),

    /// A platform lookup failed before the session started.
    #[error("platform lookup failed: {0}")]
    Lookup(#[from] PlatformError),

    /// A presence or role lookup failed mid-session.
    #[error("lookup for user {user} failed in round {round}: {source}")]
    Presence {
        user: UserId,
        round: u32,
        #[source]
        source: PlatformError,
        partial: Box<CallReport>,
    },

    /// Minting an invite failed mid-session.
    #[error("invite for user {user} failed in round {round}: {source}")]
    Invite {
        user: UserId,
        round: u32,
        #[source]
        source: PlatformError,
        partial: Box<CallReport>,
    },

    /// Delivering a notification failed for a reason other than a block.
    #[error("delivery to user {user} failed in round {round}: {source}")]
    Delivery {
        user: UserId,
        round: u32,
        #[source]
        source: PlatformError,
        partial: Box<CallReport>,
    },

    /// Policy storage failed.
    #[error("policy error: {0}")]
    Policy(#[from] PolicyError),
}

impl CallError {
    /// The report accumulated before a mid-session failure, if any.
    pub fn partial(&self) -> Option<&CallReport> {
        match self {
            Self::Presence { partial, .. }
            | Self::Invite { partial, .. }
            | Self::Delivery { partial, .. } => Some(partial),
            _ => None,
        }
    }

    /// Whether the error was raised before any notification could be sent.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::CallerNotInVoice | Self::PolicyViolation(_) | Self::Lookup(_)
        )
    }
}
