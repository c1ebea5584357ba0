//! Core types and collaborator traits for the call engine.
//!
//! This crate provides the shared vocabulary used by every other crate in
//! the workspace. It defines:
//!
//! - [`GuildId`], [`UserId`], [`RoleId`], [`ChannelId`] - stable platform identifiers
//! - [`Target`] / [`Presence`] - a live snapshot of a candidate recipient
//! - [`ExclusionReason`] / [`Exclusion`] - why a target could not be called
//! - [`InviteToken`] - a single-use, time-limited voice channel invite
//! - [`PresenceSource`], [`RoleDirectory`], [`MemberDirectory`],
//!   [`NotificationChannel`], [`InviteMinter`] - the platform boundary
//! - [`RoundTimer`] - the clock driving the wait between call rounds
//!
//! # Example
//!
//! ```rust
//! use call_core::{async_trait, ChannelId, InviteMinter, PlatformError};
//!
//! struct FixedMinter;
//!
//! #[async_trait]
//! impl InviteMinter for FixedMinter {
//!     async fn create(
//!         &self,
//!         _channel: ChannelId,
//!         _max_uses: u32,
//!         _ttl_secs: u64,
//!     ) -> Result<String, PlatformError> {
//!         Ok("abc123".to_string())
//!     }
//! }
//! ```

mod error;
mod ids;
mod invite;
mod platform;
mod target;
mod timer;

pub use error::PlatformError;
pub use ids::{ChannelId, GuildId, RoleId, UserId};
pub use invite::InviteToken;
pub use platform::{
    DeliveryOutcome, InviteMinter, MemberDirectory, NotificationChannel, PresenceSource,
    RoleDirectory,
};
pub use target::{Exclusion, ExclusionReason, Presence, Target};
pub use timer::{RoundTimer, TokioTimer};

// Re-export async_trait for convenience
pub use async_trait::async_trait;
