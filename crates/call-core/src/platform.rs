//! Collaborator traits at the platform boundary.
//!
//! The call engine never talks to a chat platform SDK directly. Thin
//! adapters implement these traits over the real client, and tests
//! implement them over in-memory fakes.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::error::PlatformError;
use crate::ids::{ChannelId, GuildId, RoleId, UserId};
use crate::target::Presence;

/// Live presence and voice state.
///
/// Implementations must reflect the platform state at call time; the
/// engine re-queries every round and never caches the answers.
#[async_trait]
pub trait PresenceSource: Send + Sync {
    /// The voice channel the user is connected to in this guild, if any.
    async fn voice_channel(
        &self,
        guild: GuildId,
        user: UserId,
    ) -> Result<Option<ChannelId>, PlatformError>;

    /// The user's current presence status.
    async fn status(&self, guild: GuildId, user: UserId) -> Result<Presence, PlatformError>;
}

/// Role membership lookups.
#[async_trait]
pub trait RoleDirectory: Send + Sync {
    /// All members holding the role.
    async fn members_of(&self, guild: GuildId, role: RoleId)
        -> Result<Vec<UserId>, PlatformError>;

    /// All roles held by the user.
    async fn roles_of(&self, guild: GuildId, user: UserId)
        -> Result<BTreeSet<RoleId>, PlatformError>;
}

/// Guild membership lookups.
#[async_trait]
pub trait MemberDirectory: Send + Sync {
    /// Every member of the guild.
    async fn members(&self, guild: GuildId) -> Result<Vec<UserId>, PlatformError>;

    /// Whether the account is automated (a bot or webhook user).
    async fn is_automated(&self, user: UserId) -> Result<bool, PlatformError>;
}

/// Outcome of a direct notification attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The notification was delivered.
    Delivered,
    /// The recipient refuses direct notifications from this sender.
    Blocked,
}

/// Direct notification delivery.
///
/// Transport failures other than [`DeliveryOutcome::Blocked`] are reported
/// as `Err` and abort the calling session.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Send a direct text notification to a user.
    async fn send(&self, user: UserId, text: &str) -> Result<DeliveryOutcome, PlatformError>;
}

/// Invite minting for voice channels.
#[async_trait]
pub trait InviteMinter: Send + Sync {
    /// Create an invite for the channel and return its code.
    async fn create(
        &self,
        channel: ChannelId,
        max_uses: u32,
        ttl_secs: u64,
    ) -> Result<String, PlatformError>;
}
