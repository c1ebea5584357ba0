//! Invite minting for call notifications.

use std::sync::Arc;

use call_core::{ChannelId, InviteMinter, InviteToken, PlatformError};
use tracing::debug;

/// Mints single-use, time-limited invites into the caller's channel.
///
/// No retries happen here; a failed mint is reported to the caller.
#[derive(Clone)]
pub struct InvitationFactory {
    minter: Arc<dyn InviteMinter>,
    max_uses: u32,
    ttl_secs: u64,
}

impl InvitationFactory {
    /// Create a factory with explicit invite limits.
    pub fn new(minter: Arc<dyn InviteMinter>, max_uses: u32, ttl_secs: u64) -> Self {
        Self {
            minter,
            max_uses,
            ttl_secs,
        }
    }

    /// Create a factory with the default single-use, five-minute limits.
    pub fn with_defaults(minter: Arc<dyn InviteMinter>) -> Self {
        Self::new(
            minter,
            InviteToken::DEFAULT_MAX_USES,
            InviteToken::DEFAULT_TTL_SECS,
        )
    }

    /// Mint an invite for the channel.
    pub async fn create_invite(&self, channel: ChannelId) -> Result<InviteToken, PlatformError> {
        let code = self
            .minter
            .create(channel, self.max_uses, self.ttl_secs)
            .await?;
        debug!("Minted invite {} for channel {}", code, channel);

        Ok(InviteToken {
            code,
            channel_id: channel,
            max_uses: self.max_uses,
            ttl_secs: self.ttl_secs,
        })
    }
}
