//! Voice channel invite tokens.

use crate::ids::ChannelId;

/// A single-use, time-limited invite into a voice channel.
///
/// Tokens are minted per notification attempt and never stored beyond the
/// call they were created for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteToken {
    /// Platform invite code.
    pub code: String,
    /// Channel the invite joins.
    pub channel_id: ChannelId,
    /// Maximum number of times the invite can be redeemed.
    pub max_uses: u32,
    /// Lifetime of the invite in seconds.
    pub ttl_secs: u64,
}

impl InviteToken {
    /// Default number of uses for a call invite.
    pub const DEFAULT_MAX_USES: u32 = 1;

    /// Default lifetime for a call invite (five minutes).
    pub const DEFAULT_TTL_SECS: u64 = 300;

    /// Build the shareable URL for this invite.
    pub fn url(&self, base_url: &str) -> String {
        format!("{}{}", base_url, self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invite_url() {
        let token = InviteToken {
            code: "xyz".to_string(),
            channel_id: ChannelId(1),
            max_uses: InviteToken::DEFAULT_MAX_USES,
            ttl_secs: InviteToken::DEFAULT_TTL_SECS,
        };
        assert_eq!(token.url("https://discord.gg/"), "https://discord.gg/xyz");
    }
}
