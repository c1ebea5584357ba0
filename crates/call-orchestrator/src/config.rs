//! Configuration for call sessions.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use call_core::InviteToken;
use tracing::warn;

/// Default number of rounds per call.
pub const DEFAULT_MAX_ROUNDS: u32 = 5;

/// Default wait between rounds.
pub const DEFAULT_ROUND_INTERVAL: Duration = Duration::from_secs(1);

/// Default prefix for invite URLs.
pub const DEFAULT_INVITE_BASE_URL: &str = "https://discord.gg/";

/// Default path of the uncallable roles file.
pub const DEFAULT_POLICY_PATH: &str = "uncallable_roles.json";

/// Configuration for the call orchestrator.
#[derive(Debug, Clone)]
pub struct CallConfig {
    /// Maximum number of rounds before the call ends. Clamped to at least 1.
    pub max_rounds: u32,

    /// Wait between two rounds.
    pub round_interval: Duration,

    /// Uses allowed per minted invite.
    pub invite_max_uses: u32,

    /// Lifetime of a minted invite, in seconds.
    pub invite_ttl_secs: u64,

    /// Prefix joined with the invite code to form the URL in notifications.
    pub invite_base_url: String,

    /// Whether a caller mentioning themselves is kept as a target.
    pub allow_self_call: bool,

    /// Location of the JSON policy store.
    pub policy_path: PathBuf,
}

impl Default for CallConfig {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
            round_interval: DEFAULT_ROUND_INTERVAL,
            invite_max_uses: InviteToken::DEFAULT_MAX_USES,
            invite_ttl_secs: InviteToken::DEFAULT_TTL_SECS,
            invite_base_url: DEFAULT_INVITE_BASE_URL.to_string(),
            allow_self_call: false,
            policy_path: PathBuf::from(DEFAULT_POLICY_PATH),
        }
    }
}

/// Read and parse an environment variable, warning on malformed values.
fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring invalid value for {}: {:?}", name, raw);
            None
        }
    }
}

impl CallConfig {
    /// Create configuration from environment variables.
    ///
    /// Optional environment variables:
    /// - `CALL_MAX_ROUNDS` - Rounds per call (default: 5)
    /// - `CALL_ROUND_INTERVAL_MS` - Wait between rounds in ms (default: 1000)
    /// - `CALL_INVITE_MAX_USES` - Uses per invite (default: 1)
    /// - `CALL_INVITE_TTL_SECS` - Invite lifetime (default: 300)
    /// - `CALL_INVITE_BASE_URL` - Invite URL prefix (default: https://discord.gg/)
    /// - `CALL_ALLOW_SELF_CALL` - Keep the caller as a target (default: false)
    /// - `CALL_POLICY_PATH` - Policy store file (default: uncallable_roles.json)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let max_rounds = parse_var("CALL_MAX_ROUNDS")
            .unwrap_or(defaults.max_rounds)
            .max(1);

        let round_interval = parse_var("CALL_ROUND_INTERVAL_MS")
            .map(Duration::from_millis)
            .unwrap_or(defaults.round_interval);

        let invite_max_uses = parse_var("CALL_INVITE_MAX_USES").unwrap_or(defaults.invite_max_uses);

        let invite_ttl_secs = parse_var("CALL_INVITE_TTL_SECS").unwrap_or(defaults.invite_ttl_secs);

        let invite_base_url =
            env::var("CALL_INVITE_BASE_URL").unwrap_or(defaults.invite_base_url);

        let allow_self_call = parse_var("CALL_ALLOW_SELF_CALL").unwrap_or(defaults.allow_self_call);

        let policy_path = env::var("CALL_POLICY_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.policy_path);

        Self {
            max_rounds,
            round_interval,
            invite_max_uses,
            invite_ttl_secs,
            invite_base_url,
            allow_self_call,
            policy_path,
        }
    }

    /// Set the number of rounds (at least 1).
    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds.max(1);
        self
    }

    /// Set the wait between rounds.
    pub fn with_round_interval(mut self, round_interval: Duration) -> Self {
        self.round_interval = round_interval;
        self
    }

    /// Keep or drop the caller when they mention themselves.
    pub fn with_self_call(mut self, allow: bool) -> Self {
        self.allow_self_call = allow;
        self
    }

    /// Upper bound on how long the round loop can wait in total.
    pub fn max_session_wait(&self) -> Duration {
        self.round_interval * self.max_rounds.saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CallConfig::default();
        assert_eq!(config.max_rounds, 5);
        assert_eq!(config.round_interval, Duration::from_secs(1));
        assert_eq!(config.invite_max_uses, 1);
        assert_eq!(config.invite_ttl_secs, 300);
        assert!(!config.allow_self_call);
        assert_eq!(config.policy_path, PathBuf::from("uncallable_roles.json"));
    }

    #[test]
    fn test_builders() {
        let config = CallConfig::default()
            .with_max_rounds(0)
            .with_round_interval(Duration::from_millis(10))
            .with_self_call(true);
        assert_eq!(config.max_rounds, 1);
        assert_eq!(config.round_interval, Duration::from_millis(10));
        assert!(config.allow_self_call);
    }

    #[test]
    fn test_max_session_wait() {
        let config = CallConfig::default();
        assert_eq!(config.max_session_wait(), Duration::from_secs(4));
    }
}
