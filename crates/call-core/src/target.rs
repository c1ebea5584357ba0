//! Targets and exclusion reasons.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::{ChannelId, RoleId, UserId};

/// Presence status of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    Online,
    Idle,
    Dnd,
    Invisible,
    Offline,
}

impl Presence {
    /// Get the platform name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Idle => "idle",
            Self::Dnd => "dnd",
            Self::Invisible => "invisible",
            Self::Offline => "offline",
        }
    }

    /// Whether the user is reachable for a call.
    pub fn is_online(&self) -> bool {
        matches!(self, Self::Online)
    }
}

impl fmt::Display for Presence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A candidate recipient with a live presence, voice and role snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub user_id: UserId,
    pub voice_channel: Option<ChannelId>,
    pub presence: Presence,
    pub roles: BTreeSet<RoleId>,
}

impl Target {
    /// Create a target snapshot with no voice channel and no roles.
    pub fn new(user_id: UserId, presence: Presence) -> Self {
        Self {
            user_id,
            voice_channel: None,
            presence,
            roles: BTreeSet::new(),
        }
    }

    /// Whether the target is connected to the given channel.
    pub fn is_in(&self, channel: ChannelId) -> bool {
        self.voice_channel == Some(channel)
    }
}

/// Why a target was dropped from a call.
///
/// Exclusions are data, not errors: they are accumulated per session and
/// reported back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExclusionReason {
    /// The target is already in the caller's voice channel.
    AlreadyConnected,
    /// The target's presence is not `online`.
    Status(Presence),
    /// The target holds a role marked uncallable in this guild.
    UncallableRole,
    /// The target refuses direct notifications.
    DeliveryBlocked,
}

impl ExclusionReason {
    /// Stable machine-readable code for this reason.
    pub fn code(&self) -> String {
        match self {
            Self::AlreadyConnected => "already-connected".to_string(),
            Self::Status(presence) => format!("status-{}", presence.as_str()),
            Self::UncallableRole => "uncallable-role".to_string(),
            Self::DeliveryBlocked => "delivery-blocked".to_string(),
        }
    }
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code())
    }
}

/// A target that was dropped from a call, with its reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exclusion {
    pub user_id: UserId,
    pub reason: ExclusionReason,
}

impl Exclusion {
    pub fn new(user_id: UserId, reason: ExclusionReason) -> Self {
        Self { user_id, reason }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_codes_are_stable() {
        assert_eq!(ExclusionReason::AlreadyConnected.code(), "already-connected");
        assert_eq!(
            ExclusionReason::Status(Presence::Offline).code(),
            "status-offline"
        );
        assert_eq!(ExclusionReason::Status(Presence::Dnd).code(), "status-dnd");
        assert_eq!(ExclusionReason::UncallableRole.code(), "uncallable-role");
        assert_eq!(ExclusionReason::DeliveryBlocked.to_string(), "delivery-blocked");
    }

    #[test]
    fn test_presence() {
        assert!(Presence::Online.is_online());
        assert!(!Presence::Idle.is_online());
        assert_eq!(Presence::Invisible.to_string(), "invisible");
    }

    #[test]
    fn test_target_is_in() {
        let mut target = Target::new(UserId(1), Presence::Online);
        assert!(!target.is_in(ChannelId(5)));
        target.voice_channel = Some(ChannelId(5));
        assert!(target.is_in(ChannelId(5)));
        assert!(!target.is_in(ChannelId(6)));
    }
}
