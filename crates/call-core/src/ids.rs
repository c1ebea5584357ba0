//! Stable platform identifiers.
//!
//! All identifiers are opaque 64-bit snowflakes assigned by the platform.
//! They are compared by value, never by the identity of a live platform object.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! snowflake {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
            Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Get the raw numeric value.
            pub fn get(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

snowflake!(
    /// Identifier of a guild (server).
    GuildId
);
snowflake!(
    /// Identifier of a user account.
    UserId
);
snowflake!(
    /// Identifier of a guild role.
    RoleId
);
snowflake!(
    /// Identifier of a voice channel.
    ChannelId
);

impl UserId {
    /// Mention markup for this user.
    pub fn mention(self) -> String {
        format!("<@{}>", self.0)
    }
}

impl RoleId {
    /// Mention markup for this role.
    pub fn mention(self) -> String {
        format!("<@&{}>", self.0)
    }
}
