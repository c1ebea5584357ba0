//! In-memory platform fakes for the call engine.
//!
//! This crate provides mock implementations of the platform collaborator
//! traits for testing:
//! - `MockGuild` - a guild with members, roles, voice channels and presence,
//!   implementing every collaborator trait and recording what was sent
//! - `ScriptedTimer` - a virtual clock that runs scripted guild changes
//!   between rounds
//!
//! For production, implement the traits in `call-core` over the real
//! platform client instead.
//!
//! # Example
//!
//! ```rust
//! use call_core::{ChannelId, GuildId, Presence, PresenceSource, UserId};
//! use mock_platform::MockGuild;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), call_core::PlatformError> {
//!     let guild = MockGuild::new(GuildId(1));
//!     guild.add_member(UserId(10), Presence::Online);
//!     guild.join_voice(UserId(10), ChannelId(100));
//!
//!     let channel = guild.voice_channel(GuildId(1), UserId(10)).await?;
//!     assert_eq!(channel, Some(ChannelId(100)));
//!     Ok(())
//! }
//! ```

mod guild;
mod timer;

pub use guild::{MockGuild, SentNotification};
pub use timer::ScriptedTimer;
