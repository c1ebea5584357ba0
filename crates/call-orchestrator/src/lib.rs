//! Call orchestration engine.
//!
//! This crate provides the [`CallOrchestrator`] which simulates a "call" in
//! a group chat: it repeatedly sends single-use voice channel invites to a
//! set of users until they join, become unreachable, or the caller hangs up.
//!
//! # Features
//!
//! - Resolves user and role mentions into a deduplicated list of humans
//! - Re-checks every target's presence and voice state each round
//! - Skips targets holding a guild's uncallable roles
//! - Mints a fresh single-use invite for each notification
//! - Stops when the caller leaves their voice channel or is cancelled
//! - Reports a stable reason for every target that was not called
//!
//! # Architecture
//!
//! ```text
//! Command (from the platform adapter)
//!          ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    CALL ORCHESTRATOR                        │
//! │                                                             │
//! │  1. Resolve mentions (MentionResolver)                      │
//! │         ↓                                                   │
//! │  2. Check the caller is in a voice channel                  │
//! │         ↓                                                   │
//! │  3. For each round (default 5, one second apart):           │
//! │     • caller left the origin channel → Aborted              │
//! │     • refresh each remaining target                         │
//! │     • already connected / not online / uncallable → report  │
//! │     • otherwise mint an invite and notify                   │
//! │         ↓                                                   │
//! │  4. Return the report of unreachable targets                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use call_orchestrator::{CallConfig, CallOrchestrator, CallRequest, Platform};
//! use call_policy::{JsonPolicyStore, PolicyRegistry};
//! use tokio_util::sync::CancellationToken;
//!
//! let config = CallConfig::from_env();
//! let store = Arc::new(JsonPolicyStore::new(&config.policy_path));
//! let policies = Arc::new(PolicyRegistry::load(store).await);
//! let orchestrator = CallOrchestrator::new(Platform::from_shared(adapter), policies, config);
//!
//! let request = CallRequest::new(guild, caller, "alice", targets);
//! let report = orchestrator.call(request, &CancellationToken::new()).await?;
//! for exclusion in &report.unreachable {
//!     println!("{}: {}", exclusion.user_id, exclusion.reason);
//! }
//! ```

mod commands;
mod config;
mod error;
mod formatting;
mod invitation;
mod orchestrator;
mod platform;
mod resolver;
mod sender;
mod session;

// Public exports
pub use commands::{CallCommand, CommandHandler, RoleMention};
pub use config::CallConfig;
pub use error::{CallError, PolicyViolation};
pub use formatting::{
    didnt_call_message, everyone_toggled_message, exclusion_line, notification_text,
    role_marked_message, role_recalled_message, uncallables_message, CALLER_NOT_IN_VOICE,
    EVERYONE_NOT_CALLABLE, FINISHING_CALL, NO_MENTIONS, STARTING_CALL,
};
pub use invitation::InvitationFactory;
pub use orchestrator::{CallOrchestrator, CallRequest};
pub use platform::Platform;
pub use resolver::{MentionRequest, MentionResolver};
pub use sender::{LoggingNotifier, NoOpNotifier};
pub use session::{AbortReason, CallOutcome, CallReport, CallSession, CallState, Completion};

// Re-export commonly used types from dependencies
pub use call_core::{Exclusion, ExclusionReason, GuildId, RoleId, UserId};
pub use tokio_util::sync::CancellationToken;
