//! Per-guild callability policy for the call engine.
//!
//! This crate provides:
//!
//! - [`CallPolicy`] - the uncallable roles and everyone toggle of one guild
//! - [`PolicyRegistry`] - shared access to every guild's policy, with
//!   concurrent reads and a single writer per guild
//! - [`PolicyStore`] - durable guild → uncallable roles mapping, with
//!   [`JsonPolicyStore`] (file-backed) and [`MemoryPolicyStore`] implementations
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use call_core::{GuildId, RoleId};
//! use call_policy::{JsonPolicyStore, PolicyRegistry};
//!
//! # async fn example() -> Result<(), call_policy::PolicyError> {
//! let store = Arc::new(JsonPolicyStore::new("uncallable_roles.json"));
//! let registry = PolicyRegistry::load(store).await;
//!
//! let added = registry.mark_uncallable(GuildId(1), RoleId(10)).await?;
//! assert!(added);
//! # Ok(())
//! # }
//! ```
//!
//! The everyone toggle is held in memory only; the persisted layout is a
//! JSON object mapping guild ids to arrays of role ids.

mod error;
mod policy;
mod registry;
mod store;

pub use error::{PolicyError, Result};
pub use policy::CallPolicy;
pub use registry::PolicyRegistry;
pub use store::{JsonPolicyStore, MemoryPolicyStore, PolicySnapshot, PolicyStore};
