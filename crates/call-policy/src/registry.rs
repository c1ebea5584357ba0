//! Shared registry of guild call policies.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use call_core::{GuildId, RoleId, Target};
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use crate::error::{PolicyError, Result};
use crate::policy::CallPolicy;
use crate::store::PolicyStore;

/// One guild's policy plus its writer lock.
///
/// Readers only take the `policy` read lock. Writers hold `writer` for the
/// whole read-modify-flush-commit sequence, so mutations of one guild are
/// serialized while reads stay concurrent.
#[derive(Debug)]
struct GuildSlot {
    policy: RwLock<CallPolicy>,
    writer: Mutex<()>,
}

impl GuildSlot {
    fn new(policy: CallPolicy) -> Self {
        Self {
            policy: RwLock::new(policy),
            writer: Mutex::new(()),
        }
    }
}

/// Call policies for every guild, backed by a [`PolicyStore`].
///
/// Policies are created lazily with empty defaults the first time a guild is
/// referenced. Every role mutation is flushed to the store before it is
/// applied in memory; a failed flush leaves the policy unchanged.
pub struct PolicyRegistry {
    guilds: RwLock<HashMap<GuildId, Arc<GuildSlot>>>,
    store: Arc<dyn PolicyStore>,
}

impl PolicyRegistry {
    /// Create an empty registry without reading the store.
    pub fn new(store: Arc<dyn PolicyStore>) -> Self {
        Self {
            guilds: RwLock::new(HashMap::new()),
            store,
        }
    }

    /// Create a registry populated from the store.
    ///
    /// A store that cannot be read degrades to an empty policy set.
    pub async fn load(store: Arc<dyn PolicyStore>) -> Self {
        let registry = Self::new(store);

        match registry.store.load().await {
            Ok(snapshot) => {
                let mut guilds = registry.guilds.write().await;
                for (guild, roles) in snapshot {
                    let policy = CallPolicy::with_roles(guild, roles);
                    guilds.insert(guild, Arc::new(GuildSlot::new(policy)));
                }
                info!("Loaded call policies for {} guilds", guilds.len());
            }
            Err(err) => {
                warn!("Failed to load call policies, starting empty: {}", err);
            }
        }

        registry
    }

    async fn slot(&self, guild: GuildId) -> Arc<GuildSlot> {
        if let Some(slot) = self.guilds.read().await.get(&guild) {
            return slot.clone();
        }

        self.guilds
            .write()
            .await
            .entry(guild)
            .or_insert_with(|| Arc::new(GuildSlot::new(CallPolicy::new(guild))))
            .clone()
    }

    /// Snapshot of a guild's policy.
    pub async fn policy(&self, guild: GuildId) -> CallPolicy {
        self.slot(guild).await.policy.read().await.clone()
    }

    /// Apply a role mutation: flush to the store, then commit in memory.
    async fn mutate_roles<F>(&self, guild: GuildId, apply: F) -> Result<bool>
    where
        F: FnOnce(&mut CallPolicy) -> bool,
    {
        let slot = self.slot(guild).await;
        let _writer = slot.writer.lock().await;

        let mut next = slot.policy.read().await.clone();
        if !apply(&mut next) {
            return Ok(false);
        }

        self.store
            .save_guild(guild, &next.uncallable_roles())
            .await
            .map_err(|source| PolicyError::Persist {
                guild,
                source: Box::new(source),
            })?;

        *slot.policy.write().await = next;
        Ok(true)
    }

    /// Mark a role uncallable in a guild.
    ///
    /// Returns `false` if the role was already uncallable.
    pub async fn mark_uncallable(&self, guild: GuildId, role: RoleId) -> Result<bool> {
        let added = self
            .mutate_roles(guild, |policy| policy.mark_uncallable(role))
            .await?;
        if added {
            info!("Guild {}: role {} is now uncallable", guild, role);
        }
        Ok(added)
    }

    /// Make a role callable again in a guild.
    ///
    /// Returns `false` if the role was already callable.
    pub async fn mark_callable(&self, guild: GuildId, role: RoleId) -> Result<bool> {
        let removed = self
            .mutate_roles(guild, |policy| policy.mark_callable(role))
            .await?;
        if removed {
            info!("Guild {}: role {} is now callable", guild, role);
        }
        Ok(removed)
    }

    /// Whether any of the roles is uncallable in the guild.
    pub async fn is_uncallable(&self, guild: GuildId, roles: &BTreeSet<RoleId>) -> bool {
        self.slot(guild).await.policy.read().await.is_uncallable(roles)
    }

    /// Whether the target holds an uncallable role in the guild.
    pub async fn is_target_uncallable(&self, guild: GuildId, target: &Target) -> bool {
        self.is_uncallable(guild, &target.roles).await
    }

    /// Uncallable roles of the guild, in the order they were marked.
    pub async fn list_uncallable(&self, guild: GuildId) -> Vec<RoleId> {
        self.slot(guild).await.policy.read().await.uncallable_roles()
    }

    pub async fn everyone_callable(&self, guild: GuildId) -> bool {
        self.slot(guild).await.policy.read().await.everyone_callable()
    }

    /// Set whether everyone may be called at once in the guild.
    ///
    /// Held in memory only. Returns `false` if the toggle already had that value.
    pub async fn set_everyone_callable(&self, guild: GuildId, callable: bool) -> bool {
        let slot = self.slot(guild).await;
        let _writer = slot.writer.lock().await;

        let changed = slot.policy.write().await.set_everyone_callable(callable);
        if changed {
            info!("Guild {}: everyone callable set to {}", guild, callable);
        }
        changed
    }
}
