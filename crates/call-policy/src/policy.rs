//! Callability policy of a single guild.

use call_core::{GuildId, RoleId, Target};
use indexmap::IndexSet;

/// Roles exempt from being called, plus the everyone toggle, for one guild.
///
/// Roles keep their insertion order so listings are stable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallPolicy {
    guild_id: GuildId,
    uncallable_roles: IndexSet<RoleId>,
    everyone_callable: bool,
}

impl CallPolicy {
    /// Create an empty policy: no uncallable roles, everyone not callable.
    pub fn new(guild_id: GuildId) -> Self {
        Self {
            guild_id,
            uncallable_roles: IndexSet::new(),
            everyone_callable: false,
        }
    }

    /// Create a policy from stored uncallable roles. Duplicates are dropped.
    pub fn with_roles(guild_id: GuildId, roles: impl IntoIterator<Item = RoleId>) -> Self {
        Self {
            guild_id,
            uncallable_roles: roles.into_iter().collect(),
            everyone_callable: false,
        }
    }

    pub fn guild_id(&self) -> GuildId {
        self.guild_id
    }

    /// Mark a role uncallable. Returns `false` if it already was.
    pub fn mark_uncallable(&mut self, role: RoleId) -> bool {
        self.uncallable_roles.insert(role)
    }

    /// Mark a role callable again. Returns `false` if it already was.
    pub fn mark_callable(&mut self, role: RoleId) -> bool {
        self.uncallable_roles.shift_remove(&role)
    }

    /// Whether a single role is uncallable.
    pub fn is_role_uncallable(&self, role: RoleId) -> bool {
        self.uncallable_roles.contains(&role)
    }

    /// Whether any of the given roles is uncallable.
    pub fn is_uncallable<'a>(&self, roles: impl IntoIterator<Item = &'a RoleId>) -> bool {
        roles
            .into_iter()
            .any(|role| self.uncallable_roles.contains(role))
    }

    /// Whether the target holds an uncallable role.
    pub fn is_target_uncallable(&self, target: &Target) -> bool {
        self.is_uncallable(&target.roles)
    }

    /// Uncallable roles in the order they were marked.
    pub fn uncallable_roles(&self) -> Vec<RoleId> {
        self.uncallable_roles.iter().copied().collect()
    }

    pub fn everyone_callable(&self) -> bool {
        self.everyone_callable
    }

    /// Set the everyone toggle. Returns `false` if it already had that value.
    pub fn set_everyone_callable(&mut self, callable: bool) -> bool {
        let changed = self.everyone_callable != callable;
        self.everyone_callable = callable;
        changed
    }
}
