//! Mention resolution into call targets.

use call_core::{GuildId, PlatformError, RoleId, Target, UserId};
use call_policy::CallPolicy;
use indexmap::IndexSet;
use tracing::debug;

use crate::error::{CallError, PolicyViolation};
use crate::platform::Platform;

/// Raw mentions from a call command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MentionRequest {
    pub guild: GuildId,
    pub caller: UserId,
    /// Directly mentioned users.
    pub users: Vec<UserId>,
    /// Mentioned roles; every member of each role is a candidate.
    pub roles: Vec<RoleId>,
    /// Whether the caller asked to call everyone.
    pub everyone: bool,
}

impl MentionRequest {
    /// Create an empty request for the caller.
    pub fn new(guild: GuildId, caller: UserId) -> Self {
        Self {
            guild,
            caller,
            ..Default::default()
        }
    }

    pub fn with_users(mut self, users: impl IntoIterator<Item = UserId>) -> Self {
        self.users.extend(users);
        self
    }

    pub fn with_roles(mut self, roles: impl IntoIterator<Item = RoleId>) -> Self {
        self.roles.extend(roles);
        self
    }

    pub fn with_everyone(mut self) -> Self {
        self.everyone = true;
        self
    }

    /// Whether nothing was mentioned at all.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty() && self.roles.is_empty() && !self.everyone
    }
}

/// Turns user, role and everyone mentions into deduplicated human targets.
#[derive(Clone)]
pub struct MentionResolver {
    platform: Platform,
    allow_self_call: bool,
}

impl MentionResolver {
    pub fn new(platform: Platform, allow_self_call: bool) -> Self {
        Self {
            platform,
            allow_self_call,
        }
    }

    /// Resolve mentions into targets, in order of first appearance.
    ///
    /// Automated accounts are dropped, and so is the caller unless self
    /// calls are allowed. An everyone request fails with
    /// [`PolicyViolation::EveryoneNotCallable`] unless the guild allows it,
    /// and otherwise yields every member currently online.
    pub async fn resolve(
        &self,
        request: &MentionRequest,
        policy: &CallPolicy,
    ) -> Result<Vec<Target>, CallError> {
        let guild = request.guild;

        let candidates: IndexSet<UserId> = if request.everyone {
            if !policy.everyone_callable() {
                return Err(PolicyViolation::EveryoneNotCallable.into());
            }
            self.platform.members.members(guild).await?.into_iter().collect()
        } else {
            let mut candidates: IndexSet<UserId> = request.users.iter().copied().collect();
            for role in &request.roles {
                candidates.extend(self.platform.roles.members_of(guild, *role).await?);
            }
            candidates
        };

        let mut targets = Vec::with_capacity(candidates.len());
        for user in candidates {
            if user == request.caller && !self.allow_self_call {
                debug!("Dropping caller {} from their own call", user);
                continue;
            }
            if self.platform.members.is_automated(user).await? {
                debug!("Dropping automated account {}", user);
                continue;
            }

            let target = self.snapshot(guild, user).await?;
            if request.everyone && !target.presence.is_online() {
                continue;
            }
            targets.push(target);
        }

        debug!(
            "Resolved {} targets for caller {} in guild {}",
            targets.len(),
            request.caller,
            guild
        );
        Ok(targets)
    }

    /// Take a live snapshot of a user's presence, voice state and roles.
    pub async fn snapshot(&self, guild: GuildId, user: UserId) -> Result<Target, PlatformError> {
        let presence = self.platform.presence.status(guild, user).await?;
        let voice_channel = self.platform.presence.voice_channel(guild, user).await?;
        let roles = self.platform.roles.roles_of(guild, user).await?;

        Ok(Target {
            user_id: user,
            voice_channel,
            presence,
            roles,
        })
    }
}
