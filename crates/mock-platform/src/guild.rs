//! A fake guild implementing every platform collaborator.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use call_core::{
    ChannelId, DeliveryOutcome, GuildId, InviteMinter, MemberDirectory, NotificationChannel,
    PlatformError, Presence, PresenceSource, RoleDirectory, RoleId, UserId,
};
use tracing::debug;

/// Per-member state.
#[derive(Debug, Clone)]
struct Member {
    presence: Presence,
    voice: Option<ChannelId>,
    roles: BTreeSet<RoleId>,
    automated: bool,
    blocks_notifications: bool,
    failing_delivery: bool,
}

impl Member {
    fn new(presence: Presence, automated: bool) -> Self {
        Self {
            presence,
            voice: None,
            roles: BTreeSet::new(),
            automated,
            blocks_notifications: false,
            failing_delivery: false,
        }
    }
}

/// A notification recorded by the fake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentNotification {
    pub user_id: UserId,
    pub text: String,
}

#[derive(Debug, Default)]
struct State {
    members: BTreeMap<UserId, Member>,
    sent: Vec<SentNotification>,
    invites: Vec<(ChannelId, u32, u64)>,
    presence_lookups: usize,
    unavailable: bool,
}

/// An in-memory guild.
///
/// Cloning shares the underlying state, so a test can keep a handle and
/// change presence or voice state while a call session is running.
#[derive(Debug, Clone)]
pub struct MockGuild {
    id: GuildId,
    state: Arc<Mutex<State>>,
}

impl MockGuild {
    /// Create an empty guild.
    pub fn new(id: GuildId) -> Self {
        Self {
            id,
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    pub fn id(&self) -> GuildId {
        self.id
    }

    fn state(&self) -> MutexGuard<'_, State> {
        // A poisoned lock only means another test thread panicked.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn with_member(&self, user: UserId, f: impl FnOnce(&mut Member)) {
        if let Some(member) = self.state().members.get_mut(&user) {
            f(member);
        }
    }

    fn check_guild(&self, guild: GuildId) -> Result<(), PlatformError> {
        if guild != self.id {
            return Err(PlatformError::NotFound(format!("guild {}", guild)));
        }
        if self.state().unavailable {
            return Err(PlatformError::Unavailable("mock guild offline".to_string()));
        }
        Ok(())
    }

    /// Add a human member.
    pub fn add_member(&self, user: UserId, presence: Presence) {
        self.state().members.insert(user, Member::new(presence, false));
    }

    /// Add an automated (bot) member.
    pub fn add_bot(&self, user: UserId) {
        self.state()
            .members
            .insert(user, Member::new(Presence::Online, true));
    }

    /// Give a member a role.
    pub fn grant_role(&self, user: UserId, role: RoleId) {
        self.with_member(user, |member| {
            member.roles.insert(role);
        });
    }

    /// Change a member's presence.
    pub fn set_presence(&self, user: UserId, presence: Presence) {
        self.with_member(user, |member| member.presence = presence);
    }

    /// Connect a member to a voice channel.
    pub fn join_voice(&self, user: UserId, channel: ChannelId) {
        self.with_member(user, |member| member.voice = Some(channel));
    }

    /// Disconnect a member from voice.
    pub fn leave_voice(&self, user: UserId) {
        self.with_member(user, |member| member.voice = None);
    }

    /// Make the member refuse direct notifications.
    pub fn block_notifications(&self, user: UserId) {
        self.with_member(user, |member| member.blocks_notifications = true);
    }

    /// Make delivery to the member fail with a transport error.
    pub fn fail_delivery(&self, user: UserId) {
        self.with_member(user, |member| member.failing_delivery = true);
    }

    /// Make every lookup fail as if the platform were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state().unavailable = unavailable;
    }

    /// Notifications delivered so far.
    pub fn sent(&self) -> Vec<SentNotification> {
        self.state().sent.clone()
    }

    /// Notifications delivered to one user.
    pub fn sent_to(&self, user: UserId) -> usize {
        self.state()
            .sent
            .iter()
            .filter(|sent| sent.user_id == user)
            .count()
    }

    /// Invites minted so far, as `(channel, max_uses, ttl_secs)`.
    pub fn invites(&self) -> Vec<(ChannelId, u32, u64)> {
        self.state().invites.clone()
    }

    /// Number of presence status lookups served.
    pub fn presence_lookups(&self) -> usize {
        self.state().presence_lookups
    }
}

#[async_trait]
impl PresenceSource for MockGuild {
    async fn voice_channel(
        &self,
        guild: GuildId,
        user: UserId,
    ) -> Result<Option<ChannelId>, PlatformError> {
        self.check_guild(guild)?;
        Ok(self.state().members.get(&user).and_then(|m| m.voice))
    }

    async fn status(&self, guild: GuildId, user: UserId) -> Result<Presence, PlatformError> {
        self.check_guild(guild)?;
        let mut state = self.state();
        state.presence_lookups += 1;
        Ok(state
            .members
            .get(&user)
            .map(|m| m.presence)
            .unwrap_or(Presence::Offline))
    }
}

#[async_trait]
impl RoleDirectory for MockGuild {
    async fn members_of(
        &self,
        guild: GuildId,
        role: RoleId,
    ) -> Result<Vec<UserId>, PlatformError> {
        self.check_guild(guild)?;
        Ok(self
            .state()
            .members
            .iter()
            .filter(|(_, member)| member.roles.contains(&role))
            .map(|(user, _)| *user)
            .collect())
    }

    async fn roles_of(
        &self,
        guild: GuildId,
        user: UserId,
    ) -> Result<BTreeSet<RoleId>, PlatformError> {
        self.check_guild(guild)?;
        Ok(self
            .state()
            .members
            .get(&user)
            .map(|m| m.roles.clone())
            .unwrap_or_default())
    }
}

#[async_trait]
impl MemberDirectory for MockGuild {
    async fn members(&self, guild: GuildId) -> Result<Vec<UserId>, PlatformError> {
        self.check_guild(guild)?;
        Ok(self.state().members.keys().copied().collect())
    }

    async fn is_automated(&self, user: UserId) -> Result<bool, PlatformError> {
        Ok(self
            .state()
            .members
            .get(&user)
            .map(|m| m.automated)
            .unwrap_or(false))
    }
}

#[async_trait]
impl NotificationChannel for MockGuild {
    async fn send(&self, user: UserId, text: &str) -> Result<DeliveryOutcome, PlatformError> {
        let mut state = self.state();
        let member = state
            .members
            .get(&user)
            .ok_or_else(|| PlatformError::NotFound(format!("user {}", user)))?;

        if member.failing_delivery {
            return Err(PlatformError::Request("connection reset".to_string()));
        }
        if member.blocks_notifications {
            return Ok(DeliveryOutcome::Blocked);
        }

        debug!("Mock delivery to {}: {}", user, text);
        state.sent.push(SentNotification {
            user_id: user,
            text: text.to_string(),
        });
        Ok(DeliveryOutcome::Delivered)
    }
}

#[async_trait]
impl InviteMinter for MockGuild {
    async fn create(
        &self,
        channel: ChannelId,
        max_uses: u32,
        ttl_secs: u64,
    ) -> Result<String, PlatformError> {
        let mut state = self.state();
        if state.unavailable {
            return Err(PlatformError::Unavailable("mock guild offline".to_string()));
        }
        state.invites.push((channel, max_uses, ttl_secs));
        Ok(format!("invite-{}", state.invites.len()))
    }
}
