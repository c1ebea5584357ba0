//! Bundle of platform collaborators used by the engine.

use std::sync::Arc;

use call_core::{InviteMinter, MemberDirectory, NotificationChannel, PresenceSource, RoleDirectory};

/// The platform collaborators a call needs.
#[derive(Clone)]
pub struct Platform {
    pub presence: Arc<dyn PresenceSource>,
    pub roles: Arc<dyn RoleDirectory>,
    pub members: Arc<dyn MemberDirectory>,
    pub notifier: Arc<dyn NotificationChannel>,
    pub invites: Arc<dyn InviteMinter>,
}

impl Platform {
    /// Use a single adapter that implements every collaborator trait.
    pub fn from_shared<T>(adapter: Arc<T>) -> Self
    where
        T: PresenceSource
            + RoleDirectory
            + MemberDirectory
            + NotificationChannel
            + InviteMinter
            + 'static,
    {
        Self {
            presence: adapter.clone(),
            roles: adapter.clone(),
            members: adapter.clone(),
            notifier: adapter.clone(),
            invites: adapter,
        }
    }

    /// Replace the notification channel, e.g. to wrap it with logging.
    pub fn with_notifier(mut self, notifier: Arc<dyn NotificationChannel>) -> Self {
        self.notifier = notifier;
        self
    }
}
