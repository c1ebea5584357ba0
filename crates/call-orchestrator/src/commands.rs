//! Caller-facing commands mapped onto the core operations.
//!
//! Parsing the platform's command syntax, permission checks and help text
//! belong to the platform adapter. These handlers take already parsed
//! arguments and return the reply lines to send back, in order.

use std::sync::Arc;

use call_core::{GuildId, RoleId, UserId};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::error::{CallError, PolicyViolation};
use crate::formatting::{
    didnt_call_message, everyone_toggled_message, role_marked_message, role_recalled_message,
    uncallables_message, CALLER_NOT_IN_VOICE, EVERYONE_NOT_CALLABLE, FINISHING_CALL, NO_MENTIONS,
    STARTING_CALL,
};
use crate::orchestrator::{CallOrchestrator, CallRequest};
use crate::resolver::MentionRequest;

/// A mentioned role with its display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleMention {
    pub id: RoleId,
    pub name: String,
}

impl RoleMention {
    pub fn new(id: RoleId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Arguments of the `call` command.
#[derive(Debug, Clone)]
pub struct CallCommand {
    pub caller_name: String,
    pub mentions: MentionRequest,
}

impl CallCommand {
    pub fn new(caller_name: impl Into<String>, mentions: MentionRequest) -> Self {
        Self {
            caller_name: caller_name.into(),
            mentions,
        }
    }
}

/// Handles `call`, `uncallable`, `recallable`, `uncallables` and the
/// everyone toggle.
#[derive(Clone)]
pub struct CommandHandler {
    orchestrator: Arc<CallOrchestrator>,
}

impl CommandHandler {
    pub fn new(orchestrator: Arc<CallOrchestrator>) -> Self {
        Self { orchestrator }
    }

    /// `call <targets>`: resolve the mentions and run a call session.
    ///
    /// `on_start` receives the start reply as soon as ringing begins, so the
    /// adapter can send it while the rounds run. The returned lines are the
    /// replies to send once the session is over. Precondition failures and
    /// policy violations become replies and never reach `on_start`. Fatal
    /// mid-session errors are returned with their partial report.
    pub async fn call<F>(
        &self,
        command: CallCommand,
        cancel: &CancellationToken,
        on_start: F,
    ) -> Result<Vec<String>, CallError>
    where
        F: FnOnce(&str) + Send,
    {
        let mentions = &command.mentions;
        if mentions.is_empty() {
            return Ok(vec![NO_MENTIONS.to_string()]);
        }

        let policy = self.orchestrator.policies().policy(mentions.guild).await;
        let targets = match self.orchestrator.resolver().resolve(mentions, &policy).await {
            Ok(targets) => targets,
            Err(CallError::PolicyViolation(PolicyViolation::EveryoneNotCallable)) => {
                return Ok(vec![EVERYONE_NOT_CALLABLE.to_string()]);
            }
            Err(err) => return Err(err),
        };

        let request = CallRequest::from_targets(
            mentions.guild,
            mentions.caller,
            command.caller_name.as_str(),
            &targets,
        );
        let report = match self
            .orchestrator
            .call_with_start(request, cancel, |_| on_start(STARTING_CALL))
            .await
        {
            Ok(report) => report,
            Err(CallError::CallerNotInVoice) => {
                return Ok(vec![CALLER_NOT_IN_VOICE.to_string()]);
            }
            Err(err) => return Err(err),
        };

        let mut replies = vec![FINISHING_CALL.to_string()];
        if let Some(message) = didnt_call_message(&report.unreachable) {
            replies.push(message);
        }
        Ok(replies)
    }

    /// `uncallable <roles>`: mark each role uncallable.
    pub async fn uncallable(
        &self,
        guild: GuildId,
        roles: &[RoleMention],
    ) -> Result<Vec<String>, CallError> {
        if roles.is_empty() {
            return Ok(vec![NO_MENTIONS.to_string()]);
        }

        let mut replies = Vec::with_capacity(roles.len());
        for role in roles {
            let added = self
                .orchestrator
                .policies()
                .mark_uncallable(guild, role.id)
                .await?;
            replies.push(role_marked_message(&role.name, added));
        }
        Ok(replies)
    }

    /// `recallable <roles>`: make each role callable again.
    pub async fn recallable(
        &self,
        guild: GuildId,
        roles: &[RoleMention],
    ) -> Result<Vec<String>, CallError> {
        if roles.is_empty() {
            return Ok(vec![NO_MENTIONS.to_string()]);
        }

        let mut replies = Vec::with_capacity(roles.len());
        for role in roles {
            let removed = self
                .orchestrator
                .policies()
                .mark_callable(guild, role.id)
                .await?;
            replies.push(role_recalled_message(&role.name, removed));
        }
        Ok(replies)
    }

    /// `uncallables`: list the guild's uncallable roles.
    pub async fn uncallables(&self, guild: GuildId) -> String {
        let roles = self.orchestrator.policies().list_uncallable(guild).await;
        uncallables_message(&roles)
    }

    /// Allow or forbid calling everyone at once.
    pub async fn everyone_callable(&self, guild: GuildId, by: UserId, callable: bool) -> String {
        let changed = self
            .orchestrator
            .policies()
            .set_everyone_callable(guild, callable)
            .await;
        if changed {
            info!("Guild {}: everyone toggle changed by {}", guild, by);
        }
        everyone_toggled_message(callable, changed)
    }
}
