//! The call orchestrator: a per-invocation polling state machine.

use std::sync::Arc;

use call_core::{
    ChannelId, DeliveryOutcome, ExclusionReason, GuildId, RoundTimer, Target, TokioTimer, UserId,
};
use call_policy::PolicyRegistry;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::CallConfig;
use crate::error::CallError;
use crate::formatting::notification_text;
use crate::invitation::InvitationFactory;
use crate::platform::Platform;
use crate::resolver::MentionResolver;
use crate::session::{AbortReason, CallOutcome, CallReport, CallSession, Completion};

/// A request to call a set of already resolved users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRequest {
    pub guild: GuildId,
    pub caller: UserId,
    /// Display name shown in the notification text.
    pub caller_name: String,
    pub targets: Vec<UserId>,
}

impl CallRequest {
    pub fn new(
        guild: GuildId,
        caller: UserId,
        caller_name: impl Into<String>,
        targets: impl IntoIterator<Item = UserId>,
    ) -> Self {
        Self {
            guild,
            caller,
            caller_name: caller_name.into(),
            targets: targets.into_iter().collect(),
        }
    }

    /// Build a request from resolved target snapshots.
    pub fn from_targets(
        guild: GuildId,
        caller: UserId,
        caller_name: impl Into<String>,
        targets: &[Target],
    ) -> Self {
        Self::new(guild, caller, caller_name, targets.iter().map(|t| t.user_id))
    }
}

/// Drives call sessions.
///
/// The orchestrator itself is stateless between calls and can run any
/// number of sessions concurrently; each [`CallOrchestrator::call`]
/// exclusively owns its [`CallSession`]. The only shared state is the
/// [`PolicyRegistry`], which the orchestrator reads but never writes.
pub struct CallOrchestrator {
    platform: Platform,
    policies: Arc<PolicyRegistry>,
    invitations: InvitationFactory,
    resolver: MentionResolver,
    timer: Arc<dyn RoundTimer>,
    config: CallConfig,
}

impl CallOrchestrator {
    /// Create an orchestrator that waits between rounds in real time.
    pub fn new(platform: Platform, policies: Arc<PolicyRegistry>, config: CallConfig) -> Self {
        let invitations = InvitationFactory::new(
            platform.invites.clone(),
            config.invite_max_uses,
            config.invite_ttl_secs,
        );
        let resolver = MentionResolver::new(platform.clone(), config.allow_self_call);

        Self {
            platform,
            policies,
            invitations,
            resolver,
            timer: Arc::new(TokioTimer),
            config,
        }
    }

    /// Replace the round timer, e.g. with a virtual clock in tests.
    pub fn with_timer(mut self, timer: Arc<dyn RoundTimer>) -> Self {
        self.timer = timer;
        self
    }

    pub fn config(&self) -> &CallConfig {
        &self.config
    }

    pub fn policies(&self) -> &Arc<PolicyRegistry> {
        &self.policies
    }

    pub fn resolver(&self) -> &MentionResolver {
        &self.resolver
    }

    /// Run a call session to completion.
    ///
    /// Fails with [`CallError::CallerNotInVoice`] before sending anything if
    /// the caller is not in a voice channel. Otherwise runs up to
    /// `max_rounds` rounds and returns the report. The session stops early
    /// when every target is resolved, when the caller leaves the origin
    /// channel, or when `cancel` fires. Unexpected lookup, invite or
    /// delivery failures abort the session with the partial report attached.
    pub async fn call(
        &self,
        request: CallRequest,
        cancel: &CancellationToken,
    ) -> Result<CallReport, CallError> {
        self.call_with_start(request, cancel, |_| {}).await
    }

    /// Like [`CallOrchestrator::call`], but runs `on_start` with the origin
    /// channel once the precondition holds and before the first round.
    pub async fn call_with_start<F>(
        &self,
        request: CallRequest,
        cancel: &CancellationToken,
        on_start: F,
    ) -> Result<CallReport, CallError>
    where
        F: FnOnce(ChannelId) + Send,
    {
        let CallRequest {
            guild,
            caller,
            caller_name,
            targets,
        } = request;

        let origin = self
            .platform
            .presence
            .voice_channel(guild, caller)
            .await?
            .ok_or(CallError::CallerNotInVoice)?;

        let mut session = CallSession::new(guild, caller, origin, targets);
        session.start();
        info!(
            "Starting call from {} in guild {} (channel {}, {} targets)",
            caller,
            guild,
            origin,
            session.remaining().len()
        );
        on_start(origin);

        let max_rounds = self.config.max_rounds.max(1);
        for round in 1..=max_rounds {
            if cancel.is_cancelled() {
                return Ok(self.finish(session, CallOutcome::Aborted(AbortReason::Cancelled)));
            }

            let current = match self.platform.presence.voice_channel(guild, caller).await {
                Ok(channel) => channel,
                Err(source) => {
                    return Err(CallError::Presence {
                        user: caller,
                        round,
                        source,
                        partial: Box::new(session.partial_report()),
                    })
                }
            };
            if current != Some(origin) {
                return Ok(self.finish(session, CallOutcome::Aborted(AbortReason::CallerLeft)));
            }

            session.begin_round(round);
            debug!("Call from {}: round {}/{}", caller, round, max_rounds);

            for user in session.remaining() {
                if cancel.is_cancelled() {
                    return Ok(self.finish(session, CallOutcome::Aborted(AbortReason::Cancelled)));
                }
                self.ring(&mut session, user, &caller_name, round).await?;
            }

            if !session.has_remaining() {
                return Ok(self.finish(session, CallOutcome::Completed(Completion::AllResolved)));
            }
            if round == max_rounds {
                break;
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Ok(self.finish(session, CallOutcome::Aborted(AbortReason::Cancelled)));
                }
                _ = self.timer.wait(self.config.round_interval) => {}
            }
        }

        Ok(self.finish(session, CallOutcome::Completed(Completion::RoundsExhausted)))
    }

    /// Process one target within a round.
    async fn ring(
        &self,
        session: &mut CallSession,
        user: UserId,
        caller_name: &str,
        round: u32,
    ) -> Result<(), CallError> {
        let guild = session.guild();
        let origin = session.origin();

        let target = match self.resolver.snapshot(guild, user).await {
            Ok(target) => target,
            Err(source) => {
                return Err(CallError::Presence {
                    user,
                    round,
                    source,
                    partial: Box::new(session.partial_report()),
                })
            }
        };

        if let Some(reason) = self.classify(guild, origin, &target).await {
            debug!("Not calling {} in round {}: {}", user, round, reason);
            session.exclude(user, reason);
            return Ok(());
        }

        let invite = match self.invitations.create_invite(origin).await {
            Ok(invite) => invite,
            Err(source) => {
                error!("Failed to mint invite for {} in round {}: {}", user, round, source);
                return Err(CallError::Invite {
                    user,
                    round,
                    source,
                    partial: Box::new(session.partial_report()),
                });
            }
        };

        let text = notification_text(caller_name, &invite.url(&self.config.invite_base_url));
        match self.platform.notifier.send(user, &text).await {
            Ok(DeliveryOutcome::Delivered) => {
                debug!("Sent invite {} to {} in round {}", invite.code, user, round);
                session.record_invite();
                Ok(())
            }
            Ok(DeliveryOutcome::Blocked) => {
                warn!("User {} blocks notifications, not calling again", user);
                session.exclude(user, ExclusionReason::DeliveryBlocked);
                Ok(())
            }
            Err(source) => {
                error!("Delivery to {} failed in round {}: {}", user, round, source);
                Err(CallError::Delivery {
                    user,
                    round,
                    source,
                    partial: Box::new(session.partial_report()),
                })
            }
        }
    }

    /// Classify a target; `None` means it should be called.
    ///
    /// First match wins: already in the origin channel, then not online,
    /// then holding an uncallable role.
    async fn classify(
        &self,
        guild: GuildId,
        origin: ChannelId,
        target: &Target,
    ) -> Option<ExclusionReason> {
        if target.is_in(origin) {
            return Some(ExclusionReason::AlreadyConnected);
        }
        if !target.presence.is_online() {
            return Some(ExclusionReason::Status(target.presence));
        }
        if self.policies.is_target_uncallable(guild, target).await {
            return Some(ExclusionReason::UncallableRole);
        }
        None
    }

    fn finish(&self, session: CallSession, outcome: CallOutcome) -> CallReport {
        let caller = session.caller();
        let report = session.finish(outcome);
        info!(
            "Call from {} {} after {} rounds ({} invites sent, {} not called)",
            caller,
            report.outcome,
            report.rounds,
            report.invites_sent,
            report.unreachable.len()
        );
        report
    }
}
