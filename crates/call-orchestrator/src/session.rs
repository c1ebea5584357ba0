//! Per-invocation call session state.

use std::fmt;

use call_core::{ChannelId, Exclusion, ExclusionReason, GuildId, UserId};
use indexmap::IndexSet;

/// Lifecycle of a call session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    Idle,
    Ringing,
    Completed,
    Aborted,
}

/// Why a call completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Every target was resolved before the rounds ran out.
    AllResolved,
    /// The last round finished with targets still pending.
    RoundsExhausted,
}

/// Why a call was aborted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    /// The caller left, or switched away from, the origin channel.
    CallerLeft,
    /// An external supervisor cancelled the session.
    Cancelled,
}

/// Terminal outcome of a call session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOutcome {
    Completed(Completion),
    Aborted(AbortReason),
    /// The session stopped on a fatal error; the report is partial.
    Failed,
}

impl CallOutcome {
    /// The session state this outcome leaves the session in.
    pub fn state(&self) -> CallState {
        match self {
            Self::Completed(_) => CallState::Completed,
            Self::Aborted(_) | Self::Failed => CallState::Aborted,
        }
    }
}

impl fmt::Display for CallOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed(Completion::AllResolved) => f.write_str("completed (all resolved)"),
            Self::Completed(Completion::RoundsExhausted) => {
                f.write_str("completed (rounds exhausted)")
            }
            Self::Aborted(AbortReason::CallerLeft) => f.write_str("aborted (caller left)"),
            Self::Aborted(AbortReason::Cancelled) => f.write_str("aborted (cancelled)"),
            Self::Failed => f.write_str("failed"),
        }
    }
}

/// Result of a call session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallReport {
    pub outcome: CallOutcome,
    /// Rounds that started processing targets.
    pub rounds: u32,
    /// Targets dropped from the call, in the order they were dropped.
    pub unreachable: Vec<Exclusion>,
    /// Targets still being called when the session ended.
    pub pending: Vec<UserId>,
    /// Notifications delivered over the whole session.
    pub invites_sent: usize,
    /// Set when the report was cut short by a fatal error.
    pub partial: bool,
}

/// State of one call, exclusively owned by the invocation running it.
#[derive(Debug)]
pub struct CallSession {
    guild: GuildId,
    caller: UserId,
    origin: ChannelId,
    state: CallState,
    round: u32,
    remaining: IndexSet<UserId>,
    unreachable: Vec<Exclusion>,
    invites_sent: usize,
}

impl CallSession {
    /// Create an idle session. Duplicate targets are collapsed.
    pub fn new(
        guild: GuildId,
        caller: UserId,
        origin: ChannelId,
        targets: impl IntoIterator<Item = UserId>,
    ) -> Self {
        Self {
            guild,
            caller,
            origin,
            state: CallState::Idle,
            round: 0,
            remaining: targets.into_iter().collect(),
            unreachable: Vec::new(),
            invites_sent: 0,
        }
    }

    pub fn guild(&self) -> GuildId {
        self.guild
    }

    pub fn caller(&self) -> UserId {
        self.caller
    }

    /// The caller's voice channel when the session started.
    pub fn origin(&self) -> ChannelId {
        self.origin
    }

    pub fn state(&self) -> CallState {
        self.state
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    /// Move from `Idle` to `Ringing`.
    pub fn start(&mut self) {
        if self.state == CallState::Idle {
            self.state = CallState::Ringing;
        }
    }

    /// Record the start of a new round.
    pub fn begin_round(&mut self, round: u32) {
        self.round = round;
    }

    /// Targets still being called, in first-mention order.
    pub fn remaining(&self) -> Vec<UserId> {
        self.remaining.iter().copied().collect()
    }

    pub fn has_remaining(&self) -> bool {
        !self.remaining.is_empty()
    }

    /// Drop a target from the call with a reason.
    ///
    /// A target is reported at most once; returns `false` if it was not
    /// remaining.
    pub fn exclude(&mut self, user: UserId, reason: ExclusionReason) -> bool {
        if !self.remaining.shift_remove(&user) {
            return false;
        }
        self.unreachable.push(Exclusion::new(user, reason));
        true
    }

    /// Record a delivered notification.
    pub fn record_invite(&mut self) {
        self.invites_sent += 1;
    }

    /// Exclusions accumulated so far.
    pub fn unreachable(&self) -> &[Exclusion] {
        &self.unreachable
    }

    fn report(&self, outcome: CallOutcome) -> CallReport {
        CallReport {
            outcome,
            rounds: self.round,
            unreachable: self.unreachable.clone(),
            pending: self.remaining(),
            invites_sent: self.invites_sent,
            partial: outcome == CallOutcome::Failed,
        }
    }

    /// End the session and produce its report.
    pub fn finish(mut self, outcome: CallOutcome) -> CallReport {
        self.state = outcome.state();
        self.report(outcome)
    }

    /// Report of what was accumulated so far, for fatal errors.
    pub fn partial_report(&self) -> CallReport {
        self.report(CallOutcome::Failed)
    }
}
