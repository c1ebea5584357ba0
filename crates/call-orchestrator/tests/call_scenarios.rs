//! End-to-end call scenarios against the in-memory platform.

use std::sync::Arc;

use call_core::{ChannelId, Exclusion, ExclusionReason, GuildId, Presence, RoleId, UserId};
use call_orchestrator::{
    AbortReason, CallConfig, CallOrchestrator, CallOutcome, CallRequest, CancellationToken,
    Completion, MentionRequest, Platform,
};
use call_policy::{MemoryPolicyStore, PolicyRegistry};
use mock_platform::{MockGuild, ScriptedTimer};

const GUILD: GuildId = GuildId(1);
const VOICE: ChannelId = ChannelId(900);

const A: UserId = UserId(1);
const B: UserId = UserId(2);
const C: UserId = UserId(3);
const D: UserId = UserId(4);
const RESTRICTED: RoleId = RoleId(77);

struct Harness {
    guild: MockGuild,
    timer: Arc<ScriptedTimer>,
    orchestrator: CallOrchestrator,
}

async fn harness() -> Harness {
    let guild = MockGuild::new(GUILD);
    guild.add_member(A, Presence::Online);
    guild.join_voice(A, VOICE);
    guild.add_member(B, Presence::Online);
    guild.add_member(C, Presence::Online);
    guild.grant_role(C, RESTRICTED);
    guild.add_member(D, Presence::Offline);

    let policies = Arc::new(PolicyRegistry::new(Arc::new(MemoryPolicyStore::new())));
    policies.mark_uncallable(GUILD, RESTRICTED).await.unwrap();

    let timer = Arc::new(ScriptedTimer::new());
    let orchestrator = CallOrchestrator::new(
        Platform::from_shared(Arc::new(guild.clone())),
        policies,
        CallConfig::default(),
    )
    .with_timer(timer.clone());

    Harness {
        guild,
        timer,
        orchestrator,
    }
}

#[tokio::test]
async fn test_caller_hangs_up_between_round_two_and_three() {
    let h = harness().await;

    let handle = h.guild.clone();
    h.timer.on_tick(2, move || handle.leave_voice(A));

    let report = h
        .orchestrator
        .call(
            CallRequest::new(GUILD, A, "A", [B, C, D]),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(report.outcome, CallOutcome::Aborted(AbortReason::CallerLeft));
    assert_eq!(report.rounds, 2);
    assert_eq!(
        report.unreachable,
        vec![
            Exclusion::new(C, ExclusionReason::UncallableRole),
            Exclusion::new(D, ExclusionReason::Status(Presence::Offline)),
        ]
    );
    // B was called in rounds 1 and 2 only.
    assert_eq!(h.guild.sent_to(B), 2);
    assert_eq!(h.guild.sent_to(C), 0);
    assert_eq!(h.guild.sent_to(D), 0);
    assert_eq!(h.guild.invites().len(), 2);
    assert_eq!(report.pending, vec![B]);
}

#[tokio::test]
async fn test_full_session_without_hang_up() {
    let h = harness().await;

    let report = h
        .orchestrator
        .call(
            CallRequest::new(GUILD, A, "A", [B, C, D]),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(
        report.outcome,
        CallOutcome::Completed(Completion::RoundsExhausted)
    );
    assert_eq!(h.guild.sent_to(B), 5);
    // Exclusions are never re-reported in later rounds.
    assert_eq!(report.unreachable.len(), 2);
    assert_eq!(report.unreachable.len() + report.pending.len(), 3);
}

#[tokio::test]
async fn test_targets_drop_out_over_rounds() {
    let h = harness().await;

    let handle = h.guild.clone();
    h.timer.on_tick(1, move || handle.set_presence(B, Presence::Idle));
    let handle = h.guild.clone();
    h.timer.on_tick(1, move || handle.set_presence(D, Presence::Online));

    let report = h
        .orchestrator
        .call(
            CallRequest::new(GUILD, A, "A", [B, D]),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    // D is excluded in round 1; coming back online later changes nothing.
    assert_eq!(
        report.unreachable,
        vec![
            Exclusion::new(D, ExclusionReason::Status(Presence::Offline)),
            Exclusion::new(B, ExclusionReason::Status(Presence::Idle)),
        ]
    );
    assert_eq!(report.outcome, CallOutcome::Completed(Completion::AllResolved));
    assert_eq!(report.rounds, 2);
    assert_eq!(h.guild.sent_to(B), 1);
    assert_eq!(h.guild.sent_to(D), 0);
}

#[tokio::test]
async fn test_resolve_then_call() {
    let h = harness().await;
    h.guild.add_bot(UserId(50));
    h.guild.grant_role(UserId(50), RESTRICTED);

    let policy = h.orchestrator.policies().policy(GUILD).await;
    let mentions = MentionRequest::new(GUILD, A)
        .with_users([B, A])
        .with_roles([RESTRICTED]);
    let targets = h
        .orchestrator
        .resolver()
        .resolve(&mentions, &policy)
        .await
        .unwrap();
    let ids: Vec<UserId> = targets.iter().map(|t| t.user_id).collect();
    assert_eq!(ids, vec![B, C]);

    let report = h
        .orchestrator
        .call(
            CallRequest::from_targets(GUILD, A, "A", &targets),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
    assert_eq!(
        report.unreachable,
        vec![Exclusion::new(C, ExclusionReason::UncallableRole)]
    );
}

#[tokio::test]
async fn test_concurrent_sessions_are_independent() {
    let guild = MockGuild::new(GUILD);
    for user in 1..=4 {
        guild.add_member(UserId(user), Presence::Online);
    }
    guild.join_voice(UserId(1), ChannelId(10));
    guild.join_voice(UserId(2), ChannelId(20));

    let policies = Arc::new(PolicyRegistry::new(Arc::new(MemoryPolicyStore::new())));
    let orchestrator = Arc::new(
        CallOrchestrator::new(
            Platform::from_shared(Arc::new(guild.clone())),
            policies,
            CallConfig::default().with_max_rounds(3),
        )
        .with_timer(Arc::new(ScriptedTimer::new())),
    );

    let first = {
        let orchestrator = orchestrator.clone();
        tokio::spawn(async move {
            orchestrator
                .call(
                    CallRequest::new(GUILD, UserId(1), "one", [UserId(3)]),
                    &CancellationToken::new(),
                )
                .await
        })
    };
    let second = {
        let orchestrator = orchestrator.clone();
        tokio::spawn(async move {
            orchestrator
                .call(
                    CallRequest::new(GUILD, UserId(2), "two", [UserId(4), UserId(1)]),
                    &CancellationToken::new(),
                )
                .await
        })
    };

    let first = first.await.unwrap().unwrap();
    let second = second.await.unwrap().unwrap();

    assert_eq!(first.invites_sent, 3);
    assert!(first.unreachable.is_empty());
    assert_eq!(second.invites_sent, 6);
    assert_eq!(guild.sent_to(UserId(3)), 3);
    assert_eq!(guild.sent_to(UserId(4)), 3);

    let invites = guild.invites();
    assert_eq!(invites.iter().filter(|(c, _, _)| *c == ChannelId(10)).count(), 3);
    assert_eq!(invites.iter().filter(|(c, _, _)| *c == ChannelId(20)).count(), 6);
}
