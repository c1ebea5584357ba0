//! Simulated call example.
//!
//! This example runs the command handler against an in-memory guild: it
//! marks a role uncallable, places a call to a handful of members, and has
//! the caller hang up part way through.
//!
//! Run with: cargo run -p call-orchestrator --example simulated_call
//!
//! Configuration via .env file or environment variables:
//!   CALL_MAX_ROUNDS         - Rounds per call (default: 5)
//!   CALL_ROUND_INTERVAL_MS  - Wait between rounds (default: 1000)
//!   CALL_POLICY_PATH        - Policy store file (default: uncallable_roles.json)
//!   RUST_LOG                - Log filter

use std::sync::Arc;
use std::time::Duration;

use call_core::{ChannelId, GuildId, Presence, RoleId, UserId};
use call_orchestrator::{
    CallCommand, CallConfig, CallOrchestrator, CancellationToken, CommandHandler,
    LoggingNotifier, MentionRequest, Platform, RoleMention,
};
use call_policy::{JsonPolicyStore, PolicyRegistry};
use mock_platform::MockGuild;
use tracing::info;

const GUILD: GuildId = GuildId(1);
const VOICE: ChannelId = ChannelId(900);
const CALLER: UserId = UserId(1);
const MODS: RoleId = RoleId(77);

fn build_guild() -> MockGuild {
    let guild = MockGuild::new(GUILD);
    guild.add_member(CALLER, Presence::Online);
    guild.join_voice(CALLER, VOICE);

    guild.add_member(UserId(2), Presence::Online);
    guild.add_member(UserId(3), Presence::Online);
    guild.grant_role(UserId(3), MODS);
    guild.add_member(UserId(4), Presence::Offline);
    guild.add_member(UserId(5), Presence::Online);
    guild.block_notifications(UserId(5));
    guild.add_bot(UserId(6));
    guild
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("call_orchestrator=debug".parse()?)
                .add_directive("call_policy=info".parse()?),
        )
        .init();

    let config = CallConfig::from_env();
    println!("Policy store: {}", config.policy_path.display());

    let store = Arc::new(JsonPolicyStore::new(&config.policy_path));
    let policies = Arc::new(PolicyRegistry::load(store).await);

    let guild = build_guild();
    let platform = Platform::from_shared(Arc::new(guild.clone()))
        .with_notifier(Arc::new(LoggingNotifier::new(Arc::new(guild.clone()))));

    let hang_up_after = config.round_interval * 2 + Duration::from_millis(100);
    let orchestrator = Arc::new(CallOrchestrator::new(platform, policies, config));
    let handler = CommandHandler::new(orchestrator);

    for reply in handler
        .uncallable(GUILD, &[RoleMention::new(MODS, "mods")])
        .await?
    {
        println!("> {}", reply);
    }
    println!("> {}", handler.uncallables(GUILD).await);

    // Hang up part way through the call.
    let hang_up = guild.clone();
    tokio::spawn(async move {
        tokio::time::sleep(hang_up_after).await;
        info!("Caller hangs up");
        hang_up.leave_voice(CALLER);
    });

    let mentions = MentionRequest::new(GUILD, CALLER)
        .with_users([UserId(2), UserId(4), UserId(5), UserId(6)])
        .with_roles([MODS]);
    let replies = handler
        .call(
            CallCommand::new("caller", mentions),
            &CancellationToken::new(),
            |line| println!("> {}", line),
        )
        .await?;
    for reply in replies {
        println!("> {}", reply);
    }

    println!("\n{} notifications delivered", guild.sent().len());
    Ok(())
}
