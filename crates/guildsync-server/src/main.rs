use clap::Parser;
use guildsync_core::config::{SyncConfig, WarnLevel};
use guildsync_discord::DiscordGateway;
use guildsync_server::auth::IntakeAuth;
use guildsync_server::state::AppState;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "guildsync",
    about = "Federated moderation fan-out — mirror bans and mutes across linked communities",
    version
)]
struct Cli {
    /// Path to the sync configuration file
    #[arg(long, env = "GUILDSYNC_CONFIG", default_value = "guildsync.yaml")]
    config: PathBuf,

    /// Port for the intake API
    #[arg(long, env = "GUILDSYNC_PORT", default_value_t = 3141)]
    port: u16,

    /// Bot token for the platform API
    #[arg(long, env = "DISCORD_BOT_TOKEN", hide_env_values = true)]
    token: String,

    /// Shared token guarding the intake API (omit for an open local intake)
    #[arg(long, env = "GUILDSYNC_API_TOKEN", hide_env_values = true)]
    api_token: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_target(false)
        .init();

    let config = SyncConfig::load(&cli.config)?;
    for warning in config.validate() {
        match warning.level {
            WarnLevel::Error => tracing::error!("config: {}", warning.message),
            WarnLevel::Warning => tracing::warn!("config: {}", warning.message),
        }
    }
    tracing::info!(
        primary = %config.primary_community,
        communities = config.dispatch_order().len(),
        "configuration loaded"
    );

    let gateway = Arc::new(DiscordGateway::connect(&cli.token).await?);
    let state = AppState::new(gateway, config);
    let auth = match cli.api_token {
        Some(token) => IntakeAuth::with_token(token),
        None => IntakeAuth::open(),
    };

    guildsync_server::serve(state, auth, cli.port).await
}
