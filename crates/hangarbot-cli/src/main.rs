use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::info;

use hangarbot_config::Credentials;
use hangarbot_core::render_status;
use hangarbot_discord::api::DiscordApi;
use hangarbot_discord::DiscordStatusChannel;
use hangarbot_updater::channel::StatusPublisher;
use hangarbot_updater::health::run_liveness_server;
use hangarbot_updater::store::CycleStore;
use hangarbot_updater::ticker::run_update_loop;

#[derive(Parser)]
#[command(name = "hangarbot", about = "Hangar cycle status bot")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bot: post and keep editing the status message
    Run {
        /// Liveness endpoint port (overrides config and PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Render the status message to stdout without touching Discord
    Preview {
        /// Instant to render (RFC 3339), defaults to now
        #[arg(long)]
        at: Option<String>,

        /// Number of consecutive ticks to render
        #[arg(long, default_value_t = 1)]
        ticks: u32,
    },
    /// Check resolved configuration
    Health,
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(run_bot(port))?;
        }
        Commands::Preview { at, ticks } => {
            run_preview(at, ticks)?;
        }
        Commands::Health => {
            let config = hangarbot_config::load_config().unwrap_or_default();
            match config.validate() {
                Ok(_) => println!("hangarbot configuration is valid"),
                Err(e) => println!("hangarbot configuration is INVALID: {e}"),
            }
            println!(
                "  cycle: {}m closed / {}m open / {}m restart",
                config.cycle.closed_minutes, config.cycle.open_minutes, config.cycle.restart_minutes
            );
            println!("  lights: {}", config.cycle.light_count);
            println!("  tick interval: {}s", config.updater.tick_interval_secs);
            println!("  liveness port: {}", config.server.resolved_port());
            println!(
                "  channel configured: {}",
                config.discord.channel_id.is_some()
            );
            if let Ok(dir) = config.state_dir() {
                if let Ok(store) = CycleStore::open(&dir) {
                    match store.last_transition() {
                        Ok(Some(record)) => println!(
                            "  last transition: {:?} at {}",
                            record.status, record.timestamp
                        ),
                        Ok(None) => println!("  last transition: none recorded"),
                        Err(e) => println!("  last transition: unreadable ({e})"),
                    }
                }
            }
        }
    }

    Ok(())
}

async fn run_bot(port_override: Option<u16>) -> anyhow::Result<()> {
    let config = hangarbot_config::load_config()?;
    let cycle = config.validate()?;
    let credentials = Credentials::from_env(&config)?;

    let api = DiscordApi::new(&credentials.token);
    let me = api
        .get_current_user()
        .await
        .context("Discord token check failed")?;
    info!(bot = %me.username, channel_id = %credentials.channel_id, "connected to Discord");

    let channel = DiscordStatusChannel::new(api, credentials.channel_id);
    let publisher = StatusPublisher::new(Arc::new(channel));

    let state_dir = hangarbot_config::ensure_state_dir(&config)?;
    let store = CycleStore::open(&state_dir)?;

    let cancel = CancellationToken::new();

    let host = config.server.host.clone();
    let port = port_override.unwrap_or_else(|| config.server.resolved_port());
    let liveness_cancel = cancel.clone();
    let liveness = tokio::spawn(async move {
        if let Err(e) = run_liveness_server(&host, port, liveness_cancel).await {
            tracing::error!("liveness server error: {e:#}");
        }
    });

    let updater = tokio::spawn(run_update_loop(
        cycle,
        config.lights.clone(),
        store,
        publisher,
        Duration::from_secs(config.updater.tick_interval_secs),
        cancel.clone(),
    ));

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for ctrl-c")?;
    info!("shutdown requested");
    cancel.cancel();

    let _ = updater.await;
    let _ = liveness.await;
    Ok(())
}

fn run_preview(at: Option<String>, ticks: u32) -> anyhow::Result<()> {
    let config = hangarbot_config::load_config()?;
    let cycle = config.validate()?;

    let start = match at {
        Some(raw) => DateTime::parse_from_rfc3339(&raw)
            .context("--at must be an RFC 3339 timestamp")?
            .with_timezone(&Utc),
        None => Utc::now(),
    };
    let step = chrono::Duration::seconds(config.updater.tick_interval_secs as i64);

    for i in 0..ticks {
        let message = render_status(&cycle, &config.lights, start + step * i as i32);
        println!("{}", message.content);
        if i + 1 < ticks {
            println!("---");
        }
    }
    Ok(())
}
