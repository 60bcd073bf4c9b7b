//! cadence market-making bot - entry point.
//!
//! Quotes a bid/ask pair around the mid on a fixed cadence, skews for
//! inventory, and recovers from failures by canceling exposure and
//! restarting. Runs against the deterministic paper exchange.

use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// cadence market-making bot
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via CADENCE_CONFIG)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    cadence_telemetry::init_logging()?;

    info!("Starting cadence bot v{}", env!("CARGO_PKG_VERSION"));

    let config_path = args.config.or_else(|| std::env::var("CADENCE_CONFIG").ok());
    let config = cadence_bot::AppConfig::load(config_path.as_deref(), "config/default.toml")?;

    let app = cadence_bot::Application::new(config)?;

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received");
            signal_token.cancel();
        }
    });

    app.run(shutdown).await;

    Ok(())
}
