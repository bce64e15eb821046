// src/main.rs — claimbot entry point

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::watch;

use claimbot::api::client::HttpTransport;
use claimbot::cli::Cli;
use claimbot::engine::scheduler::{run_loop, Scheduler};
use claimbot::infra::config::Config;
use claimbot::infra::logger;

#[tokio::main]
async fn main() {
    // Respects RUST_LOG
    logger::init_logging("info");

    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = if let Some(ref path) = cli.config {
        Config::load_from(Path::new(path))?
    } else {
        Config::from_env()
    };

    // CLI flags win over file and environment.
    if let Some(ref accounts) = cli.accounts {
        config.claims.accounts_file = accounts.clone();
    }
    if let Some(ref base_url) = cli.base_url {
        config.api.base_url = base_url.trim_end_matches('/').to_string();
    }
    if cli.dry_run {
        config.claims.dry_run = true;
    }

    tracing::info!(
        base_url = %config.api.base_url,
        accounts_file = %config.claims.accounts_file,
        dry_run = config.claims.dry_run,
        loop_interval_ms = config.schedule.loop_interval_ms,
        gift_codes = %config.claims.gift_codes.join(", "),
        "claimbot starting"
    );

    let transport = Arc::new(HttpTransport::new(&config.api)?);
    let interval = Duration::from_millis(config.schedule.loop_interval_ms);
    let scheduler = Scheduler::new(config, transport);

    if cli.once {
        return scheduler.run_pass().await;
    }

    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Ctrl+C received, stopping after the current pass");
            let _ = stop_tx.send(true);
        }
    });

    run_loop(&scheduler, interval, stop_rx).await
}
