use tortoise_aoc::aoc::client::AoC;
use tortoise_aoc::cli::Cli;
use tortoise_aoc::config::Settings;
use tortoise_aoc::core::handlers::{CommandHandlers, TORTOISE_LEADERBOARD_ID};
use tortoise_aoc::messaging::client::initialize_messaging;
use tortoise_aoc::scheduler::{JobProcess, Scheduler};
use tortoise_aoc::storage::MemoryCache;
use tortoise_aoc::utils::SystemClock;

use clap::Parser;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = Settings::new(Cli::parse())?;

    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(settings.get_trace_level())
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cancellation = CancellationToken::new();
    let cache = MemoryCache::new();

    let aoc_client = AoC::new(
        settings.aoc_base_url.clone(),
        settings.aoc_api_timeout(),
        TORTOISE_LEADERBOARD_ID,
        settings.aoc_event_year,
        settings.aoc_session_cookie.clone(),
    )?;

    let sched = Scheduler::new(Arc::new(aoc_client), cache.clone(), cancellation.clone()).await?;
    let jobs = vec![
        JobProcess::InitializePrivateLeaderboard,
        JobProcess::UpdatePrivateLeaderboard(settings.refresh_interval()),
    ];
    for job in jobs {
        sched.add_job(job).await?;
    }

    info!("Starting scheduler.");
    sched.start().await?;

    let shutdown = cancellation.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received Ctrl-C, shutting down.");
                shutdown.cancel();
            }
            Err(e) => error!("Could not listen for shutdown signal. {e}"),
        }
    });

    let handlers = Arc::new(CommandHandlers::new(
        cache,
        Arc::new(SystemClock),
        settings.aoc_event_year,
    ));

    info!("Initializing messaging engine.");
    initialize_messaging(handlers, &settings, cancellation).await?;

    Ok(())
}
