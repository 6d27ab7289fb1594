//! Tour guide core - traveler tracking and proximity rewards
//!
//! Runs the background location tracker against simulated providers and an
//! in-memory store seeded with internal travelers.
//!
//! Module structure:
//! - `domain/` - Core types (Traveler, Attraction, Reward), distance
//! - `io/` - Collaborator interfaces (catalog, location, points, store)
//! - `services/` - Business logic (RewardsEngine, TourGuide, Tracker)
//! - `infra/` - Infrastructure (Config, Metrics, Retry)

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tourguide_core::infra::{Config, Metrics};
use tourguide_core::io::{
    seed_travelers, AttractionCatalog, InMemoryUserStore, SimulatedLocationProvider,
    SimulatedRewardPoints, StaticCatalog, UserStore,
};
use tourguide_core::services::{LocationTracker, RewardsEngine, TourGuide, WorkerPool};
use tracing::info;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;

/// Tour guide core - background tracking and rewards
#[derive(Parser, Debug)]
#[command(name = "tourguide", version, about)]
struct Args {
    /// Path to TOML configuration file (else CONFIG_FILE, else config/dev.toml)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured logging with configurable level via RUST_LOG env var
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(UtcTime::rfc_3339())
        .with_target(false)
        .init();

    info!(git_hash = %env!("GIT_HASH"), "tourguide starting");

    let args = Args::parse();
    let config = Config::load(args.config.as_deref());
    config.validate()?;

    info!(
        config_file = %config.config_file(),
        proximity_buffer_miles = %config.proximity_buffer_miles(),
        visibility_range_miles = %config.visibility_range_miles(),
        poll_interval_secs = %config.poll_interval().as_secs(),
        min_workers = %config.min_workers(),
        workers_per_core = %config.workers_per_core(),
        internal_user_count = %config.internal_user_count(),
        "config_loaded"
    );

    let metrics = Arc::new(Metrics::new());

    let configured = config.attractions();
    let catalog: Arc<dyn AttractionCatalog> = if configured.is_empty() {
        Arc::new(StaticCatalog::builtin())
    } else {
        Arc::new(StaticCatalog::new(configured))
    };
    info!(attractions = %catalog.list_attractions().len(), "catalog_loaded");

    let store: Arc<dyn UserStore> = Arc::new(InMemoryUserStore::new());
    let seeded = seed_travelers(
        store.as_ref(),
        config.internal_user_count(),
        config.visits_per_user(),
        &mut StdRng::from_entropy(),
    );
    info!(travelers = %seeded, "internal_travelers_ready");

    let pool = Arc::new(WorkerPool::from_config(&config));
    let engine = RewardsEngine::new(
        catalog,
        Arc::new(SimulatedRewardPoints::new()),
        config.rewards(),
        pool,
        metrics.clone(),
    )?
    .with_retry(config.retry_policy());

    let guide = Arc::new(
        TourGuide::new(store, Arc::new(SimulatedLocationProvider::new()), Arc::new(engine), metrics.clone())
            .with_retry(config.retry_policy()),
    );

    // Start metrics reporter (lock-free reads with full summary)
    let metrics_clone = metrics.clone();
    let metrics_interval = config.metrics_interval_secs().max(1);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(metrics_interval));
        loop {
            interval.tick().await;
            metrics_clone.report().log();
        }
    });

    let tracker = LocationTracker::spawn(guide, config.poll_interval());

    tokio::signal::ctrl_c().await.ok();
    info!("shutdown_signal_received");
    tracker.shutdown().await;

    metrics.report().log();
    info!("tourguide shutdown complete");
    Ok(())
}
