//! NoteKeeper - authenticated personal notes API
//! Mission: Register, log in, keep notes that only their owner can touch

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use dotenv::dotenv;
use std::{sync::Arc, time::Duration};
use tokio::{net::TcpListener, time::interval};
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use notekeeper_backend::{
    auth::BlacklistStore, build_router, middleware::RateLimitLayer, AppState, Config,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Environment first so clap sees .env values
    let _ = dotenv();
    init_tracing();

    let config = Config::parse();
    config.validate()?;

    info!("🚀 NoteKeeper starting");

    let state = AppState::from_config(&config)?;
    info!("💾 Database initialized at: {}", config.database_path);
    info!(
        "🚦 Rate limit: {} requests / {}s per caller (burst {})",
        config.rate_limit_max_requests, config.rate_limit_window_secs, config.rate_limit_burst
    );

    tokio::spawn(blacklist_pruning(
        state.blacklist.clone(),
        config.blacklist_prune_interval(),
    ));
    tokio::spawn(rate_limit_cleanup(state.rate_limiter.clone()));

    let app = build_router(state);

    let addr = config.bind_addr()?;
    let listener = TcpListener::bind(addr).await?;
    info!("🎯 API server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("NoteKeeper stopped");
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "notekeeper=debug,notekeeper_backend=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Revoked tokens only matter until they expire; drop the rest periodically.
async fn blacklist_pruning(blacklist: Arc<BlacklistStore>, every: Duration) {
    let mut ticker = interval(every);
    loop {
        ticker.tick().await;
        match blacklist.prune_expired(Utc::now().timestamp()) {
            Ok(0) => debug!("Blacklist prune: nothing expired"),
            Ok(n) => info!("🧹 Pruned {} expired blacklist entries", n),
            Err(e) => warn!("Blacklist prune failed: {:#}", e),
        }
    }
}

async fn rate_limit_cleanup(limiter: RateLimitLayer) {
    let mut ticker = interval(limiter.config().window);
    loop {
        ticker.tick().await;
        let removed = limiter.cleanup();
        if removed > 0 {
            debug!("Rate limiter dropped {} idle callers", removed);
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
