//! Service Configuration
//! Mission: Load every tunable once at process start (flags or environment)

use anyhow::{bail, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::warn;

use crate::middleware::RateLimitConfig;

const MIN_SECRET_LEN: usize = 32;

#[derive(Parser, Debug, Clone)]
#[command(name = "notekeeper")]
#[command(about = "NoteKeeper - authenticated personal notes API")]
pub struct Config {
    /// Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value = "8080")]
    pub port: u16,

    /// SQLite database file (users, notes, token blacklist)
    #[arg(long, env = "DATABASE_PATH", default_value = "notekeeper.db")]
    pub database_path: String,

    /// HMAC secret used to sign session tokens
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    /// bcrypt work factor
    #[arg(long, env = "BCRYPT_COST", default_value_t = bcrypt::DEFAULT_COST)]
    pub bcrypt_cost: u32,

    /// Requests allowed per caller per window on note routes
    #[arg(long, env = "RATE_LIMIT_MAX_REQUESTS", default_value = "100")]
    pub rate_limit_max_requests: u32,

    /// Rate limit window in seconds
    #[arg(long, env = "RATE_LIMIT_WINDOW_SECS", default_value = "60")]
    pub rate_limit_window_secs: u64,

    /// Extra requests tolerated above the ceiling before rejecting
    #[arg(long, env = "RATE_LIMIT_BURST", default_value = "0")]
    pub rate_limit_burst: u32,

    /// How often expired blacklist entries are pruned, in seconds
    #[arg(long, env = "BLACKLIST_PRUNE_SECS", default_value = "600")]
    pub blacklist_prune_secs: u64,
}

impl Config {
    /// Reject settings the service cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.jwt_secret.trim().is_empty() {
            bail!("JWT_SECRET must not be empty");
        }
        if self.jwt_secret.len() < MIN_SECRET_LEN {
            warn!(
                "⚠️  JWT_SECRET is shorter than {} bytes - use a longer secret in production",
                MIN_SECRET_LEN
            );
        }
        if !(4..=31).contains(&self.bcrypt_cost) {
            bail!("BCRYPT_COST must be between 4 and 31, got {}", self.bcrypt_cost);
        }
        if self.rate_limit_max_requests == 0 {
            bail!("RATE_LIMIT_MAX_REQUESTS must be greater than zero");
        }
        if self.rate_limit_window_secs == 0 {
            bail!("RATE_LIMIT_WINDOW_SECS must be greater than zero");
        }
        if self.blacklist_prune_secs == 0 {
            bail!("BLACKLIST_PRUNE_SECS must be greater than zero");
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }

    pub fn rate_limit(&self) -> RateLimitConfig {
        RateLimitConfig {
            max_requests: self.rate_limit_max_requests,
            window: Duration::from_secs(self.rate_limit_window_secs),
            burst: self.rate_limit_burst,
        }
    }

    pub fn blacklist_prune_interval(&self) -> Duration {
        Duration::from_secs(self.blacklist_prune_secs)
    }
}
