use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

mod config;
mod error;
mod games;
mod server;

use config::Config;
use games::sportradar::{default_season_year, SportradarConfig};
use games::{Aggregator, GamesCache, RetryPolicy, Sportradar};
use server::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    let season_year = config
        .season_year
        .unwrap_or_else(|| default_season_year(Utc::now()));
    info!(
        "Season {}/{}, target date: {}",
        season_year,
        config.season_type,
        config
            .schedule_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "today".to_string())
    );

    let provider = Sportradar::new(SportradarConfig {
        api_key: &config.api_key,
        base_url: &config.api_base,
        access_level: &config.access_level,
        language: &config.language,
        format: &config.api_format,
        season_year,
        season_type: &config.season_type,
    })?;

    let aggregator = Aggregator::new(
        Arc::new(provider),
        config.game_limit,
        config.display_offset()?,
        config.schedule_date,
        RetryPolicy::new(
            config.schedule_retries,
            Duration::from_millis(config.schedule_retry_delay_ms),
        ),
        RetryPolicy::new(
            config.summary_retries,
            Duration::from_millis(config.summary_retry_delay_ms),
        ),
    );

    let cache = GamesCache::new(
        aggregator,
        Duration::from_secs(config.cache_ttl_secs),
        Duration::from_secs(config.refresh_timeout_secs),
    );

    let app = server::router(AppState { cache });
    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .context("invalid LISTEN_ADDR")?;
    info!("Games API listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
