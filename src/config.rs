use chrono::{FixedOffset, NaiveDate};
use clap::Parser;

/// Current-games API backed by the Sportradar NBA feed
#[derive(Parser, Debug, Clone)]
#[command(name = "courtside", version, about)]
pub struct Config {
    /// Sportradar API key
    #[arg(long, env = "SPORTRADAR_API_KEY")]
    pub api_key: String,

    /// Sportradar access level (trial or production)
    #[arg(long, env = "SPORTRADAR_ACCESS_LEVEL", default_value = "trial")]
    pub access_level: String,

    /// API language code
    #[arg(long, env = "SPORTRADAR_LANGUAGE", default_value = "en")]
    pub language: String,

    /// API payload format
    #[arg(long, env = "SPORTRADAR_FORMAT", default_value = "json")]
    pub api_format: String,

    /// Sportradar API base URL
    #[arg(
        long,
        env = "SPORTRADAR_API_BASE",
        default_value = "https://api.sportradar.com"
    )]
    pub api_base: String,

    /// Season year (the year the season begins); defaults by calendar,
    /// rolling over in August
    #[arg(long, env = "SPORTRADAR_SEASON_YEAR")]
    pub season_year: Option<i32>,

    /// Season type (PRE, REG, PST, ...)
    #[arg(long, env = "SPORTRADAR_SEASON_TYPE", default_value = "REG")]
    pub season_type: String,

    /// Fixed target date (YYYY-MM-DD) instead of today in the display zone
    #[arg(long, env = "SPORTRADAR_DATE")]
    pub schedule_date: Option<NaiveDate>,

    /// Display time zone as a UTC offset, e.g. -05:00 for US Eastern
    #[arg(long, env = "DISPLAY_TZ_OFFSET", default_value = "-05:00")]
    pub display_tz_offset: String,

    /// Number of games to surface
    #[arg(long, env = "GAME_LIMIT", default_value = "5")]
    pub game_limit: usize,

    /// Cache time-to-live in seconds
    #[arg(long, env = "CACHE_TTL_SECS", default_value = "30")]
    pub cache_ttl_secs: u64,

    /// Extra attempts per game summary fetch
    #[arg(long, env = "SUMMARY_RETRIES", default_value = "1")]
    pub summary_retries: u32,

    /// Delay between summary attempts in milliseconds
    #[arg(long, env = "SUMMARY_RETRY_DELAY_MS", default_value = "1000")]
    pub summary_retry_delay_ms: u64,

    /// Extra attempts for the schedule fetch
    #[arg(long, env = "SCHEDULE_RETRIES", default_value = "2")]
    pub schedule_retries: u32,

    /// Delay between schedule attempts in milliseconds
    #[arg(long, env = "SCHEDULE_RETRY_DELAY_MS", default_value = "1000")]
    pub schedule_retry_delay_ms: u64,

    /// Overall deadline for one cache refresh in seconds
    #[arg(long, env = "REFRESH_TIMEOUT_SECS", default_value = "25")]
    pub refresh_timeout_secs: u64,

    /// API listen address
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:3000")]
    pub listen_addr: String,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_key.trim().is_empty() {
            anyhow::bail!("SPORTRADAR_API_KEY must not be empty");
        }
        if self.game_limit == 0 {
            anyhow::bail!("game_limit must be at least 1");
        }
        if self.refresh_timeout_secs == 0 {
            anyhow::bail!("refresh_timeout_secs must be positive");
        }
        if self.schedule_retries < self.summary_retries {
            anyhow::bail!(
                "schedule_retries must be at least summary_retries; the schedule call is the one worth insisting on"
            );
        }
        self.display_offset()?;
        Ok(())
    }

    /// Parsed display time zone offset.
    pub fn display_offset(&self) -> anyhow::Result<FixedOffset> {
        self.display_tz_offset.parse::<FixedOffset>().map_err(|e| {
            anyhow::anyhow!(
                "invalid DISPLAY_TZ_OFFSET '{}' (expected e.g. -05:00): {}",
                self.display_tz_offset,
                e
            )
        })
    }
}
