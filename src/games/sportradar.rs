use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::debug;

use super::models::{numeric, GameSummary, RawGame, TeamRef};
use super::provider::GameProvider;
use crate::error::ProviderError;

/// NBA schedule/summary provider backed by the Sportradar v8 API.
/// Docs: <https://developer.sportradar.com/basketball/reference/nba-overview>
pub struct Sportradar {
    http: Client,
    api_key: String,
    base_url: String,
    access_level: String,
    language: String,
    format: String,
    season_year: i32,
    season_type: String,
}

pub struct SportradarConfig<'a> {
    pub api_key: &'a str,
    pub base_url: &'a str,
    pub access_level: &'a str,
    pub language: &'a str,
    pub format: &'a str,
    pub season_year: i32,
    pub season_type: &'a str,
}

impl Sportradar {
    pub fn new(cfg: SportradarConfig<'_>) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Sportradar {
            http,
            api_key: cfg.api_key.to_string(),
            base_url: cfg.base_url.to_string(),
            access_level: cfg.access_level.to_string(),
            language: cfg.language.to_string(),
            format: cfg.format.to_string(),
            season_year: cfg.season_year,
            season_type: cfg.season_type.to_string(),
        })
    }

    fn schedule_url(&self) -> String {
        format!(
            "{}/nba/{}/v8/{}/games/{}/{}/schedule.{}",
            self.base_url,
            self.access_level,
            self.language,
            self.season_year,
            self.season_type,
            self.format
        )
    }

    fn summary_url(&self, game_id: &str) -> String {
        format!(
            "{}/nba/{}/v8/{}/games/{}/summary.{}",
            self.base_url, self.access_level, self.language, game_id, self.format
        )
    }

    async fn get_json(&self, url: &str) -> Result<Value, ProviderError> {
        debug!("GET {}", url);
        let resp = self
            .http
            .get(url)
            .header("x-api-key", &self.api_key)
            .send()
            .await
            .map_err(|source| ProviderError::Network {
                url: url.to_string(),
                source,
            })?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ProviderError::NotFound {
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            return Err(ProviderError::Http {
                status,
                url: url.to_string(),
            });
        }

        resp.json::<Value>()
            .await
            .map_err(|source| ProviderError::Decode {
                url: url.to_string(),
                source,
            })
    }
}

#[async_trait]
impl GameProvider for Sportradar {
    fn name(&self) -> &str {
        "Sportradar"
    }

    async fn fetch_schedule(&self) -> Result<Vec<RawGame>, ProviderError> {
        let raw = self.get_json(&self.schedule_url()).await?;
        Ok(parse_schedule(&raw))
    }

    async fn fetch_summary(&self, game_id: &str) -> Result<GameSummary, ProviderError> {
        let raw = self.get_json(&self.summary_url(game_id)).await?;
        Ok(GameSummary::new(raw))
    }
}

/// Default season year: the NBA season year is the year the season begins
/// (2024 for 2024-25), so the rollover happens in August.
pub fn default_season_year(now: DateTime<Utc>) -> i32 {
    if now.month() >= 8 {
        now.year()
    } else {
        now.year() - 1
    }
}

// ── Parsing helpers ────────────────────────────────────────────────────────────

fn parse_schedule(raw: &Value) -> Vec<RawGame> {
    let games = match raw.get("games").and_then(Value::as_array) {
        Some(a) => a,
        None => return vec![],
    };

    games
        .iter()
        .filter_map(|g| {
            let id = g.get("id").and_then(Value::as_str)?.to_string();
            let status = g
                .get("status")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string();

            // A bad or missing timestamp is not an error; the selector
            // drops unscheduled games later.
            let scheduled = g
                .get("scheduled")
                .and_then(Value::as_str)
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|dt| dt.with_timezone(&Utc));

            let home = parse_team(g.get("home"));
            let away = parse_team(g.get("away"));
            let home_points = side_points(g, "home");
            let away_points = side_points(g, "away");

            Some(RawGame {
                id,
                status,
                scheduled,
                home,
                away,
                home_points,
                away_points,
            })
        })
        .collect()
}

fn parse_team(value: Option<&Value>) -> TeamRef {
    let value = match value {
        Some(v) => v,
        None => return TeamRef::default(),
    };
    TeamRef {
        name: value.get("name").and_then(Value::as_str).map(str::to_string),
        alias: value
            .get("alias")
            .and_then(Value::as_str)
            .map(str::to_string),
    }
}

/// Point totals on schedule entries show up flat (`home_points`) or nested
/// (`home.points`) depending on the feed.
fn side_points(game: &Value, side: &str) -> Option<i64> {
    game.get(format!("{side}_points"))
        .and_then(numeric)
        .or_else(|| game.get(side)?.get("points").and_then(numeric))
}
