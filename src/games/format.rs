use chrono::{DateTime, Duration, FixedOffset, Utc};

use super::enrich::team_points;
use super::models::{DisplayRecord, GameSummary, SelectedGame, Side};

/// Lead time between the listed tip time and the actual tipoff.
const TIPOFF_BUFFER_MINUTES: i64 = 10;

/// Classified game state. `closed` and `complete` both mean final;
/// `created` is still just a scheduled game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Scheduled,
    InProgress,
    Halftime,
    Final,
    Unknown,
}

impl GamePhase {
    pub fn classify(status: &str) -> Self {
        match status.to_ascii_lowercase().as_str() {
            "scheduled" | "created" => GamePhase::Scheduled,
            "inprogress" => GamePhase::InProgress,
            "halftime" => GamePhase::Halftime,
            "closed" | "complete" => GamePhase::Final,
            _ => GamePhase::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GamePhase::Scheduled => "scheduled",
            GamePhase::InProgress => "inprogress",
            GamePhase::Halftime => "halftime",
            GamePhase::Final => "final",
            GamePhase::Unknown => "unknown",
        }
    }

    /// A score is only meaningful once play has started.
    fn shows_score(self) -> bool {
        matches!(
            self,
            GamePhase::InProgress | GamePhase::Halftime | GamePhase::Final
        )
    }
}

/// Turn a selected game and its (possibly missing) summary into the record
/// served to clients. Pure and total: missing or malformed data degrades to
/// placeholder strings.
pub fn format_record(
    selected: &SelectedGame,
    summary: Option<&GameSummary>,
    offset: FixedOffset,
    now: DateTime<Utc>,
) -> DisplayRecord {
    let game = &selected.game;

    let time = game
        .scheduled
        .map(|s| s.with_timezone(&offset).format("%-I:%M %p").to_string())
        .unwrap_or_else(|| "Unknown".to_string());

    let matchup = format!("{} @ {}", game.away.label("AWAY"), game.home.label("HOME"));

    // Live status from the summary beats the (possibly hours-old) schedule
    // status.
    let status_raw = summary
        .and_then(|s| s.status())
        .unwrap_or(game.status.as_str());
    let phase = GamePhase::classify(status_raw);

    let away_points = team_points(summary, Side::Away, game);
    let home_points = team_points(summary, Side::Home, game);
    let score = match (away_points, home_points) {
        (Some(away), Some(home)) if phase.shows_score() => {
            if phase == GamePhase::Final {
                format!("{away}-{home} Final")
            } else {
                format!("{away}-{home}")
            }
        }
        _ => "N/A".to_string(),
    };

    let detail = match phase {
        GamePhase::InProgress => {
            match (summary.and_then(|s| s.period()), summary.and_then(|s| s.clock())) {
                (Some(period), Some(clock)) => format!("Q{period} - {clock}"),
                (Some(period), None) => format!("Q{period}"),
                _ => String::new(),
            }
        }
        GamePhase::Halftime => "Halftime".to_string(),
        GamePhase::Scheduled => game
            .scheduled
            .map(|s| tipoff_countdown(s, now))
            .unwrap_or_default(),
        GamePhase::Final | GamePhase::Unknown => String::new(),
    };

    DisplayRecord {
        game_id: game.id.clone(),
        date: selected.date.format("%Y-%m-%d").to_string(),
        time,
        matchup,
        status: phase.label().to_string(),
        score,
        detail,
    }
}

/// Human countdown to tipoff, rounded to 5-minute granularity. The buffer
/// accounts for pre-game ceremony between the listed time and the actual
/// first possession.
pub fn tipoff_countdown(scheduled: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = scheduled + Duration::minutes(TIPOFF_BUFFER_MINUTES) - now;
    let minutes = delta.num_milliseconds() as f64 / 60_000.0;
    let rounded = (((minutes / 5.0).round() * 5.0).max(0.0)) as i64;

    if rounded == 0 {
        return "tipoff should be soon".to_string();
    }
    if rounded < 60 {
        return format!("tipoff in ~{rounded} minutes");
    }

    let hours = rounded / 60;
    let minutes = rounded % 60;
    if minutes == 0 {
        format!(
            "tipoff in ~{hours} hour{}",
            if hours == 1 { "" } else { "s" }
        )
    } else {
        format!("tipoff in ~{hours}h {minutes}m")
    }
}
