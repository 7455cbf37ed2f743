use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value;

/// One schedule entry as fetched from the provider. Immutable once parsed;
/// a game with an unparseable timestamp carries `scheduled: None` and is
/// dropped at bucketing time rather than erroring.
#[derive(Debug, Clone, PartialEq)]
pub struct RawGame {
    pub id: String,
    /// Provider status code: scheduled | created | inprogress | halftime |
    /// closed | complete, or anything else we treat as unknown.
    pub status: String,
    pub scheduled: Option<DateTime<Utc>>,
    pub home: TeamRef,
    pub away: TeamRef,
    pub home_points: Option<i64>,
    pub away_points: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamRef {
    pub name: Option<String>,
    pub alias: Option<String>,
}

impl TeamRef {
    /// Short label for the matchup line: alias, then full name, then the
    /// given placeholder.
    pub fn label<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.alias
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or(fallback)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Home,
    Away,
}

impl Side {
    pub fn key(self) -> &'static str {
        match self {
            Side::Home => "home",
            Side::Away => "away",
        }
    }

    /// Flat `{side}_points` key used by some summary schemas.
    pub fn points_key(self) -> &'static str {
        match self {
            Side::Home => "home_points",
            Side::Away => "away_points",
        }
    }
}

/// Per-game summary payload. The provider has shipped several shapes for
/// this document over time, so it is kept as raw JSON and read through
/// tolerant accessors; a field that is missing or malformed simply reads
/// as `None`.
#[derive(Debug, Clone)]
pub struct GameSummary {
    raw: Value,
}

impl GameSummary {
    pub fn new(raw: Value) -> Self {
        GameSummary { raw }
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Live status, preferring the nested `game.status` over a top-level
    /// `status`.
    pub fn status(&self) -> Option<&str> {
        self.raw
            .get("game")
            .and_then(|g| g.get("status"))
            .or_else(|| self.raw.get("status"))
            .and_then(Value::as_str)
    }

    /// Current quarter/period, wherever the schema put it. The first key
    /// holding a usable number wins.
    pub fn period(&self) -> Option<i64> {
        let game = self.raw.get("game");
        [
            game.and_then(|g| g.get("quarter")),
            self.raw.get("quarter"),
            game.and_then(|g| g.get("period")),
            game.and_then(|g| g.get("period_number")),
        ]
        .into_iter()
        .flatten()
        .find_map(numeric)
    }

    /// Game clock string, e.g. "4:21". An empty or non-string candidate
    /// falls through to the next known key.
    pub fn clock(&self) -> Option<&str> {
        let game = self.raw.get("game");
        [
            game.and_then(|g| g.get("clock")),
            self.raw.get("clock"),
            game.and_then(|g| g.get("clock_decimal")),
            self.raw.get("clock_decimal"),
        ]
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .find(|s| !s.is_empty())
    }
}

/// Coerce a JSON value into an integer, accepting numbers and numeric
/// strings ("102"). Non-finite numbers read as `None`.
pub(crate) fn numeric(value: &Value) -> Option<i64> {
    match value {
        Value::Number(_) => value.as_f64().filter(|n| n.is_finite()).map(|n| n as i64),
        Value::String(s) if !s.trim().is_empty() => {
            s.trim().parse::<f64>().ok().filter(|n| n.is_finite()).map(|n| n as i64)
        }
        _ => None,
    }
}

/// A raw game tagged with the calendar date bucket it was selected under.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedGame {
    pub date: NaiveDate,
    pub game: RawGame,
}

/// The final output unit served to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayRecord {
    pub game_id: String,
    /// Bucket date key, `YYYY-MM-DD` in the display time zone.
    pub date: String,
    /// Local tip time, e.g. "7:30 PM", or "Unknown".
    pub time: String,
    /// "AWAY @ HOME"
    pub matchup: String,
    /// Classified status label: scheduled | inprogress | halftime | final | unknown.
    pub status: String,
    /// "{away}-{home}" with a " Final" suffix for finished games, else "N/A".
    pub score: String,
    /// Period/clock ("Q3 - 4:21"), "Halftime", a tipoff countdown, or empty.
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn team_label_prefers_alias_then_name() {
        let team = TeamRef {
            name: Some("Boston Celtics".into()),
            alias: Some("BOS".into()),
        };
        assert_eq!(team.label("HOME"), "BOS");

        let no_alias = TeamRef {
            name: Some("Boston Celtics".into()),
            alias: None,
        };
        assert_eq!(no_alias.label("HOME"), "Boston Celtics");
        assert_eq!(TeamRef::default().label("HOME"), "HOME");
    }

    #[test]
    fn summary_status_prefers_nested_game_status() {
        let s = GameSummary::new(json!({
            "status": "scheduled",
            "game": { "status": "inprogress" }
        }));
        assert_eq!(s.status(), Some("inprogress"));

        let top_only = GameSummary::new(json!({ "status": "halftime" }));
        assert_eq!(top_only.status(), Some("halftime"));
        assert_eq!(GameSummary::new(json!({})).status(), None);
    }

    #[test]
    fn summary_period_accepts_all_known_keys() {
        let quarter = GameSummary::new(json!({ "game": { "quarter": 3 } }));
        assert_eq!(quarter.period(), Some(3));

        let flat = GameSummary::new(json!({ "quarter": "2" }));
        assert_eq!(flat.period(), Some(2));

        let period_number = GameSummary::new(json!({ "game": { "period_number": 4 } }));
        assert_eq!(period_number.period(), Some(4));
    }

    #[test]
    fn summary_clock_falls_through_empty_candidates() {
        let s = GameSummary::new(json!({ "game": { "clock": "" }, "clock": "7:02" }));
        assert_eq!(s.clock(), Some("7:02"));

        let decimal = GameSummary::new(json!({ "game": { "clock_decimal": "4.5" } }));
        assert_eq!(decimal.clock(), Some("4.5"));
        assert_eq!(GameSummary::new(json!({})).clock(), None);
    }

    #[test]
    fn numeric_handles_numbers_and_strings() {
        assert_eq!(numeric(&json!(102)), Some(102));
        assert_eq!(numeric(&json!("98")), Some(98));
        assert_eq!(numeric(&json!("  110 ")), Some(110));
        assert_eq!(numeric(&json!("n/a")), None);
        assert_eq!(numeric(&json!("")), None);
        assert_eq!(numeric(&json!(null)), None);
        assert_eq!(numeric(&json!({"points": 5})), None);
    }
}
