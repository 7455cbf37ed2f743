use serde_json::Value;
use tracing::warn;

use super::models::{numeric, GameSummary, RawGame, SelectedGame, Side};
use super::provider::GameProvider;
use super::retry::{with_retry, RetryPolicy};

/// Fetch one game's summary under the given retry budget. Exhausting the
/// budget degrades that game's record to schedule-only data; it never fails
/// the batch.
pub async fn fetch_summary(
    provider: &dyn GameProvider,
    selected: &SelectedGame,
    policy: RetryPolicy,
) -> Option<GameSummary> {
    let game_id = &selected.game.id;
    match with_retry(policy, || provider.fetch_summary(game_id)).await {
        Ok(summary) => Some(summary),
        Err(err) => {
            warn!("Summary fetch failed for {}: {}", game_id, err);
            None
        }
    }
}

/// The summary schemas seen in the wild put per-side points in several
/// places. Candidates are tried in order; extend this list when the
/// provider invents another nesting.
const POINT_PATHS: &[fn(&Value, Side) -> Option<&Value>] = &[
    side_points,
    side_statistics_points,
    side_scoring_points,
    boxscore_points,
    boxscore_statistics_points,
    boxscore_scoring_points,
    game_side_points,
    game_flat_points,
];

fn side_points(v: &Value, side: Side) -> Option<&Value> {
    v.get(side.key())?.get("points")
}

fn side_statistics_points(v: &Value, side: Side) -> Option<&Value> {
    v.get(side.key())?.get("statistics")?.get("points")
}

fn side_scoring_points(v: &Value, side: Side) -> Option<&Value> {
    v.get(side.key())?.get("scoring")?.get("points")
}

fn boxscore_points(v: &Value, side: Side) -> Option<&Value> {
    v.get("boxscore")?.get(side.key())?.get("points")
}

fn boxscore_statistics_points(v: &Value, side: Side) -> Option<&Value> {
    v.get("boxscore")?.get(side.key())?.get("statistics")?.get("points")
}

fn boxscore_scoring_points(v: &Value, side: Side) -> Option<&Value> {
    v.get("boxscore")?.get(side.key())?.get("scoring")?.get("points")
}

fn game_side_points(v: &Value, side: Side) -> Option<&Value> {
    v.get("game")?.get(side.key())?.get("points")
}

fn game_flat_points(v: &Value, side: Side) -> Option<&Value> {
    v.get("game")?.get(side.points_key())
}

/// Resolve one side's point total: first summary path that yields a usable
/// number wins, then the schedule entry's own totals. `None` means unknown,
/// never zero.
pub fn team_points(summary: Option<&GameSummary>, side: Side, game: &RawGame) -> Option<i64> {
    if let Some(summary) = summary {
        for path in POINT_PATHS {
            if let Some(points) = path(summary.raw(), side).and_then(numeric) {
                return Some(points);
            }
        }
    }
    match side {
        Side::Home => game.home_points,
        Side::Away => game.away_points,
    }
}
