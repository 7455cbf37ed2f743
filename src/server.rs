use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::error;

use crate::games::{DisplayRecord, GamesCache};

#[derive(Clone)]
pub struct AppState {
    pub cache: GamesCache,
}

/// Build the Axum router for the games API.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/games", get(games_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct GamesQuery {
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
struct GamesResponse {
    games: Vec<DisplayRecord>,
}

/// GET /api/games?limit=N
///
/// Serves the cached current-games list; the `X-Cache` header reports
/// whether the response was fresh, a refresh miss, or a stale fallback.
async fn games_handler(
    State(state): State<AppState>,
    Query(query): Query<GamesQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    match state.cache.get().await {
        Ok((entry, status)) => {
            let games: Vec<DisplayRecord> = match query.limit {
                Some(limit) => entry.records.iter().take(limit).cloned().collect(),
                None => entry.records.clone(),
            };
            Ok((
                [("x-cache", status.as_str())],
                Json(GamesResponse { games }),
            ))
        }
        Err(err) => {
            error!("Games request failed: {}", err);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch games.".to_string(),
            ))
        }
    }
}
