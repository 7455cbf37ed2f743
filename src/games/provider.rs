use async_trait::async_trait;

use crate::error::ProviderError;
use crate::games::models::{GameSummary, RawGame};

/// Trait that every upstream games provider must implement.
#[async_trait]
pub trait GameProvider: Send + Sync {
    /// Fetch the full season schedule.
    async fn fetch_schedule(&self) -> Result<Vec<RawGame>, ProviderError>;

    /// Fetch the live/final summary for one game.
    async fn fetch_summary(&self, game_id: &str) -> Result<GameSummary, ProviderError>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}
