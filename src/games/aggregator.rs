use std::sync::Arc;

use chrono::{FixedOffset, NaiveDate, Utc};
use futures_util::future::join_all;
use tracing::info;

use super::enrich;
use super::format::format_record;
use super::models::DisplayRecord;
use super::provider::GameProvider;
use super::retry::{with_retry, RetryPolicy};
use super::select::select_games;
use crate::error::ProviderError;

/// Composes one aggregation pass: schedule fetch → backfill selection →
/// concurrent summary enrichment → formatting, in selection order.
pub struct Aggregator {
    provider: Arc<dyn GameProvider>,
    limit: usize,
    display_offset: FixedOffset,
    /// Fixed target date for testing/backfill inspection; `None` means
    /// today in the display time zone.
    target_date: Option<NaiveDate>,
    /// The schedule call is singular and foundational, so it gets a larger
    /// budget than the per-game summary calls.
    schedule_retry: RetryPolicy,
    summary_retry: RetryPolicy,
}

impl Aggregator {
    pub fn new(
        provider: Arc<dyn GameProvider>,
        limit: usize,
        display_offset: FixedOffset,
        target_date: Option<NaiveDate>,
        schedule_retry: RetryPolicy,
        summary_retry: RetryPolicy,
    ) -> Self {
        Aggregator {
            provider,
            limit,
            display_offset,
            target_date,
            schedule_retry,
            summary_retry,
        }
    }

    /// Produce the current list of display records. Fails only when the
    /// schedule fetch exhausts its retry budget; everything below degrades
    /// per-game instead.
    pub async fn current_games(&self) -> Result<Vec<DisplayRecord>, ProviderError> {
        let schedule =
            with_retry(self.schedule_retry, || self.provider.fetch_schedule()).await?;
        let total = schedule.len();

        let now = Utc::now();
        let target = self
            .target_date
            .unwrap_or_else(|| now.with_timezone(&self.display_offset).date_naive());

        let selected = select_games(schedule, target, self.limit, self.display_offset);
        info!(
            "Selected {}/{} games for {} from {}",
            selected.len(),
            total,
            target,
            self.provider.name()
        );

        let summaries = join_all(selected.iter().map(|sel| {
            enrich::fetch_summary(self.provider.as_ref(), sel, self.summary_retry)
        }))
        .await;

        Ok(selected
            .iter()
            .zip(summaries.iter())
            .map(|(sel, summary)| {
                format_record(sel, summary.as_ref(), self.display_offset, now)
            })
            .collect())
    }
}
