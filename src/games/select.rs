use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

use super::models::{RawGame, SelectedGame};

/// Calendar date a game lands on in the display time zone.
pub fn bucket_date(scheduled: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    scheduled.with_timezone(&offset).date_naive()
}

/// Pick up to `limit` games to show: everything on the target date first,
/// then backfill from the most recent earlier dates until the quota fills.
/// Dates after the target are never considered. Games without a scheduled
/// instant are dropped. Within a date, games are ordered by scheduled
/// instant descending; equal instants keep their input order.
pub fn select_games(
    games: Vec<RawGame>,
    target: NaiveDate,
    limit: usize,
    offset: FixedOffset,
) -> Vec<SelectedGame> {
    let mut buckets: BTreeMap<NaiveDate, Vec<RawGame>> = BTreeMap::new();
    for game in games {
        let scheduled = match game.scheduled {
            Some(s) => s,
            None => continue,
        };
        buckets
            .entry(bucket_date(scheduled, offset))
            .or_default()
            .push(game);
    }

    let mut picked = Vec::new();

    if let Some(mut today) = buckets.remove(&target) {
        sort_scheduled_desc(&mut today);
        picked.extend(
            today
                .into_iter()
                .take(limit)
                .map(|game| SelectedGame { date: target, game }),
        );
    }

    for (date, mut bucket) in buckets.into_iter().rev().filter(|(d, _)| *d < target) {
        if picked.len() >= limit {
            break;
        }
        sort_scheduled_desc(&mut bucket);
        for game in bucket {
            if picked.len() >= limit {
                break;
            }
            picked.push(SelectedGame { date, game });
        }
    }

    picked
}

/// Stable descending sort keeps input order for equal instants.
fn sort_scheduled_desc(games: &mut [RawGame]) {
    games.sort_by(|a, b| b.scheduled.cmp(&a.scheduled));
}
