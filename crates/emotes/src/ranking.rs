//! Scoreboard ordering for presentation.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::scoring::Scoreboard;

/// One row of the rendered scoreboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEmote {
    pub id: String,
    pub name: String,
    pub count: usize,
    pub added_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub score: f64,
}

/// Order every scored emote by descending score.
///
/// The sort is stable; emotes with equal scores keep vocabulary order.
/// Unused emotes are included.
pub fn rank(board: &Scoreboard) -> Vec<RankedEmote> {
    let mut rows: Vec<RankedEmote> = board
        .entries()
        .iter()
        .map(|entry| RankedEmote {
            id: entry.record.id.clone(),
            name: entry.record.name.clone(),
            count: entry.record.count(),
            added_at: entry.record.added_at,
            last_used_at: entry.record.last_used(),
            score: entry.score,
        })
        .collect();

    rows.sort_by(|a, b| b.score.total_cmp(&a.score));
    rows
}
