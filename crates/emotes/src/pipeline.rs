//! End-to-end counting run.
//!
//! Fetch vocabulary, scan logs, freeze, score once, rank.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::ranking::{RankedEmote, rank};
use crate::scoring::{ScoringPolicy, Scoreboard};
use crate::usage::{ScanStats, UsageAccumulator};
use crate::vocabulary::{EmoteVocabularyEntry, VocabularySource, validate_vocabulary};

/// Outcome of a counting run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountReport {
    /// Number of emotes in the vocabulary
    pub vocabulary_size: usize,
    pub stats: ScanStats,
    /// Name of the scoring policy used
    pub policy: &'static str,
    pub scored_at: DateTime<Utc>,
    /// Every vocabulary emote, highest score first
    pub ranked: Vec<RankedEmote>,
}

/// Score a known vocabulary against every log file in `log_dir`.
///
/// Any unreadable log file aborts the run; no partial scoreboard is returned.
pub fn count_from_logs(
    vocabulary: &[EmoteVocabularyEntry],
    log_dir: &Path,
    policy: &dyn ScoringPolicy,
    now: DateTime<Utc>,
) -> Result<CountReport> {
    validate_vocabulary(vocabulary)?;

    let mut accumulator = UsageAccumulator::new(vocabulary);
    let stats = accumulator.scan_directory(log_dir)?;
    let store = accumulator.finalize();
    store.verify(vocabulary)?;

    info!(
        files = stats.files,
        lines = stats.lines,
        matched = stats.matched_lines,
        hits = stats.emote_hits,
        "Finished scanning logs"
    );

    let board = Scoreboard::compute(store, policy, now);
    let ranked = rank(&board);

    info!(policy = board.policy(), emotes = ranked.len(), "Computed scores");

    Ok(CountReport {
        vocabulary_size: vocabulary.len(),
        stats,
        policy: board.policy(),
        scored_at: board.scored_at(),
        ranked,
    })
}

/// Fetch the channel's vocabulary from `source`, then score `log_dir`.
pub async fn count_emotes(
    source: &dyn VocabularySource,
    user_id: &str,
    log_dir: &Path,
    policy: &dyn ScoringPolicy,
    now: DateTime<Utc>,
) -> Result<CountReport> {
    info!(source = source.name(), user_id, "Fetching emote vocabulary");
    let vocabulary = source.fetch(user_id).await?;
    count_from_logs(&vocabulary, log_dir, policy, now)
}
