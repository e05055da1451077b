//! Emote scoring policies.
//!
//! A run scores with exactly one [`ScoringPolicy`], chosen through
//! [`ScoringConfig`]. The default is [`MinMaxPolicy`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::usage::{EmoteUsageRecord, UsageStore};

/// Weight of the normalized count in [`MinMaxPolicy`].
pub const COUNT_WEIGHT: f64 = 0.3;
/// Weight of the normalized recency in [`MinMaxPolicy`].
pub const RECENCY_WEIGHT: f64 = 0.7;
/// Normalized value used when every emote shares the same count or age.
pub const UNIFORM_NORMALIZED: f64 = 0.5;
/// Per-second decay rate of [`DecayPolicy`].
pub const DEFAULT_DECAY_RATE: f64 = 1e-7;

/// Policy selector exposed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum ScoringKind {
    /// Weighted min/max normalization of count and recency
    #[default]
    MinMax,
    /// Sum of exponentially decayed usage events
    Decay,
}

/// Configuration for emote scoring.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ScoringConfig {
    /// Min/max normalization
    #[default]
    MinMax,
    /// Exponential time decay
    Decay {
        /// Decay rate per second of event age
        #[serde(default = "default_decay_rate")]
        decay_rate: f64,
    },
}

fn default_decay_rate() -> f64 {
    DEFAULT_DECAY_RATE
}

impl ScoringConfig {
    /// Build a config for a policy kind, using `decay_rate` only for decay.
    pub fn from_kind(kind: ScoringKind, decay_rate: f64) -> Self {
        match kind {
            ScoringKind::MinMax => Self::MinMax,
            ScoringKind::Decay => Self::Decay { decay_rate },
        }
    }

    pub fn kind(&self) -> ScoringKind {
        match self {
            Self::MinMax => ScoringKind::MinMax,
            Self::Decay { .. } => ScoringKind::Decay,
        }
    }
}

/// Trait for emote scoring strategies.
pub trait ScoringPolicy: Send + Sync {
    /// Policy name, used in logs.
    fn name(&self) -> &'static str;

    /// Score every record, returning one score per record in input order.
    fn score_all(&self, records: &[EmoteUsageRecord], now: DateTime<Utc>) -> Vec<f64>;
}

/// Seconds elapsed between `then` and `now`.
fn age_secs(now: DateTime<Utc>, then: DateTime<Utc>) -> f64 {
    (now - then).num_milliseconds() as f64 / 1000.0
}

/// Two-factor score: `0.3 * normalized count + 0.7 * normalized recency`.
///
/// Counts are normalized across all emotes. Recency is normalized across
/// emotes with at least one use; emotes never used get a recency of 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinMaxPolicy;

impl MinMaxPolicy {
    pub fn new() -> Self {
        Self
    }
}

fn normalize(value: f64, min: f64, max: f64) -> f64 {
    if max == min {
        UNIFORM_NORMALIZED
    } else {
        (value - min) / (max - min)
    }
}

impl ScoringPolicy for MinMaxPolicy {
    fn name(&self) -> &'static str {
        "min-max"
    }

    fn score_all(&self, records: &[EmoteUsageRecord], now: DateTime<Utc>) -> Vec<f64> {
        let ages: Vec<Option<f64>> = records
            .iter()
            .map(|r| r.last_used().map(|last| age_secs(now, last)))
            .collect();

        let min_count = records.iter().map(|r| r.count()).min().unwrap_or(0) as f64;
        let max_count = records.iter().map(|r| r.count()).max().unwrap_or(0) as f64;
        let min_age = ages.iter().flatten().copied().fold(f64::INFINITY, f64::min);
        let max_age = ages.iter().flatten().copied().fold(f64::NEG_INFINITY, f64::max);

        records
            .iter()
            .zip(&ages)
            .map(|(record, age)| {
                let norm_count = normalize(record.count() as f64, min_count, max_count);
                let norm_recency = match age {
                    Some(age) => 1.0 - normalize(*age, min_age, max_age),
                    None => 0.0,
                };
                COUNT_WEIGHT * norm_count + RECENCY_WEIGHT * norm_recency
            })
            .collect()
    }
}

/// Sum of `exp(-decay_rate * age)` over every usage event.
///
/// Each event contributes independently, so more and more recent usage both
/// raise the score. No global pass is needed.
#[derive(Debug, Clone, Copy)]
pub struct DecayPolicy {
    decay_rate: f64,
}

impl DecayPolicy {
    pub fn new(decay_rate: f64) -> Self {
        Self { decay_rate }
    }

    pub fn decay_rate(&self) -> f64 {
        self.decay_rate
    }

    fn score_one(&self, record: &EmoteUsageRecord, now: DateTime<Utc>) -> f64 {
        record
            .usage_timestamps()
            .iter()
            .map(|t| (-self.decay_rate * age_secs(now, *t)).exp())
            .sum()
    }
}

impl Default for DecayPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_DECAY_RATE)
    }
}

impl ScoringPolicy for DecayPolicy {
    fn name(&self) -> &'static str {
        "decay"
    }

    fn score_all(&self, records: &[EmoteUsageRecord], now: DateTime<Utc>) -> Vec<f64> {
        records.iter().map(|r| self.score_one(r, now)).collect()
    }
}

/// Create a scoring policy from configuration.
pub fn create_policy(config: &ScoringConfig) -> Box<dyn ScoringPolicy> {
    match config {
        ScoringConfig::MinMax => Box::new(MinMaxPolicy::new()),
        ScoringConfig::Decay { decay_rate } => Box::new(DecayPolicy::new(*decay_rate)),
    }
}

/// A usage record with its final score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredEmote {
    pub record: EmoteUsageRecord,
    pub score: f64,
}

/// Every usage record of a store, scored once.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scoreboard {
    policy: &'static str,
    scored_at: DateTime<Utc>,
    entries: Vec<ScoredEmote>,
}

impl Scoreboard {
    /// Score a frozen usage store with a single policy at `now`.
    pub fn compute(store: UsageStore, policy: &dyn ScoringPolicy, now: DateTime<Utc>) -> Self {
        let scores = policy.score_all(store.records(), now);
        let entries = store
            .into_records()
            .into_iter()
            .zip(scores)
            .map(|(record, score)| ScoredEmote { record, score })
            .collect();

        Self {
            policy: policy.name(),
            scored_at: now,
            entries,
        }
    }

    /// Entries in vocabulary order.
    pub fn entries(&self) -> &[ScoredEmote] {
        &self.entries
    }

    pub fn get(&self, name: &str) -> Option<&ScoredEmote> {
        self.entries.iter().find(|e| e.record.name == name)
    }

    pub fn policy(&self) -> &'static str {
        self.policy
    }

    pub fn scored_at(&self) -> DateTime<Utc> {
        self.scored_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usage::UsageAccumulator;
    use crate::vocabulary::EmoteVocabularyEntry;
    use chrono::{NaiveDate, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Build a store from `(name, [dates])` pairs.
    fn store(usage: &[(&str, &[NaiveDate])]) -> UsageStore {
        let added = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        let vocab: Vec<_> = usage
            .iter()
            .map(|(name, _)| EmoteVocabularyEntry::new(format!("id-{name}"), *name, added))
            .collect();
        let mut acc = UsageAccumulator::new(&vocab);
        for (name, dates) in usage {
            for d in *dates {
                acc.record_usage(*d, name);
            }
        }
        acc.finalize()
    }

    fn scores(board: &Scoreboard) -> Vec<f64> {
        board.entries().iter().map(|e| e.score).collect()
    }

    #[test]
    fn test_min_max_bounds() {
        let store = store(&[
            ("A", &[date(2024, 5, 31), date(2024, 5, 30), date(2024, 5, 29)]),
            ("B", &[date(2024, 1, 1)]),
            ("C", &[]),
            ("D", &[date(2024, 3, 15), date(2024, 3, 16)]),
        ]);
        let board = Scoreboard::compute(store, &MinMaxPolicy, now());

        for score in scores(&board) {
            assert!((0.0..=1.0).contains(&score), "score out of bounds: {score}");
        }
        // Most used and most recent.
        assert!((board.get("A").unwrap().score - 1.0).abs() < 1e-9);
        // Never used, lowest count.
        assert_eq!(board.get("C").unwrap().score, 0.0);
    }

    #[test]
    fn test_min_max_equal_counts() {
        let store = store(&[
            ("A", &[date(2024, 5, 1)]),
            ("B", &[date(2024, 4, 1)]),
            ("C", &[date(2024, 3, 1)]),
        ]);
        let board = Scoreboard::compute(store, &MinMaxPolicy, now());

        // norm_count is 0.5 for all, recency spans 1.0 .. 0.0.
        assert!((board.get("A").unwrap().score - (0.3 * 0.5 + 0.7)).abs() < 1e-9);
        assert!((board.get("C").unwrap().score - 0.3 * 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_min_max_equal_ages() {
        let store = store(&[
            ("A", &[date(2024, 5, 1), date(2024, 5, 1)]),
            ("B", &[date(2024, 5, 1)]),
        ]);
        let board = Scoreboard::compute(store, &MinMaxPolicy, now());

        assert!((board.get("A").unwrap().score - (0.3 + 0.7 * 0.5)).abs() < 1e-9);
        assert!((board.get("B").unwrap().score - 0.7 * 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_min_max_unused_emote_has_zero_recency() {
        let store = store(&[("Kappa", &[]), ("PogChamp", &[])]);
        let board = Scoreboard::compute(store, &MinMaxPolicy, now());

        // Counts are all equal (0), recency is 0 for never-used emotes.
        assert_eq!(scores(&board), vec![0.3 * 0.5, 0.3 * 0.5]);
    }

    #[test]
    fn test_decay_unused_emote_scores_zero() {
        let store = store(&[("Kappa", &[])]);
        let board = Scoreboard::compute(store, &DecayPolicy::default(), now());
        assert_eq!(board.get("Kappa").unwrap().score, 0.0);
    }

    #[test]
    fn test_decay_extra_recent_event_raises_score() {
        let shared = [date(2024, 1, 10), date(2024, 2, 20)];
        let with_extra = [date(2024, 1, 10), date(2024, 2, 20), date(2024, 6, 1)];
        let store = store(&[("X", &with_extra), ("Y", &shared)]);
        let board = Scoreboard::compute(store, &DecayPolicy::default(), now());

        assert!(board.get("X").unwrap().score > board.get("Y").unwrap().score);
    }

    #[test]
    fn test_decay_event_today_contributes_about_one() {
        let store = store(&[("Kappa", &[date(2024, 6, 1)])]);
        let board = Scoreboard::compute(store, &DecayPolicy::default(), now());

        // 12 hours old: exp(-1e-7 * 43200) ~= 0.9957
        let score = board.get("Kappa").unwrap().score;
        assert!(score > 0.99 && score <= 1.0);
    }

    #[test]
    fn test_decay_old_event_is_negligible() {
        let store = store(&[("Kappa", &[date(2023, 6, 1)])]);
        let board = Scoreboard::compute(store, &DecayPolicy::default(), now());
        assert!(board.get("Kappa").unwrap().score < 0.05);
    }

    #[test]
    fn test_scoring_does_not_touch_usage() {
        let store = store(&[("Kappa", &[date(2024, 5, 1), date(2024, 4, 1)])]);
        let before = store.get("Kappa").unwrap().usage_timestamps().to_vec();
        let board = Scoreboard::compute(store, &MinMaxPolicy, now());

        assert_eq!(board.get("Kappa").unwrap().record.usage_timestamps(), &before[..]);
        assert_eq!(board.policy(), "min-max");
        assert_eq!(board.scored_at(), now());
    }

    #[test]
    fn test_create_policy() {
        assert_eq!(create_policy(&ScoringConfig::default()).name(), "min-max");
        let decay = ScoringConfig::from_kind(ScoringKind::Decay, 2e-7);
        assert_eq!(decay, ScoringConfig::Decay { decay_rate: 2e-7 });
        assert_eq!(create_policy(&decay).name(), "decay");
        assert_eq!(decay.kind(), ScoringKind::Decay);
    }

    #[test]
    fn test_config_deserialize() {
        let config: ScoringConfig =
            serde_json::from_str(r#"{"type":"decay"}"#).unwrap();
        assert_eq!(
            config,
            ScoringConfig::Decay {
                decay_rate: DEFAULT_DECAY_RATE
            }
        );

        let config: ScoringConfig = serde_json::from_str(r#"{"type":"min-max"}"#).unwrap();
        assert_eq!(config, ScoringConfig::MinMax);
    }
}
