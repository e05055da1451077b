//! Emotes: chat-log emote usage counting and scoring.
//!
//! This crate turns a channel's emote set and its historical chat logs into a
//! ranked scoreboard.
//!
//! ## Core Types
//!
//! - [`EmoteVocabularyEntry`] - An emote known to the channel (id, name, added date)
//! - [`VocabularySource`] - Trait for emote catalog implementations
//! - [`UsageAccumulator`] - Scans log lines and records emote usage
//! - [`UsageStore`] - Frozen per-emote usage after all logs were scanned
//!
//! ## Scoring
//!
//! - [`ScoringPolicy`] - Trait for score computation strategies
//! - [`MinMaxPolicy`] - Weighted min/max normalization of count and recency
//! - [`DecayPolicy`] - Sum of exponentially decayed usage events
//! - [`Scoreboard`] - Usage records paired with their computed score
//!
//! ## Collaborators
//!
//! - [`catalog::SevenTvClient`] - 7TV emote set lookup
//! - [`download::LogDownloader`] - Daily chat-log download
//! - [`render`] - HTML scoreboard report

pub mod catalog;
pub mod download;
pub mod error;
pub mod matcher;
pub mod pipeline;
pub mod ranking;
pub mod render;
pub mod scoring;
pub mod usage;
pub mod vocabulary;

pub use catalog::SevenTvClient;
pub use download::{DownloadSummary, LogDownloader};
pub use error::{EmotesError, Result};
pub use matcher::{LineMatch, match_line};
pub use pipeline::{CountReport, count_emotes, count_from_logs};
pub use ranking::{RankedEmote, rank};
pub use render::{ReportLinks, render_report, render_report_with, write_report};
pub use scoring::{
    DecayPolicy, MinMaxPolicy, ScoredEmote, Scoreboard, ScoringConfig, ScoringKind,
    ScoringPolicy, create_policy,
};
pub use usage::{EmoteUsageRecord, LineOutcome, ScanStats, UsageAccumulator, UsageStore};
pub use vocabulary::{EmoteVocabularyEntry, VocabularySource, validate_vocabulary};
