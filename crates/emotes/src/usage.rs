//! Emote usage accumulation.
//!
//! [`UsageAccumulator`] owns the usage map while logs are scanned.
//! [`UsageAccumulator::finalize`] consumes it into a read-only [`UsageStore`]
//! which is the only input scoring accepts.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::ops::AddAssign;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{EmotesError, Result};
use crate::matcher::match_line;
use crate::vocabulary::EmoteVocabularyEntry;

/// Usage of one emote across all scanned logs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmoteUsageRecord {
    pub id: String,
    pub name: String,
    pub added_at: DateTime<Utc>,
    usage_timestamps: Vec<DateTime<Utc>>,
}

impl EmoteUsageRecord {
    fn from_entry(entry: &EmoteVocabularyEntry) -> Self {
        Self {
            id: entry.id.clone(),
            name: entry.name.clone(),
            added_at: entry.added_at,
            usage_timestamps: Vec::new(),
        }
    }

    /// Every observed use. Chronological once frozen in a [`UsageStore`].
    pub fn usage_timestamps(&self) -> &[DateTime<Utc>] {
        &self.usage_timestamps
    }

    pub fn count(&self) -> usize {
        self.usage_timestamps.len()
    }

    /// Most recent use, independent of scan order.
    pub fn last_used(&self) -> Option<DateTime<Utc>> {
        self.usage_timestamps.iter().max().copied()
    }
}

/// Result of feeding a single line to the accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    /// The line does not have the chat-log shape
    Unmatched,
    /// The line matched but its date is not a calendar date
    InvalidDate,
    /// The line matched; holds the number of emote tokens recorded
    Recorded(usize),
}

/// Counters for a scan of one or more log files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    pub files: u64,
    pub lines: u64,
    pub matched_lines: u64,
    pub invalid_dates: u64,
    pub emote_hits: u64,
}

impl ScanStats {
    fn record(&mut self, outcome: LineOutcome) {
        self.lines += 1;
        match outcome {
            LineOutcome::Unmatched => {}
            LineOutcome::InvalidDate => self.invalid_dates += 1,
            LineOutcome::Recorded(hits) => {
                self.matched_lines += 1;
                self.emote_hits += hits as u64;
            }
        }
    }
}

impl AddAssign for ScanStats {
    fn add_assign(&mut self, other: Self) {
        self.files += other.files;
        self.lines += other.lines;
        self.matched_lines += other.matched_lines;
        self.invalid_dates += other.invalid_dates;
        self.emote_hits += other.emote_hits;
    }
}

/// Accumulates emote usage from chat-log lines.
#[derive(Debug)]
pub struct UsageAccumulator {
    /// Records in vocabulary order
    records: Vec<EmoteUsageRecord>,
    /// Emote name -> index into `records`
    index: HashMap<String, usize>,
}

impl UsageAccumulator {
    /// Create an accumulator with one empty record per vocabulary entry.
    ///
    /// A repeated name keeps its first entry.
    pub fn new(vocabulary: &[EmoteVocabularyEntry]) -> Self {
        let mut records = Vec::with_capacity(vocabulary.len());
        let mut index = HashMap::with_capacity(vocabulary.len());
        for entry in vocabulary {
            if index.contains_key(&entry.name) {
                continue;
            }
            index.insert(entry.name.clone(), records.len());
            records.push(EmoteUsageRecord::from_entry(entry));
        }
        Self { records, index }
    }

    /// Record every exact emote token in `message` as used on `date`.
    ///
    /// Tokens are separated by single spaces. Returns the number of tokens
    /// recorded.
    pub fn record_usage(&mut self, date: NaiveDate, message: &str) -> usize {
        let timestamp = date.and_time(chrono::NaiveTime::MIN).and_utc();
        let mut hits = 0;
        for token in message.split(' ') {
            if let Some(&idx) = self.index.get(token) {
                self.records[idx].usage_timestamps.push(timestamp);
                hits += 1;
            }
        }
        hits
    }

    /// Feed a single raw log line.
    pub fn scan_line(&mut self, line: &str) -> LineOutcome {
        let Some(matched) = match_line(line) else {
            return LineOutcome::Unmatched;
        };
        match NaiveDate::parse_from_str(matched.date, "%Y-%m-%d") {
            Ok(date) => LineOutcome::Recorded(self.record_usage(date, matched.message)),
            Err(e) => {
                warn!(date = matched.date, error = %e, "Skipping line with invalid date");
                LineOutcome::InvalidDate
            }
        }
    }

    /// Scan every line of a reader. Read errors abort the scan.
    pub fn scan_reader<R: BufRead>(&mut self, mut reader: R) -> std::io::Result<ScanStats> {
        let mut stats = ScanStats::default();
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&buf);
            let line: &str = &line;
            let line = line.strip_suffix('\n').unwrap_or(line);
            let line = line.strip_suffix('\r').unwrap_or(line);
            stats.record(self.scan_line(line));
        }
        Ok(stats)
    }

    /// Scan one log file.
    pub fn scan_file(&mut self, path: &Path) -> Result<ScanStats> {
        let file = File::open(path).map_err(|e| EmotesError::log_read(path, e))?;
        let mut stats = self
            .scan_reader(BufReader::new(file))
            .map_err(|e| EmotesError::log_read(path, e))?;
        stats.files = 1;

        info!(
            file = %path.display(),
            lines = stats.lines,
            matched = stats.matched_lines,
            hits = stats.emote_hits,
            "Scanned log file"
        );
        Ok(stats)
    }

    /// Scan every regular file of a directory in file-name order.
    ///
    /// The first file that cannot be read aborts the whole scan.
    pub fn scan_directory(&mut self, dir: &Path) -> Result<ScanStats> {
        let mut total = ScanStats::default();
        for path in list_log_files(dir)? {
            total += self.scan_file(&path)?;
        }
        Ok(total)
    }

    /// Freeze the accumulated usage.
    ///
    /// Each history is put in chronological order, so the frozen store does
    /// not depend on the order the files were scanned in.
    pub fn finalize(mut self) -> UsageStore {
        for record in &mut self.records {
            record.usage_timestamps.sort();
        }
        UsageStore {
            records: self.records,
        }
    }
}

/// List the regular files of a log directory, sorted by file name.
pub fn list_log_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| EmotesError::log_read(dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| EmotesError::log_read(dir, e))?;
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        } else {
            debug!(path = %path.display(), "Skipping non-file directory entry");
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Read-only usage for every vocabulary emote.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageStore {
    records: Vec<EmoteUsageRecord>,
}

impl UsageStore {
    /// Records in vocabulary order.
    pub fn records(&self) -> &[EmoteUsageRecord] {
        &self.records
    }

    pub fn get(&self, name: &str) -> Option<&EmoteUsageRecord> {
        self.records.iter().find(|r| r.name == name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub(crate) fn into_records(self) -> Vec<EmoteUsageRecord> {
        self.records
    }

    /// Check that the store holds exactly one record per vocabulary name and
    /// that every history is chronological.
    pub fn verify(&self, vocabulary: &[EmoteVocabularyEntry]) -> Result<()> {
        for entry in vocabulary {
            match self.get(&entry.name) {
                Some(record) if record.id == entry.id => {}
                Some(record) => {
                    return Err(EmotesError::invariant(format!(
                        "record for '{}' carries id {} instead of {}",
                        entry.name, record.id, entry.id
                    )));
                }
                None => {
                    return Err(EmotesError::invariant(format!(
                        "no usage record for emote '{}'",
                        entry.name
                    )));
                }
            }
        }
        if self.records.len() != vocabulary.len() {
            return Err(EmotesError::invariant(format!(
                "{} usage records for {} vocabulary entries",
                self.records.len(),
                vocabulary.len()
            )));
        }
        if let Some(record) = self
            .records
            .iter()
            .find(|r| r.usage_timestamps.windows(2).any(|w| w[0] > w[1]))
        {
            return Err(EmotesError::invariant(format!(
                "usage history of '{}' is not chronological",
                record.name
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io::Cursor;

    fn vocabulary(names: &[&str]) -> Vec<EmoteVocabularyEntry> {
        let added = Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap();
        names
            .iter()
            .map(|n| EmoteVocabularyEntry::new(format!("id-{n}"), *n, added))
            .collect()
    }

    fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_repeated_emote_in_one_line() {
        let mut acc = UsageAccumulator::new(&vocabulary(&["PogChamp"]));

        let outcome = acc.scan_line("[2024-01-01] #chan: hello PogChamp PogChamp");
        assert_eq!(outcome, LineOutcome::Recorded(2));

        let store = acc.finalize();
        let record = store.get("PogChamp").unwrap();
        assert_eq!(record.count(), 2);
        assert_eq!(
            record.usage_timestamps(),
            &[day(2024, 1, 1), day(2024, 1, 1)]
        );
    }

    #[test]
    fn test_same_line_twice_doubles_count() {
        let mut acc = UsageAccumulator::new(&vocabulary(&["Kappa", "LUL"]));
        let line = "[2024-02-10 20:00:00] #chan user: Kappa LUL Kappa";

        acc.scan_line(line);
        let once = acc.records[acc.index["Kappa"]].count();
        acc.scan_line(line);
        let twice = acc.records[acc.index["Kappa"]].count();

        assert_eq!(once, 2);
        assert_eq!(twice, 4);
    }

    #[test]
    fn test_only_exact_tokens_count() {
        let mut acc = UsageAccumulator::new(&vocabulary(&["PogChamp"]));
        let hits = acc.record_usage(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            "PogChampXYZ xPogChamp pogchamp PogChamp! PogChamp,  PogChamp\tPogChamp",
        );
        assert_eq!(hits, 0);
        assert_eq!(acc.finalize().get("PogChamp").unwrap().count(), 0);
    }

    #[test]
    fn test_unknown_emote_never_mentioned() {
        let mut acc = UsageAccumulator::new(&vocabulary(&["Kappa"]));
        acc.scan_line("[2024-01-01] #chan: nothing to see here");

        let store = acc.finalize();
        let record = store.get("Kappa").unwrap();
        assert!(record.usage_timestamps().is_empty());
        assert_eq!(record.last_used(), None);
    }

    #[test]
    fn test_malformed_line_is_silently_skipped() {
        let mut acc = UsageAccumulator::new(&vocabulary(&["PogChamp"]));
        assert_eq!(acc.scan_line("not a log line at all"), LineOutcome::Unmatched);
        assert_eq!(acc.finalize().get("PogChamp").unwrap().count(), 0);
    }

    #[test]
    fn test_invalid_date_is_skipped() {
        // The warn! event is not captured here; the outcome and the
        // invalid_dates counter stand in for it.
        let mut acc = UsageAccumulator::new(&vocabulary(&["PogChamp"]));
        assert_eq!(
            acc.scan_line("[2024-13-99] #chan: PogChamp"),
            LineOutcome::InvalidDate
        );
        assert_eq!(acc.finalize().get("PogChamp").unwrap().count(), 0);
    }

    #[test]
    fn test_scan_reader_stats() {
        let mut acc = UsageAccumulator::new(&vocabulary(&["Kappa", "PogChamp"]));
        let log = "[2024-01-01 10:00:00] #chan a: Kappa\r\n\
                   # metadata line\n\
                   [2024-02-30 10:00:00] #chan b: Kappa\n\
                   [2024-01-02 10:00:00] #chan c: PogChamp Kappa";

        let stats = acc.scan_reader(Cursor::new(log)).unwrap();
        assert_eq!(stats.lines, 4);
        assert_eq!(stats.matched_lines, 2);
        assert_eq!(stats.invalid_dates, 1);
        assert_eq!(stats.emote_hits, 3);

        let store = acc.finalize();
        let kappa = store.get("Kappa").unwrap();
        assert_eq!(kappa.count(), 2);
        assert_eq!(kappa.last_used(), Some(day(2024, 1, 2)));
    }

    #[test]
    fn test_trailing_carriage_return_is_not_part_of_token() {
        let mut acc = UsageAccumulator::new(&vocabulary(&["Kappa"]));
        acc.scan_reader(Cursor::new("[2024-01-01] #chan: Kappa\r\n"))
            .unwrap();
        assert_eq!(acc.finalize().get("Kappa").unwrap().count(), 1);
    }

    #[test]
    fn test_only_one_carriage_return_is_stripped() {
        let mut acc = UsageAccumulator::new(&vocabulary(&["Kappa"]));
        let stats = acc
            .scan_reader(Cursor::new("[2024-01-01] #chan: Kappa\r\r\n"))
            .unwrap();
        assert_eq!(stats.matched_lines, 1);
        assert_eq!(stats.emote_hits, 0);
        assert_eq!(acc.finalize().get("Kappa").unwrap().count(), 0);
    }

    #[test]
    fn test_finalize_orders_history() {
        let mut acc = UsageAccumulator::new(&vocabulary(&["Kappa"]));
        acc.scan_line("[2024-03-01] #chan: Kappa");
        acc.scan_line("[2024-01-01] #chan: Kappa");
        acc.scan_line("[2024-02-01] #chan: Kappa");

        let store = acc.finalize();
        let kappa = store.get("Kappa").unwrap();
        assert_eq!(
            kappa.usage_timestamps(),
            &[day(2024, 1, 1), day(2024, 2, 1), day(2024, 3, 1)]
        );
        assert_eq!(kappa.last_used(), Some(day(2024, 3, 1)));
        assert!(store.verify(&vocabulary(&["Kappa"])).is_ok());
    }

    #[test]
    fn test_verify_rejects_unordered_history() {
        let vocab = vocabulary(&["Kappa"]);
        let mut record = EmoteUsageRecord::from_entry(&vocab[0]);
        record.usage_timestamps = vec![day(2024, 3, 1), day(2024, 1, 1)];
        let store = UsageStore {
            records: vec![record],
        };

        let err = store.verify(&vocab).unwrap_err();
        assert!(err.to_string().contains("not chronological"));
    }

    #[test]
    fn test_verify_against_vocabulary() {
        let vocab = vocabulary(&["Kappa", "PogChamp"]);
        let store = UsageAccumulator::new(&vocab).finalize();
        assert!(store.verify(&vocab).is_ok());

        let larger = vocabulary(&["Kappa", "PogChamp", "LUL"]);
        let err = store.verify(&larger).unwrap_err();
        assert!(matches!(err, EmotesError::Invariant(_)));
    }

    #[test]
    fn test_stats_add_assign() {
        let mut total = ScanStats::default();
        total += ScanStats {
            files: 1,
            lines: 10,
            matched_lines: 8,
            invalid_dates: 1,
            emote_hits: 3,
        };
        total += ScanStats {
            files: 1,
            lines: 5,
            matched_lines: 5,
            invalid_dates: 0,
            emote_hits: 2,
        };
        assert_eq!(total.files, 2);
        assert_eq!(total.lines, 15);
        assert_eq!(total.emote_hits, 5);
    }
}
