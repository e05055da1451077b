//! Historical chat-log download.
//!
//! Fetches one log per day from a justlog-compatible instance and stores
//! each response body verbatim as `{data_dir}/{YYYY-MM-DD}.log`.

use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{EmotesError, Result};

/// Counters for a finished download run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DownloadSummary {
    /// Days written to disk
    pub downloaded: u32,
    /// Days the instance has no log for
    pub missing: u32,
    /// Total bytes written
    pub bytes: u64,
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| EmotesError::InvalidDate(s.to_string()))
}

/// Every day from `start` through `end`, inclusive.
pub fn date_range(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |d| *d <= end)
}

/// File name a day's log is stored under.
pub fn log_file_name(date: NaiveDate) -> String {
    format!("{}.log", date.format("%Y-%m-%d"))
}

/// Create `dir` if missing and remove the regular files already in it.
///
/// Returns the number of files removed.
pub async fn prepare_data_dir(dir: &Path) -> Result<usize> {
    tokio::fs::create_dir_all(dir).await?;

    let mut removed = 0;
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            tokio::fs::remove_file(entry.path()).await?;
            removed += 1;
        }
    }
    debug!(dir = %dir.display(), removed, "Cleared data directory");
    Ok(removed)
}

/// Downloads daily chat logs for one channel.
pub struct LogDownloader {
    client: Client,
    instance: String,
    channel: String,
}

impl LogDownloader {
    /// `instance` is the log host, e.g. `logs.example.com`.
    pub fn new(client: Client, instance: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            client,
            instance: instance.into(),
            channel: channel.into(),
        }
    }

    /// `https://{instance}/channel/{channel}/{year}/{month}/{day}`
    pub fn log_url(&self, date: NaiveDate) -> Result<Url> {
        let mut base = if self.instance.contains("://") {
            Url::parse(&self.instance)?
        } else {
            Url::parse(&format!("https://{}", self.instance))?
        };
        // Joining replaces the last segment unless the path ends in '/'
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let path = format!(
            "channel/{}/{}/{}/{}",
            self.channel,
            date.year(),
            date.month(),
            date.day()
        );
        Ok(base.join(&path)?)
    }

    /// Download every day from `start` through `end` into `data_dir`.
    ///
    /// The directory is created and emptied first. The first failing day
    /// aborts the run.
    pub async fn download_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        data_dir: &Path,
    ) -> Result<DownloadSummary> {
        prepare_data_dir(data_dir).await?;

        let mut summary = DownloadSummary::default();
        for date in date_range(start, end) {
            info!("Downloading logs for {}", date);
            let written = self
                .download_day(date, data_dir)
                .await
                .map_err(|e| EmotesError::Download {
                    date,
                    source: Box::new(e),
                })?;
            match written {
                Some(bytes) => {
                    summary.downloaded += 1;
                    summary.bytes += bytes;
                }
                None => summary.missing += 1,
            }
        }
        Ok(summary)
    }

    /// Download one day. Returns `None` when the instance has no log for it.
    pub async fn download_day(&self, date: NaiveDate, data_dir: &Path) -> Result<Option<u64>> {
        let url = self.log_url(date)?;
        let mut response = self.client.get(url.clone()).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            warn!(%url, "No log available for {}", date);
            return Ok(None);
        }
        response.error_for_status_ref()?;

        let path: PathBuf = data_dir.join(log_file_name(date));
        let mut file = File::create(&path).await?;
        let mut bytes = 0u64;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            bytes += chunk.len() as u64;
        }
        file.flush().await?;

        debug!(file = %path.display(), bytes, "Wrote log file");
        Ok(Some(bytes))
    }
}
