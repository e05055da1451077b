use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use emotes::download::parse_date;
use emotes::{
    CountReport, DownloadSummary, LogDownloader, ScoringConfig, ScoringKind, SevenTvClient,
    create_policy, render_report_with, write_report,
};
use reqwest::Client;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::error::{AppError, Result};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

pub struct CommandExecutor {
    config: AppConfig,
    client: Client,
}

impl CommandExecutor {
    pub fn new(config: AppConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self { config, client })
    }

    /// Scoring settings after applying command line overrides.
    pub fn scoring_config(
        &self,
        policy: Option<ScoringKind>,
        decay_rate: Option<f64>,
    ) -> Result<ScoringConfig> {
        if let Some(rate) = decay_rate
            && !(rate.is_finite() && rate > 0.0)
        {
            return Err(AppError::configuration(format!(
                "--decay-rate must be a positive number, got {rate}"
            )));
        }
        let configured_rate = match self.config.scoring {
            ScoringConfig::Decay { decay_rate } => decay_rate,
            ScoringConfig::MinMax => emotes::scoring::DEFAULT_DECAY_RATE,
        };
        let kind = policy.unwrap_or_else(|| self.config.scoring.kind());
        Ok(ScoringConfig::from_kind(kind, decay_rate.unwrap_or(configured_rate)))
    }

    pub async fn count(
        &self,
        user_id: &str,
        data_dir: &Path,
        output: &Path,
        policy: Option<ScoringKind>,
        decay_rate: Option<f64>,
    ) -> Result<CountReport> {
        if user_id.trim().is_empty() {
            return Err(AppError::configuration("USER_ID must not be empty"));
        }

        let scoring = self.scoring_config(policy, decay_rate)?;
        if decay_rate.is_some() && scoring.kind() != ScoringKind::Decay {
            warn!("--decay-rate has no effect with the min-max policy");
        }
        let policy = create_policy(&scoring);
        let source =
            SevenTvClient::with_endpoint(self.client.clone(), &self.config.catalog_endpoint);

        let report =
            emotes::count_emotes(&source, user_id, data_dir, policy.as_ref(), Utc::now()).await?;

        let html = render_report_with(&report.ranked, report.scored_at, &self.config.report);
        write_report(output, &html).await?;

        info!(
            emotes = report.ranked.len(),
            lines = report.stats.lines,
            policy = report.policy,
            "Scoreboard written to {}",
            output.display()
        );
        Ok(report)
    }

    pub async fn download(
        &self,
        instance: &str,
        channel: &str,
        start_date: &str,
        end_date: Option<&str>,
        data_dir: &Path,
    ) -> Result<DownloadSummary> {
        if instance.trim().is_empty() {
            return Err(AppError::configuration("LOG_INSTANCE must not be empty"));
        }
        if channel.trim().is_empty() {
            return Err(AppError::configuration("CHANNEL must not be empty"));
        }
        let start = parse_date(start_date)?;
        let end = match end_date {
            Some(end) => parse_date(end)?,
            None => Utc::now().date_naive(),
        };
        if start > end {
            return Err(AppError::configuration(format!(
                "start date {start} is after end date {end}"
            )));
        }

        let downloader = LogDownloader::new(self.client.clone(), instance, channel);
        let summary = downloader.download_range(start, end, data_dir).await?;

        info!(
            downloaded = summary.downloaded,
            missing = summary.missing,
            bytes = summary.bytes,
            "Finished downloading logs for {}",
            channel
        );
        Ok(summary)
    }
}
