use std::path::PathBuf;

use clap::{Parser, Subcommand};
use emotes::ScoringKind;

#[derive(Parser, Debug)]
#[command(
    name = "emoterank",
    author,
    version,
    about = "Count and score a channel's 7TV emote usage from chat logs"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the config file
    #[arg(short, long, global = true, env = "EMOTERANK_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score emote usage in a log directory and render the HTML scoreboard
    Count {
        /// Twitch user ID whose 7TV emote set is scored
        #[arg(long, env = "USER_ID")]
        user_id: String,

        /// Directory holding the chat logs
        #[arg(long, env = "DATA_DIRECTORY")]
        data_dir: PathBuf,

        /// HTML file to write
        #[arg(short, long, env = "RENDERFILE")]
        output: PathBuf,

        /// Scoring policy, overrides the config file
        #[arg(long, value_enum)]
        policy: Option<ScoringKind>,

        /// Decay rate per second, used by the decay policy
        #[arg(long)]
        decay_rate: Option<f64>,
    },

    /// Download daily chat logs from a justlog instance
    Download {
        /// Log instance host, e.g. logs.example.com
        #[arg(long, env = "LOG_INSTANCE")]
        instance: String,

        /// Channel to download logs for
        #[arg(long, env = "CHANNEL")]
        channel: String,

        /// First day to download (YYYY-MM-DD)
        #[arg(long, env = "STARTDATE")]
        start_date: String,

        /// Last day to download (YYYY-MM-DD), defaults to today
        #[arg(long)]
        end_date: Option<String>,

        /// Directory the logs are written to; its files are removed first
        #[arg(long, env = "DATA_DIRECTORY")]
        data_dir: PathBuf,
    },

    /// Show or reset the configuration
    Config {
        /// Print the effective configuration
        #[arg(long)]
        show: bool,

        /// Overwrite the config file with defaults
        #[arg(long, conflicts_with = "show")]
        reset: bool,
    },
}
