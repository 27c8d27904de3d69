use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::data::{Endpoints, DEFAULT_BACKEND_URL, DEFAULT_SEASON, DEFAULT_STATS_URL};
use crate::retry::{RetryPolicy, DEFAULT_MAX_ATTEMPTS};

const APP_DIR: &str = "mlb-tui";

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "MLB teams, standings and rosters in the terminal", long_about = None)]
pub struct Args {
    /// Base URL of the teams backend
    #[arg(long, env = "MLB_TUI_BACKEND_URL", default_value = DEFAULT_BACKEND_URL)]
    pub backend_url: String,

    /// Base URL of the stats API
    #[arg(long, env = "MLB_TUI_STATS_URL", default_value = DEFAULT_STATS_URL)]
    pub stats_url: String,

    /// Season used for standings and player stats
    #[arg(long, default_value_t = DEFAULT_SEASON)]
    pub season: u16,

    /// Attempts made against the teams backend before giving up
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS, value_parser = clap::value_parser!(u32).range(1..))]
    pub retries: u32,

    /// Milliseconds to wait between attempts
    #[arg(long, default_value_t = 4000)]
    pub retry_delay_ms: u64,

    /// Preferences file (favorites and theme choices)
    #[arg(long, env = "MLB_TUI_STATE")]
    pub state_file: Option<PathBuf>,

    /// Directory for the rolling log file
    #[arg(long, env = "MLB_TUI_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Don't download player headshots
    #[arg(long)]
    pub no_headshots: bool,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub endpoints: Endpoints,
    pub retry: RetryPolicy,
    pub state_file: PathBuf,
    pub log_dir: PathBuf,
    pub show_headshots: bool,
}

impl Config {
    pub fn from_args(args: Args) -> Self {
        let data_dir = default_data_dir();
        Self {
            endpoints: Endpoints {
                backend: args.backend_url,
                stats: args.stats_url,
                season: args.season,
            },
            retry: RetryPolicy::new(args.retries, Duration::from_millis(args.retry_delay_ms)),
            state_file: args
                .state_file
                .unwrap_or_else(|| data_dir.join("preferences.json")),
            log_dir: args.log_dir.unwrap_or_else(|| data_dir.join("logs")),
            show_headshots: !args.no_headshots,
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}
