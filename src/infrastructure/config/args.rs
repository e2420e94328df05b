use super::app_config::LogLevel;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "teleview",
    version,
    about = "A terminal viewer for Telegram chat archives",
    long_about = None
)]
pub struct CliArgs {
    /// Configuration file path.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Archive API base URL.
    #[arg(long, env = "TELEVIEW_API_URL", value_name = "URL")]
    pub api_url: Option<String>,

    /// Archive API bearer token.
    #[arg(long, env = "TELEVIEW_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// Group to open; repeat to cycle between several.
    #[arg(short, long = "group", value_name = "ID", allow_hyphen_values = true)]
    pub groups: Vec<String>,

    /// Messages requested per history page.
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Enable mouse support.
    #[arg(long)]
    pub mouse: Option<bool>,
}
