use super::app_config::LogLevel;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "unsplash-feed",
    version,
    about = "Infinite-scrolling Unsplash photo feed with a tiered image cache",
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

    /// Unsplash access key.
    #[arg(long, env = "UNSPLASH_ACCESS_KEY", hide_env_values = true)]
    pub access_key: Option<String>,

    /// API root URL.
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Records per listing page.
    #[arg(long)]
    pub per_page: Option<u32>,

    /// Disk cache directory.
    #[arg(long, value_name = "PATH")]
    pub cache_dir: Option<PathBuf>,

    /// Keep the response cache in memory only.
    #[arg(long)]
    pub no_disk_cache: bool,

    /// Number of listing pages to scroll through before exiting.
    #[arg(long, default_value_t = 3)]
    pub pages: u32,
}
