//! Command-line options and logging setup for the `userboard` binary.
//!
use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::error::{Context, Result, simple_error};
use crate::remote::DEFAULT_ENDPOINT;

#[derive(Parser, Debug, Clone)]
#[command(name = "userboard", version, about = "Browse a remote user directory and edit it locally")]
pub struct Cli {
    /// Collection URL returning a JSON array of users.
    #[arg(long, env = "USERBOARD_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Theme file (key = #RRGGBB). Created with defaults if missing.
    #[arg(long, default_value = "theme.conf")]
    pub theme: String,

    /// Keybindings file (Action = Key). Created with defaults if missing.
    #[arg(long, default_value = "keybinds.conf")]
    pub keybinds: String,

    /// Where log output goes; the terminal itself is taken by the UI.
    #[arg(long, env = "USERBOARD_LOG_FILE", default_value = "userboard.log")]
    pub log_file: PathBuf,

    /// Log filter, e.g. `info` or `userboard=debug`.
    #[arg(long, env = "USERBOARD_LOG", default_value = "info")]
    pub log_level: String,
}

/// Reject endpoints that are not absolute http(s) URLs.
pub fn validate_endpoint(endpoint: &str) -> Result<()> {
    let url = reqwest::Url::parse(endpoint).with_ctx(|| format!("invalid endpoint '{endpoint}'"))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(simple_error(format!(
            "invalid endpoint '{endpoint}': unsupported scheme '{other}'"
        ))),
    }
}

/// Install a `tracing` subscriber writing plain text to the log file.
pub fn init_logging(cli: &Cli) -> Result<()> {
    let filter = EnvFilter::try_new(&cli.log_level)
        .with_ctx(|| format!("invalid log filter '{}'", cli.log_level))?;
    let file = File::create(&cli.log_file)
        .with_ctx(|| format!("create log file {}", cli.log_file.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| simple_error(format!("install log subscriber: {e}")))?;
    Ok(())
}
