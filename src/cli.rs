//! Command-line argument parsing for sql-desk.

use crate::config::Config;
use clap::Parser;
use std::path::PathBuf;

/// A conversational natural-language-to-SQL assistant for the terminal.
#[derive(Parser, Debug)]
#[command(name = "sqldesk")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Backend base URL (e.g. http://localhost:5000)
    #[arg(short, long, value_name = "URL", env = "SQLDESK_URL")]
    pub url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS", env = "SQLDESK_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Schema to select at startup (must exist on the backend)
    #[arg(short, long, value_name = "NAME")]
    pub schema: Option<String>,

    /// Config file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Use the built-in mock backend (no network, for trying the tool)
    #[arg(long)]
    pub mock: bool,

    /// Check backend health and exit
    #[arg(long)]
    pub check: bool,

    /// Write logs to a file instead of stderr
    #[arg(long)]
    pub log_file: bool,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path to use.
    ///
    /// Uses the --config argument if provided, otherwise the default path.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_url_and_schema() {
        let cli = Cli::parse_from(["sqldesk", "--url", "http://backend:5000", "-s", "loans.txt"]);

        assert_eq!(cli.url.as_deref(), Some("http://backend:5000"));
        assert_eq!(cli.schema.as_deref(), Some("loans.txt"));
        assert!(!cli.mock);
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["sqldesk"]);

        assert_eq!(cli.url, None);
        assert_eq!(cli.timeout, None);
        assert!(!cli.check);
        assert!(!cli.log_file);
    }

    #[test]
    fn test_config_path_prefers_flag() {
        let cli = Cli::parse_from(["sqldesk", "--config", "/tmp/custom.toml"]);

        assert_eq!(cli.config_path(), PathBuf::from("/tmp/custom.toml"));
    }
}
