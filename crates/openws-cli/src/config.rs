//! CLI configuration.
//!
//! Resolved in three layers: built-in defaults, then environment variables,
//! then command-line flags.

use std::env;

use log::LevelFilter;

/// Settings shared by every subcommand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// Log level filter.
    pub log_level: LevelFilter,
    /// Prefix log lines with `HH:MM:SS`.
    pub log_timestamps: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_level: LevelFilter::Warn,
            log_timestamps: true,
        }
    }
}

impl CliConfig {
    /// Create config from environment variables.
    ///
    /// # Environment Variables
    ///
    /// | Variable | Values | Description |
    /// |----------|--------|-------------|
    /// | `OPENWS_LOG` | trace/debug/info/warn/error/off | Log level |
    /// | `OPENWS_LOG_TIMESTAMPS` | 0/false | Hide timestamps |
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(level) = lookup("OPENWS_LOG").and_then(|v| parse_level(&v)) {
            config.log_level = level;
        }
        if lookup("OPENWS_LOG_TIMESTAMPS").is_some_and(|v| v == "0" || v.eq_ignore_ascii_case("false")) {
            config.log_timestamps = false;
        }

        config
    }

    /// Applies `--verbose` / `--quiet`. Verbose wins if both are given.
    #[must_use]
    pub fn with_flags(mut self, verbose: bool, quiet: bool) -> Self {
        if quiet {
            self.log_level = LevelFilter::Error;
        }
        if verbose {
            self.log_level = LevelFilter::Debug;
        }
        self
    }
}

fn parse_level(value: &str) -> Option<LevelFilter> {
    match value.to_lowercase().as_str() {
        "trace" => Some(LevelFilter::Trace),
        "debug" => Some(LevelFilter::Debug),
        "info" => Some(LevelFilter::Info),
        "warn" | "warning" => Some(LevelFilter::Warn),
        "error" => Some(LevelFilter::Error),
        "off" | "none" => Some(LevelFilter::Off),
        _ => None,
    }
}
