//! Plain stderr logger for the `openws` binary.

use std::fmt::Write as _;

use log::{Level, LevelFilter, Log, Metadata, Record};
use time::OffsetDateTime;
use time::macros::format_description;

use crate::config::CliConfig;

/// Writes `[HH:MM:SS] LEVEL target: message` lines to stderr.
pub struct StderrLogger {
    max_level: LevelFilter,
    show_timestamps: bool,
}

impl StderrLogger {
    /// Creates a logger from the resolved CLI configuration.
    #[must_use]
    pub fn new(config: &CliConfig) -> Self {
        Self {
            max_level: config.log_level,
            show_timestamps: config.log_timestamps,
        }
    }

    /// Initialize as the global logger, ignoring errors if already set.
    pub fn try_init(config: &CliConfig) {
        let logger = Self::new(config);
        let max_level = logger.max_level;
        if log::set_boxed_logger(Box::new(logger)).is_ok() {
            log::set_max_level(max_level);
        }
    }

    fn format(&self, record: &Record) -> String {
        let level = match record.level() {
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
        };
        let target = record
            .target()
            .strip_prefix("openws::")
            .unwrap_or(record.target());

        let mut line = String::new();
        if self.show_timestamps {
            let fmt = format_description!("[hour]:[minute]:[second]");
            if let Ok(ts) = OffsetDateTime::now_utc().format(&fmt) {
                let _ = write!(line, "[{ts}] ");
            }
        }
        let _ = write!(line, "{level:<5} {target}: {}", record.args());
        line
    }
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("{}", self.format(record));
        }
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(logger: &StderrLogger, level: Level, target: &str) -> String {
        logger.format(
            &Record::builder()
                .level(level)
                .target(target)
                .args(format_args!("hello"))
                .build(),
        )
    }

    #[test]
    fn test_format_without_timestamp() {
        let logger = StderrLogger::new(&CliConfig {
            log_level: LevelFilter::Info,
            log_timestamps: false,
        });
        assert_eq!(render(&logger, Level::Info, "openws::spec"), "INFO  spec: hello");
        assert_eq!(render(&logger, Level::Warn, "other"), "WARN  other: hello");
    }

    #[test]
    fn test_format_with_timestamp() {
        let logger = StderrLogger::new(&CliConfig::default());
        let line = render(&logger, Level::Error, "openws");
        assert!(line.starts_with('['));
        assert!(line.ends_with("ERROR openws: hello"));
    }

    #[test]
    fn test_enabled_respects_level() {
        let logger = StderrLogger::new(&CliConfig::default());
        let debug = Metadata::builder().level(Level::Debug).build();
        let warn = Metadata::builder().level(Level::Warn).build();
        assert!(!logger.enabled(&debug));
        assert!(logger.enabled(&warn));
    }
}
