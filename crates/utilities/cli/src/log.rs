//! Logging flags and the configuration they resolve to.

use crate::tracing::LogFormat;
use clap::{ArgAction, Args, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

/// Log filters indexed by the number of `-v` flags. Anything past the end is `TRACE`.
const VERBOSITY: [LevelFilter; 5] = [
    LevelFilter::OFF,
    LevelFilter::ERROR,
    LevelFilter::WARN,
    LevelFilter::INFO,
    LevelFilter::DEBUG,
];

/// Logging flags, accepted before or after any subcommand.
#[derive(Args, Debug, Default, Serialize, Deserialize, Clone)]
pub struct LogArgs {
    /// Verbosity: `-v` errors only up to `-vvvvv` for per-header and per-block traces.
    /// Defaults to 3 (info). Applies to stdout and file logs alike.
    #[arg(
        short = 'v',
        global = true,
        default_value = "3",
        env = "ETHUTILS_LOG_LEVEL",
        action = ArgAction::Count,
    )]
    pub level: u8,
    /// Suppress logs on stdout. Command output is still printed.
    #[arg(long = "logs.stdout.quiet", short = 'q', global = true, env = "ETHUTILS_LOG_STDOUT_QUIET")]
    pub stdout_quiet: bool,
    /// Format of the logs on stdout.
    #[arg(
        long = "logs.stdout.format",
        global = true,
        default_value = "full",
        env = "ETHUTILS_LOG_STDOUT_FORMAT"
    )]
    pub stdout_format: LogFormat,
    /// Directory for log files. File logging is off unless this is set.
    #[arg(long = "logs.file.directory", global = true, env = "ETHUTILS_LOG_FILE_DIRECTORY")]
    pub file_directory: Option<PathBuf>,
    /// Format of the logs in log files.
    #[arg(
        long = "logs.file.format",
        global = true,
        default_value = "full",
        env = "ETHUTILS_LOG_FILE_FORMAT"
    )]
    pub file_format: LogFormat,
    /// How often a new log file is started.
    #[arg(
        long = "logs.file.rotation",
        global = true,
        default_value = "never",
        env = "ETHUTILS_LOG_FILE_ROTATION"
    )]
    pub file_rotation: LogRotation,
    /// Keep at most this many log files, deleting the oldest.
    #[arg(long = "logs.file.max-files", global = true, env = "ETHUTILS_LOG_FILE_MAX_FILES")]
    pub file_max_files: Option<usize>,
}

/// How often a new log file is started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    /// Every minute.
    Minutely,
    /// Every hour.
    Hourly,
    /// Every day.
    Daily,
    /// A single file.
    #[default]
    Never,
}

/// Where and how log files are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFileConfig {
    /// Directory holding the log files.
    pub directory: PathBuf,
    /// Format of each line.
    pub format: LogFormat,
    /// Rotation interval.
    pub rotation: LogRotation,
    /// Retention limit, if any.
    pub max_files: Option<usize>,
}

/// Resolved logging setup. The default logs at debug level to stdout only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Level applied on top of `RUST_LOG`.
    pub level: LevelFilter,
    /// Stdout format, or `None` for no stdout logs.
    pub stdout: Option<LogFormat>,
    /// File logging, or `None` for no log files.
    pub file: Option<LogFileConfig>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: LevelFilter::DEBUG, stdout: Some(LogFormat::Full), file: None }
    }
}

impl LogConfig {
    /// Maps a `-v` count to a level filter.
    pub fn verbosity(count: u8) -> LevelFilter {
        VERBOSITY.get(count as usize).copied().unwrap_or(LevelFilter::TRACE)
    }

    /// Sets the level filter.
    pub const fn with_level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }
}

impl From<LogArgs> for LogConfig {
    fn from(args: LogArgs) -> Self {
        Self {
            level: Self::verbosity(args.level),
            stdout: (!args.stdout_quiet).then_some(args.stdout_format),
            file: args.file_directory.map(|directory| LogFileConfig {
                directory,
                format: args.file_format,
                rotation: args.file_rotation,
                max_files: args.file_max_files,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use rstest::rstest;

    #[derive(Parser, Debug)]
    struct Flags {
        #[command(flatten)]
        logs: LogArgs,
    }

    fn resolve(args: &[&str]) -> LogConfig {
        let flags = Flags::parse_from(std::iter::once("ethutils").chain(args.iter().copied()));
        flags.logs.into()
    }

    #[rstest]
    #[case::default(&[], LevelFilter::INFO)]
    #[case::errors(&["-v"], LevelFilter::ERROR)]
    #[case::warnings(&["-vv"], LevelFilter::WARN)]
    #[case::debug(&["-vvvv"], LevelFilter::DEBUG)]
    #[case::trace(&["-vvvvv"], LevelFilter::TRACE)]
    #[case::beyond_trace(&["-vvvvvvvv"], LevelFilter::TRACE)]
    fn test_verbosity_flags(#[case] args: &[&str], #[case] level: LevelFilter) {
        assert_eq!(resolve(args).level, level);
    }

    #[test]
    fn test_zero_verbosity_disables_logging() {
        assert_eq!(LogConfig::verbosity(0), LevelFilter::OFF);
    }

    #[test]
    fn test_stdout_only_by_default() {
        let config = resolve(&[]);
        assert_eq!(config.stdout, Some(LogFormat::Full));
        assert_eq!(config.file, None);
    }

    #[test]
    fn test_quiet_with_rotating_json_files() {
        let config = resolve(&[
            "-q",
            "--logs.file.directory",
            "/var/log/ethutils",
            "--logs.file.format",
            "json",
            "--logs.file.rotation",
            "daily",
            "--logs.file.max-files",
            "7",
        ]);

        assert_eq!(config.stdout, None);
        assert_eq!(
            config.file,
            Some(LogFileConfig {
                directory: PathBuf::from("/var/log/ethutils"),
                format: LogFormat::Json,
                rotation: LogRotation::Daily,
                max_files: Some(7),
            })
        );
    }
}
