//! [tracing_subscriber] utilities.

use crate::log::{LogConfig, LogRotation};
use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter, Layer,
    prelude::__tracing_subscriber_SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
};

/// Prefix of the log files written to the log directory.
const LOG_FILE_PREFIX: &str = "ethutils.log";

/// The format of the logs.
#[derive(
    Default, Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[clap(rename_all = "lowercase")]
pub enum LogFormat {
    /// Full format (default).
    #[default]
    Full,
    /// JSON format.
    Json,
    /// Pretty format.
    Pretty,
    /// Compact format.
    Compact,
}

/// An error installing the tracing subscriber.
#[derive(Debug, thiserror::Error)]
pub enum LogInitError {
    /// The log file appender could not be created.
    #[error("Failed to create log file appender: {0}")]
    Appender(#[from] InitError),
    /// A global subscriber is already installed.
    #[error("Failed to install tracing subscriber: {0}")]
    Subscriber(#[from] TryInitError),
}

impl From<LogRotation> for Rotation {
    fn from(rotation: LogRotation) -> Self {
        match rotation {
            LogRotation::Minutely => Self::MINUTELY,
            LogRotation::Hourly => Self::HOURLY,
            LogRotation::Daily => Self::DAILY,
            LogRotation::Never => Self::NEVER,
        }
    }
}

impl LogConfig {
    /// Installs the global tracing subscriber.
    ///
    /// `env_filter` defaults to the `RUST_LOG` environment variable; the configured global level
    /// is added to it as a directive.
    pub fn init_tracing_subscriber(&self, env_filter: Option<EnvFilter>) -> Result<(), LogInitError> {
        let file_layer = match &self.file {
            Some(file) => {
                let mut builder = RollingFileAppender::builder()
                    .rotation(file.rotation.into())
                    .filename_prefix(LOG_FILE_PREFIX);
                if let Some(max_files) = file.max_files {
                    builder = builder.max_log_files(max_files);
                }
                let appender = builder.build(&file.directory)?;

                Some(match file.format {
                    LogFormat::Full => tracing_subscriber::fmt::layer().with_writer(appender).boxed(),
                    LogFormat::Json => {
                        tracing_subscriber::fmt::layer().json().with_writer(appender).boxed()
                    }
                    LogFormat::Pretty => {
                        tracing_subscriber::fmt::layer().pretty().with_writer(appender).boxed()
                    }
                    LogFormat::Compact => {
                        tracing_subscriber::fmt::layer().compact().with_writer(appender).boxed()
                    }
                })
            }
            None => None,
        };

        let stdout_layer = self.stdout.map(|format| match format {
            LogFormat::Full => tracing_subscriber::fmt::layer().boxed(),
            LogFormat::Json => tracing_subscriber::fmt::layer().json().boxed(),
            LogFormat::Pretty => tracing_subscriber::fmt::layer().pretty().boxed(),
            LogFormat::Compact => tracing_subscriber::fmt::layer().compact().boxed(),
        });

        let env_filter = env_filter
            .unwrap_or_else(EnvFilter::from_default_env)
            .add_directive(self.level.into());

        tracing_subscriber::registry()
            .with(env_filter)
            .with(file_layer)
            .with(stdout_layer)
            .try_init()?;

        Ok(())
    }
}

/// Installs a trace level stdout subscriber for tests, ignoring an already installed one.
pub fn init_test_tracing() {
    let _ = LogConfig::default().with_level(LevelFilter::TRACE).init_tracing_subscriber(None);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::LogFileConfig;
    use tempfile::TempDir;

    #[test]
    fn test_rotation_conversion() {
        assert_eq!(Rotation::from(LogRotation::Daily), Rotation::DAILY);
        assert_eq!(Rotation::from(LogRotation::Never), Rotation::NEVER);
    }

    #[test]
    fn test_file_logging_creates_log_file() {
        let dir = TempDir::new().unwrap();
        let config = LogConfig {
            stdout: None,
            file: Some(LogFileConfig {
                directory: dir.path().to_path_buf(),
                format: LogFormat::Json,
                rotation: LogRotation::Never,
                max_files: Some(2),
            }),
            ..Default::default()
        };

        // Another test may already have installed the global subscriber; the appender is
        // created before that check either way.
        let _ = config.init_tracing_subscriber(None);

        assert!(dir.path().join(LOG_FILE_PREFIX).exists());
    }

    #[test]
    fn test_init_test_tracing_twice() {
        init_test_tracing();
        init_test_tracing();
    }
}
