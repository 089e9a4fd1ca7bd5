//! Date and time of day flags.

use clap::Args;
use ethutils_fetch::{DateSpec, RangeError};

/// A point in time given as a date and a time of day, in UTC.
#[derive(Debug, Clone, Args)]
pub(crate) struct TimeArgs {
    /// Date in YYYY-MM-DD format, or an offset from today such as -1d, -2m or -1y.
    #[arg(long)]
    pub(crate) date: Option<DateSpec>,
    /// Hour of the day (UTC). Only used with an absolute date.
    #[arg(long, default_value_t = 0, requires = "date")]
    pub(crate) hour: u32,
    /// Minute of the hour (UTC). Only used with an absolute date.
    #[arg(long = "min", default_value_t = 0, requires = "date")]
    pub(crate) minute: u32,
}

impl TimeArgs {
    /// Resolves the arguments into a unix timestamp, if a date was given.
    pub(crate) fn timestamp(&self) -> Result<Option<u64>, RangeError> {
        self.date.map(|date| date.resolve(self.hour, self.minute)).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(flatten)]
        time: TimeArgs,
    }

    #[test]
    fn test_date_with_time_of_day() {
        let cli = TestCli::parse_from(["test", "--date", "2021-04-27", "--hour", "19", "--min", "20"]);
        assert_eq!(cli.time.timestamp().unwrap(), Some(1_619_551_200));
    }

    #[test]
    fn test_no_date() {
        let cli = TestCli::parse_from(["test"]);
        assert_eq!(cli.time.timestamp().unwrap(), None);
    }

    #[test]
    fn test_hour_requires_date() {
        assert!(TestCli::try_parse_from(["test", "--hour", "3"]).is_err());
    }

    #[test]
    fn test_invalid_date_is_rejected_by_parser() {
        assert!(TestCli::try_parse_from(["test", "--date", "2021-02-30"]).is_err());
    }
}
