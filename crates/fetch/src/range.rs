//! Resolution of block and date arguments into a [`HeightRange`].

use crate::{
    BlockGateway, BlockHeightLocator, GatewayError, LocatorError,
    calendar::{CivilDate, SECONDS_PER_DAY},
};
use alloy_eips::BlockNumberOrTag;
use std::{
    fmt,
    ops::RangeInclusive,
    str::FromStr,
    time::{SystemTime, UNIX_EPOCH},
};

/// An inclusive range of block heights. `start` never exceeds `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeightRange {
    start: u64,
    end: u64,
}

impl HeightRange {
    /// Creates the range `start..=end`.
    pub const fn new(start: u64, end: u64) -> Result<Self, RangeError> {
        if start > end {
            return Err(RangeError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Creates a range holding the single height `height`.
    pub const fn single(height: u64) -> Self {
        Self { start: height, end: height }
    }

    /// The first height.
    pub const fn start(&self) -> u64 {
        self.start
    }

    /// The last height.
    pub const fn end(&self) -> u64 {
        self.end
    }

    /// Number of heights in the range. Never zero. Saturates at [`u64::MAX`] for the full range.
    pub const fn len(&self) -> u64 {
        (self.end - self.start).saturating_add(1)
    }

    /// Always `false`.
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Returns `true` if `height` is in the range.
    pub const fn contains(&self, height: u64) -> bool {
        self.start <= height && height <= self.end
    }

    /// Iterates the heights in ascending order.
    pub const fn iter(&self) -> RangeInclusive<u64> {
        self.start..=self.end
    }
}

impl IntoIterator for HeightRange {
    type Item = u64;
    type IntoIter = RangeInclusive<u64>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for HeightRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// Where a range begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeStart {
    /// At a block height.
    Height(u64),
    /// At the first block at or after a unix timestamp.
    Time(u64),
}

/// How far a range extends from its start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeLength {
    /// A number of blocks, at least one.
    Blocks(u64),
    /// Every block produced within this many seconds of the start time.
    Seconds(u64),
    /// Up to and including the latest block.
    Latest,
}

impl Default for RangeLength {
    fn default() -> Self {
        Self::Blocks(1)
    }
}

impl FromStr for RangeLength {
    type Err = RangeError;

    /// Parses `""` (one block), `"."` (to the latest block), a block count such as `"40"`, or a
    /// timespan with an `s`, `m`, `h` or `d` suffix such as `"5m"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || RangeError::InvalidLength(s.to_string());
        match s {
            "" => return Ok(Self::default()),
            "." => return Ok(Self::Latest),
            _ => {}
        }

        let (digits, unit) = match s.char_indices().last() {
            Some((i, 's')) => (&s[..i], 1),
            Some((i, 'm')) => (&s[..i], 60),
            Some((i, 'h')) => (&s[..i], 3_600),
            Some((i, 'd')) => (&s[..i], SECONDS_PER_DAY),
            _ => (s, 0),
        };
        let count = digits.parse::<u64>().map_err(|_| invalid())?;
        if count == 0 {
            return Err(invalid());
        }
        match unit {
            0 => Ok(Self::Blocks(count)),
            unit => count.checked_mul(unit).map(Self::Seconds).ok_or_else(invalid),
        }
    }
}

/// A calendar day, absolute or relative to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSpec {
    /// A UTC date, written `YYYY-MM-DD`.
    Day(CivilDate),
    /// Midnight UTC, `n` days ago. Written `-Nd`.
    DaysAgo(u32),
    /// Midnight UTC, `n` months ago. Written `-Nm`.
    MonthsAgo(u32),
    /// Midnight UTC, `n` years ago. Written `-Ny`.
    YearsAgo(u32),
}

impl DateSpec {
    /// Resolves the date into a unix timestamp, relative to `now` (unix seconds).
    ///
    /// `hour` and `minute` (UTC) only apply to [`DateSpec::Day`]; relative dates always resolve
    /// to midnight. Moving back by months or years keeps the day of the month where possible and
    /// otherwise uses the last day of the target month.
    pub fn resolve_at(&self, now: u64, hour: u32, minute: u32) -> Result<u64, RangeError> {
        let today = CivilDate::from_timestamp(now);
        let day = match *self {
            Self::Day(date) => {
                if hour >= 24 || minute >= 60 {
                    return Err(RangeError::InvalidTime { hour, minute });
                }
                let midnight = date.midnight_timestamp().ok_or(RangeError::BeforeEpoch)?;
                return Ok(midnight + u64::from(hour) * 3_600 + u64::from(minute) * 60);
            }
            Self::DaysAgo(days) => {
                CivilDate::from_days(today.days_since_epoch() - i64::from(days))
            }
            Self::MonthsAgo(months) => today.sub_months(months),
            Self::YearsAgo(years) => today.sub_months(years.saturating_mul(12)),
        };
        day.midnight_timestamp().ok_or(RangeError::BeforeEpoch)
    }

    /// Resolves the date against the system clock.
    pub fn resolve(&self, hour: u32, minute: u32) -> Result<u64, RangeError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| RangeError::BeforeEpoch)?
            .as_secs();
        self.resolve_at(now, hour, minute)
    }
}

impl FromStr for DateSpec {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || RangeError::InvalidDate(s.to_string());

        if let Some(offset) = s.strip_prefix('-') {
            let Some((split, _)) = offset.char_indices().last() else { return Err(invalid()) };
            let (count, unit) = offset.split_at(split);
            let count = count.parse::<u32>().map_err(|_| invalid())?;
            return match unit {
                "d" => Ok(Self::DaysAgo(count)),
                "m" => Ok(Self::MonthsAgo(count)),
                "y" => Ok(Self::YearsAgo(count)),
                _ => Err(invalid()),
            };
        }

        let mut parts = s.split('-');
        let (Some(year), Some(month), Some(day), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };
        if year.len() != 4 || month.len() != 2 || day.len() != 2 {
            return Err(invalid());
        }
        let year = year.parse().map_err(|_| invalid())?;
        let month = month.parse().map_err(|_| invalid())?;
        let day = day.parse().map_err(|_| invalid())?;
        CivilDate::new(year, month, day).map(Self::Day).ok_or_else(invalid)
    }
}

/// An error resolving a block range.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    /// The start of the range is after its end.
    #[error("Invalid block range: start {start} is after end {end}")]
    InvalidRange {
        /// The requested start.
        start: u64,
        /// The requested end.
        end: u64,
    },
    /// The length argument could not be parsed.
    #[error("Invalid range length '{0}', expected a block count, a timespan (s, m, h, d) or '.'")]
    InvalidLength(String),
    /// The date argument could not be parsed.
    #[error("Invalid date '{0}', expected YYYY-MM-DD or an offset like -1d, -2m, -1y")]
    InvalidDate(String),
    /// The time of day is out of range.
    #[error("Invalid time of day {hour:02}:{minute:02}")]
    InvalidTime {
        /// The hour.
        hour: u32,
        /// The minute.
        minute: u32,
    },
    /// The date is before the unix epoch.
    #[error("Date is before the unix epoch")]
    BeforeEpoch,
    /// Locating a block by time failed.
    #[error(transparent)]
    Locator(#[from] LocatorError),
    /// Fetching a header failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Resolves a start and a length into a range of heights.
///
/// For a time based start, the range begins at the first block at or after that time. A timespan
/// ends at the last block before `start time + span`; with a height based start the span counts
/// from that block's timestamp. The end is never below the start.
pub async fn find_block_range<G: BlockGateway>(
    locator: &BlockHeightLocator<G>,
    start: RangeStart,
    length: RangeLength,
) -> Result<HeightRange, RangeError> {
    let gateway = locator.gateway();
    let (first, start_time) = match start {
        RangeStart::Height(height) => {
            let header = gateway.header_by_height(height.into()).await?;
            (header.number, header.timestamp)
        }
        RangeStart::Time(timestamp) => (locator.locate(timestamp).await?.number, timestamp),
    };

    let last = match length {
        RangeLength::Blocks(count) => first.saturating_add(count.saturating_sub(1)),
        RangeLength::Latest => gateway.header_by_height(BlockNumberOrTag::Latest).await?.number,
        RangeLength::Seconds(span) => {
            locator.locate(start_time.saturating_add(span)).await?.number.saturating_sub(1)
        }
    };

    let range = HeightRange { start: first, end: last.max(first) };
    debug!(target: "range", ?start, ?length, %range, "Resolved block range");
    Ok(range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LocatorConfig, test_utils::FixtureGateway};
    use rstest::rstest;
    use std::sync::Arc;

    /// Heights 100..=110, timestamps 100 + 13 * (height - 100).
    fn locator() -> BlockHeightLocator<FixtureGateway> {
        let config = LocatorConfig::default().with_reference(110, 230).with_earliest_height(100);
        BlockHeightLocator::new(Arc::new(FixtureGateway::linear(100, 110, 100, 13, 0)), config)
    }

    #[test]
    fn test_height_range() {
        let range = HeightRange::new(100, 102).unwrap();
        assert_eq!(range.len(), 3);
        assert!(range.contains(100) && range.contains(102));
        assert!(!range.contains(103));
        assert_eq!(range.iter().collect::<Vec<_>>(), vec![100, 101, 102]);
        assert_eq!(range.to_string(), "100..=102");
        assert_eq!(HeightRange::single(7).len(), 1);
        assert_eq!(
            HeightRange::new(5, 4).unwrap_err(),
            RangeError::InvalidRange { start: 5, end: 4 }
        );
    }

    #[test]
    fn test_full_height_range_len_saturates() {
        let range = HeightRange::new(0, u64::MAX).unwrap();
        assert_eq!(range.len(), u64::MAX);
        assert_eq!(HeightRange::new(1, u64::MAX).unwrap().len(), u64::MAX);
    }

    #[rstest]
    #[case::default("", RangeLength::Blocks(1))]
    #[case::latest(".", RangeLength::Latest)]
    #[case::blocks("40", RangeLength::Blocks(40))]
    #[case::seconds("90s", RangeLength::Seconds(90))]
    #[case::minutes("5m", RangeLength::Seconds(300))]
    #[case::hours("2h", RangeLength::Seconds(7_200))]
    #[case::days("4d", RangeLength::Seconds(345_600))]
    fn test_parse_length(#[case] input: &str, #[case] expected: RangeLength) {
        assert_eq!(input.parse::<RangeLength>().unwrap(), expected);
    }

    #[rstest]
    #[case::zero_blocks("0")]
    #[case::zero_span("0s")]
    #[case::negative("-3")]
    #[case::unknown_unit("5w")]
    #[case::missing_count("m")]
    #[case::words("many")]
    fn test_parse_length_rejects(#[case] input: &str) {
        assert_eq!(
            input.parse::<RangeLength>().unwrap_err(),
            RangeError::InvalidLength(input.to_string())
        );
    }

    #[rstest]
    #[case::day("2021-04-27", DateSpec::Day(CivilDate { year: 2021, month: 4, day: 27 }))]
    #[case::days_ago("-1d", DateSpec::DaysAgo(1))]
    #[case::months_ago("-2m", DateSpec::MonthsAgo(2))]
    #[case::years_ago("-1y", DateSpec::YearsAgo(1))]
    fn test_parse_date(#[case] input: &str, #[case] expected: DateSpec) {
        assert_eq!(input.parse::<DateSpec>().unwrap(), expected);
    }

    #[rstest]
    #[case::no_such_day("2021-02-30")]
    #[case::short_month("2021-4-27")]
    #[case::unknown_offset("-5w")]
    #[case::missing_count("-d")]
    #[case::words("yesterday")]
    #[case::trailing("2021-04-27-01")]
    fn test_parse_date_rejects(#[case] input: &str) {
        assert_eq!(input.parse::<DateSpec>().unwrap_err(), RangeError::InvalidDate(input.to_string()));
    }

    #[rstest]
    #[case::day_with_time(DateSpec::Day(CivilDate { year: 2021, month: 4, day: 27 }), 1_619_551_200, 19, 20, 1_619_551_200)]
    #[case::one_day_ago(DateSpec::DaysAgo(1), 1_619_551_200, 19, 20, 1_619_395_200)]
    #[case::month_end_clamped(DateSpec::MonthsAgo(1), 1_711_886_400, 0, 0, 1_709_164_800)]
    #[case::leap_day_year_ago(DateSpec::YearsAgo(1), 1_709_164_800, 0, 0, 1_677_542_400)]
    fn test_resolve_date(
        #[case] date: DateSpec,
        #[case] now: u64,
        #[case] hour: u32,
        #[case] minute: u32,
        #[case] expected: u64,
    ) {
        assert_eq!(date.resolve_at(now, hour, minute).unwrap(), expected);
    }

    #[test]
    fn test_resolve_rejects_bad_time_and_pre_epoch() {
        let day = DateSpec::Day(CivilDate { year: 2021, month: 4, day: 27 });
        assert_eq!(day.resolve_at(0, 24, 0).unwrap_err(), RangeError::InvalidTime { hour: 24, minute: 0 });
        assert_eq!(DateSpec::DaysAgo(2).resolve_at(86_400, 0, 0).unwrap_err(), RangeError::BeforeEpoch);
    }

    #[rstest]
    #[case::single_block(RangeStart::Height(102), RangeLength::default(), 102, 102)]
    #[case::block_count(RangeStart::Height(102), RangeLength::Blocks(3), 102, 104)]
    #[case::to_latest(RangeStart::Height(102), RangeLength::Latest, 102, 110)]
    #[case::height_and_span(RangeStart::Height(102), RangeLength::Seconds(26), 102, 103)]
    #[case::time_and_span(RangeStart::Time(165), RangeLength::Seconds(26), 105, 106)]
    #[case::time_and_count(RangeStart::Time(160), RangeLength::Blocks(2), 105, 106)]
    #[case::span_shorter_than_block(RangeStart::Time(160), RangeLength::Seconds(5), 105, 105)]
    #[tokio::test]
    async fn test_find_block_range(
        #[case] start: RangeStart,
        #[case] length: RangeLength,
        #[case] first: u64,
        #[case] last: u64,
    ) {
        let range = find_block_range(&locator(), start, length).await.unwrap();
        assert_eq!(range, HeightRange::new(first, last).unwrap());
    }

    #[tokio::test]
    async fn test_find_block_range_after_tip() {
        let err = find_block_range(&locator(), RangeStart::Time(231), RangeLength::default())
            .await
            .unwrap_err();
        assert_eq!(err, RangeError::Locator(LocatorError::TargetAfterTip { target: 231, tip: 230 }));
    }

    #[tokio::test]
    async fn test_find_block_range_unknown_height() {
        let err = find_block_range(&locator(), RangeStart::Height(500), RangeLength::default())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            RangeError::Gateway(GatewayError::BlockNotFound(BlockNumberOrTag::Number(500)))
        );
    }
}
