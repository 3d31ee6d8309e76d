use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, NaiveDateTime};
use std::fmt;

/// Resolution a time source actually delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    /// Whole seconds only. Gateways without a GPS fix report like this.
    Second,
    SubSecond,
}

/// Instant in milliseconds since the Unix epoch, tagged with its source precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    millis: i64,
    precision: Precision,
}

impl Timestamp {
    pub fn from_millis(millis: i64, precision: Precision) -> Self {
        Timestamp { millis, precision }
    }

    /// Parse an ISO-8601 time string.
    ///
    /// Accepts RFC 3339 with offset (`2019-10-04T11:33:05.012345Z`) and, for
    /// servers that omit the zone, a naive date-time which is taken as UTC.
    /// Digits below one millisecond are truncated. Precision is `SubSecond`
    /// only when the text carries a fractional seconds part.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        let millis = match DateTime::parse_from_rfc3339(text) {
            Ok(dt) => dt.timestamp_millis(),
            Err(_) => NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
                .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f"))
                .map_err(|e| anyhow!("Invalid time '{}': {}", text, e))?
                .and_utc()
                .timestamp_millis(),
        };

        let precision = if text.contains('.') {
            Precision::SubSecond
        } else {
            Precision::Second
        };

        Ok(Timestamp { millis, precision })
    }

    pub fn millis(&self) -> i64 {
        self.millis
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    pub fn is_sub_second(&self) -> bool {
        self.precision == Precision::SubSecond
    }

    /// Signed distance `self - earlier`.
    pub fn since(&self, earlier: &Timestamp) -> ClockOffset {
        ClockOffset(Duration::milliseconds(self.millis - earlier.millis))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match DateTime::from_timestamp_millis(self.millis) {
            Some(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.3fZ")),
            None => write!(f, "{}ms", self.millis),
        }
    }
}

/// Server time minus gateway time. Positive when the gateway saw the uplink first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ClockOffset(pub Duration);

impl ClockOffset {
    pub fn as_millis(&self) -> i64 {
        self.0.num_milliseconds()
    }
}

impl fmt::Display for ClockOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.as_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2019-10-04T11:33:05Z
    const BASE_MS: i64 = 1_570_188_785_000;

    #[test]
    fn test_parse_rfc3339_with_fraction() {
        let ts = Timestamp::parse("2019-10-04T11:33:05.012Z").unwrap();
        assert_eq!(ts.millis(), BASE_MS + 12);
        assert_eq!(ts.precision(), Precision::SubSecond);
    }

    #[test]
    fn test_parse_truncates_below_millisecond() {
        let ts = Timestamp::parse("2019-10-04T11:33:05.123999999Z").unwrap();
        assert_eq!(ts.millis(), BASE_MS + 123);
    }

    #[test]
    fn test_parse_whole_seconds() {
        let ts = Timestamp::parse("2019-10-04T11:33:05Z").unwrap();
        assert_eq!(ts.millis(), BASE_MS);
        assert_eq!(ts.precision(), Precision::Second);
        assert!(!ts.is_sub_second());
    }

    #[test]
    fn test_parse_zero_fraction_still_sub_second() {
        let ts = Timestamp::parse("2019-10-04T11:33:05.000Z").unwrap();
        assert_eq!(ts.millis(), BASE_MS);
        assert!(ts.is_sub_second());
    }

    #[test]
    fn test_parse_offset_and_naive() {
        let with_offset = Timestamp::parse("2019-10-04T13:33:05.500+02:00").unwrap();
        assert_eq!(with_offset.millis(), BASE_MS + 500);

        let naive = Timestamp::parse("2019-10-04T11:33:05.500").unwrap();
        assert_eq!(naive.millis(), BASE_MS + 500);
    }

    #[test]
    fn test_parse_garbage() {
        assert!(Timestamp::parse("").is_err());
        assert!(Timestamp::parse("yesterday.noon").is_err());
        assert!(Timestamp::parse("2019-13-40T99:00:00.1Z").is_err());
    }

    #[test]
    fn test_offset_sign() {
        let server = Timestamp::from_millis(BASE_MS + 500, Precision::SubSecond);
        let gateway = Timestamp::from_millis(BASE_MS + 380, Precision::SubSecond);
        assert_eq!(server.since(&gateway).as_millis(), 120);
        assert_eq!(gateway.since(&server).as_millis(), -120);
        assert_eq!(server.since(&gateway).to_string(), "120ms");
    }

    #[test]
    fn test_display() {
        let ts = Timestamp::from_millis(BASE_MS + 7, Precision::SubSecond);
        assert_eq!(ts.to_string(), "2019-10-04T11:33:05.007Z");
    }
}
