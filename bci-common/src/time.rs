//! Modification-time conversion
//!
//! Object stores report modification instants in UTC. The inventory shows
//! them in US/Pacific and also records an epoch value used for sorting and for
//! picking the newest entry.
//!
//! Historically the epoch value was derived from the Pacific wall-clock
//! fields read back as host-local time, which shifts it by the difference
//! between the two zones. [`EpochMode::LocalWallClock`] keeps that behavior so
//! inventories stay comparable with older ones; [`EpochMode::Instant`] records
//! the true instant.

use chrono::{DateTime, Duration, FixedOffset, Local, LocalResult, NaiveDateTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Display timezone for all inventory timestamps
pub const PACIFIC: Tz = chrono_tz::US::Pacific;

/// `2021-11-11 20:17 PST`
pub const PRETTY_FORMAT: &str = "%Y-%m-%d %H:%M %Z";

/// How the numeric `last_modified` value is derived
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EpochMode {
    /// Pacific wall-clock fields interpreted as host-local time
    #[default]
    #[serde(rename = "local")]
    LocalWallClock,
    /// Seconds since the epoch of the actual instant
    Instant,
}

impl FromStr for EpochMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(EpochMode::LocalWallClock),
            "instant" => Ok(EpochMode::Instant),
            other => Err(format!("unknown epoch mode '{}' (expected 'local' or 'instant')", other)),
        }
    }
}

impl fmt::Display for EpochMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EpochMode::LocalWallClock => write!(f, "local"),
            EpochMode::Instant => write!(f, "instant"),
        }
    }
}

/// Converted modification time of one object
#[derive(Debug, Clone, PartialEq)]
pub struct ModificationTime {
    pub epoch: f64,
    pub pretty: String,
}

impl ModificationTime {
    /// Convert a UTC instant. Sub-second precision is dropped.
    pub fn from_utc(instant: DateTime<Utc>, mode: EpochMode) -> Self {
        let instant = instant.with_nanosecond(0).unwrap_or(instant);
        let pacific = instant.with_timezone(&PACIFIC);
        let pretty = pacific.format(PRETTY_FORMAT).to_string();

        let epoch = match mode {
            EpochMode::Instant => instant.timestamp(),
            EpochMode::LocalWallClock => wall_clock_as_local(&pacific.naive_local()),
        };

        Self {
            epoch: epoch as f64,
            pretty,
        }
    }
}

/// Read wall-clock fields as host-local time, the way `mktime` does.
///
/// Ambiguous times (DST fold) take the earlier instant. Times inside a DST gap
/// use the offset in effect just before the gap, so they land after every
/// earlier wall-clock time and before every later one.
fn wall_clock_as_local(naive: &NaiveDateTime) -> i64 {
    match Local.from_local_datetime(naive) {
        LocalResult::Single(t) => t.timestamp(),
        LocalResult::Ambiguous(earliest, _) => earliest.timestamp(),
        LocalResult::None => {
            let as_utc = Utc.from_utc_datetime(naive).timestamp();
            match offset_before_gap(naive) {
                Some(offset) => as_utc - i64::from(offset.local_minus_utc()),
                None => as_utc,
            }
        }
    }
}

/// Host offset at the last representable wall-clock time before `naive`
fn offset_before_gap(naive: &NaiveDateTime) -> Option<FixedOffset> {
    let step = Duration::minutes(15);
    let mut earlier = *naive;
    // Gaps never span a whole day
    for _ in 0..(4 * 24) {
        earlier -= step;
        if let Some(t) = Local.from_local_datetime(&earlier).latest() {
            return Some(*t.offset());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_pretty_standard_time() {
        let t = ModificationTime::from_utc(utc("2021-11-12T04:17:00Z"), EpochMode::Instant);
        assert_eq!(t.pretty, "2021-11-11 20:17 PST");
    }

    #[test]
    fn test_pretty_daylight_time() {
        let t = ModificationTime::from_utc(utc("2021-07-04T19:05:42Z"), EpochMode::Instant);
        assert_eq!(t.pretty, "2021-07-04 12:05 PDT");
    }

    #[test]
    fn test_instant_mode_is_true_epoch() {
        let instant = utc("2021-11-12T04:17:00Z");
        let t = ModificationTime::from_utc(instant, EpochMode::Instant);
        assert_eq!(t.epoch, instant.timestamp() as f64);
    }

    #[test]
    fn test_subseconds_dropped() {
        let t = ModificationTime::from_utc(utc("2021-11-12T04:17:00.750Z"), EpochMode::Instant);
        assert_eq!(t.epoch, utc("2021-11-12T04:17:00Z").timestamp() as f64);
    }

    #[test]
    fn test_local_mode_reads_pacific_fields_as_local() {
        let instant = utc("2021-11-12T04:17:00Z");
        let t = ModificationTime::from_utc(instant, EpochMode::LocalWallClock);

        let pacific_fields = NaiveDateTime::parse_from_str("2021-11-11 20:17:00", "%Y-%m-%d %H:%M:%S").unwrap();
        let expected = Local.from_local_datetime(&pacific_fields).earliest().unwrap().timestamp();
        assert_eq!(t.epoch, expected as f64);
        assert_eq!(t.pretty, "2021-11-11 20:17 PST");
    }

    #[test]
    fn test_local_mode_preserves_ordering() {
        let earlier = ModificationTime::from_utc(utc("2021-03-01T00:00:00Z"), EpochMode::LocalWallClock);
        let later = ModificationTime::from_utc(utc("2021-03-02T00:00:00Z"), EpochMode::LocalWallClock);
        assert!(earlier.epoch < later.epoch);
    }

    #[test]
    fn test_epoch_mode_parsing() {
        assert_eq!("local".parse::<EpochMode>().unwrap(), EpochMode::LocalWallClock);
        assert_eq!(" Instant ".parse::<EpochMode>().unwrap(), EpochMode::Instant);
        assert!("utc".parse::<EpochMode>().is_err());
        assert_eq!(EpochMode::default(), EpochMode::LocalWallClock);
        assert_eq!(EpochMode::Instant.to_string(), "instant");
    }
}
