//! Hour-offset encoding of the time axis.

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::error::{GeneratorError, Result};

/// Time unit label used when a dataset does not set its own.
pub const DEFAULT_TIME_UNIT: &str = "hours since 1990-01-01";

/// Seconds from the Unix epoch to 1990-01-01T00:00:00Z.
const DEFAULT_EPOCH_SECONDS: i64 = 631_152_000;

/// 1990-01-01T00:00:00Z, the epoch matching [`DEFAULT_TIME_UNIT`].
pub fn default_epoch() -> DateTime<Utc> {
    Utc.timestamp_nanos(DEFAULT_EPOCH_SECONDS * 1_000_000_000)
}

/// Whole hours from `epoch` to `time`, rounded towards negative infinity.
pub fn hours_between(epoch: DateTime<Utc>, time: DateTime<Utc>) -> i64 {
    (time.timestamp() - epoch.timestamp()).div_euclid(3600)
}

/// `epoch` shifted by a number of hours.
pub fn hours_after(epoch: DateTime<Utc>, hours: i64) -> DateTime<Utc> {
    epoch + Duration::hours(hours)
}

/// Time-axis value stored for `time`.
pub fn encode_offset(epoch: DateTime<Utc>, time: DateTime<Utc>, unit: &str) -> Result<i32> {
    i32::try_from(hours_between(epoch, time)).map_err(|_| GeneratorError::TimeOutOfRange {
        time: time.to_rfc3339(),
        unit: unit.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_epoch() {
        assert_eq!(default_epoch().to_rfc3339(), "1990-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_hours_between_whole_hours() {
        let epoch = default_epoch();
        let time = Utc.with_ymd_and_hms(1990, 1, 2, 3, 0, 0).unwrap();
        assert_eq!(hours_between(epoch, time), 27);
        assert_eq!(hours_after(epoch, 27), time);
    }

    #[test]
    fn test_hours_between_floors() {
        let epoch = default_epoch();
        let later = Utc.with_ymd_and_hms(1990, 1, 1, 5, 59, 59).unwrap();
        assert_eq!(hours_between(epoch, later), 5);

        let earlier = Utc.with_ymd_and_hms(1989, 12, 31, 23, 30, 0).unwrap();
        assert_eq!(hours_between(epoch, earlier), -1);
    }

    #[test]
    fn test_encode_offset_out_of_range() {
        let epoch = default_epoch();
        let far = hours_after(epoch, i64::from(i32::MAX) + 1);
        let err = encode_offset(epoch, far, DEFAULT_TIME_UNIT).unwrap_err();
        assert!(matches!(err, GeneratorError::TimeOutOfRange { .. }));
    }
}
