use chrono::{DateTime, FixedOffset, Utc};

use common::{Error, Result};

/// Coarsened scan timestamp used as the last part of an alert key.
///
/// Timestamps are floored to a `minutes`-wide bucket in the configured
/// local offset and rendered as `"%I:%M %p %d-%m-%Y"`. Two scans inside the
/// same bucket share a label, so the second one's alerts are duplicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeBucket {
    minutes: u32,
    offset: FixedOffset,
}

impl TimeBucket {
    pub const LABEL_FORMAT: &'static str = "%I:%M %p %d-%m-%Y";

    pub fn new(minutes: u32, utc_offset_minutes: i32) -> Result<Self> {
        if minutes == 0 {
            return Err(Error::InvalidParameter(
                "alert bucket must be at least one minute".into(),
            ));
        }
        let offset = FixedOffset::east_opt(utc_offset_minutes * 60).ok_or_else(|| {
            Error::InvalidParameter(format!(
                "UTC offset of {utc_offset_minutes} minutes is out of range"
            ))
        })?;
        Ok(Self { minutes, offset })
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn local(&self, now: DateTime<Utc>) -> DateTime<FixedOffset> {
        now.with_timezone(&self.offset)
    }

    /// Start of the bucket containing `now`, in local time.
    pub fn start(&self, now: DateTime<Utc>) -> DateTime<FixedOffset> {
        let offset_secs = i64::from(self.offset.local_minus_utc());
        let span = i64::from(self.minutes) * 60;
        let local_secs = now.timestamp() + offset_secs;
        let floored = local_secs - local_secs.rem_euclid(span) - offset_secs;
        DateTime::<Utc>::from_timestamp(floored, 0)
            .unwrap_or(now)
            .with_timezone(&self.offset)
    }

    pub fn label(&self, now: DateTime<Utc>) -> String {
        self.start(now).format(Self::LABEL_FORMAT).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, h, m, s).unwrap()
    }

    #[test]
    fn minute_bucket_renders_local_time() {
        let bucket = TimeBucket::new(1, 330).unwrap();
        // 10:07 UTC is 15:37 at +05:30
        assert_eq!(bucket.label(at(10, 7, 42)), "03:37 PM 01-05-2024");
    }

    #[test]
    fn same_bucket_same_label() {
        let bucket = TimeBucket::new(15, 330).unwrap();
        assert_eq!(bucket.label(at(10, 0, 0)), "03:30 PM 01-05-2024");
        assert_eq!(bucket.label(at(10, 14, 59)), "03:30 PM 01-05-2024");
        assert_eq!(bucket.label(at(10, 15, 0)), "03:45 PM 01-05-2024");
    }

    #[test]
    fn hour_bucket_floors_in_local_time() {
        let bucket = TimeBucket::new(60, 330).unwrap();
        // 10:07 UTC = 15:37 local, floored to 15:00 local
        assert_eq!(bucket.label(at(10, 7, 0)), "03:00 PM 01-05-2024");
    }

    #[test]
    fn utc_bucket() {
        let bucket = TimeBucket::new(5, 0).unwrap();
        assert_eq!(bucket.label(at(23, 59, 59)), "11:55 PM 01-05-2024");
    }

    #[test]
    fn rejects_bad_parameters() {
        assert!(TimeBucket::new(0, 0).is_err());
        assert!(TimeBucket::new(1, 24 * 60).is_err());
    }
}
