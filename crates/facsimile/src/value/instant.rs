use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use parking_lot::RwLock;

/// Largest representable distance from the epoch, in milliseconds.
const MAX_EPOCH_MS: f64 = 8.64e15;

/// A moment in time, stored as epoch milliseconds. `NaN` marks an invalid
/// instant.
#[derive(Clone)]
pub struct Instant(Arc<RwLock<f64>>);

heap_handle!(Instant);

fn time_clip(ms: f64) -> f64 {
    if !ms.is_finite() || ms.abs() > MAX_EPOCH_MS {
        f64::NAN
    } else {
        ms.trunc() + 0.0
    }
}

impl Instant {
    pub fn from_millis(ms: f64) -> Self {
        Self(Arc::new(RwLock::new(time_clip(ms))))
    }

    pub fn now() -> Self {
        Self::from_millis(Utc::now().timestamp_millis() as f64)
    }

    /// Parse an RFC 3339 timestamp, a `YYYY-MM-DD` date or a
    /// `YYYY-MM-DDTHH:MM:SS[.fff]` datetime (read as UTC). Anything else
    /// yields an invalid instant.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        let ms = DateTime::parse_from_rfc3339(text)
            .map(|dt| dt.timestamp_millis())
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(text, "%Y-%m-%d")
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
                    .map(|dt| dt.and_utc().timestamp_millis())
            })
            .or_else(|| {
                NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|dt| dt.and_utc().timestamp_millis())
            });
        match ms {
            Some(ms) => Self::from_millis(ms as f64),
            None => Self::from_millis(f64::NAN),
        }
    }

    /// Epoch milliseconds, `NaN` when invalid.
    pub fn value_of(&self) -> f64 {
        *self.0.read()
    }

    pub fn set_time(&self, ms: f64) {
        *self.0.write() = time_clip(ms);
    }

    pub fn is_valid(&self) -> bool {
        !self.value_of().is_nan()
    }

    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        let ms = self.value_of();
        if ms.is_nan() {
            return None;
        }
        DateTime::from_timestamp_millis(ms as i64)
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Some(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.3fZ")),
            None => write!(f, "Invalid Date"),
        }
    }
}

impl fmt::Debug for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Instant({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_dates_as_utc_midnight() {
        let instant = Instant::parse("2017-01-15");
        assert_eq!(instant.value_of(), 1_484_438_400_000.0);
        assert_eq!(instant.to_string(), "2017-01-15T00:00:00.000Z");
    }

    #[test]
    fn impossible_dates_are_invalid() {
        let instant = Instant::parse("2016-15-14");
        assert!(!instant.is_valid());
        assert_eq!(instant.to_string(), "Invalid Date");
    }

    #[test]
    fn set_time_clips_fractions() {
        let instant = Instant::from_millis(0.0);
        instant.set_time(1500.75);
        assert_eq!(instant.value_of(), 1500.0);

        instant.set_time(f64::INFINITY);
        assert!(instant.value_of().is_nan());
    }
}
