//! Canonical time unit for pit and lap timestamps

use serde::{Deserialize, Serialize};

/// Seconds in one day, the divisor between the simulator clock and [`DayTime`].
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// A point in session time or a duration, expressed as a fraction of a day.
///
/// The simulator reports seconds; the message family and the persisted state
/// use fractions of a day. Conversion happens exactly once, when a value leaves
/// the telemetry snapshot, so nothing downstream ever sees seconds.
///
/// `0.0` doubles as "unset" for pit timestamps.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DayTime(f64);

impl DayTime {
    /// The unset / zero value.
    pub const ZERO: DayTime = DayTime(0.0);

    /// Convert a simulator duration in seconds.
    pub fn from_seconds(seconds: f64) -> Self {
        Self(seconds / SECONDS_PER_DAY)
    }

    /// Wrap a value that is already a fraction of a day.
    pub const fn from_days(days: f64) -> Self {
        Self(days)
    }

    /// Value as fraction of a day.
    pub fn days(self) -> f64 {
        self.0
    }

    /// Value in seconds.
    pub fn seconds(self) -> f64 {
        self.0 * SECONDS_PER_DAY
    }

    /// Whether the value has been recorded (strictly positive).
    pub fn is_set(self) -> bool {
        self.0 > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seconds_convert_to_fraction_of_day() {
        assert_eq!(DayTime::from_seconds(43_200.0).days(), 0.5);
        assert_eq!(DayTime::from_seconds(86_400.0), DayTime::from_days(1.0));
        assert!((DayTime::from_days(0.25).seconds() - 21_600.0).abs() < 1e-9);
    }

    #[test]
    fn zero_is_unset() {
        assert!(!DayTime::ZERO.is_set());
        assert!(!DayTime::default().is_set());
        assert!(DayTime::from_seconds(1.0).is_set());
    }

    #[test]
    fn serializes_as_bare_number() {
        let json = serde_json::to_string(&DayTime::from_days(0.5)).unwrap();
        assert_eq!(json, "0.5");
        let back: DayTime = serde_json::from_str("0.125").unwrap();
        assert_eq!(back.days(), 0.125);
    }
}
