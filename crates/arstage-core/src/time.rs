use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub};

/// Span of media or wall-clock time in fractional seconds. Never negative.
///
/// Playback positions, clip lengths, timer delays and frame deltas all use
/// this type; `to_std` bridges to tokio timers.
#[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Duration(f64);

impl Duration {
    /// Negative, NaN and infinite input all become zero.
    pub fn from_seconds(secs: f64) -> Self {
        if secs.is_finite() && secs > 0.0 {
            Duration(secs)
        } else {
            Duration(0.0)
        }
    }

    pub fn from_millis(ms: f64) -> Self {
        Self::from_seconds(ms / 1000.0)
    }

    pub const fn zero() -> Self {
        Duration(0.0)
    }

    pub fn as_seconds(&self) -> f64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }

    /// Saturates at `std::time::Duration::MAX`.
    pub fn to_std(&self) -> std::time::Duration {
        std::time::Duration::try_from_secs_f64(self.0).unwrap_or(std::time::Duration::MAX)
    }

    pub fn from_std(d: std::time::Duration) -> Self {
        Self::from_seconds(d.as_secs_f64())
    }

    pub fn min(self, other: Duration) -> Duration {
        Duration(self.0.min(other.0))
    }
}

impl Add for Duration {
    type Output = Duration;

    fn add(self, rhs: Duration) -> Duration {
        Duration::from_seconds(self.0 + rhs.0)
    }
}

impl AddAssign for Duration {
    fn add_assign(&mut self, rhs: Duration) {
        *self = *self + rhs;
    }
}

/// Saturates at zero.
impl Sub for Duration {
    type Output = Duration;

    fn sub(self, rhs: Duration) -> Duration {
        Duration::from_seconds(self.0 - rhs.0)
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_is_zero() {
        assert!(Duration::from_seconds(-3.0).is_zero());
        assert!(Duration::from_seconds(f64::NAN).is_zero());
        assert!(Duration::from_seconds(f64::INFINITY).is_zero());
        assert_eq!(Duration::default(), Duration::zero());
    }

    #[test]
    fn test_playback_clock_arithmetic() {
        let clip = Duration::from_seconds(10.0);
        let mut position = Duration::from_seconds(9.9);
        position += Duration::from_millis(250.0);
        assert_eq!(position.min(clip), clip);
        assert!((clip - position).is_zero());
        assert!(((position - clip).as_seconds() - 0.15).abs() < 1e-9);
    }

    #[test]
    fn test_display_and_serde() {
        assert_eq!(Duration::from_seconds(8.0).to_string(), "8.000s");
        let json = serde_json::to_string(&Duration::from_seconds(1.5)).unwrap();
        assert_eq!(json, "1.5");
        let back: Duration = serde_json::from_str("0.25").unwrap();
        assert_eq!(back, Duration::from_millis(250.0));
    }

    #[test]
    fn test_std_round_trip() {
        let frame = Duration::from_seconds(1.0 / 30.0);
        assert!((Duration::from_std(frame.to_std()).as_seconds() - frame.as_seconds()).abs() < 1e-9);
        assert_eq!(
            Duration::from_millis(250.0).to_std(),
            std::time::Duration::from_millis(250)
        );
        assert_eq!(
            Duration::from_seconds(1e20).to_std(),
            std::time::Duration::MAX
        );
    }
}
