// Swim time value type - minutes / seconds / hundredths
// Ordered, additive, and printable in the scoreboard "m:ss.hh" convention.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeParseError {
    #[error("invalid time string: '{0}'")]
    Invalid(String),

    #[error("time component out of range in '{0}'")]
    OutOfRange(String),
}

// ============================================================================
// TIME
// ============================================================================

/// A race time, stored as total hundredths of a second.
///
/// Times in the interchange data are written as `m:ss.hh` (or `ss.hh` under
/// one minute), sometimes with a trailing `*` marking a converted time.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Time {
    centis: u32,
}

impl Time {
    pub const ZERO: Time = Time { centis: 0 };

    /// Build a time from its clock components.
    pub fn new(minutes: u32, seconds: u32, hundredths: u32) -> Time {
        Time {
            centis: minutes * 60 * 100 + seconds * 100 + hundredths,
        }
    }

    pub fn from_centis(centis: u32) -> Time {
        Time { centis }
    }

    pub fn total_centis(&self) -> u32 {
        self.centis
    }

    pub fn minutes(&self) -> u32 {
        self.centis / 6000
    }

    pub fn seconds(&self) -> u32 {
        (self.centis / 100) % 60
    }

    pub fn hundredths(&self) -> u32 {
        self.centis % 100
    }
}

impl Add for Time {
    type Output = Time;

    fn add(self, rhs: Time) -> Time {
        Time {
            centis: self.centis + rhs.centis,
        }
    }
}

impl AddAssign for Time {
    fn add_assign(&mut self, rhs: Time) {
        self.centis += rhs.centis;
    }
}

impl Sum for Time {
    fn sum<I: Iterator<Item = Time>>(iter: I) -> Time {
        iter.fold(Time::ZERO, Add::add)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.minutes() > 0 {
            write!(
                f,
                "{}:{:02}.{:02}",
                self.minutes(),
                self.seconds(),
                self.hundredths()
            )
        } else {
            write!(f, "{:02}.{:02}", self.seconds(), self.hundredths())
        }
    }
}

impl FromStr for Time {
    type Err = TimeParseError;

    /// Parse `m:ss.hh` or `ss.hh`, tolerating surrounding whitespace and a
    /// trailing `*` (converted-time marker in the wire format).
    fn from_str(s: &str) -> Result<Time, TimeParseError> {
        let trimmed = s.trim().trim_end_matches('*');
        if trimmed.is_empty() {
            return Err(TimeParseError::Invalid(s.to_string()));
        }

        let (minute_str, rest) = match trimmed.split_once(':') {
            Some((m, r)) => (m, r),
            None => ("0", trimmed),
        };
        let (second_str, hundredth_str) = rest
            .split_once('.')
            .ok_or_else(|| TimeParseError::Invalid(s.to_string()))?;

        let minutes: u32 = minute_str
            .trim()
            .parse()
            .map_err(|_| TimeParseError::Invalid(s.to_string()))?;
        let seconds: u32 = second_str
            .parse()
            .map_err(|_| TimeParseError::Invalid(s.to_string()))?;
        let hundredths: u32 = hundredth_str
            .parse()
            .map_err(|_| TimeParseError::Invalid(s.to_string()))?;

        if seconds >= 60 || hundredths >= 100 {
            return Err(TimeParseError::OutOfRange(s.to_string()));
        }

        Ok(Time::new(minutes, seconds, hundredths))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_minutes() {
        let t: Time = "1:15.23".parse().unwrap();
        assert_eq!(t, Time::new(1, 15, 23));
        assert_eq!(t.minutes(), 1);
        assert_eq!(t.seconds(), 15);
        assert_eq!(t.hundredths(), 23);
    }

    #[test]
    fn test_parse_without_minutes() {
        let t: Time = "32.10".parse().unwrap();
        assert_eq!(t, Time::new(0, 32, 10));
    }

    #[test]
    fn test_parse_converted_marker_and_padding() {
        let t: Time = "  1:02.50*".parse().unwrap();
        assert_eq!(t, Time::new(1, 2, 50));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<Time>().is_err());
        assert!("NT".parse::<Time>().is_err());
        assert!("1:75.00".parse::<Time>().is_err());
    }

    #[test]
    fn test_display_round_trip() {
        for s in ["1:15.23", "32.10", "15:59.99", "00.01"] {
            let t: Time = s.parse().unwrap();
            assert_eq!(t.to_string(), s);
        }
    }

    #[test]
    fn test_ordering() {
        let fast: Time = "28.10".parse().unwrap();
        let slow: Time = "1:02.00".parse().unwrap();
        assert!(fast < slow);
        assert!(slow > fast);
    }

    #[test]
    fn test_addition_carries() {
        let a = Time::new(0, 59, 80);
        let b = Time::new(0, 0, 30);
        assert_eq!(a + b, Time::new(1, 0, 10));

        let total: Time = [a, b, Time::new(1, 0, 0)].into_iter().sum();
        assert_eq!(total, Time::new(2, 0, 10));
    }
}
