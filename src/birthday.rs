// Birthday inference - newer record formats omit birthdays, so a swimmer's
// birthday is tracked as the tightest interval consistent with every observed
// (age class, swim date) pair. An exact birthday collapses the interval.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BirthdayError {
    /// An observation excluded every remaining candidate birthday. The
    /// previous interval is kept; the caller reports this as a data-quality
    /// problem with the offending record.
    #[error("age {age} on {on_date} is inconsistent with birthday interval [{earliest}, {latest}]")]
    EmptyIntersection {
        age: u32,
        on_date: NaiveDate,
        earliest: NaiveDate,
        latest: NaiveDate,
    },
}

/// `date` moved `years` back, clamping Feb 29 to Feb 28 on non-leap years.
fn years_earlier(date: NaiveDate, years: u32) -> NaiveDate {
    let year = date.year() - years as i32;
    NaiveDate::from_ymd_opt(year, date.month(), date.day())
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, 2, 28).expect("Feb 28 always exists"))
}

/// Age in whole years on `on_date` for someone born on `birthday`.
/// Negative when `on_date` precedes the birthday.
pub fn age_on(birthday: NaiveDate, on_date: NaiveDate) -> i32 {
    let mut age = on_date.year() - birthday.year();
    if (on_date.month(), on_date.day()) < (birthday.month(), birthday.day()) {
        age -= 1;
    }
    age
}

// ============================================================================
// BIRTHDAY RANGE
// ============================================================================

/// Inclusive interval of possible birthdays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BirthdayRange {
    pub earliest: NaiveDate,
    pub latest: NaiveDate,
}

impl BirthdayRange {
    /// Interval for a swimmer nothing has been observed about yet.
    pub fn unbounded() -> BirthdayRange {
        BirthdayRange {
            earliest: NaiveDate::from_ymd_opt(1900, 1, 1).expect("valid date"),
            latest: NaiveDate::from_ymd_opt(2199, 12, 31).expect("valid date"),
        }
    }

    /// The interval implied by a single observation: someone aged `age` on
    /// `on_date` was born within [on_date - (age+1)y + 1d, on_date - age y].
    pub fn from_observation(age: u32, on_date: NaiveDate) -> BirthdayRange {
        BirthdayRange {
            earliest: years_earlier(on_date, age + 1) + chrono::Days::new(1),
            latest: years_earlier(on_date, age),
        }
    }

    pub fn intersect(&self, other: &BirthdayRange) -> Option<BirthdayRange> {
        let earliest = self.earliest.max(other.earliest);
        let latest = self.latest.min(other.latest);
        (earliest <= latest).then_some(BirthdayRange { earliest, latest })
    }

    /// (min_age, max_age) on `on_date`: youngest if born as late as possible,
    /// oldest if born as early as possible. Saturates at 0.
    pub fn age_range(&self, on_date: NaiveDate) -> (u32, u32) {
        let min_age = age_on(self.latest, on_date).max(0) as u32;
        let max_age = age_on(self.earliest, on_date).max(0) as u32;
        (min_age, max_age)
    }
}

// ============================================================================
// BIRTHDAY
// ============================================================================

/// What is known about a swimmer's birthday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Birthday {
    Known(NaiveDate),
    Inferred(BirthdayRange),
}

impl Birthday {
    pub fn unknown() -> Birthday {
        Birthday::Inferred(BirthdayRange::unbounded())
    }

    pub fn exact(&self) -> Option<NaiveDate> {
        match self {
            Birthday::Known(date) => Some(*date),
            Birthday::Inferred(_) => None,
        }
    }

    /// The current interval; a known birthday is a single-point interval.
    pub fn range(&self) -> BirthdayRange {
        match self {
            Birthday::Known(date) => BirthdayRange {
                earliest: *date,
                latest: *date,
            },
            Birthday::Inferred(range) => *range,
        }
    }

    pub fn age_range(&self, on_date: NaiveDate) -> (u32, u32) {
        self.range().age_range(on_date)
    }

    /// Collapse to an exact birthday. Wins over any inferred interval.
    pub fn confirm(&mut self, date: NaiveDate) {
        *self = Birthday::Known(date);
    }

    /// Narrow the interval with one (age, date) observation. No-op once the
    /// exact birthday is known. An empty intersection leaves the interval
    /// unchanged and reports the inconsistency.
    pub fn observe(&mut self, age: u32, on_date: NaiveDate) -> Result<(), BirthdayError> {
        let range = match self {
            Birthday::Known(_) => return Ok(()),
            Birthday::Inferred(range) => range,
        };
        let constraint = BirthdayRange::from_observation(age, on_date);
        match range.intersect(&constraint) {
            Some(narrowed) => {
                *range = narrowed;
                Ok(())
            }
            None => Err(BirthdayError::EmptyIntersection {
                age,
                on_date,
                earliest: range.earliest,
                latest: range.latest,
            }),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
