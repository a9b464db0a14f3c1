// The typed result record handed to the core by the wire-format parser.
// One SwimRecord is one performance by one swimmer in one session.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::sdif::{Event, Session, Sex};
use crate::stime::Time;

/// One performance record, already typed. Identity fields travel with every
/// record because the wire format repeats them on every result line; the
/// directory decides which canonical swimmer they belong to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwimRecord {
    // Identity fields
    pub first_name: String,
    pub last_name: String,
    pub middle_initial: Option<char>,
    pub sex: Sex,
    /// 12-character short-form identifier (legacy or modern).
    pub short_id: String,
    /// 14-character modern identifier, when the source carries one.
    pub long_id: Option<String>,
    /// Exact birthday, present only in older record formats.
    pub birthday: Option<NaiveDate>,
    /// Age or classification at time of swim ("10", "Sr", ...).
    pub age_class: String,

    // Performance fields
    pub event: Event,
    pub session: Session,
    pub swim_date: NaiveDate,
    pub final_time: Time,
    pub seed_time: Option<Time>,
    pub rank: Option<u32>,
    pub points: Option<f64>,

    // Affiliation at time of swim
    pub team_code: Option<String>,
    pub lsc_code: Option<String>,
    pub meet_name: String,
}

impl SwimRecord {
    /// Numeric age class, if the age class is an age rather than a
    /// classification like "Jr"/"Sr".
    pub fn age_class_years(&self) -> Option<u32> {
        self.age_class.trim().parse().ok()
    }

    /// "Last, First" as the wire format writes names.
    pub fn full_name(&self) -> String {
        format!("{}, {}", self.last_name, self.first_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdif::{Course, Stroke};

    fn record(age_class: &str) -> SwimRecord {
        SwimRecord {
            first_name: "Ana".to_string(),
            last_name: "Reyes".to_string(),
            middle_initial: None,
            sex: Sex::Female,
            short_id: "020314ANA*RE".to_string(),
            long_id: None,
            birthday: None,
            age_class: age_class.to_string(),
            event: Event::new(50, Stroke::Freestyle, Course::Scy).unwrap(),
            session: Session::Finals,
            swim_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            final_time: "28.10".parse().unwrap(),
            seed_time: None,
            rank: None,
            points: None,
            team_code: Some("PCSC".to_string()),
            lsc_code: Some("PC".to_string()),
            meet_name: "June Invite".to_string(),
        }
    }

    #[test]
    fn test_age_class_years() {
        assert_eq!(record("10").age_class_years(), Some(10));
        assert_eq!(record(" 9").age_class_years(), Some(9));
        assert_eq!(record("Sr").age_class_years(), None);
        assert_eq!(record("").age_class_years(), None);
    }

    #[test]
    fn test_full_name() {
        assert_eq!(record("10").full_name(), "Reyes, Ana");
    }
}
