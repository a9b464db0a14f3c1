// Qualifying time standards, loaded from CSV reference tables. Used only to
// annotate displayed results with the hardest cut a time beats; none of the
// core model logic depends on them.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::sdif::{AgeGroup, Course, Event, Sex, Stroke};
use crate::stime::Time;

// ============================================================================
// STANDARDS
// ============================================================================

/// Motivational cuts, easiest to hardest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TimeStandard {
    B,
    Bb,
    A,
    Aa,
    Aaa,
    Aaaa,
}

impl TimeStandard {
    pub fn label(&self) -> &'static str {
        match self {
            TimeStandard::B => "B",
            TimeStandard::Bb => "BB",
            TimeStandard::A => "A",
            TimeStandard::Aa => "AA",
            TimeStandard::Aaa => "AAA",
            TimeStandard::Aaaa => "AAAA",
        }
    }

    pub fn from_label(label: &str) -> Option<TimeStandard> {
        match label {
            "B" => Some(TimeStandard::B),
            "BB" => Some(TimeStandard::Bb),
            "A" => Some(TimeStandard::A),
            "AA" => Some(TimeStandard::Aa),
            "AAA" => Some(TimeStandard::Aaa),
            "AAAA" => Some(TimeStandard::Aaaa),
            _ => None,
        }
    }

    /// Easiest to hardest.
    pub fn all() -> [TimeStandard; 6] {
        [
            TimeStandard::B,
            TimeStandard::Bb,
            TimeStandard::A,
            TimeStandard::Aa,
            TimeStandard::Aaa,
            TimeStandard::Aaaa,
        ]
    }
}

impl fmt::Display for TimeStandard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Competition age group for a swimmer age.
pub fn age_group_for(age: u32) -> AgeGroup {
    match age {
        0..=10 => AgeGroup::TenUnder,
        11..=12 => AgeGroup::ElevenTwelve,
        13..=14 => AgeGroup::ThirteenFourteen,
        15..=16 => AgeGroup::FifteenSixteen,
        17..=18 => AgeGroup::SeventeenEighteen,
        _ => AgeGroup::Senior,
    }
}

// ============================================================================
// TABLE
// ============================================================================

/// One row of a standards CSV file:
/// `age_group,sex,distance,stroke,course,time`
/// with stroke and course in their wire-format codes.
#[derive(Debug, Deserialize)]
struct CutRow {
    age_group: String,
    sex: String,
    distance: u32,
    stroke: String,
    course: String,
    time: String,
}

#[derive(Debug, Default)]
pub struct TimeStandards {
    cuts: HashMap<(TimeStandard, AgeGroup, Sex, Event), Time>,
}

impl TimeStandards {
    pub fn new() -> TimeStandards {
        TimeStandards::default()
    }

    pub fn is_empty(&self) -> bool {
        self.cuts.is_empty()
    }

    pub fn insert_cut(
        &mut self,
        standard: TimeStandard,
        age_group: AgeGroup,
        sex: Sex,
        event: Event,
        cut: Time,
    ) {
        self.cuts.insert((standard, age_group, sex, event), cut);
    }

    /// Load every `<LABEL>.csv` table present under `dir`. Absent files just
    /// leave that standard unpopulated.
    pub fn load_dir(dir: &Path) -> Result<TimeStandards> {
        let mut standards = TimeStandards::new();
        for standard in TimeStandard::all() {
            let path = dir.join(format!("{}.csv", standard.label()));
            if !path.exists() {
                continue;
            }
            let mut reader = csv::Reader::from_path(&path)
                .with_context(|| format!("opening {}", path.display()))?;
            for row in reader.deserialize() {
                let row: CutRow = row.with_context(|| format!("parsing {}", path.display()))?;
                let age_group = match AgeGroup::from_label(&row.age_group) {
                    Some(group) => group,
                    None => continue,
                };
                let sex = match Sex::from_code(&row.sex) {
                    Ok(sex) => sex,
                    Err(_) => continue,
                };
                let event = match Stroke::from_code(&row.stroke)
                    .and_then(|stroke| {
                        Course::from_code(&row.course)
                            .and_then(|course| Event::new(row.distance, stroke, course))
                    }) {
                    Ok(event) => event,
                    Err(_) => continue,
                };
                let cut: Time = match row.time.parse() {
                    Ok(time) => time,
                    Err(_) => continue,
                };
                standards.insert_cut(standard, age_group, sex, event, cut);
            }
        }
        Ok(standards)
    }

    pub fn cut(
        &self,
        standard: TimeStandard,
        age_group: AgeGroup,
        sex: Sex,
        event: Event,
    ) -> Option<Time> {
        self.cuts.get(&(standard, age_group, sex, event)).copied()
    }

    /// The hardest standard `time` beats for this swimmer and event, if any.
    pub fn highest_standard(
        &self,
        time: Time,
        sex: Sex,
        age: u32,
        event: Event,
    ) -> Option<TimeStandard> {
        let age_group = age_group_for(age);
        TimeStandard::all()
            .into_iter()
            .rev()
            .find(|standard| match self.cut(*standard, age_group, sex, event) {
                Some(cut) => time <= cut,
                None => false,
            })
    }

    /// Every standard `time` qualifies for, easiest first.
    pub fn qualified_standards(
        &self,
        time: Time,
        sex: Sex,
        age: u32,
        event: Event,
    ) -> Vec<TimeStandard> {
        let age_group = age_group_for(age);
        TimeStandard::all()
            .into_iter()
            .filter(|standard| match self.cut(*standard, age_group, sex, event) {
                Some(cut) => time <= cut,
                None => false,
            })
            .collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> (TimeStandards, Event) {
        let event = Event::new(50, Stroke::Freestyle, Course::Scy).unwrap();
        let mut standards = TimeStandards::new();
        for (standard, cut) in [
            (TimeStandard::B, "40.00"),
            (TimeStandard::Bb, "36.00"),
            (TimeStandard::A, "32.00"),
            (TimeStandard::Aa, "30.00"),
        ] {
            standards.insert_cut(
                standard,
                AgeGroup::TenUnder,
                Sex::Female,
                event,
                cut.parse().unwrap(),
            );
        }
        (standards, event)
    }

    #[test]
    fn test_highest_standard_is_hardest_beaten_cut() {
        let (standards, event) = table();
        let time: Time = "31.50".parse().unwrap();
        assert_eq!(
            standards.highest_standard(time, Sex::Female, 10, event),
            Some(TimeStandard::A)
        );

        // Exactly on the cut still qualifies.
        let on_cut: Time = "30.00".parse().unwrap();
        assert_eq!(
            standards.highest_standard(on_cut, Sex::Female, 9, event),
            Some(TimeStandard::Aa)
        );
    }

    #[test]
    fn test_no_standard_for_slow_or_unknown() {
        let (standards, event) = table();
        let slow: Time = "45.00".parse().unwrap();
        assert_eq!(standards.highest_standard(slow, Sex::Female, 10, event), None);

        // No cuts loaded for boys or for 11-12s.
        let time: Time = "31.50".parse().unwrap();
        assert_eq!(standards.highest_standard(time, Sex::Male, 10, event), None);
        assert_eq!(standards.highest_standard(time, Sex::Female, 12, event), None);
    }

    #[test]
    fn test_qualified_standards_easiest_first() {
        let (standards, event) = table();
        let time: Time = "31.50".parse().unwrap();
        assert_eq!(
            standards.qualified_standards(time, Sex::Female, 10, event),
            vec![TimeStandard::B, TimeStandard::Bb, TimeStandard::A]
        );
    }

    #[test]
    fn test_age_group_for() {
        assert_eq!(age_group_for(8), AgeGroup::TenUnder);
        assert_eq!(age_group_for(12), AgeGroup::ElevenTwelve);
        assert_eq!(age_group_for(19), AgeGroup::Senior);
    }
}
