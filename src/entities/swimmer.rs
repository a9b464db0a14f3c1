// Swimmer entity - canonical identity plus the per-event performance index.
//
// A swimmer is created from the first record that fails to resolve to an
// existing entity, then mutated by every later record that resolves to it:
// birthday narrowing, club reassignment, long-id attachment. Performances
// are grouped by event and kept in swim-date order.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::birthday::{Birthday, BirthdayError};
use crate::entities::club::ClubId;
use crate::entities::performance::Performance;
use crate::identity::encode_legacy_id_short;
use crate::record::SwimRecord;
use crate::sdif::{Event, Sex};
use crate::stime::Time;

/// Stable surrogate id for a swimmer. Never changes, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SwimmerId(Uuid);

impl SwimmerId {
    pub fn new() -> SwimmerId {
        SwimmerId(Uuid::new_v4())
    }
}

impl Default for SwimmerId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Swimmer {
    pub id: SwimmerId,
    pub first_name: String,
    pub last_name: String,
    pub middle_initial: Option<char>,
    pub sex: Sex,
    pub birthday: Birthday,
    /// Current club, tracking the most recent swim seen so far.
    pub club: Option<ClubId>,
    /// Short-form identifier from the first record seen.
    pub short_id: String,
    /// Long-form identifier, attached when a newer-format record supplies one.
    pub long_id: Option<String>,
    /// Most recent swim date observed across all records.
    pub last_swim_date: Option<NaiveDate>,

    events: BTreeMap<Event, Vec<Performance>>,
}

impl Swimmer {
    /// Seed a new swimmer from an unresolved record.
    pub fn from_record(record: &SwimRecord, club: Option<ClubId>) -> Swimmer {
        let birthday = match record.birthday {
            Some(date) => Birthday::Known(date),
            None => Birthday::unknown(),
        };
        Swimmer {
            id: SwimmerId::new(),
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
            middle_initial: record.middle_initial,
            sex: record.sex,
            birthday,
            club,
            short_id: record.short_id.clone(),
            long_id: record.long_id.clone(),
            last_swim_date: None,
            events: BTreeMap::new(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{}, {}", self.last_name, self.first_name)
    }

    /// Exact name match, as used by the no-birthday resolution path.
    pub fn matches_name(
        &self,
        first_name: &str,
        last_name: &str,
        middle_initial: Option<char>,
    ) -> bool {
        self.first_name == first_name
            && self.last_name == last_name
            && self.middle_initial == middle_initial
    }

    /// Short-form legacy encoding of this swimmer's identity, when the exact
    /// birthday is known. Used for Hamming comparison against incoming ids.
    pub fn legacy_id(&self) -> Option<String> {
        self.birthday.exact().map(|birthday| {
            encode_legacy_id_short(
                &self.first_name,
                self.middle_initial,
                &self.last_name,
                birthday,
            )
        })
    }

    pub fn age_range(&self, on_date: NaiveDate) -> (u32, u32) {
        self.birthday.age_range(on_date)
    }

    // ------------------------------------------------------------------
    // Event index
    // ------------------------------------------------------------------

    pub fn add_performance(&mut self, performance: Performance) {
        let results = self.events.entry(performance.event).or_default();
        results.push(performance);
        results.sort_by_key(|p| p.date);
    }

    /// All performances for one event, in swim-date order.
    pub fn performances(&self, event: Event) -> &[Performance] {
        self.events.get(&event).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Fastest recorded performance for one event.
    pub fn best_performance(&self, event: Event) -> Option<&Performance> {
        self.performances(event)
            .iter()
            .min_by_key(|p| p.final_time)
    }

    pub fn best_time(&self, event: Event) -> Option<Time> {
        self.best_performance(event).map(|p| p.final_time)
    }

    /// Full history, ordered by event then date.
    pub fn time_history(&self) -> Vec<&Performance> {
        self.events.values().flatten().collect()
    }

    pub fn performance_count(&self) -> usize {
        self.events.values().map(Vec::len).sum()
    }

    // ------------------------------------------------------------------
    // Identity updates
    // ------------------------------------------------------------------

    /// Fold one record's identity information into this swimmer: confirm the
    /// birthday when the record carries one, otherwise narrow the inferred
    /// interval from the record's numeric age class.
    pub fn observe_identity(&mut self, record: &SwimRecord) -> Result<(), BirthdayError> {
        if let Some(birthday) = record.birthday {
            self.birthday.confirm(birthday);
        } else if let Some(age) = record.age_class_years() {
            self.birthday.observe(age, record.swim_date)?;
        }
        if let Some(long_id) = &record.long_id {
            self.long_id.get_or_insert_with(|| long_id.clone());
        }
        if self.middle_initial.is_none() {
            self.middle_initial = record.middle_initial;
        }
        Ok(())
    }

    /// Absorb every performance and any better identity knowledge from a
    /// duplicate entity. The duplicate is dismantled by the caller.
    pub fn absorb(&mut self, duplicate: Swimmer) {
        for (event, performances) in duplicate.events {
            let results = self.events.entry(event).or_default();
            results.extend(performances);
            results.sort_by_key(|p| p.date);
        }

        if self.long_id.is_none() {
            self.long_id = duplicate.long_id;
        }
        self.birthday = match (self.birthday, duplicate.birthday) {
            (Birthday::Known(date), _) => Birthday::Known(date),
            (Birthday::Inferred(_), Birthday::Known(date)) => Birthday::Known(date),
            (Birthday::Inferred(a), Birthday::Inferred(b)) => {
                // Both are estimates of the same person; keep the tighter
                // interval if they agree, the survivor's if they don't.
                Birthday::Inferred(a.intersect(&b).unwrap_or(a))
            }
        };

        if duplicate.last_swim_date > self.last_swim_date {
            self.last_swim_date = duplicate.last_swim_date;
            if duplicate.club.is_some() {
                self.club = duplicate.club;
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
