// Swimmer directory - the arena of canonical swimmer and club entities and
// the identity-resolution logic that maps raw records onto them.
//
// No single identifier is reliable across record formats: newer files carry
// an opaque long id, older files carry a birthdate-derived short id, and
// the newest files carry neither a birthday nor a stable encoding. Records
// are matched through a cascade of cheapest-reliable-first checks, and
// anything ambiguous is surfaced rather than guessed.

use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, warn};

use crate::entities::{Club, ClubId, Performance, Swimmer, SwimmerId};
use crate::identity::{encode_legacy_id_short, hamming_distance, SHORT_ID_LEN};
use crate::quality::{IssueKind, QualityReport, Severity};
use crate::record::SwimRecord;

/// Maximum Hamming distance at which two legacy encodings are considered
/// the same swimmer.
const LEGACY_ID_MAX_DISTANCE: usize = 1;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// Identifier has the wrong fixed width; the record is dropped.
    #[error("malformed identifier '{id}' (expected {expected} characters)")]
    MalformedIdentifier { id: String, expected: usize },

    /// More than one equally good candidate. Never auto-merged.
    #[error("ambiguous identity for '{name}': {candidates} equally good candidates")]
    Ambiguous { name: String, candidates: usize },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MergeError {
    #[error("unknown swimmer id")]
    UnknownSwimmer,
}

// ============================================================================
// DIRECTORY
// ============================================================================

#[derive(Debug, Default)]
pub struct Directory {
    swimmers: HashMap<SwimmerId, Swimmer>,
    clubs: HashMap<ClubId, Club>,
    /// Long-form id -> swimmer, the only always-exact lookup.
    by_long_id: HashMap<String, SwimmerId>,
    /// Team code -> club.
    by_team_code: HashMap<String, ClubId>,
    quality: QualityReport,
}

impl Directory {
    pub fn new() -> Directory {
        Directory::default()
    }

    // ------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------

    pub fn swimmer(&self, id: SwimmerId) -> Option<&Swimmer> {
        self.swimmers.get(&id)
    }

    pub fn swimmers(&self) -> impl Iterator<Item = &Swimmer> {
        self.swimmers.values()
    }

    pub fn swimmer_count(&self) -> usize {
        self.swimmers.len()
    }

    pub fn club(&self, id: ClubId) -> Option<&Club> {
        self.clubs.get(&id)
    }

    pub fn clubs(&self) -> impl Iterator<Item = &Club> {
        self.clubs.values()
    }

    pub fn find_club(&self, team_code: &str) -> Option<&Club> {
        self.by_team_code
            .get(team_code)
            .and_then(|id| self.clubs.get(id))
    }

    /// Members of a club, in no particular order.
    pub fn club_swimmers(&self, club_id: ClubId) -> Vec<&Swimmer> {
        match self.clubs.get(&club_id) {
            Some(club) => club
                .swimmers
                .iter()
                .filter_map(|id| self.swimmers.get(id))
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn find_swimmers_by_name(&self, last_name: &str, first_name: &str) -> Vec<&Swimmer> {
        self.swimmers
            .values()
            .filter(|s| s.last_name == last_name && s.first_name == first_name)
            .collect()
    }

    pub fn quality(&self) -> &QualityReport {
        &self.quality
    }

    pub fn quality_mut(&mut self) -> &mut QualityReport {
        &mut self.quality
    }

    // ------------------------------------------------------------------
    // Clubs
    // ------------------------------------------------------------------

    /// Get or create a club by team code, refreshing name and LSC when the
    /// caller knows them (club description lines carry both, result lines
    /// carry only the code).
    pub fn register_club(
        &mut self,
        team_code: &str,
        lsc_code: Option<&str>,
        name: Option<&str>,
    ) -> ClubId {
        if let Some(&id) = self.by_team_code.get(team_code) {
            let club = self.clubs.get_mut(&id).expect("indexed club exists");
            if club.lsc_code.is_none() {
                club.lsc_code = lsc_code.map(str::to_string);
            }
            if let Some(name) = name {
                club.name = name.to_string();
            }
            return id;
        }
        let club = Club::new(team_code, lsc_code, name.unwrap_or(team_code));
        let id = club.id;
        self.by_team_code.insert(team_code.to_string(), id);
        self.clubs.insert(id, club);
        id
    }

    fn assign_club(&mut self, swimmer_id: SwimmerId, club_id: Option<ClubId>) {
        let old_club = match self.swimmers.get(&swimmer_id) {
            Some(swimmer) if swimmer.club != club_id => swimmer.club,
            _ => return,
        };
        if let Some(old) = old_club.and_then(|id| self.clubs.get_mut(&id)) {
            old.remove_swimmer(swimmer_id);
        }
        if let Some(swimmer) = self.swimmers.get_mut(&swimmer_id) {
            swimmer.club = club_id;
        }
        if let Some(new) = club_id.and_then(|id| self.clubs.get_mut(&id)) {
            new.add_swimmer(swimmer_id);
        }
    }

    // ------------------------------------------------------------------
    // Identity resolution
    // ------------------------------------------------------------------

    /// Resolve a record to its canonical swimmer, creating one if nothing
    /// matches. Matching is tried in order of reliability: exact long id,
    /// then legacy-id Hamming comparison among swimmers sharing the exact
    /// birthday, then exact name plus age-class consistency.
    pub fn resolve_or_create(&mut self, record: &SwimRecord) -> Result<SwimmerId, ResolveError> {
        if record.short_id.len() != SHORT_ID_LEN {
            return Err(ResolveError::MalformedIdentifier {
                id: record.short_id.clone(),
                expected: SHORT_ID_LEN,
            });
        }

        let resolved = match self.find_match(record)? {
            Some(id) => {
                debug!(swimmer = %record.full_name(), "resolved to existing swimmer");
                id
            }
            None => {
                let swimmer = Swimmer::from_record(record, None);
                let id = swimmer.id;
                debug!(swimmer = %record.full_name(), "created new swimmer");
                self.swimmers.insert(id, swimmer);
                id
            }
        };

        // Every resolution refines what we know about the swimmer.
        let swimmer = self
            .swimmers
            .get_mut(&resolved)
            .expect("resolved swimmer exists");
        if let Err(err) = swimmer.observe_identity(record) {
            warn!(swimmer = %record.full_name(), %err, "inconsistent age observation");
            self.quality.issue(
                IssueKind::InconsistentAgeData,
                Severity::Warning,
                format!("{}: {} ({})", record.full_name(), err, record.swim_date),
            );
        }
        if let Some(long_id) = &record.long_id {
            self.by_long_id.insert(long_id.clone(), resolved);
        }

        Ok(resolved)
    }

    fn find_match(&self, record: &SwimRecord) -> Result<Option<SwimmerId>, ResolveError> {
        // Path 1: exact long-form id.
        if let Some(long_id) = &record.long_id {
            if let Some(&id) = self.by_long_id.get(long_id) {
                return Ok(Some(id));
            }
        }

        // Path 2: legacy encoding among swimmers with the same exact birthday.
        if let Some(birthday) = record.birthday {
            let constructed = encode_legacy_id_short(
                &record.first_name,
                record.middle_initial,
                &record.last_name,
                birthday,
            );
            let mut best: Option<(usize, SwimmerId)> = None;
            let mut tied = 0usize;
            for swimmer in self.swimmers.values() {
                if swimmer.birthday.exact() != Some(birthday) {
                    continue;
                }
                let candidate_id = swimmer.legacy_id().expect("exact birthday encodes");
                let distance = hamming_distance(&candidate_id, &constructed);
                if distance > LEGACY_ID_MAX_DISTANCE {
                    continue;
                }
                match best {
                    Some((best_distance, _)) if distance > best_distance => {}
                    Some((best_distance, _)) if distance == best_distance => tied += 1,
                    _ => {
                        best = Some((distance, swimmer.id));
                        tied = 1;
                    }
                }
            }
            return match (best, tied) {
                (Some((_, id)), 1) => Ok(Some(id)),
                (Some(_), n) => Err(ResolveError::Ambiguous {
                    name: record.full_name(),
                    candidates: n,
                }),
                (None, _) => Ok(None),
            };
        }

        // Path 3: exact name plus age-class consistency. Non-numeric age
        // classes ("Jr", "Sr") carry no age information and cannot match.
        let age = match record.age_class_years() {
            Some(age) => age,
            None => return Ok(None),
        };
        let candidates: Vec<SwimmerId> = self
            .swimmers
            .values()
            .filter(|s| {
                s.sex == record.sex
                    && s.matches_name(
                        &record.first_name,
                        &record.last_name,
                        record.middle_initial,
                    )
            })
            .filter(|s| {
                let (min_age, max_age) = s.age_range(record.swim_date);
                (min_age..=max_age).contains(&age)
            })
            .map(|s| s.id)
            .collect();

        match candidates.len() {
            0 => Ok(None),
            1 => Ok(Some(candidates[0])),
            n => Err(ResolveError::Ambiguous {
                name: record.full_name(),
                candidates: n,
            }),
        }
    }

    // ------------------------------------------------------------------
    // Ingestion
    // ------------------------------------------------------------------

    /// Resolve a record and fold its performance into the model: append to
    /// the swimmer's event index, and reassign the club only when this swim
    /// is the most recent seen for the swimmer (files arrive in no
    /// particular chronological order).
    pub fn ingest(&mut self, record: &SwimRecord) -> Result<SwimmerId, ResolveError> {
        let swimmer_id = self.resolve_or_create(record)?;

        let club_id = record
            .team_code
            .as_deref()
            .map(|code| self.register_club(code, record.lsc_code.as_deref(), None));

        let swimmer = self
            .swimmers
            .get_mut(&swimmer_id)
            .expect("resolved swimmer exists");
        swimmer.add_performance(Performance::from_record(record));

        let most_recent = Some(record.swim_date) > swimmer.last_swim_date;
        if most_recent {
            swimmer.last_swim_date = Some(record.swim_date);
        }
        let reassign = (most_recent || swimmer.club.is_none()) && club_id.is_some();
        if reassign {
            self.assign_club(swimmer_id, club_id);
        }

        self.quality.record_ingested();
        Ok(swimmer_id)
    }

    /// Attach a long-form id learned after resolution (the wire format
    /// delivers it on a separate line following the result line). Does not
    /// overwrite an id the swimmer already carries.
    pub fn attach_long_id(&mut self, swimmer_id: SwimmerId, long_id: &str) {
        if let Some(swimmer) = self.swimmers.get_mut(&swimmer_id) {
            swimmer.long_id.get_or_insert_with(|| long_id.to_string());
            self.by_long_id.insert(long_id.to_string(), swimmer_id);
        }
    }

    // ------------------------------------------------------------------
    // Merging
    // ------------------------------------------------------------------

    /// Merge two entities discovered to be the same person. The survivor
    /// absorbs every performance of the duplicate and the duplicate leaves
    /// the directory. Merging a swimmer with itself is a no-op.
    pub fn merge(
        &mut self,
        survivor: SwimmerId,
        duplicate: SwimmerId,
    ) -> Result<SwimmerId, MergeError> {
        if survivor == duplicate {
            return Ok(survivor);
        }
        if !self.swimmers.contains_key(&survivor) {
            return Err(MergeError::UnknownSwimmer);
        }
        let duplicate_entity = self
            .swimmers
            .remove(&duplicate)
            .ok_or(MergeError::UnknownSwimmer)?;

        // Drop the duplicate's club membership and remap its long id.
        if let Some(club) = duplicate_entity.club.and_then(|id| self.clubs.get_mut(&id)) {
            club.remove_swimmer(duplicate);
        }
        if let Some(long_id) = &duplicate_entity.long_id {
            self.by_long_id.insert(long_id.clone(), survivor);
        }

        let club_before = self.swimmers[&survivor].club;
        let swimmer = self.swimmers.get_mut(&survivor).expect("survivor exists");
        swimmer.absorb(duplicate_entity);
        let club_after = swimmer.club;

        // absorb() may have adopted the duplicate's more recent club; fix
        // the rosters to match.
        if club_after != club_before {
            if let Some(old) = club_before.and_then(|id| self.clubs.get_mut(&id)) {
                old.remove_swimmer(survivor);
            }
            if let Some(new) = club_after.and_then(|id| self.clubs.get_mut(&id)) {
                new.add_swimmer(survivor);
            }
        }

        debug!(?survivor, ?duplicate, "merged duplicate swimmer");
        Ok(survivor)
    }

    /// Sequential reconciliation pass: entities that share a short-form id
    /// are the same person recorded through different format generations.
    /// Runs after all files are loaded (parallel per-file ingestion must
    /// funnel into this single-threaded pass). Returns the number of merges.
    pub fn reconcile_short_ids(&mut self) -> usize {
        let mut by_short_id: HashMap<String, Vec<SwimmerId>> = HashMap::new();
        for swimmer in self.swimmers.values() {
            by_short_id
                .entry(swimmer.short_id.clone())
                .or_default()
                .push(swimmer.id);
        }

        let mut merges = 0;
        for (_, mut group) in by_short_id {
            if group.len() < 2 {
                continue;
            }
            // Survivor is the entity with the most recent swim.
            group.sort_by_key(|id| self.swimmers[id].last_swim_date);
            let survivor = *group.last().expect("non-empty group");
            for duplicate in group.into_iter().filter(|id| *id != survivor) {
                if self.merge(survivor, duplicate).is_ok() {
                    merges += 1;
                }
            }
        }
        merges
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdif::{Course, Event, Session, Sex, Stroke};
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn base_record() -> SwimRecord {
        SwimRecord {
            first_name: "Cy".to_string(),
            last_name: "Young".to_string(),
            middle_initial: Some('V'),
            sex: Sex::Male,
            short_id: "091879CY*VYO".to_string(),
            long_id: None,
            birthday: Some(d(1979, 9, 18)),
            age_class: "45".to_string(),
            event: Event::new(50, Stroke::Freestyle, Course::Scy).unwrap(),
            session: Session::Finals,
            swim_date: d(2025, 6, 1),
            final_time: "28.10".parse().unwrap(),
            seed_time: None,
            rank: None,
            points: None,
            team_code: Some("PCSC".to_string()),
            lsc_code: Some("PC".to_string()),
            meet_name: "Summer Open".to_string(),
        }
    }

    #[test]
    fn test_create_then_resolve_by_legacy_id() {
        let mut dir = Directory::new();
        let first = dir.ingest(&base_record()).unwrap();

        // Same birthday, name re-entered with a one-character difference.
        let mut again = base_record();
        again.first_name = "Sy".to_string();
        again.swim_date = d(2025, 6, 2);
        again.final_time = "27.90".parse().unwrap();
        let second = dir.ingest(&again).unwrap();

        assert_eq!(first, second);
        assert_eq!(dir.swimmer_count(), 1);
        assert_eq!(dir.swimmer(first).unwrap().performance_count(), 2);
    }

    #[test]
    fn test_resolve_by_long_id_first() {
        let mut dir = Directory::new();
        let mut record = base_record();
        record.long_id = Some("ABCD1234EFGH56".to_string());
        let id = dir.ingest(&record).unwrap();

        // Different name and no birthday, but the long id pins it.
        let mut modern = base_record();
        modern.long_id = Some("ABCD1234EFGH56".to_string());
        modern.birthday = None;
        modern.first_name = "Denton".to_string();
        assert_eq!(dir.ingest(&modern).unwrap(), id);
        assert_eq!(dir.swimmer_count(), 1);
    }

    #[test]
    fn test_resolve_by_name_and_age_class() {
        let mut dir = Directory::new();
        let mut seed = base_record();
        seed.birthday = None;
        seed.age_class = "45".to_string();
        let id = dir.ingest(&seed).unwrap();

        let mut later = base_record();
        later.birthday = None;
        later.age_class = "46".to_string();
        later.swim_date = d(2026, 5, 30);
        assert_eq!(dir.ingest(&later).unwrap(), id);
        assert_eq!(dir.swimmer_count(), 1);
    }

    #[test]
    fn test_age_class_outside_range_creates_new_swimmer() {
        let mut dir = Directory::new();
        let mut seed = base_record();
        seed.birthday = None;
        seed.age_class = "12".to_string();
        let id = dir.ingest(&seed).unwrap();

        // Same name but an age the first swimmer cannot be: a different person.
        let mut other = base_record();
        other.birthday = None;
        other.age_class = "45".to_string();
        other.swim_date = d(2025, 6, 2);
        let other_id = dir.ingest(&other).unwrap();
        assert_ne!(id, other_id);
        assert_eq!(dir.swimmer_count(), 2);
    }

    #[test]
    fn test_malformed_short_id_rejected() {
        let mut dir = Directory::new();
        let mut record = base_record();
        record.short_id = "091879CY".to_string();
        let err = dir.ingest(&record).unwrap_err();
        assert!(matches!(err, ResolveError::MalformedIdentifier { .. }));
        assert_eq!(dir.swimmer_count(), 0);
        assert_eq!(dir.quality().records_ingested, 0);
    }

    #[test]
    fn test_ambiguous_name_match_not_guessed() {
        let mut dir = Directory::new();

        // Two distinct swimmers, same name, born seven months apart.
        let mut a = base_record();
        a.birthday = Some(d(2013, 3, 1));
        a.age_class = "12".to_string();
        dir.ingest(&a).unwrap();
        let mut b = base_record();
        b.birthday = Some(d(2013, 9, 30));
        b.age_class = "11".to_string();
        b.swim_date = d(2025, 6, 2);
        dir.ingest(&b).unwrap();
        assert_eq!(dir.swimmer_count(), 2);

        // A birthday-less record on a date where both are 12: can't tell.
        let mut c = base_record();
        c.birthday = None;
        c.age_class = "12".to_string();
        c.swim_date = d(2025, 10, 15);
        let err = dir.ingest(&c).unwrap_err();
        assert_eq!(
            err,
            ResolveError::Ambiguous {
                name: "Young, Cy".to_string(),
                candidates: 2
            }
        );
        assert_eq!(dir.swimmer_count(), 2);
    }

    #[test]
    fn test_ambiguous_legacy_tie_not_guessed() {
        let mut dir = Directory::new();

        // Same birthday, encodings two apart from each other but one apart
        // from the incoming record: a tie that must not be guessed.
        let a = base_record(); // CY*V -> "091879CY*VYO"
        let mut b = base_record();
        b.first_name = "Dy".to_string();
        b.middle_initial = Some('W'); // "091879DY*WYO"
        b.swim_date = d(2025, 6, 2);
        dir.ingest(&a).unwrap();
        dir.ingest(&b).unwrap();
        assert_eq!(dir.swimmer_count(), 2);

        let mut c = base_record();
        c.middle_initial = Some('W'); // "091879CY*WYO": distance 1 to both
        c.swim_date = d(2025, 6, 3);
        let err = dir.ingest(&c).unwrap_err();
        assert!(matches!(err, ResolveError::Ambiguous { candidates: 2, .. }));
        assert_eq!(dir.swimmer_count(), 2);
    }

    #[test]
    fn test_minimum_distance_candidate_wins() {
        let mut dir = Directory::new();

        let a = base_record(); // exact encoding "091879CY*VYO"
        let mut b = base_record();
        b.first_name = "Dy".to_string();
        b.middle_initial = Some('W'); // "091879DY*WYO", distance 2 from a
        b.swim_date = d(2025, 6, 2);
        let a_id = dir.ingest(&a).unwrap();
        let b_id = dir.ingest(&b).unwrap();
        assert_ne!(a_id, b_id);
        assert_eq!(dir.swimmer_count(), 2);

        // Exact re-encounter of a: distance 0 to a, b outside the threshold.
        let mut c = base_record();
        c.swim_date = d(2025, 6, 3);
        assert_eq!(dir.ingest(&c).unwrap(), a_id);
        assert_eq!(dir.swimmer_count(), 2);
    }

    #[test]
    fn test_merge_lossless_and_idempotent() {
        let mut dir = Directory::new();
        let a = dir.ingest(&base_record()).unwrap();

        let mut other = base_record();
        other.birthday = None;
        other.first_name = "Denton".to_string();
        other.short_id = "DENTONXX0001".to_string();
        other.swim_date = d(2025, 7, 1);
        other.final_time = "27.50".parse().unwrap();
        let b = dir.ingest(&other).unwrap();
        assert_ne!(a, b);

        let total = dir.swimmer(a).unwrap().performance_count()
            + dir.swimmer(b).unwrap().performance_count();

        let survivor = dir.merge(a, b).unwrap();
        assert_eq!(survivor, a);
        assert_eq!(dir.swimmer_count(), 1);
        assert_eq!(dir.swimmer(a).unwrap().performance_count(), total);

        // Merging again with the same ids is a no-op, not an error.
        assert_eq!(dir.merge(a, a).unwrap(), a);
        assert_eq!(dir.merge(a, b).unwrap_err(), MergeError::UnknownSwimmer);
        assert_eq!(dir.swimmer(a).unwrap().performance_count(), total);
    }

    #[test]
    fn test_club_reassignment_only_on_most_recent_swim() {
        let mut dir = Directory::new();
        let id = dir.ingest(&base_record()).unwrap();
        let pcsc = dir.find_club("PCSC").unwrap().id;
        assert_eq!(dir.swimmer(id).unwrap().club, Some(pcsc));

        // An older swim at a different club must not move the swimmer.
        let mut old = base_record();
        old.team_code = Some("OSC".to_string());
        old.swim_date = d(2024, 1, 1);
        dir.ingest(&old).unwrap();
        assert_eq!(dir.swimmer(id).unwrap().club, Some(pcsc));

        // A newer swim at a different club does.
        let mut newer = base_record();
        newer.team_code = Some("OSC".to_string());
        newer.swim_date = d(2025, 8, 1);
        dir.ingest(&newer).unwrap();
        let osc = dir.find_club("OSC").unwrap().id;
        assert_eq!(dir.swimmer(id).unwrap().club, Some(osc));
        assert!(dir.club(pcsc).unwrap().swimmers.is_empty());
        assert_eq!(dir.club(osc).unwrap().swimmers, vec![id]);
    }

    #[test]
    fn test_inconsistent_age_reported_not_fatal() {
        let mut dir = Directory::new();
        let mut seed = base_record();
        seed.birthday = None;
        seed.long_id = Some("ABCD1234EFGH56".to_string());
        seed.age_class = "10".to_string();
        let id = dir.ingest(&seed).unwrap();

        // Same long id, but an age the interval cannot contain one day later.
        let mut bad = base_record();
        bad.birthday = None;
        bad.long_id = Some("ABCD1234EFGH56".to_string());
        bad.age_class = "15".to_string();
        bad.swim_date = d(2025, 6, 2);
        assert_eq!(dir.ingest(&bad).unwrap(), id);

        assert_eq!(dir.quality().count(IssueKind::InconsistentAgeData), 1);
        // The record itself was still ingested.
        assert_eq!(dir.swimmer(id).unwrap().performance_count(), 2);
        // And the interval kept its pre-contradiction bounds.
        assert_eq!(dir.swimmer(id).unwrap().age_range(d(2025, 6, 1)), (10, 10));
    }

    #[test]
    fn test_reconcile_short_ids() {
        let mut dir = Directory::new();

        // Old-format record with a birthday and a new-format record with a
        // non-numeric age class land as two entities with one short id.
        let a = dir.ingest(&base_record()).unwrap();
        let mut newer = base_record();
        newer.birthday = None;
        newer.age_class = "Sr".to_string();
        newer.swim_date = d(2025, 9, 1);
        let b = dir.ingest(&newer).unwrap();
        assert_ne!(a, b);
        assert_eq!(dir.swimmer_count(), 2);

        let merges = dir.reconcile_short_ids();
        assert_eq!(merges, 1);
        assert_eq!(dir.swimmer_count(), 1);
        let survivor = dir.swimmers().next().unwrap();
        assert_eq!(survivor.id, b);
        assert_eq!(survivor.performance_count(), 2);
        // The survivor keeps the duplicate's exact birthday.
        assert_eq!(survivor.birthday.exact(), Some(d(1979, 9, 18)));
    }
}
