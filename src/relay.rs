// Relay generation - assemble the fastest legal 4-swimmer lineups from the
// historical best-time index.
//
// A full search over every eligible swimmer is combinatorially infeasible,
// so each leg is windowed to its top 4 remaining candidates and the best
// tuple is picked from the <= 256-entry Cartesian product. A materially
// faster swimmer always appears inside the top 4 of their best leg, which
// keeps the window empirically lossless for real rosters.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::directory::Directory;
use crate::entities::SwimmerId;
use crate::sdif::{Event, Sex, Stroke};
use crate::stime::Time;

/// Per-leg candidate window.
const LEG_WINDOW: usize = 4;

// ============================================================================
// SETTINGS & ASSIGNMENTS
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelaySettings {
    /// Team code of the club to draw swimmers from.
    pub club: String,
    pub sex: Sex,
    /// Target age range, inclusive.
    pub age_range: (u32, u32),
    /// Date the relay will be swum; eligibility is evaluated as of this day.
    pub relay_date: NaiveDate,
    pub num_relays: usize,
}

/// One swimmer's leg of a generated relay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayLeg {
    pub stroke: Stroke,
    pub event: Event,
    pub swimmer: SwimmerId,
    pub best_time: Time,
}

/// A complete 4-swimmer lineup. The projected total reuses the same
/// historical best times used for ranking; it is an optimistic projection,
/// not an observed result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayAssignment {
    pub legs: Vec<RelayLeg>,
    pub total_time: Time,
}

impl RelayAssignment {
    pub fn swimmers(&self) -> Vec<SwimmerId> {
        self.legs.iter().map(|leg| leg.swimmer).collect()
    }
}

// ============================================================================
// GENERATOR
// ============================================================================

/// Candidate pool entry: (swimmer, leg best time), ordered fastest first.
type Candidate = (SwimmerId, Time);

pub struct RelayGenerator {
    settings: RelaySettings,
}

impl RelayGenerator {
    pub fn new(settings: RelaySettings) -> RelayGenerator {
        RelayGenerator { settings }
    }

    pub fn settings(&self) -> &RelaySettings {
        &self.settings
    }

    /// Generate `num_relays` lineups for a relay event, fastest first.
    /// Slots that cannot be filled (empty leg pool, or fewer than 4 distinct
    /// swimmers) come back as `None` rather than an error. Non-relay events
    /// produce no lineups.
    pub fn generate(&self, directory: &Directory, event: Event) -> Vec<Option<RelayAssignment>> {
        let legs = match event.legs() {
            Some(legs) => legs,
            None => return Vec::new(),
        };

        let eligible = self.eligible_swimmers(directory);
        debug!(
            club = %self.settings.club,
            eligible = eligible.len(),
            %event,
            "generating relays"
        );

        // Per-leg pools, sorted ascending by best time. Name is the
        // tie-break so equal times rank deterministically.
        let mut pools: Vec<Vec<Candidate>> = legs
            .iter()
            .map(|leg_event| {
                let mut pool: Vec<(&str, &str, Candidate)> = eligible
                    .iter()
                    .filter_map(|id| {
                        let swimmer = directory.swimmer(*id)?;
                        let best = swimmer.best_time(*leg_event)?;
                        Some((
                            swimmer.last_name.as_str(),
                            swimmer.first_name.as_str(),
                            (*id, best),
                        ))
                    })
                    .collect();
                pool.sort_by(|a, b| (a.2 .1, a.0, a.1).cmp(&(b.2 .1, b.0, b.1)));
                pool.into_iter().map(|(_, _, candidate)| candidate).collect()
            })
            .collect();

        let mut assignments = Vec::with_capacity(self.settings.num_relays);
        for _ in 0..self.settings.num_relays {
            match best_lineup(&pools) {
                Some(lineup) => {
                    let chosen: Vec<SwimmerId> = lineup.iter().map(|(id, _)| *id).collect();
                    for pool in pools.iter_mut() {
                        pool.retain(|(id, _)| !chosen.contains(id));
                    }
                    let legs: Vec<RelayLeg> = lineup
                        .iter()
                        .zip(legs.iter())
                        .map(|(&(swimmer, best_time), leg_event)| RelayLeg {
                            stroke: leg_event.stroke(),
                            event: *leg_event,
                            swimmer,
                            best_time,
                        })
                        .collect();
                    let total_time = legs.iter().map(|leg| leg.best_time).sum();
                    assignments.push(Some(RelayAssignment { legs, total_time }));
                }
                None => assignments.push(None),
            }
        }
        assignments
    }

    /// Swimmers from the configured club matching sex exactly and whose
    /// possible age range overlaps the target range on the relay date.
    /// Overlap rather than containment: birthdays may be unknown, so anyone
    /// who might be the right age is kept.
    fn eligible_swimmers(&self, directory: &Directory) -> Vec<SwimmerId> {
        let club = match directory.find_club(&self.settings.club) {
            Some(club) => club,
            None => return Vec::new(),
        };
        let (target_min, target_max) = self.settings.age_range;
        directory
            .club_swimmers(club.id)
            .into_iter()
            .filter(|swimmer| swimmer.sex == self.settings.sex)
            .filter(|swimmer| {
                let (min_age, max_age) = swimmer.age_range(self.settings.relay_date);
                min_age <= target_max && max_age >= target_min
            })
            .map(|swimmer| swimmer.id)
            .collect()
    }
}

/// The minimum-total lineup over the top-`LEG_WINDOW` window of each pool.
/// Tuples without 4 pairwise-distinct swimmers are discarded; ties keep the
/// first tuple in product order. `None` when a pool is empty or no distinct
/// tuple exists.
fn best_lineup(pools: &[Vec<Candidate>]) -> Option<[Candidate; 4]> {
    if pools.iter().any(Vec::is_empty) {
        return None;
    }
    let window =
        |pool: &[Candidate]| -> Vec<Candidate> { pool.iter().take(LEG_WINDOW).copied().collect() };
    let (w0, w1, w2, w3) = (
        window(&pools[0]),
        window(&pools[1]),
        window(&pools[2]),
        window(&pools[3]),
    );

    let mut best: Option<([Candidate; 4], Time)> = None;
    for &c0 in &w0 {
        for &c1 in &w1 {
            for &c2 in &w2 {
                for &c3 in &w3 {
                    let lineup = [c0, c1, c2, c3];
                    if !pairwise_distinct(&lineup) {
                        continue;
                    }
                    let total: Time = lineup.iter().map(|(_, time)| *time).sum();
                    match &best {
                        Some((_, best_total)) if total >= *best_total => {}
                        _ => best = Some((lineup, total)),
                    }
                }
            }
        }
    }
    best.map(|(lineup, _)| lineup)
}

fn pairwise_distinct(lineup: &[Candidate; 4]) -> bool {
    for i in 0..4 {
        for j in (i + 1)..4 {
            if lineup[i].0 == lineup[j].0 {
                return false;
            }
        }
    }
    true
}

// ============================================================================
// TESTS
// ============================================================================
