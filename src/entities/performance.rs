// Performance - one immutable recorded swim. Created during ingestion and
// never mutated afterward; the owning swimmer's event index keeps them
// grouped by event and ordered by date.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::record::SwimRecord;
use crate::sdif::{Event, Session};
use crate::stime::Time;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Performance {
    pub event: Event,
    pub session: Session,
    pub date: NaiveDate,
    pub final_time: Time,
    pub seed_time: Option<Time>,
    pub rank: Option<u32>,
    pub points: Option<f64>,

    /// Affiliation at time of swim, kept verbatim from the record.
    pub team_code: Option<String>,
    pub lsc_code: Option<String>,
    pub meet_name: String,
}

impl Performance {
    pub fn from_record(record: &SwimRecord) -> Performance {
        Performance {
            event: record.event,
            session: record.session,
            date: record.swim_date,
            final_time: record.final_time,
            seed_time: record.seed_time,
            rank: record.rank,
            points: record.points,
            team_code: record.team_code.clone(),
            lsc_code: record.lsc_code.clone(),
            meet_name: record.meet_name.clone(),
        }
    }
}
