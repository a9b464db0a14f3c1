// SDIF code tables - closed enumerations for the values the CL2 wire format
// encodes as single characters, plus the catalog of legal events.
// Codes follow the USA Swimming Standard Interchange Format tables
// (SEX Code 010, STROKE Code 012, COURSE Code 013, PRELIMS/FINALS Code 019).

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodeError {
    #[error("unknown sex code: '{0}'")]
    Sex(String),

    #[error("unknown stroke code: '{0}'")]
    Stroke(String),

    #[error("unknown course code: '{0}'")]
    Course(String),

    #[error("unknown session code: '{0}'")]
    Session(String),

    #[error("event not in catalog: {0} x {1:?} {2:?}")]
    InvalidEvent(u32, Stroke, Course),
}

// ============================================================================
// SEX
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
    /// Event-sex only; individual swimmers are always M or F.
    Mixed,
}

impl Sex {
    pub fn from_code(code: &str) -> Result<Sex, CodeError> {
        match code {
            "M" => Ok(Sex::Male),
            "F" => Ok(Sex::Female),
            "X" => Ok(Sex::Mixed),
            other => Err(CodeError::Sex(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "Male",
            Sex::Female => "Female",
            Sex::Mixed => "Mixed",
        }
    }
}

// ============================================================================
// STROKE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stroke {
    Freestyle,
    Backstroke,
    Breaststroke,
    Butterfly,
    IndividualMedley,
    FreestyleRelay,
    MedleyRelay,
}

impl Stroke {
    pub fn from_code(code: &str) -> Result<Stroke, CodeError> {
        match code {
            "1" => Ok(Stroke::Freestyle),
            "2" => Ok(Stroke::Backstroke),
            "3" => Ok(Stroke::Breaststroke),
            "4" => Ok(Stroke::Butterfly),
            "5" => Ok(Stroke::IndividualMedley),
            "6" => Ok(Stroke::FreestyleRelay),
            "7" => Ok(Stroke::MedleyRelay),
            other => Err(CodeError::Stroke(other.to_string())),
        }
    }

    pub fn is_relay(&self) -> bool {
        matches!(self, Stroke::FreestyleRelay | Stroke::MedleyRelay)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stroke::Freestyle => "Free",
            Stroke::Backstroke => "Back",
            Stroke::Breaststroke => "Breast",
            Stroke::Butterfly => "Fly",
            Stroke::IndividualMedley => "IM",
            Stroke::FreestyleRelay => "Free Relay",
            Stroke::MedleyRelay => "Medley Relay",
        }
    }
}

impl fmt::Display for Stroke {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// COURSE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Course {
    /// Short-course meters
    Scm,
    /// Short-course yards
    Scy,
    /// Long-course meters
    Lcm,
}

impl Course {
    /// The wire format encodes courses both numerically and alphabetically.
    pub fn from_code(code: &str) -> Result<Course, CodeError> {
        match code {
            "1" | "S" => Ok(Course::Scm),
            "2" | "Y" => Ok(Course::Scy),
            "3" | "L" => Ok(Course::Lcm),
            other => Err(CodeError::Course(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Course::Scm => "SCM",
            Course::Scy => "SCY",
            Course::Lcm => "LCM",
        }
    }
}

impl fmt::Display for Course {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SESSION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Session {
    Prelims,
    SwimOff,
    Finals,
}

impl Session {
    pub fn from_code(code: &str) -> Result<Session, CodeError> {
        match code {
            "P" => Ok(Session::Prelims),
            "S" => Ok(Session::SwimOff),
            "F" => Ok(Session::Finals),
            other => Err(CodeError::Session(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Session::Prelims => "Prelims",
            Session::SwimOff => "Swim-off",
            Session::Finals => "Finals",
        }
    }
}

// ============================================================================
// EVENT CATALOG
// ============================================================================

/// Every legal individual (distance, stroke, course) combination.
/// Relay events are validated through their leg events instead.
const VALID_EVENTS: &[(u32, Stroke, Course)] = &[
    // SCY freestyle through IM
    (25, Stroke::Freestyle, Course::Scy),
    (50, Stroke::Freestyle, Course::Scy),
    (100, Stroke::Freestyle, Course::Scy),
    (200, Stroke::Freestyle, Course::Scy),
    (400, Stroke::Freestyle, Course::Scy),
    (500, Stroke::Freestyle, Course::Scy),
    (800, Stroke::Freestyle, Course::Scy),
    (1000, Stroke::Freestyle, Course::Scy),
    (1650, Stroke::Freestyle, Course::Scy),
    (25, Stroke::Backstroke, Course::Scy),
    (50, Stroke::Backstroke, Course::Scy),
    (100, Stroke::Backstroke, Course::Scy),
    (200, Stroke::Backstroke, Course::Scy),
    (25, Stroke::Breaststroke, Course::Scy),
    (50, Stroke::Breaststroke, Course::Scy),
    (100, Stroke::Breaststroke, Course::Scy),
    (200, Stroke::Breaststroke, Course::Scy),
    (25, Stroke::Butterfly, Course::Scy),
    (50, Stroke::Butterfly, Course::Scy),
    (100, Stroke::Butterfly, Course::Scy),
    (200, Stroke::Butterfly, Course::Scy),
    (100, Stroke::IndividualMedley, Course::Scy),
    (200, Stroke::IndividualMedley, Course::Scy),
    (400, Stroke::IndividualMedley, Course::Scy),
    // SCM
    (25, Stroke::Freestyle, Course::Scm),
    (50, Stroke::Freestyle, Course::Scm),
    (100, Stroke::Freestyle, Course::Scm),
    (200, Stroke::Freestyle, Course::Scm),
    (400, Stroke::Freestyle, Course::Scm),
    (800, Stroke::Freestyle, Course::Scm),
    (1500, Stroke::Freestyle, Course::Scm),
    (25, Stroke::Backstroke, Course::Scm),
    (50, Stroke::Backstroke, Course::Scm),
    (100, Stroke::Backstroke, Course::Scm),
    (200, Stroke::Backstroke, Course::Scm),
    (25, Stroke::Breaststroke, Course::Scm),
    (50, Stroke::Breaststroke, Course::Scm),
    (100, Stroke::Breaststroke, Course::Scm),
    (200, Stroke::Breaststroke, Course::Scm),
    (25, Stroke::Butterfly, Course::Scm),
    (50, Stroke::Butterfly, Course::Scm),
    (100, Stroke::Butterfly, Course::Scm),
    (200, Stroke::Butterfly, Course::Scm),
    (100, Stroke::IndividualMedley, Course::Scm),
    (200, Stroke::IndividualMedley, Course::Scm),
    (400, Stroke::IndividualMedley, Course::Scm),
    // LCM
    (50, Stroke::Freestyle, Course::Lcm),
    (100, Stroke::Freestyle, Course::Lcm),
    (200, Stroke::Freestyle, Course::Lcm),
    (400, Stroke::Freestyle, Course::Lcm),
    (800, Stroke::Freestyle, Course::Lcm),
    (1500, Stroke::Freestyle, Course::Lcm),
    (50, Stroke::Backstroke, Course::Lcm),
    (100, Stroke::Backstroke, Course::Lcm),
    (200, Stroke::Backstroke, Course::Lcm),
    (50, Stroke::Breaststroke, Course::Lcm),
    (100, Stroke::Breaststroke, Course::Lcm),
    (200, Stroke::Breaststroke, Course::Lcm),
    (50, Stroke::Butterfly, Course::Lcm),
    (100, Stroke::Butterfly, Course::Lcm),
    (200, Stroke::Butterfly, Course::Lcm),
    (200, Stroke::IndividualMedley, Course::Lcm),
    (400, Stroke::IndividualMedley, Course::Lcm),
];

/// A swim event. Construction is checked against the event catalog, so an
/// `Event` value is always a legal combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Event {
    distance: u32,
    stroke: Stroke,
    course: Course,
}

impl Event {
    pub fn new(distance: u32, stroke: Stroke, course: Course) -> Result<Event, CodeError> {
        let legal = if stroke.is_relay() {
            distance % 4 == 0
                && Event::new(distance / 4, Stroke::Freestyle, course).is_ok()
                && (stroke == Stroke::FreestyleRelay
                    || Event::leg_strokes(stroke)
                        .iter()
                        .all(|s| Event::new(distance / 4, *s, course).is_ok()))
        } else {
            VALID_EVENTS.contains(&(distance, stroke, course))
        };

        if legal {
            Ok(Event {
                distance,
                stroke,
                course,
            })
        } else {
            Err(CodeError::InvalidEvent(distance, stroke, course))
        }
    }

    pub fn distance(&self) -> u32 {
        self.distance
    }

    pub fn stroke(&self) -> Stroke {
        self.stroke
    }

    pub fn course(&self) -> Course {
        self.course
    }

    /// All individual events, in catalog order. Used for full-history walks.
    pub fn catalog() -> impl Iterator<Item = Event> {
        VALID_EVENTS.iter().map(|&(d, s, c)| Event {
            distance: d,
            stroke: s,
            course: c,
        })
    }

    /// Leg stroke order for a relay stroke. Medley relays swim back, breast,
    /// fly, free; freestyle relays swim four freestyle legs.
    pub fn leg_strokes(stroke: Stroke) -> [Stroke; 4] {
        match stroke {
            Stroke::MedleyRelay => [
                Stroke::Backstroke,
                Stroke::Breaststroke,
                Stroke::Butterfly,
                Stroke::Freestyle,
            ],
            _ => [Stroke::Freestyle; 4],
        }
    }

    /// The four leg events of a relay event, in swim order.
    pub fn legs(&self) -> Option<[Event; 4]> {
        if !self.stroke.is_relay() {
            return None;
        }
        let leg_distance = self.distance / 4;
        let strokes = Event::leg_strokes(self.stroke);
        let mut legs = [*self; 4];
        for (leg, stroke) in legs.iter_mut().zip(strokes) {
            *leg = Event::new(leg_distance, stroke, self.course).ok()?;
        }
        Some(legs)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.distance, self.stroke, self.course)
    }
}

// ============================================================================
// AGE GROUPS
// ============================================================================

/// Standard competition age groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeGroup {
    TenUnder,
    ElevenTwelve,
    ThirteenFourteen,
    FifteenSixteen,
    SeventeenEighteen,
    Senior,
}

impl AgeGroup {
    pub fn range(&self) -> (u32, u32) {
        match self {
            AgeGroup::TenUnder => (0, 10),
            AgeGroup::ElevenTwelve => (11, 12),
            AgeGroup::ThirteenFourteen => (13, 14),
            AgeGroup::FifteenSixteen => (15, 16),
            AgeGroup::SeventeenEighteen => (17, 18),
            AgeGroup::Senior => (13, 100),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AgeGroup::TenUnder => "10&u",
            AgeGroup::ElevenTwelve => "11-12",
            AgeGroup::ThirteenFourteen => "13-14",
            AgeGroup::FifteenSixteen => "15-16",
            AgeGroup::SeventeenEighteen => "17-18",
            AgeGroup::Senior => "senior",
        }
    }

    pub fn from_label(label: &str) -> Option<AgeGroup> {
        match label {
            "10&u" => Some(AgeGroup::TenUnder),
            "11-12" => Some(AgeGroup::ElevenTwelve),
            "13-14" => Some(AgeGroup::ThirteenFourteen),
            "15-16" => Some(AgeGroup::FifteenSixteen),
            "17-18" => Some(AgeGroup::SeventeenEighteen),
            "senior" => Some(AgeGroup::Senior),
            _ => None,
        }
    }

    pub fn all() -> [AgeGroup; 6] {
        [
            AgeGroup::TenUnder,
            AgeGroup::ElevenTwelve,
            AgeGroup::ThirteenFourteen,
            AgeGroup::FifteenSixteen,
            AgeGroup::SeventeenEighteen,
            AgeGroup::Senior,
        ]
    }
}

// ============================================================================
// LSC
// ============================================================================

/// Name for an LSC (regional subdivision) code, if the code is known.
pub fn lsc_name(code: &str) -> Option<&'static str> {
    let name = match code {
        "AD" => "Adirondack",
        "AK" => "Alaska",
        "AM" => "Allegheny Mountain",
        "AR" => "Arkansas",
        "AZ" => "Arizona",
        "BD" => "Border",
        "CA" => "Southern California",
        "CC" => "Central California",
        "CO" => "Colorado",
        "CT" => "Connecticut",
        "FG" => "Florida Gold Coast",
        "FL" => "Florida",
        "GA" => "Georgia",
        "GU" => "Gulf",
        "HI" => "Hawaii",
        "IA" => "Iowa",
        "IE" => "Inland Empire",
        "IL" => "Illinois",
        "IN" => "Indiana",
        "KY" => "Kentucky",
        "LA" => "Louisiana",
        "LE" => "Lake Erie",
        "MA" => "Middle Atlantic",
        "MD" => "Maryland",
        "ME" => "Maine",
        "MI" => "Michigan",
        "MN" => "Minnesota",
        "MR" => "Metropolitan",
        "MS" => "Mississippi",
        "MT" => "Montana",
        "MV" => "Missouri Valley",
        "MW" => "Midwestern",
        "NC" => "North Carolina",
        "ND" => "North Dakota",
        "NE" => "New England",
        "NI" => "Niagara",
        "NJ" => "New Jersey",
        "NM" => "New Mexico",
        "NT" => "North Texas",
        "OH" => "Ohio",
        "OK" => "Oklahoma",
        "OR" => "Oregon",
        "OZ" => "Ozark",
        "PC" => "Pacific",
        "PN" => "Pacific Northwest",
        "PV" => "Potomac Valley",
        "SC" => "South Carolina",
        "SD" => "South Dakota",
        "SE" => "Southeastern",
        "SI" => "San Diego Imperial",
        "SN" => "Sierra Nevada",
        "SR" => "Snake River",
        "ST" => "South Texas",
        "UT" => "Utah",
        "VA" => "Virginia",
        "WI" => "Wisconsin",
        "WT" => "West Texas",
        "WV" => "West Virginia",
        "WY" => "Wyoming",
        "UN" => "Unattached",
        _ => return None,
    };
    Some(name)
}

// ============================================================================
// TESTS
// ============================================================================
