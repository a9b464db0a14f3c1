// relaycraft - swim meet results model and relay lineup generator
// Exposes all modules for use in the CLI and tests

pub mod birthday;
pub mod directory;
pub mod entities;
pub mod identity;
pub mod parser;
pub mod quality;
pub mod record;
pub mod relay;
pub mod sdif;
pub mod stime;
pub mod timestandard;

// Re-export commonly used types
pub use birthday::{Birthday, BirthdayError, BirthdayRange};
pub use directory::{Directory, MergeError, ResolveError};
pub use entities::{Club, ClubId, Performance, Swimmer, SwimmerId};
pub use identity::{
    encode_legacy_id, encode_legacy_id_short, hamming_distance, is_legacy_id, SHORT_ID_LEN,
};
pub use parser::{read_cl2_dir, Cl2Parser};
pub use quality::{IssueKind, QualityIssue, QualityReport, Severity};
pub use record::SwimRecord;
pub use relay::{RelayAssignment, RelayGenerator, RelayLeg, RelaySettings};
pub use sdif::{AgeGroup, Course, Event, Session, Sex, Stroke};
pub use stime::Time;
pub use timestandard::{TimeStandard, TimeStandards};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
