// Entity models for the in-memory swim database.
//
// Entities live in the directory arena keyed by stable surrogate ids;
// cross-references (club roster, swimmer's club) are ids, not pointers,
// so a merge is a reindex rather than pointer surgery.

pub mod club;
pub mod performance;
pub mod swimmer;

pub use club::{Club, ClubId};
pub use performance::Performance;
pub use swimmer::{Swimmer, SwimmerId};
