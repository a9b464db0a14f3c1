// Club entity. Rosters hold swimmer ids rather than references; all lookups
// go through the directory arena.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::swimmer::SwimmerId;
use crate::sdif::lsc_name;

/// Stable surrogate id for a club.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClubId(Uuid);

impl ClubId {
    pub fn new() -> ClubId {
        ClubId(Uuid::new_v4())
    }
}

impl Default for ClubId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Club {
    pub id: ClubId,
    /// Four-character team code from the wire format.
    pub team_code: String,
    /// Two-character regional (LSC) code, when attached.
    pub lsc_code: Option<String>,
    pub name: String,
    /// Roster of member swimmers, by id.
    pub swimmers: Vec<SwimmerId>,
}

impl Club {
    pub fn new(team_code: &str, lsc_code: Option<&str>, name: &str) -> Club {
        Club {
            id: ClubId::new(),
            team_code: team_code.to_string(),
            lsc_code: lsc_code.map(str::to_string),
            name: name.to_string(),
            swimmers: Vec::new(),
        }
    }

    pub fn add_swimmer(&mut self, swimmer: SwimmerId) {
        if !self.swimmers.contains(&swimmer) {
            self.swimmers.push(swimmer);
        }
    }

    pub fn remove_swimmer(&mut self, swimmer: SwimmerId) {
        self.swimmers.retain(|s| *s != swimmer);
    }

    /// Full LSC name for display, when the code is a known one.
    pub fn region_name(&self) -> Option<&'static str> {
        self.lsc_code.as_deref().and_then(lsc_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roster_add_remove() {
        let mut club = Club::new("PCSC", Some("PC"), "Pacific Swim Club");
        let a = SwimmerId::new();
        let b = SwimmerId::new();

        club.add_swimmer(a);
        club.add_swimmer(a); // no duplicate entries
        club.add_swimmer(b);
        assert_eq!(club.swimmers.len(), 2);

        club.remove_swimmer(a);
        assert_eq!(club.swimmers, vec![b]);
    }

    #[test]
    fn test_region_name() {
        let club = Club::new("PCSC", Some("PC"), "Pacific Swim Club");
        assert_eq!(club.region_name(), Some("Pacific"));

        let unattached = Club::new("XXXX", None, "Unknown");
        assert_eq!(unattached.region_name(), None);
    }
}
