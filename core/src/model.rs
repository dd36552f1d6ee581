use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Shelter identifier (primary key in the record store).
pub type ShelterId = u64;

/// Connection identifier.
pub type ConnectionId = u64;

/// Year a trail was established; the filtering key for graph builds.
pub type Year = i32;

/// A mountain shelter.
///
/// Equality and hashing look at `id` only: two records with the same id are
/// the same shelter even if their attributes differ.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shelter {
    pub id: ShelterId,
    pub name: String,
    pub locality: String,
    pub altitude: i32,
    pub capacity: u32,
    pub is_open: bool,
}

impl PartialEq for Shelter {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Shelter {}

impl Hash for Shelter {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Shelter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.locality)
    }
}

/// A trail between two shelters, tagged with the year it was recorded.
///
/// `distance`, `difficulty` and `duration` are carried as payload; no
/// traversal looks at them. Identity is `id` only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connection {
    pub id: ConnectionId,
    pub shelter_id1: ShelterId,
    pub shelter_id2: ShelterId,
    pub distance: f64,
    pub difficulty: String,
    pub duration: NaiveTime,
    pub year: Year,
}

impl Connection {
    pub fn endpoints(&self) -> (ShelterId, ShelterId) {
        (self.shelter_id1, self.shelter_id2)
    }

    pub fn is_self_loop(&self) -> bool {
        self.shelter_id1 == self.shelter_id2
    }
}

impl PartialEq for Connection {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Connection {}

impl Hash for Connection {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}
