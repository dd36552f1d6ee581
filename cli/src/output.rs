use std::fmt;

use serde::Serialize;
use shelter_graph_core::Shelter;

/// One shelter line in command output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShelterRow {
    pub id: u64,
    pub name: String,
    pub locality: String,
    pub altitude: i32,
    pub degree: usize,
}

impl ShelterRow {
    pub fn new(shelter: &Shelter, degree: usize) -> Self {
        Self {
            id: shelter.id,
            name: shelter.name.clone(),
            locality: shelter.locality.clone(),
            altitude: shelter.altitude,
            degree,
        }
    }
}

impl fmt::Display for ShelterRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>6}  {}({})  {}m  neighbors={}",
            self.id, self.name, self.locality, self.altitude, self.degree
        )
    }
}

/// Sort rows by name, then id, so listings are stable across runs.
pub fn sort_rows(rows: &mut [ShelterRow]) {
    rows.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
}

/// Print `value` as pretty JSON or through its `Display` impl.
pub fn emit<T: Serialize + fmt::Display>(value: &T, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print!("{value}");
    }
    Ok(())
}
