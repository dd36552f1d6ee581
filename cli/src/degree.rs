use std::fmt;

use serde::Serialize;
use shelter_graph_core::{RecordStore, ShelterEngine};

use crate::output::ShelterRow;

/// Shelters ranked by number of neighbors.
#[derive(Debug, Serialize)]
pub struct DegreeOutput {
    pub ranking: Vec<ShelterRow>,
}

impl fmt::Display for DegreeOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (rank, row) in self.ranking.iter().enumerate() {
            writeln!(f, "{:>4}. {row}", rank + 1)?;
        }
        Ok(())
    }
}

/// Top `top_n` shelters by degree; 0 lists all of them.
pub fn run<S: RecordStore>(engine: &ShelterEngine<S>, top_n: usize) -> DegreeOutput {
    let ranking = engine
        .degree_centrality(top_n)
        .into_iter()
        .map(|(shelter, degree)| ShelterRow::new(shelter, degree as usize))
        .collect();
    DegreeOutput { ranking }
}
