use std::fmt;

use serde::Serialize;
use shelter_graph_core::{RecordStore, ShelterEngine};

use crate::output::{sort_rows, ShelterRow};

/// Graph shelters with their neighbor counts.
#[derive(Debug, Serialize)]
pub struct NodesOutput {
    pub shelters: Vec<ShelterRow>,
}

impl fmt::Display for NodesOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} shelters in graph", self.shelters.len())?;
        for row in &self.shelters {
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}

pub fn run<S: RecordStore>(engine: &ShelterEngine<S>) -> NodesOutput {
    let mut shelters: Vec<ShelterRow> = engine
        .nodes()
        .into_iter()
        .map(|s| ShelterRow::new(s, engine.num_neighbors(s)))
        .collect();
    sort_rows(&mut shelters);
    NodesOutput { shelters }
}
