use std::fmt;

use serde::Serialize;
use shelter_graph_core::{RecordStore, ShelterEngine, Year};

#[derive(Debug, Serialize)]
pub struct ComponentsOutput {
    pub year: Year,
    pub nodes: usize,
    pub edges: usize,
    pub components: usize,
}

impl fmt::Display for ComponentsOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "year <= {}: {} shelters, {} trails, {} connected components",
            self.year, self.nodes, self.edges, self.components
        )
    }
}

pub fn run<S: RecordStore>(engine: &ShelterEngine<S>, year: Year) -> ComponentsOutput {
    let graph = engine.graph();
    ComponentsOutput {
        year,
        nodes: graph.node_count(),
        edges: graph.edge_count(),
        components: engine.num_connected_components(),
    }
}
