use std::fmt;

use serde::Serialize;
use shelter_graph_core::{BuildReport, BuildStatus, RecordStore, ShelterEngine, Year};

/// Result of the `build` command.
#[derive(Debug, Serialize)]
pub struct BuildOutput {
    #[serde(flatten)]
    pub report: BuildReport,
    pub components: usize,
}

impl fmt::Display for BuildOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = &self.report;
        match &r.status {
            BuildStatus::Loaded => writeln!(f, "graph built for year <= {}", r.year)?,
            BuildStatus::StoreFailed(reason) => {
                writeln!(f, "graph for year <= {} is empty: {}", r.year, reason)?
            }
        }
        writeln!(f, "  connections read: {}", r.connections_read)?;
        writeln!(f, "  orphan connections: {}", r.orphan_connections)?;
        writeln!(f, "  self-loops: {}", r.self_loops)?;
        writeln!(f, "  nodes: {}", r.node_count)?;
        writeln!(f, "  edges: {}", r.edge_count)?;
        writeln!(f, "  components: {}", self.components)?;
        writeln!(f, "  load time: {:.2}ms", r.load_time_ms)
    }
}

pub fn run<S: RecordStore>(engine: &mut ShelterEngine<S>, year: Year) -> BuildOutput {
    let report = engine.build_graph(year);
    BuildOutput {
        report,
        components: engine.num_connected_components(),
    }
}
