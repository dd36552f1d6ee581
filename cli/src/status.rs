use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use shelter_graph_core::{ShelterEngine, Year};

use crate::config::Config;
use crate::store::CsvStore;

#[derive(Debug, Serialize)]
pub struct StatusOutput {
    pub shelters_file: PathBuf,
    pub connections_file: PathBuf,
    pub catalog_shelters: usize,
    pub default_year: Year,
    pub min_year: Year,
    pub max_year: Year,
    pub year: Year,
    pub status: &'static str,
    pub node_count: usize,
    pub edge_count: usize,
    pub memory_bytes: usize,
}

impl fmt::Display for StatusOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "shelters file:    {}", self.shelters_file.display())?;
        writeln!(f, "connections file: {}", self.connections_file.display())?;
        writeln!(f, "catalog:          {} shelters", self.catalog_shelters)?;
        writeln!(
            f,
            "years:            {}..={} (default {})",
            self.min_year, self.max_year, self.default_year
        )?;
        writeln!(
            f,
            "graph {}:       {} ({} nodes, {} edges, ~{} bytes)",
            self.year, self.status, self.node_count, self.edge_count, self.memory_bytes
        )
    }
}

/// Build the graph for `year` and report it alongside the configuration.
pub fn run(engine: &mut ShelterEngine<CsvStore>, config: &Config, year: Year) -> StatusOutput {
    let status = if engine.build_graph(year).is_loaded() {
        "loaded"
    } else {
        "store_failed"
    };
    let store = engine.store();
    let graph = engine.graph();

    StatusOutput {
        shelters_file: store.shelters_path().to_path_buf(),
        connections_file: store.connections_path().to_path_buf(),
        catalog_shelters: engine.catalog_len(),
        default_year: config.default_year,
        min_year: config.min_year,
        max_year: config.max_year,
        year,
        status,
        node_count: graph.node_count(),
        edge_count: graph.edge_count(),
        memory_bytes: graph.memory_usage(),
    }
}
