use std::fmt;

use clap::ValueEnum;
use serde::Serialize;
use shelter_graph_core::{RecordStore, ShelterEngine, ShelterId};

use crate::output::{sort_rows, ShelterRow};
use crate::util::resolve_node;

/// Which traversal answers a reachability query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    /// Breadth-first spanning tree.
    Tree,
    /// FIFO worklist.
    Iterative,
    /// Recursive depth-first search.
    Recursive,
    /// Spanning tree cross-checked against the worklist.
    All,
}

#[derive(Debug, Serialize)]
pub struct ReachableOutput {
    pub start: ShelterRow,
    pub method: Method,
    pub reachable: Vec<ShelterRow>,
}

impl fmt::Display for ReachableOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} shelters reachable from {}({})",
            self.reachable.len(),
            self.start.name,
            self.start.locality
        )?;
        for row in &self.reachable {
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}

pub fn run<S: RecordStore>(
    engine: &ShelterEngine<S>,
    start_id: ShelterId,
    method: Method,
) -> anyhow::Result<ReachableOutput> {
    let start = resolve_node(engine, start_id)?;

    let found = match method {
        Method::Tree => engine.reachable_tree(start)?,
        Method::Iterative => engine.reachable_iterative(start)?,
        Method::Recursive => engine.reachable_recursive(start)?,
        Method::All => engine.reachable(start)?,
    };

    let mut reachable: Vec<ShelterRow> = found
        .into_iter()
        .map(|s| ShelterRow::new(s, engine.num_neighbors(s)))
        .collect();
    sort_rows(&mut reachable);

    Ok(ReachableOutput {
        start: ShelterRow::new(start, engine.num_neighbors(start)),
        method,
        reachable,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::{write_dataset, CONNECTIONS, SHELTERS};

    fn engine_2010() -> (tempfile::TempDir, ShelterEngine<crate::store::CsvStore>) {
        let (dir, store) = write_dataset(SHELTERS, CONNECTIONS);
        let mut engine = ShelterEngine::new(store);
        engine.build_graph(2010);
        (dir, engine)
    }

    #[test]
    fn test_every_method_agrees() {
        let (_dir, engine) = engine_2010();
        for method in [Method::Tree, Method::Iterative, Method::Recursive, Method::All] {
            let out = run(&engine, 1, method).unwrap();
            let ids: Vec<_> = out.reachable.iter().map(|r| r.id).collect();
            assert_eq!(ids, vec![2, 3], "method {method:?}");
        }
    }

    #[test]
    fn test_unknown_shelter() {
        let (_dir, engine) = engine_2010();
        let err = run(&engine, 42, Method::All).unwrap_err();
        assert!(err.to_string().contains("42"));
    }

    #[test]
    fn test_shelter_outside_graph() {
        let (dir, store) = write_dataset(SHELTERS, CONNECTIONS);
        let mut engine = ShelterEngine::new(store);
        engine.build_graph(2000);
        let err = run(&engine, 3, Method::Tree).unwrap_err();
        assert!(err.to_string().contains("not a node"));
        drop(dir);
    }

    #[test]
    fn test_display() {
        let (_dir, engine) = engine_2010();
        let text = run(&engine, 3, Method::Recursive).unwrap().to_string();
        assert!(text.starts_with("2 shelters reachable from Rifugio C(Canazei)"));
    }
}
