use std::collections::{HashMap, HashSet};
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::error::{EngineError, Result};
use crate::graph::Graph;
use crate::model::{Shelter, ShelterId, Year};
use crate::store::RecordStore;
use crate::traversal::{self, DegreeResult};

/// Outcome of the connection read behind a graph build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum BuildStatus {
    /// Connections were read and the graph reflects them.
    Loaded,
    /// The store failed; the graph was left empty.
    StoreFailed(String),
}

/// Summary of one `build_graph` call.
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub year: Year,
    pub status: BuildStatus,
    /// Connections returned by the store that passed the year filter.
    pub connections_read: usize,
    /// Connections dropped because an endpoint is missing from the catalog.
    pub orphan_connections: usize,
    /// Usable connections whose endpoints are the same shelter.
    pub self_loops: usize,
    pub node_count: usize,
    pub edge_count: usize,
    pub load_time_ms: f64,
}

impl BuildReport {
    pub fn is_loaded(&self) -> bool {
        self.status == BuildStatus::Loaded
    }
}

/// Owns the shelter catalog and the current trail graph.
///
/// The catalog is read once at construction. `build_graph` is the only
/// mutator: it clears the graph and repopulates it, so queries must not run
/// concurrently with a rebuild.
pub struct ShelterEngine<S: RecordStore> {
    store: S,
    catalog: HashMap<ShelterId, Shelter>,
    graph: Graph,
    last_build: Option<BuildReport>,
}

impl<S: RecordStore> ShelterEngine<S> {
    /// Load the shelter catalog from `store`.
    ///
    /// A store failure leaves the catalog empty; every later build then
    /// yields an empty graph.
    pub fn new(store: S) -> Self {
        let catalog: HashMap<ShelterId, Shelter> = match store.read_shelters() {
            Ok(shelters) => shelters.into_iter().map(|s| (s.id, s)).collect(),
            Err(e) => {
                warn!(error = %e, "shelter read failed; catalog is empty");
                HashMap::new()
            }
        };
        debug!(shelters = catalog.len(), "catalog loaded");

        Self {
            store,
            catalog,
            graph: Graph::new(),
            last_build: None,
        }
    }

    /// Rebuild the graph from connections with `year <= cutoff`.
    ///
    /// A connection is usable when both endpoints are catalog shelters; nodes
    /// are exactly the endpoints of usable connections, so a connection with
    /// a dangling endpoint contributes neither node nor edge. A connection
    /// from a shelter to itself adds that shelter with a loop edge.
    /// Store failures are logged and reported in the returned
    /// [`BuildReport`], never raised.
    pub fn build_graph(&mut self, year: Year) -> BuildReport {
        let start = Instant::now();
        self.graph.clear();

        let connections = match self.store.read_connections(year) {
            Ok(connections) => connections,
            Err(e) => {
                warn!(year, error = %e, "connection read failed; graph left empty");
                let report = BuildReport {
                    year,
                    status: BuildStatus::StoreFailed(e.to_string()),
                    connections_read: 0,
                    orphan_connections: 0,
                    self_loops: 0,
                    node_count: 0,
                    edge_count: 0,
                    load_time_ms: start.elapsed().as_secs_f64() * 1000.0,
                };
                self.last_build = Some(report.clone());
                return report;
            }
        };

        let surviving: Vec<_> = connections.iter().filter(|c| c.year <= year).collect();

        let mut orphan_connections = 0;
        let mut self_loops = 0;
        let usable: Vec<_> = surviving
            .iter()
            .filter(|c| {
                let (a, b) = c.endpoints();
                if !(self.catalog.contains_key(&a) && self.catalog.contains_key(&b)) {
                    debug!(connection = c.id, a, b, "connection endpoint not in catalog");
                    orphan_connections += 1;
                    return false;
                }
                if c.is_self_loop() {
                    self_loops += 1;
                }
                true
            })
            .collect();

        let endpoint_ids: HashSet<ShelterId> = usable
            .iter()
            .flat_map(|c| [c.shelter_id1, c.shelter_id2])
            .collect();
        for id in endpoint_ids {
            self.graph.add_node(id);
        }

        for c in &usable {
            self.graph.add_edge(c.shelter_id1, c.shelter_id2);
        }

        let report = BuildReport {
            year,
            status: BuildStatus::Loaded,
            connections_read: surviving.len(),
            orphan_connections,
            self_loops,
            node_count: self.graph.node_count(),
            edge_count: self.graph.edge_count(),
            load_time_ms: start.elapsed().as_secs_f64() * 1000.0,
        };
        info!(
            year,
            connections = report.connections_read,
            orphans = report.orphan_connections,
            nodes = report.node_count,
            edges = report.edge_count,
            "graph built"
        );
        self.last_build = Some(report.clone());
        report
    }

    /// Shelters in the current graph, in map iteration order.
    pub fn nodes(&self) -> Vec<&Shelter> {
        self.resolve(self.graph.node_ids())
    }

    /// Degree of `shelter`; 0 when it is not in the graph.
    pub fn num_neighbors(&self, shelter: &Shelter) -> usize {
        self.graph.degree(shelter.id)
    }

    pub fn num_connected_components(&self) -> usize {
        traversal::count_connected_components(&self.graph)
    }

    /// Reachable shelters from the breadth-first spanning tree rooted at `start`.
    pub fn reachable_tree(&self, start: &Shelter) -> Result<Vec<&Shelter>> {
        let ids = traversal::reachable_tree(&self.graph, start.id)
            .ok_or(EngineError::NodeNotInGraph(start.id))?;
        Ok(self.resolve(ids))
    }

    /// Reachable shelters from the FIFO worklist traversal.
    pub fn reachable_iterative(&self, start: &Shelter) -> Result<Vec<&Shelter>> {
        let ids = traversal::reachable_iterative(&self.graph, start.id)
            .ok_or(EngineError::NodeNotInGraph(start.id))?;
        Ok(self.resolve(ids))
    }

    /// Reachable shelters from the recursive depth-first traversal.
    pub fn reachable_recursive(&self, start: &Shelter) -> Result<Vec<&Shelter>> {
        let ids = traversal::reachable_recursive(&self.graph, start.id)
            .ok_or(EngineError::NodeNotInGraph(start.id))?;
        Ok(self.resolve(ids))
    }

    /// Every shelter reachable from `start`, excluding `start`.
    ///
    /// Cross-checks the spanning-tree and worklist traversals as sets and
    /// returns the spanning-tree result. Neither uses the call stack, so any
    /// component size is safe; the recursive traversal is only run through
    /// [`reachable_recursive`](Self::reachable_recursive).
    pub fn reachable(&self, start: &Shelter) -> Result<Vec<&Shelter>> {
        let tree = self.reachable_tree(start)?;
        let iterative = self.reachable_iterative(start)?;

        let tree_set: HashSet<&Shelter> = tree.iter().copied().collect();
        let iterative_set: HashSet<&Shelter> = iterative.into_iter().collect();
        let agree = tree_set == iterative_set;
        if !agree {
            error!(
                start = start.id,
                tree = tree_set.len(),
                iterative = iterative_set.len(),
                "reachability traversals disagree"
            );
        }
        debug_assert!(agree, "reachability traversals disagree for {}", start.id);

        Ok(tree)
    }

    /// Shelters ranked by degree, see [`traversal::degree_centrality`].
    pub fn degree_centrality(&self, top_n: usize) -> Vec<(&Shelter, u32)> {
        traversal::degree_centrality(&self.graph, top_n)
            .into_iter()
            .filter_map(|DegreeResult { node_id, degree }| {
                self.catalog.get(&node_id).map(|s| (s, degree))
            })
            .collect()
    }

    /// Look up a catalog shelter, whether or not it is in the graph.
    pub fn shelter(&self, id: ShelterId) -> Option<&Shelter> {
        self.catalog.get(&id)
    }

    pub fn catalog_len(&self) -> usize {
        self.catalog.len()
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn last_build(&self) -> Option<&BuildReport> {
        self.last_build.as_ref()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn resolve(&self, ids: impl IntoIterator<Item = ShelterId>) -> Vec<&Shelter> {
        ids.into_iter().filter_map(|id| self.catalog.get(&id)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::model::Connection;
    use crate::store::MemoryStore;
    use chrono::NaiveTime;
    use proptest::prelude::*;
    use std::cell::Cell;
    use std::collections::BTreeSet;

    fn shelter(id: ShelterId, name: &str) -> Shelter {
        Shelter {
            id,
            name: name.to_string(),
            locality: "Dolomiti".to_string(),
            altitude: 2200,
            capacity: 30,
            is_open: true,
        }
    }

    fn conn(id: u64, a: ShelterId, b: ShelterId, year: Year) -> Connection {
        Connection {
            id,
            shelter_id1: a,
            shelter_id2: b,
            distance: 3.2,
            difficulty: "media".to_string(),
            duration: NaiveTime::from_hms_opt(2, 15, 0).unwrap(),
            year,
        }
    }

    fn abc_engine(connections: Vec<Connection>) -> ShelterEngine<MemoryStore> {
        let shelters = vec![
            shelter(1, "Rifugio A"),
            shelter(2, "Rifugio B"),
            shelter(3, "Rifugio C"),
        ];
        ShelterEngine::new(MemoryStore::new(shelters, connections))
    }

    fn ids(shelters: &[&Shelter]) -> BTreeSet<ShelterId> {
        shelters.iter().map(|s| s.id).collect()
    }

    fn edge_set(g: &Graph) -> BTreeSet<(ShelterId, ShelterId)> {
        g.edges().collect()
    }

    struct FailingStore {
        shelters_ok: bool,
    }

    impl RecordStore for FailingStore {
        fn read_shelters(&self) -> std::result::Result<Vec<Shelter>, StoreError> {
            if self.shelters_ok {
                Ok(vec![shelter(1, "Rifugio A"), shelter(2, "Rifugio B")])
            } else {
                Err(StoreError::unavailable("connection refused"))
            }
        }

        fn read_connections(&self, _year: Year) -> std::result::Result<Vec<Connection>, StoreError> {
            Err(StoreError::query("syntax error"))
        }
    }

    /// Returns every connection regardless of the cutoff.
    struct UnfilteredStore(MemoryStore);

    impl RecordStore for UnfilteredStore {
        fn read_shelters(&self) -> std::result::Result<Vec<Shelter>, StoreError> {
            self.0.read_shelters()
        }

        fn read_connections(&self, _year: Year) -> std::result::Result<Vec<Connection>, StoreError> {
            Ok(self.0.connections().to_vec())
        }
    }

    struct ToggleStore {
        inner: MemoryStore,
        fail: Cell<bool>,
    }

    impl RecordStore for ToggleStore {
        fn read_shelters(&self) -> std::result::Result<Vec<Shelter>, StoreError> {
            self.inner.read_shelters()
        }

        fn read_connections(&self, year: Year) -> std::result::Result<Vec<Connection>, StoreError> {
            if self.fail.get() {
                return Err(StoreError::unavailable("server has gone away"));
            }
            self.inner.read_connections(year)
        }
    }

    #[test]
    fn test_scenario_year_2000() {
        let mut engine = abc_engine(vec![conn(10, 1, 2, 2000), conn(11, 2, 3, 2010)]);
        let report = engine.build_graph(2000);
        assert!(report.is_loaded());
        assert_eq!(ids(&engine.nodes()), BTreeSet::from([1, 2]));
        assert_eq!(edge_set(engine.graph()), BTreeSet::from([(1, 2)]));
        let a = engine.shelter(1).unwrap().clone();
        let b = engine.shelter(2).unwrap().clone();
        assert_eq!(engine.num_neighbors(&a), 1);
        assert_eq!(engine.num_neighbors(&b), 1);
        assert_eq!(engine.num_connected_components(), 1);
    }

    #[test]
    fn test_scenario_year_2010() {
        let mut engine = abc_engine(vec![conn(10, 1, 2, 2000), conn(11, 2, 3, 2010)]);
        engine.build_graph(2010);
        assert_eq!(ids(&engine.nodes()), BTreeSet::from([1, 2, 3]));
        assert_eq!(edge_set(engine.graph()), BTreeSet::from([(1, 2), (2, 3)]));
        assert_eq!(engine.num_connected_components(), 1);
        let a = engine.shelter(1).unwrap().clone();
        assert_eq!(ids(&engine.reachable(&a).unwrap()), BTreeSet::from([2, 3]));
    }

    #[test]
    fn test_orphan_connection_dropped() {
        let mut engine = abc_engine(vec![conn(10, 1, 2, 2000), conn(12, 3, 99, 2000)]);
        let report = engine.build_graph(2000);
        assert_eq!(report.orphan_connections, 1);
        assert_eq!(ids(&engine.nodes()), BTreeSet::from([1, 2]));
        assert_eq!(engine.graph().edge_count(), 1);
        let c = engine.shelter(3).unwrap().clone();
        assert_eq!(engine.num_neighbors(&c), 0);
        assert_eq!(engine.reachable(&c), Err(EngineError::NodeNotInGraph(3)));
    }

    #[test]
    fn test_connection_store_failure_yields_empty_graph() {
        let mut engine = ShelterEngine::new(FailingStore { shelters_ok: true });
        assert_eq!(engine.catalog_len(), 2);
        let report = engine.build_graph(2020);
        assert!(matches!(report.status, BuildStatus::StoreFailed(_)));
        assert_eq!(engine.nodes().len(), 0);
        assert_eq!(engine.graph().edge_count(), 0);
        assert_eq!(engine.num_connected_components(), 0);
    }

    #[test]
    fn test_shelter_store_failure_yields_empty_catalog() {
        let engine = ShelterEngine::new(FailingStore { shelters_ok: false });
        assert_eq!(engine.catalog_len(), 0);
        assert!(engine.shelter(1).is_none());
    }

    #[test]
    fn test_failed_build_clears_previous_graph() {
        let shelters = vec![shelter(1, "Rifugio A"), shelter(2, "Rifugio B")];
        let store = ToggleStore {
            inner: MemoryStore::new(shelters, vec![conn(1, 1, 2, 2000)]),
            fail: Cell::new(false),
        };
        let mut engine = ShelterEngine::new(store);
        engine.build_graph(2000);
        assert_eq!(engine.graph().node_count(), 2);

        engine.store().fail.set(true);
        let report = engine.build_graph(2000);
        assert!(!report.is_loaded());
        assert!(engine.graph().is_empty());
        assert!(!engine.last_build().unwrap().is_loaded());
    }

    #[test]
    fn test_engine_refilters_by_year() {
        let shelters = vec![shelter(1, "A"), shelter(2, "B"), shelter(3, "C")];
        let store = MemoryStore::new(shelters, vec![conn(10, 1, 2, 2000), conn(11, 2, 3, 2010)]);
        let mut engine = ShelterEngine::new(UnfilteredStore(store));
        let report = engine.build_graph(2005);
        assert_eq!(report.connections_read, 1);
        assert_eq!(ids(&engine.nodes()), BTreeSet::from([1, 2]));
    }

    #[test]
    fn test_year_before_any_connection_is_empty() {
        let mut engine = abc_engine(vec![conn(10, 1, 2, 2000)]);
        let report = engine.build_graph(1900);
        assert!(report.is_loaded());
        assert_eq!(report.node_count, 0);
        assert_eq!(engine.num_connected_components(), 0);
    }

    #[test]
    fn test_rebuild_replaces_graph() {
        let mut engine = abc_engine(vec![conn(10, 1, 2, 2000), conn(11, 2, 3, 2010)]);
        engine.build_graph(2010);
        engine.build_graph(2000);
        assert_eq!(ids(&engine.nodes()), BTreeSet::from([1, 2]));
        assert_eq!(engine.last_build().unwrap().year, 2000);
    }

    #[test]
    fn test_duplicate_connections_collapse() {
        let mut engine = abc_engine(vec![conn(10, 1, 2, 2000), conn(13, 2, 1, 2001)]);
        let report = engine.build_graph(2005);
        assert_eq!(report.connections_read, 2);
        assert_eq!(report.edge_count, 1);
        let a = engine.shelter(1).unwrap().clone();
        assert_eq!(engine.num_neighbors(&a), 1);
    }

    #[test]
    fn test_self_loop_connection_keeps_shelter() {
        let mut engine = abc_engine(vec![conn(10, 1, 1, 2000)]);
        let report = engine.build_graph(2000);
        assert_eq!(report.self_loops, 1);
        assert_eq!(report.node_count, 1);
        assert_eq!(report.edge_count, 1);
        assert_eq!(ids(&engine.nodes()), BTreeSet::from([1]));
        assert_eq!(engine.num_connected_components(), 1);
        let a = engine.shelter(1).unwrap().clone();
        assert_eq!(engine.num_neighbors(&a), 1);
        assert!(engine.reachable(&a).unwrap().is_empty());
    }

    #[test]
    fn test_self_loop_beside_trail() {
        let mut engine = abc_engine(vec![conn(10, 1, 2, 2000), conn(11, 3, 3, 2000)]);
        engine.build_graph(2000);
        assert_eq!(ids(&engine.nodes()), BTreeSet::from([1, 2, 3]));
        assert_eq!(engine.num_connected_components(), 2);
        let a = engine.shelter(1).unwrap().clone();
        assert_eq!(ids(&engine.reachable(&a).unwrap()), BTreeSet::from([2]));
    }

    #[test]
    fn test_reachable_long_chain_on_small_stack() {
        const LEN: u64 = 300_000;
        let shelters: Vec<Shelter> = (0..LEN).map(|i| shelter(i, &format!("Rifugio {i}"))).collect();
        let connections: Vec<Connection> = (0..LEN - 1).map(|i| conn(i, i, i + 1, 2000)).collect();

        // 8 MiB, the usual main-thread stack
        let worker = std::thread::Builder::new()
            .stack_size(8 * 1024 * 1024)
            .spawn(move || {
                let mut engine = ShelterEngine::new(MemoryStore::new(shelters, connections));
                engine.build_graph(2000);
                let start = engine.shelter(0).unwrap().clone();
                engine.reachable(&start).unwrap().len()
            })
            .unwrap();
        assert_eq!(worker.join().unwrap(), (LEN - 1) as usize);
    }

    #[test]
    fn test_num_neighbors_absent_shelter() {
        let mut engine = abc_engine(vec![conn(10, 1, 2, 2000)]);
        engine.build_graph(2000);
        let c = engine.shelter(3).unwrap().clone();
        assert_eq!(engine.num_neighbors(&c), 0);
    }

    #[test]
    fn test_reachable_absent_start_is_error() {
        let mut engine = abc_engine(vec![conn(10, 1, 2, 2000)]);
        engine.build_graph(2000);
        let c = engine.shelter(3).unwrap().clone();
        assert_eq!(engine.reachable(&c), Err(EngineError::NodeNotInGraph(3)));
        assert_eq!(engine.reachable_recursive(&c), Err(EngineError::NodeNotInGraph(3)));
        assert_eq!(engine.reachable_iterative(&c), Err(EngineError::NodeNotInGraph(3)));
        assert_eq!(engine.reachable_tree(&c), Err(EngineError::NodeNotInGraph(3)));
    }

    #[test]
    fn test_reachable_uses_id_identity() {
        let mut engine = abc_engine(vec![conn(10, 1, 2, 2000)]);
        engine.build_graph(2000);
        // attributes differ from the catalog copy; only the id matters
        let stale = shelter(1, "Old name");
        let result = engine.reachable(&stale).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "Rifugio B");
    }

    #[test]
    fn test_degree_centrality_resolves_shelters() {
        let mut engine = abc_engine(vec![conn(10, 1, 2, 2000), conn(11, 2, 3, 2000)]);
        engine.build_graph(2000);
        let ranked = engine.degree_centrality(0);
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].0.name, "Rifugio B");
        assert_eq!(ranked[0].1, 2);
    }

    // --- Properties ---

    fn arb_connections() -> impl Strategy<Value = Vec<Connection>> {
        prop::collection::vec((0u64..25, 0u64..25, 1990i32..2020), 0..50).prop_map(|rows| {
            rows.into_iter()
                .enumerate()
                .map(|(i, (a, b, year))| conn(i as u64, a, b, year))
                .collect()
        })
    }

    fn catalog() -> Vec<Shelter> {
        // ids 20..25 stay out of the catalog to produce orphans
        (0..20).map(|i| shelter(i, &format!("Rifugio {i}"))).collect()
    }

    proptest! {
        #[test]
        fn prop_build_is_monotonic(connections in arb_connections(), y1 in 1985i32..2025, y2 in 1985i32..2025) {
            let (lo, hi) = if y1 <= y2 { (y1, y2) } else { (y2, y1) };
            let mut engine = ShelterEngine::new(MemoryStore::new(catalog(), connections));

            engine.build_graph(lo);
            let lo_nodes = ids(&engine.nodes());
            let lo_edges = edge_set(engine.graph());

            engine.build_graph(hi);
            let hi_nodes = ids(&engine.nodes());
            let hi_edges = edge_set(engine.graph());

            prop_assert!(lo_nodes.is_subset(&hi_nodes));
            prop_assert!(lo_edges.is_subset(&hi_edges));
        }

        #[test]
        fn prop_build_is_idempotent(connections in arb_connections(), year in 1985i32..2025) {
            let mut engine = ShelterEngine::new(MemoryStore::new(catalog(), connections));
            engine.build_graph(year);
            let first = (ids(&engine.nodes()), edge_set(engine.graph()));
            engine.build_graph(year);
            let second = (ids(&engine.nodes()), edge_set(engine.graph()));
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_nodes_are_catalog_endpoints(connections in arb_connections(), year in 1985i32..2025) {
            let mut engine = ShelterEngine::new(MemoryStore::new(catalog(), connections.clone()));
            engine.build_graph(year);
            let expected: BTreeSet<ShelterId> = connections
                .iter()
                .filter(|c| c.year <= year)
                .filter(|c| c.shelter_id1 < 20 && c.shelter_id2 < 20)
                .flat_map(|c| [c.shelter_id1, c.shelter_id2])
                .collect();
            prop_assert_eq!(ids(&engine.nodes()), expected);
        }

        #[test]
        fn prop_reachable_variants_agree(connections in arb_connections()) {
            let mut engine = ShelterEngine::new(MemoryStore::new(catalog(), connections));
            engine.build_graph(2020);
            for start in engine.nodes() {
                let tree = ids(&engine.reachable_tree(start).unwrap());
                let iterative = ids(&engine.reachable_iterative(start).unwrap());
                let recursive = ids(&engine.reachable_recursive(start).unwrap());
                prop_assert_eq!(&tree, &iterative);
                prop_assert_eq!(&tree, &recursive);
                prop_assert!(!tree.contains(&start.id));
            }
        }
    }
}
