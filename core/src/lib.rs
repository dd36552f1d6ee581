//! shelter-graph-core: In-memory trail graph over mountain shelters.
//!
//! A pure Rust library that keeps an id-keyed undirected adjacency list,
//! rebuilds it from year-filtered connection records, and answers degree,
//! connected-component and reachability queries. Reachability is offered
//! three ways (spanning tree, FIFO worklist, recursive DFS) that must agree.
//!
//! Record access sits behind the [`RecordStore`] trait; this crate does no
//! I/O of its own.

mod engine;
mod error;
mod graph;
mod model;
mod store;
mod traversal;

pub use engine::{BuildReport, BuildStatus, ShelterEngine};
pub use error::{EngineError, Result, StoreError};
pub use graph::Graph;
pub use model::{Connection, ConnectionId, Shelter, ShelterId, Year};
pub use store::{MemoryStore, RecordStore};
pub use traversal::{
    bfs_tree, connected_components, count_connected_components, degree_centrality,
    reachable_iterative, reachable_recursive, reachable_tree, DegreeResult, SpanningTree,
};
