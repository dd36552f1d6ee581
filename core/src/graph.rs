use std::collections::{HashMap, HashSet};

use crate::model::ShelterId;

/// Undirected edge key, always stored as `(low, high)`.
type EdgeKey = (ShelterId, ShelterId);

fn edge_key(a: ShelterId, b: ShelterId) -> EdgeKey {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// In-memory undirected simple graph keyed by shelter id.
///
/// Holds ids only; shelter records live in the engine's catalog and are
/// resolved at the query boundary. Every undirected edge appears in the
/// adjacency list of both endpoints and once in the edge-key set, which is
/// what collapses duplicate connections between the same pair. A self-loop
/// is one edge key and lists the node once among its own neighbors.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    adjacency: HashMap<ShelterId, Vec<ShelterId>>,
    edges: HashSet<EdgeKey>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-allocate for a known graph size.
    pub fn with_capacity(node_count: usize, edge_count: usize) -> Self {
        Self {
            adjacency: HashMap::with_capacity(node_count),
            edges: HashSet::with_capacity(edge_count),
        }
    }

    /// Remove every node and edge.
    pub fn clear(&mut self) {
        self.adjacency.clear();
        self.edges.clear();
    }

    /// Register a node. No-op if it is already present.
    pub fn add_node(&mut self, id: ShelterId) {
        self.adjacency.entry(id).or_default();
    }

    /// Add an undirected edge, inserting both endpoints as nodes.
    ///
    /// Returns false when the edge already exists.
    pub fn add_edge(&mut self, a: ShelterId, b: ShelterId) -> bool {
        self.add_node(a);
        self.add_node(b);
        if !self.edges.insert(edge_key(a, b)) {
            return false;
        }
        self.adjacency.entry(a).or_default().push(b);
        if a != b {
            self.adjacency.entry(b).or_default().push(a);
        }
        true
    }

    pub fn contains_node(&self, id: ShelterId) -> bool {
        self.adjacency.contains_key(&id)
    }

    pub fn contains_edge(&self, a: ShelterId, b: ShelterId) -> bool {
        self.edges.contains(&edge_key(a, b))
    }

    /// Adjacent node ids. Empty for absent nodes.
    pub fn neighbors(&self, id: ShelterId) -> &[ShelterId] {
        self.adjacency.get(&id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Number of adjacent nodes; 0 for isolated or absent nodes. A self-loop
    /// counts once.
    pub fn degree(&self, id: ShelterId) -> usize {
        self.neighbors(id).len()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = ShelterId> + '_ {
        self.adjacency.keys().copied()
    }

    /// Each undirected edge once, as `(low, high)`.
    pub fn edges(&self) -> impl Iterator<Item = (ShelterId, ShelterId)> + '_ {
        self.edges.iter().copied()
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// Approximate memory usage in bytes.
    pub fn memory_usage(&self) -> usize {
        use std::mem::size_of;

        let nodes_mem = self.adjacency.len() * (size_of::<ShelterId>() + size_of::<Vec<ShelterId>>());
        let adj_mem: usize = self
            .adjacency
            .values()
            .map(|v| v.capacity() * size_of::<ShelterId>())
            .sum();
        let edge_mem = self.edges.len() * size_of::<EdgeKey>();

        nodes_mem + adj_mem + edge_mem
    }
}
