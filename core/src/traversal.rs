use std::collections::{HashMap, HashSet, VecDeque};

use crate::graph::Graph;
use crate::model::ShelterId;

/// Breadth-first spanning tree rooted at one node.
///
/// Covers exactly the root's connected component. Parent pointers are kept
/// instead of child lists; `order` is the BFS discovery order.
#[derive(Debug, Clone)]
pub struct SpanningTree {
    root: ShelterId,
    order: Vec<ShelterId>,
    // node → (parent, depth). The root is its own parent at depth 0.
    links: HashMap<ShelterId, (ShelterId, u32)>,
}

impl SpanningTree {
    pub fn root(&self) -> ShelterId {
        self.root
    }

    /// Number of tree nodes, root included.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: ShelterId) -> bool {
        self.links.contains_key(&id)
    }

    /// Tree nodes in discovery order, root first.
    pub fn node_ids(&self) -> &[ShelterId] {
        &self.order
    }

    /// Tree edges as `(parent, child)`, in discovery order of the child.
    pub fn edges(&self) -> impl Iterator<Item = (ShelterId, ShelterId)> + '_ {
        self.order
            .iter()
            .skip(1)
            .map(move |child| (self.links[child].0, *child))
    }

    pub fn parent_of(&self, id: ShelterId) -> Option<ShelterId> {
        match self.links.get(&id) {
            Some(&(parent, _)) if id != self.root => Some(parent),
            _ => None,
        }
    }

    /// Hop count from the root, or None if `id` is not in the tree.
    pub fn depth_of(&self, id: ShelterId) -> Option<u32> {
        self.links.get(&id).map(|&(_, depth)| depth)
    }
}

/// Degree information for a single node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DegreeResult {
    pub node_id: ShelterId,
    pub degree: u32,
}

/// Build the breadth-first spanning tree rooted at `start`.
///
/// Returns None if `start` is not in the graph.
pub fn bfs_tree(graph: &Graph, start: ShelterId) -> Option<SpanningTree> {
    if !graph.contains_node(start) {
        return None;
    }

    let mut links: HashMap<ShelterId, (ShelterId, u32)> = HashMap::new();
    let mut order = vec![start];
    let mut queue: VecDeque<ShelterId> = VecDeque::new();

    links.insert(start, (start, 0));
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        let depth = links[&current].1;
        for &next in graph.neighbors(current) {
            if !links.contains_key(&next) {
                links.insert(next, (current, depth + 1));
                order.push(next);
                queue.push_back(next);
            }
        }
    }

    Some(SpanningTree {
        root: start,
        order,
        links,
    })
}

/// Reachable set via the spanning tree: tree nodes minus the root.
pub fn reachable_tree(graph: &Graph, start: ShelterId) -> Option<Vec<ShelterId>> {
    let tree = bfs_tree(graph, start)?;
    Some(tree.node_ids()[1..].to_vec())
}

/// Reachable set via an explicit FIFO worklist.
///
/// Nodes are marked visited on discovery, so nothing is enqueued twice.
pub fn reachable_iterative(graph: &Graph, start: ShelterId) -> Option<Vec<ShelterId>> {
    if !graph.contains_node(start) {
        return None;
    }

    let mut visited: HashSet<ShelterId> = HashSet::new();
    let mut worklist: VecDeque<ShelterId> = VecDeque::new();
    visited.insert(start);
    worklist.push_back(start);

    while let Some(current) = worklist.pop_front() {
        for &next in graph.neighbors(current) {
            if visited.insert(next) {
                worklist.push_back(next);
            }
        }
    }

    visited.remove(&start);
    Some(visited.into_iter().collect())
}

/// Reachable set via recursive depth-first search.
///
/// Uses the call stack: recursion depth is the longest descent the DFS
/// takes, at most the size of the start's component. Very long trail
/// chains should go through [`reachable_iterative`] instead.
pub fn reachable_recursive(graph: &Graph, start: ShelterId) -> Option<Vec<ShelterId>> {
    if !graph.contains_node(start) {
        return None;
    }

    let mut visited: HashSet<ShelterId> = HashSet::new();
    let mut found: Vec<ShelterId> = Vec::new();
    dfs_visit(graph, start, &mut visited, &mut found);

    // found[0] is start
    found.remove(0);
    Some(found)
}

fn dfs_visit(
    graph: &Graph,
    node: ShelterId,
    visited: &mut HashSet<ShelterId>,
    found: &mut Vec<ShelterId>,
) {
    visited.insert(node);
    found.push(node);
    for &next in graph.neighbors(node) {
        if !visited.contains(&next) {
            dfs_visit(graph, next, visited, found);
        }
    }
}

/// Partition the graph into connected components.
///
/// Isolated nodes form singleton components. Component order follows the
/// map iteration order and carries no meaning.
pub fn connected_components(graph: &Graph) -> Vec<Vec<ShelterId>> {
    let mut seen: HashSet<ShelterId> = HashSet::with_capacity(graph.node_count());
    let mut components = Vec::new();

    for id in graph.node_ids() {
        if seen.contains(&id) {
            continue;
        }
        let mut component = vec![id];
        let mut queue: VecDeque<ShelterId> = VecDeque::from([id]);
        seen.insert(id);

        while let Some(current) = queue.pop_front() {
            for &next in graph.neighbors(current) {
                if seen.insert(next) {
                    component.push(next);
                    queue.push_back(next);
                }
            }
        }
        components.push(component);
    }

    components
}

/// Number of connected components; 0 for an empty graph.
pub fn count_connected_components(graph: &Graph) -> usize {
    connected_components(graph).len()
}

/// Return nodes ranked by degree.
///
/// If `top_n` is 0, returns all nodes. Otherwise returns the top N by
/// degree (descending). Ties are broken by node ID (ascending).
pub fn degree_centrality(graph: &Graph, top_n: usize) -> Vec<DegreeResult> {
    let mut results: Vec<DegreeResult> = graph
        .node_ids()
        .map(|id| DegreeResult {
            node_id: id,
            degree: graph.degree(id) as u32,
        })
        .collect();

    results.sort_by(|a, b| b.degree.cmp(&a.degree).then(a.node_id.cmp(&b.node_id)));

    if top_n > 0 && top_n < results.len() {
        results.truncate(top_n);
    }

    results
}
