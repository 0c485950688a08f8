//! Routing trait and default Dijkstra implementation.
//!
//! # Pluggability
//!
//! The service calls routing via the [`Router`] trait, so an A* or
//! contraction-hierarchy router can replace [`DijkstraRouter`] without
//! touching the request pipeline.
//!
//! # Cost units
//!
//! Edge cost is `edge_length_m`: the shortest walk is the geometrically
//! shortest one.  Lengths are validated non-negative at build time.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use wr_core::{EdgeId, GeoPoint, NodeId};

use crate::network::WalkNetwork;
use crate::{SpatialError, SpatialResult};

// ── Route ─────────────────────────────────────────────────────────────────────

/// The result of a routing query.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    /// Nodes visited in order, source and destination inclusive.  Never
    /// empty: a trivial route holds just the source.
    pub nodes: Vec<NodeId>,
    /// Edges to traverse in order; `edges[i]` joins `nodes[i]` and
    /// `nodes[i + 1]`.
    pub edges: Vec<EdgeId>,
    /// Sum of traversed edge lengths, in metres.
    pub total_length_m: f64,
}

impl Route {
    /// `true` if the source and destination are the same node.
    pub fn is_trivial(&self) -> bool {
        self.edges.is_empty()
    }

    /// Positions of the route's nodes, in order.
    pub fn coords(&self, network: &WalkNetwork) -> Vec<GeoPoint> {
        self.nodes
            .iter()
            .map(|n| network.node_pos[n.index()])
            .collect()
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable routing engine.
///
/// Implementations must be `Send + Sync`: one router instance is shared by
/// every in-flight request.
pub trait Router: Send + Sync {
    /// Compute a minimum-length route from `from` to `to`.
    ///
    /// `from == to` yields a trivial route, not an error.
    ///
    /// # Errors
    ///
    /// [`SpatialError::NodeNotFound`] if either node is outside the network,
    /// [`SpatialError::NoRoute`] if `to` is unreachable from `from`.
    fn route(&self, network: &WalkNetwork, from: NodeId, to: NodeId) -> SpatialResult<Route>;
}

// ── DijkstraRouter ────────────────────────────────────────────────────────────

/// Standard Dijkstra's algorithm over the CSR walk graph.
#[derive(Debug, Default, Clone, Copy)]
pub struct DijkstraRouter;

impl Router for DijkstraRouter {
    fn route(&self, network: &WalkNetwork, from: NodeId, to: NodeId) -> SpatialResult<Route> {
        dijkstra(network, from, to)
    }
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

/// Total-ordered path cost.  Lengths are finite and non-negative, so
/// `total_cmp` agrees with the numeric order.
#[derive(Copy, Clone, Debug, PartialEq)]
struct Cost(f64);

impl Eq for Cost {}

impl Ord for Cost {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn dijkstra(network: &WalkNetwork, from: NodeId, to: NodeId) -> SpatialResult<Route> {
    for n in [from, to] {
        if !network.contains(n) {
            return Err(SpatialError::NodeNotFound(n));
        }
    }

    if from == to {
        return Ok(Route { nodes: vec![from], edges: vec![], total_length_m: 0.0 });
    }

    let n = network.node_count();
    // dist[v] = best known length (m) to reach v.
    let mut dist      = vec![f64::INFINITY; n];
    // prev_edge[v] = EdgeId that reached v; EdgeId::INVALID for unreached nodes.
    let mut prev_edge = vec![EdgeId::INVALID; n];

    dist[from.index()] = 0.0;

    // Min-heap via Reverse.  Secondary key NodeId makes tie-breaking deterministic.
    let mut heap: BinaryHeap<Reverse<(Cost, NodeId)>> = BinaryHeap::new();
    heap.push(Reverse((Cost(0.0), from)));

    while let Some(Reverse((Cost(cost), node))) = heap.pop() {
        if node == to {
            return Ok(reconstruct(network, &prev_edge, from, to, cost));
        }

        // Skip stale heap entries.
        if cost > dist[node.index()] {
            continue;
        }

        for edge in network.out_edges(node) {
            let neighbor = network.edge_to[edge.index()];
            let new_cost = cost + network.edge_length_m[edge.index()];

            if new_cost < dist[neighbor.index()] {
                dist[neighbor.index()] = new_cost;
                prev_edge[neighbor.index()] = edge;
                heap.push(Reverse((Cost(new_cost), neighbor)));
            }
        }
    }

    Err(SpatialError::NoRoute { from, to })
}

fn reconstruct(
    network: &WalkNetwork,
    prev_edge: &[EdgeId],
    from: NodeId,
    to: NodeId,
    total_length_m: f64,
) -> Route {
    let mut edges = Vec::new();
    let mut cur = to;
    while cur != from {
        let e = prev_edge[cur.index()];
        debug_assert_ne!(e, EdgeId::INVALID, "settled node without predecessor");
        edges.push(e);
        cur = network.edge_from[e.index()];
    }
    edges.reverse();

    let mut nodes = Vec::with_capacity(edges.len() + 1);
    nodes.push(from);
    nodes.extend(edges.iter().map(|e| network.edge_to[e.index()]));

    Route { nodes, edges, total_length_m }
}
