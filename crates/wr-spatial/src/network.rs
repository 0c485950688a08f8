//! Walk network representation and builder.
//!
//! # Data layout
//!
//! The graph uses **Compressed Sparse Row (CSR)** format for outgoing edges.
//! Given a `NodeId n`, its outgoing edges occupy the slice:
//!
//! ```text
//! edge_to[ node_out_start[n] .. node_out_start[n+1] ]
//! ```
//!
//! All edge arrays (`edge_from`, `edge_to`, `edge_length_m`) are sorted by
//! source node and indexed by `EdgeId`.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) maps `(lat, lon)` to the nearest `NodeId`.  Used
//! per request to snap geocoded addresses onto the network.

use std::fmt;

use rstar::{PointDistance, RTree, RTreeObject, AABB};
use rustc_hash::FxHashMap;

use wr_core::{EdgeId, GeoPoint, NodeId};

use crate::{SpatialError, SpatialResult};

// ── R-tree node entry ─────────────────────────────────────────────────────────

/// Entry stored in the R-tree spatial index: a 2-D `[lat, lon]` point with
/// the associated `NodeId`.
#[derive(Clone)]
struct NodeEntry {
    point: [f64; 2], // [lat, lon]
    id: NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    /// Squared Euclidean distance in lat/lon space.  Sufficient for
    /// nearest-node queries within a city.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dlat = self.point[0] - point[0];
        let dlon = self.point[1] - point[1];
        dlat * dlat + dlon * dlon
    }
}

// ── Snap result ───────────────────────────────────────────────────────────────

/// A coordinate mapped onto the network.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Snap {
    pub node: NodeId,
    /// Position of `node`.
    pub pos: GeoPoint,
    /// Haversine distance from the query point to `pos`, in metres.
    pub distance_m: f64,
}

// ── WalkNetwork ───────────────────────────────────────────────────────────────

/// Directed walk graph in CSR format plus a spatial index for node snapping.
///
/// All fields except the index are `pub` for direct indexed access.  Do not
/// construct directly; use [`WalkNetworkBuilder`] or one of the loaders.
pub struct WalkNetwork {
    // ── Node data ─────────────────────────────────────────────────────────
    /// Geographic position of each node.  Indexed by `NodeId`.
    pub node_pos: Vec<GeoPoint>,

    /// External identifier of each node (OSM node id, bundle id).
    pub node_ref: Vec<u64>,

    // ── CSR edge adjacency ────────────────────────────────────────────────
    /// CSR row pointer.  Length = `node_count + 1`.
    pub node_out_start: Vec<u32>,

    // ── Edge data (indexed by EdgeId = position in sorted order) ──────────
    /// Source node of each edge.  Needed for route reconstruction.
    pub edge_from: Vec<NodeId>,

    /// Destination node of each edge.
    pub edge_to: Vec<NodeId>,

    /// Length of each edge in metres.  The Dijkstra edge cost.
    pub edge_length_m: Vec<f64>,

    // ── Spatial index ─────────────────────────────────────────────────────
    spatial_idx: RTree<NodeEntry>,
}

impl WalkNetwork {
    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    #[inline]
    pub fn contains(&self, node: NodeId) -> bool {
        node.index() < self.node_count()
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// Iterator over the `EdgeId`s of all outgoing edges from `node`.
    ///
    /// A contiguous index range, no allocation.
    #[inline]
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        (start..end).map(|i| EdgeId(i as u32))
    }

    /// Shortest directed edge `from → to`, if any.
    pub fn edge_between(&self, from: NodeId, to: NodeId) -> Option<EdgeId> {
        if !self.contains(from) {
            return None;
        }
        self.out_edges(from)
            .filter(|e| self.edge_to[e.index()] == to)
            .min_by(|a, b| {
                self.edge_length_m[a.index()].total_cmp(&self.edge_length_m[b.index()])
            })
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// Return the `NodeId` of the nearest node to `pos`.
    ///
    /// Nodes at exactly the same planar distance resolve to the lowest
    /// `NodeId`.  Returns `None` only if the network has no nodes.
    pub fn snap_to_node(&self, pos: GeoPoint) -> Option<NodeId> {
        let query = pos.to_array();
        let mut candidates = self.spatial_idx.nearest_neighbor_iter(&query);

        let first = candidates.next()?;
        let best_d2 = first.distance_2(&query);
        let mut best = first.id;
        for entry in candidates {
            if entry.distance_2(&query) > best_d2 {
                break;
            }
            best = best.min(entry.id);
        }
        Some(best)
    }

    /// Like [`snap_to_node`](Self::snap_to_node) but also reports where the
    /// node is and how far away it is.
    pub fn snap(&self, pos: GeoPoint) -> Option<Snap> {
        let node = self.snap_to_node(pos)?;
        let node_pos = self.node_pos[node.index()];
        Some(Snap { node, pos: node_pos, distance_m: pos.distance_m(node_pos) })
    }
}

impl fmt::Debug for WalkNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalkNetwork")
            .field("nodes", &self.node_count())
            .field("edges", &self.edge_count())
            .finish_non_exhaustive()
    }
}

// ── WalkNetworkBuilder ────────────────────────────────────────────────────────

/// Construct a [`WalkNetwork`] incrementally, then call [`build`](Self::build).
///
/// The builder accepts nodes and directed edges in any order.  `build()`
/// sorts edges by source node, constructs the CSR arrays, and bulk-loads the
/// R-tree.
///
/// # Example
///
/// ```
/// use wr_core::GeoPoint;
/// use wr_spatial::WalkNetworkBuilder;
///
/// let mut b = WalkNetworkBuilder::new();
/// let a = b.add_node(GeoPoint::new(37.7749, -122.4194), 1);
/// let c = b.add_node(GeoPoint::new(37.7760, -122.4180), 2);
/// b.add_road(a, c, 170.0).unwrap();
/// let net = b.build();
/// assert_eq!(net.node_count(), 2);
/// assert_eq!(net.edge_count(), 2); // bidirectional
/// ```
pub struct WalkNetworkBuilder {
    nodes:     Vec<GeoPoint>,
    refs:      Vec<u64>,
    by_ref:    FxHashMap<u64, NodeId>,
    raw_edges: Vec<RawEdge>,
}

struct RawEdge {
    from:     NodeId,
    to:       NodeId,
    length_m: f64,
}

impl WalkNetworkBuilder {
    pub fn new() -> Self {
        Self::with_capacity(0, 0)
    }

    /// Pre-allocate for the expected number of nodes and edges.
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            nodes:     Vec::with_capacity(nodes),
            refs:      Vec::with_capacity(nodes),
            by_ref:    FxHashMap::with_capacity_and_hasher(nodes, Default::default()),
            raw_edges: Vec::with_capacity(edges),
        }
    }

    /// Add a node and return its `NodeId` (sequential from 0).
    ///
    /// `node_ref` is the node's external identifier.  Uniqueness is the
    /// caller's concern; a repeated ref shadows the earlier one in
    /// [`node_by_ref`](Self::node_by_ref).
    pub fn add_node(&mut self, pos: GeoPoint, node_ref: u64) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(pos);
        self.refs.push(node_ref);
        self.by_ref.insert(node_ref, id);
        id
    }

    /// Add a **directed** edge from `from` to `to` of `length_m` metres.
    pub fn add_directed_edge(&mut self, from: NodeId, to: NodeId, length_m: f64) -> SpatialResult<()> {
        for n in [from, to] {
            if n.index() >= self.nodes.len() {
                return Err(SpatialError::NodeNotFound(n));
            }
        }
        if !length_m.is_finite() || length_m < 0.0 {
            return Err(SpatialError::InvalidEdge {
                from: self.refs[from.index()],
                to: self.refs[to.index()],
                length: length_m,
            });
        }
        self.raw_edges.push(RawEdge { from, to, length_m });
        Ok(())
    }

    /// Convenience: add edges in **both directions** for an undirected
    /// segment (every walkable way).
    pub fn add_road(&mut self, a: NodeId, b: NodeId, length_m: f64) -> SpatialResult<()> {
        self.add_directed_edge(a, b, length_m)?;
        self.add_directed_edge(b, a, length_m)
    }

    pub fn node_by_ref(&self, node_ref: u64) -> Option<NodeId> {
        self.by_ref.get(&node_ref).copied()
    }

    /// Look up the position of a node added earlier (used by loaders to
    /// compute edge lengths between adjacent way nodes).
    pub fn node_pos(&self, id: NodeId) -> GeoPoint {
        self.nodes[id.index()]
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn edge_count(&self) -> usize { self.raw_edges.len() }

    /// Consume the builder and produce a [`WalkNetwork`].
    ///
    /// Time complexity: O(E log E) for edge sort + O(N log N) for R-tree bulk
    /// load.
    pub fn build(self) -> WalkNetwork {
        let node_count = self.nodes.len();
        let edge_count = self.raw_edges.len();

        // Stable sort keeps insertion order within a source node.
        let mut raw = self.raw_edges;
        raw.sort_by_key(|e| e.from.0);

        let edge_from:     Vec<NodeId> = raw.iter().map(|e| e.from).collect();
        let edge_to:       Vec<NodeId> = raw.iter().map(|e| e.to).collect();
        let edge_length_m: Vec<f64>    = raw.iter().map(|e| e.length_m).collect();

        let mut node_out_start = vec![0u32; node_count + 1];
        for e in &raw {
            node_out_start[e.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, edge_count);

        let entries: Vec<NodeEntry> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, &pos)| NodeEntry {
                point: pos.to_array(),
                id: NodeId(i as u32),
            })
            .collect();
        let spatial_idx = RTree::bulk_load(entries);

        WalkNetwork {
            node_pos: self.nodes,
            node_ref: self.refs,
            node_out_start,
            edge_from,
            edge_to,
            edge_length_m,
            spatial_idx,
        }
    }
}

impl Default for WalkNetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}
