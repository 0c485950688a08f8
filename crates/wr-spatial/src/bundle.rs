//! Prepared graph bundles: a walk network serialized once, loaded at startup.
//!
//! # JSON format
//!
//! ```json
//! {
//!   "directed": false,
//!   "nodes": [ { "id": 65290756, "lat": 37.7749, "lon": -122.4194 }, … ],
//!   "edges": [ { "from": 65290756, "to": 65290757, "length": 84.2 }, … ]
//! }
//! ```
//!
//! `id` is any `u64` (typically the OSM node id); edges refer to nodes by
//! it.  `length` is in metres.  With `"directed": false` (the default) each
//! edge is added in both directions.
//!
//! # CSV format
//!
//! A directory holding `nodes.csv` (`id,lat,lon`) and `edges.csv`
//! (`from,to,length`).  CSV bundles are always undirected.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use wr_core::GeoPoint;

use crate::network::{WalkNetwork, WalkNetworkBuilder};
use crate::{SpatialError, SpatialResult};

// ── Records ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BundleNode {
    pub id:  u64,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BundleEdge {
    pub from:   u64,
    pub to:     u64,
    pub length: f64,
}

/// In-memory form of a bundle file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphBundle {
    #[serde(default)]
    pub directed: bool,
    pub nodes: Vec<BundleNode>,
    pub edges: Vec<BundleEdge>,
}

impl GraphBundle {
    /// Validate and convert into a [`WalkNetwork`].
    ///
    /// # Errors
    ///
    /// - [`SpatialError::DuplicateNodeRef`] if a node id repeats,
    /// - [`SpatialError::Core`] if a coordinate is out of range,
    /// - [`SpatialError::UnknownNodeRef`] if an edge names a missing node,
    /// - [`SpatialError::InvalidEdge`] for negative or non-finite lengths.
    pub fn into_network(self) -> SpatialResult<WalkNetwork> {
        let mut builder = WalkNetworkBuilder::with_capacity(self.nodes.len(), self.edges.len() * 2);

        let mut seen = HashSet::with_capacity(self.nodes.len());
        for n in &self.nodes {
            if !seen.insert(n.id) {
                return Err(SpatialError::DuplicateNodeRef(n.id));
            }
            builder.add_node(GeoPoint::checked(n.lat, n.lon)?, n.id);
        }

        for e in &self.edges {
            let from = builder.node_by_ref(e.from).ok_or(SpatialError::UnknownNodeRef(e.from))?;
            let to   = builder.node_by_ref(e.to).ok_or(SpatialError::UnknownNodeRef(e.to))?;
            if self.directed {
                builder.add_directed_edge(from, to, e.length)?;
            } else {
                builder.add_road(from, to, e.length)?;
            }
        }

        Ok(builder.build())
    }

    /// Snapshot a network.  Every CSR edge is written, so the result is
    /// marked `directed`.
    pub fn from_network(network: &WalkNetwork) -> Self {
        let nodes = network
            .node_pos
            .iter()
            .zip(&network.node_ref)
            .map(|(pos, &id)| BundleNode { id, lat: pos.lat, lon: pos.lon })
            .collect();

        let edges = (0..network.edge_count())
            .map(|i| BundleEdge {
                from:   network.node_ref[network.edge_from[i].index()],
                to:     network.node_ref[network.edge_to[i].index()],
                length: network.edge_length_m[i],
            })
            .collect();

        GraphBundle { directed: true, nodes, edges }
    }
}

// ── JSON ──────────────────────────────────────────────────────────────────────

/// Load a network from a JSON bundle file.
pub fn load_json(path: &Path) -> SpatialResult<WalkNetwork> {
    let file = File::open(path)?;
    load_json_reader(BufReader::new(file))
}

/// Like [`load_json`] but accepts any `Read` source.
pub fn load_json_reader<R: Read>(reader: R) -> SpatialResult<WalkNetwork> {
    let bundle: GraphBundle = serde_json::from_reader(reader)?;
    bundle.into_network()
}

/// Write `network` as a JSON bundle.
pub fn write_json<W: Write>(network: &WalkNetwork, writer: W) -> SpatialResult<()> {
    let mut writer = BufWriter::new(writer);
    serde_json::to_writer(&mut writer, &GraphBundle::from_network(network))?;
    writer.flush()?;
    Ok(())
}

// ── CSV ───────────────────────────────────────────────────────────────────────

/// Load a network from a directory holding `nodes.csv` and `edges.csv`.
pub fn load_csv_dir(dir: &Path) -> SpatialResult<WalkNetwork> {
    let nodes = File::open(dir.join("nodes.csv"))?;
    let edges = File::open(dir.join("edges.csv"))?;
    load_csv_readers(nodes, edges)
}

/// Like [`load_csv_dir`] but accepts any `Read` sources.
pub fn load_csv_readers<N: Read, E: Read>(nodes: N, edges: E) -> SpatialResult<WalkNetwork> {
    let nodes = csv::Reader::from_reader(nodes)
        .deserialize::<BundleNode>()
        .collect::<Result<Vec<_>, _>>()?;
    let edges = csv::Reader::from_reader(edges)
        .deserialize::<BundleEdge>()
        .collect::<Result<Vec<_>, _>>()?;

    GraphBundle { directed: false, nodes, edges }.into_network()
}

// ── Dispatch ──────────────────────────────────────────────────────────────────

/// Load a bundle from `path`: a directory is read as CSV, a file as JSON.
pub fn load_bundle(path: &Path) -> SpatialResult<WalkNetwork> {
    if path.is_dir() {
        load_csv_dir(path)
    } else {
        load_json(path)
    }
}
