//! OSM PBF loader — enabled with the `osm` Cargo feature.
//!
//! # Usage
//!
//! ```ignore
//! use std::path::Path;
//! use wr_spatial::osm::load_from_pbf;
//!
//! let network = load_from_pbf(Path::new("san-francisco.osm.pbf"), true)?;
//! ```
//!
//! # What is loaded
//!
//! Only walkable `highway=*` ways are included (see
//! [`is_walkable`](crate::walk::is_walkable)).  Buildings, POIs and
//! relations are ignored.
//!
//! # Memory note
//!
//! The loader buffers all OSM node positions in a `FxHashMap<u64, GeoPoint>`
//! for the single pass (ways reference nodes by OSM id).  The map is freed
//! once the network is assembled.

use std::path::Path;

use osmpbf::{Element, ElementReader};
use rustc_hash::FxHashMap;

use wr_core::GeoPoint;

use crate::network::WalkNetwork;
use crate::walk::{assemble, is_walkable, WayRefs};
use crate::SpatialError;

/// Load a walk network from an OSM PBF file.
///
/// # Errors
///
/// Returns [`SpatialError::Osm`] on parse errors,
/// [`SpatialError::Io`] on file errors.
pub fn load_from_pbf(path: &Path, keep_largest: bool) -> Result<WalkNetwork, SpatialError> {
    let reader = ElementReader::from_path(path).map_err(|e| SpatialError::Osm(e.to_string()))?;

    let mut positions: FxHashMap<u64, GeoPoint> = FxHashMap::default();
    let mut ways: Vec<WayRefs> = Vec::new();

    reader
        .for_each(|elem| match elem {
            Element::Node(n) => {
                positions.insert(n.id() as u64, GeoPoint::new(n.lat(), n.lon()));
            }
            Element::DenseNode(n) => {
                positions.insert(n.id() as u64, GeoPoint::new(n.lat(), n.lon()));
            }
            Element::Way(w) => {
                // Collect tags eagerly so &str lifetimes don't escape the closure.
                let tags: Vec<(&str, &str)> = w.tags().collect();
                if is_walkable(&tags) {
                    ways.push(WayRefs(w.refs().map(|r| r as u64).collect()));
                }
            }
            _ => {}
        })
        .map_err(|e| SpatialError::Osm(e.to_string()))?;

    tracing::debug!(nodes = positions.len(), walkable_ways = ways.len(), "read pbf");

    assemble(&positions, &ways, keep_largest)
}
