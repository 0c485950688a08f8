//! Overpass API query building and response parsing.
//!
//! The HTTP round-trip itself lives with the caller (the server's startup
//! code and the `prepare_bundle` CLI); this module only turns a bounding box
//! into Overpass QL and an `[out:json]` response into a [`WalkNetwork`].
//!
//! # Usage
//!
//! ```ignore
//! let ql = walk_query(&bbox, 180);
//! let body = http_post(overpass_url, ql)?;
//! let network = network_from_json(&body, true)?;
//! ```

use std::collections::HashMap;

use rustc_hash::FxHashMap;

use serde::Deserialize;

use wr_core::{BBox, GeoPoint};

use crate::network::WalkNetwork;
use crate::walk::{assemble, is_walkable, WayRefs};
use crate::{SpatialError, SpatialResult};

/// Overpass QL selecting every `highway=*` way in `bbox` plus its nodes.
///
/// Walkability is filtered client-side by [`is_walkable`] so the same rules
/// apply to Overpass and PBF sources.
pub fn walk_query(bbox: &BBox, timeout_secs: u32) -> String {
    format!(
        "[out:json][timeout:{timeout_secs}];\n\
         (way[\"highway\"]({bbox}););\n\
         (._;>;);\n\
         out body;"
    )
}

// ── Response model ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct OverpassResponse {
    elements: Vec<Element>,
    #[serde(default)]
    remark: Option<String>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Element {
    Node {
        id:  u64,
        lat: f64,
        lon: f64,
    },
    Way {
        #[serde(default)]
        nodes: Vec<u64>,
        #[serde(default)]
        tags:  HashMap<String, String>,
    },
    #[serde(other)]
    Other,
}

// ── Public entry points ───────────────────────────────────────────────────────

/// Parse an Overpass `[out:json]` body into a walk network.
///
/// `keep_largest` drops every component except the largest, so that any
/// two snapped nodes are mutually reachable.
pub fn network_from_json(body: &str, keep_largest: bool) -> SpatialResult<WalkNetwork> {
    let response: OverpassResponse = serde_json::from_str(body)?;
    network_from_response(response, keep_largest)
}

fn network_from_response(response: OverpassResponse, keep_largest: bool) -> SpatialResult<WalkNetwork> {
    // Overpass reports server-side failures (timeouts, memory) as a remark
    // alongside a truncated element list.
    if let Some(remark) = response.remark.filter(|r| r.contains("error")) {
        return Err(SpatialError::Parse(format!("overpass: {remark}")));
    }

    let mut positions: FxHashMap<u64, GeoPoint> = FxHashMap::default();
    let mut ways: Vec<WayRefs> = Vec::new();
    let mut skipped = 0usize;

    for element in response.elements {
        match element {
            Element::Node { id, lat, lon } => {
                positions.insert(id, GeoPoint::checked(lat, lon)?);
            }
            Element::Way { nodes, tags } => {
                let tags: Vec<(&str, &str)> =
                    tags.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
                if is_walkable(&tags) {
                    ways.push(WayRefs(nodes));
                } else {
                    skipped += 1;
                }
            }
            Element::Other => {}
        }
    }

    tracing::debug!(
        nodes = positions.len(),
        walkable_ways = ways.len(),
        skipped_ways = skipped,
        "parsed overpass response"
    );

    assemble(&positions, &ways, keep_largest)
}
