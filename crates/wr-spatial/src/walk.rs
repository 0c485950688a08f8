//! Pedestrian tag rules and way-to-network assembly shared by the OSM
//! loaders ([`overpass`](crate::overpass), [`osm`](crate::osm)).
//!
//! # What counts as walkable
//!
//! A way is walkable when its `highway` class admits pedestrians (see
//! [`highway_walkable`]) and it is not closed to them by `foot=no` or by
//! `access=no|private` without a `foot=yes|designated|permissive` override.
//! All walkable ways are added in **both directions**: `oneway` tags do not
//! bind pedestrians.

use rustc_hash::{FxHashMap, FxHashSet};

use wr_core::{GeoPoint, NodeId};

use crate::network::{WalkNetwork, WalkNetworkBuilder};
use crate::SpatialResult;

/// Whether a `highway=*` class admits pedestrians.
pub fn highway_walkable(highway: &str) -> bool {
    match highway {
        "footway" | "path" | "pedestrian" | "steps" | "corridor" | "crossing"
        | "living_street" | "residential" | "service" | "unclassified" | "road"
        | "track" | "cycleway" | "bridleway"
        | "tertiary" | "tertiary_link"
        | "secondary" | "secondary_link"
        | "primary" | "primary_link"
        | "trunk" | "trunk_link" => true,
        // Motorways, unbuilt ways, platforms and anything unknown.
        _ => false,
    }
}

/// Whether a way with these tags belongs in the walk network.
pub fn is_walkable(tags: &[(&str, &str)]) -> bool {
    let tag = |key: &str| tags.iter().find(|(k, _)| *k == key).map(|(_, v)| *v);

    let Some(highway) = tag("highway") else {
        return false;
    };
    if !highway_walkable(highway) {
        return false;
    }
    if tag("area") == Some("yes") {
        return false;
    }

    match tag("foot") {
        Some("no") => false,
        Some("yes" | "designated" | "permissive") => true,
        _ => !matches!(tag("access"), Some("no" | "private")),
    }
}

/// A walkable way: its node references in order.
#[derive(Debug, Clone)]
pub struct WayRefs(pub Vec<u64>);

/// Build a walk network from node positions and walkable ways.
///
/// Only nodes referenced by some way are kept; they are added in ascending
/// ref order so `NodeId`s are reproducible across loads.  Segments touching
/// a ref absent from `positions` (clipped extracts) are skipped, as are
/// zero-length self-loops.  With `keep_largest`, only the largest weakly
/// connected component survives.
pub fn assemble(
    positions: &FxHashMap<u64, GeoPoint>,
    ways: &[WayRefs],
    keep_largest: bool,
) -> SpatialResult<WalkNetwork> {
    let mut segments: Vec<(u64, u64)> = ways
        .iter()
        .flat_map(|w| w.0.windows(2).map(|pair| (pair[0], pair[1])))
        .filter(|(a, b)| a != b && positions.contains_key(a) && positions.contains_key(b))
        .collect();

    if keep_largest {
        let keep = largest_component(&segments);
        segments.retain(|(a, _)| keep.contains(a));
    }

    let mut refs: Vec<u64> = segments.iter().flat_map(|&(a, b)| [a, b]).collect();
    refs.sort_unstable();
    refs.dedup();

    let mut builder = WalkNetworkBuilder::with_capacity(refs.len(), segments.len() * 2);
    let ids: FxHashMap<u64, NodeId> = refs
        .iter()
        .map(|&r| (r, builder.add_node(positions[&r], r)))
        .collect();

    for (a, b) in segments {
        let (from, to) = (ids[&a], ids[&b]);
        let len_m = builder.node_pos(from).distance_m(builder.node_pos(to));
        builder.add_road(from, to, len_m)?;
    }

    Ok(builder.build())
}

/// Refs of the largest weakly connected component, via union–find.
fn largest_component(segments: &[(u64, u64)]) -> FxHashSet<u64> {
    let mut index: FxHashMap<u64, usize> = FxHashMap::default();
    let mut parent: Vec<usize> = Vec::new();

    let mut slot = |r: u64, parent: &mut Vec<usize>| -> usize {
        *index.entry(r).or_insert_with(|| {
            parent.push(parent.len());
            parent.len() - 1
        })
    };

    fn find(parent: &mut [usize], mut x: usize) -> usize {
        while parent[x] != x {
            parent[x] = parent[parent[x]];
            x = parent[x];
        }
        x
    }

    for &(a, b) in segments {
        let ia = slot(a, &mut parent);
        let ib = slot(b, &mut parent);
        let (ra, rb) = (find(&mut parent, ia), find(&mut parent, ib));
        if ra != rb {
            parent[ra.max(rb)] = ra.min(rb);
        }
    }

    let mut sizes: FxHashMap<usize, usize> = FxHashMap::default();
    let roots: Vec<(u64, usize)> = index
        .iter()
        .map(|(&r, &i)| (r, find(&mut parent, i)))
        .collect();
    for &(_, root) in &roots {
        *sizes.entry(root).or_default() += 1;
    }

    // Ties go to the component holding the smallest slot (first seen).
    let Some(best) = sizes
        .iter()
        .max_by(|(ra, sa), (rb, sb)| sa.cmp(sb).then(rb.cmp(ra)))
        .map(|(&root, _)| root)
    else {
        return FxHashSet::default();
    };

    roots
        .into_iter()
        .filter(|&(_, root)| root == best)
        .map(|(r, _)| r)
        .collect()
}
