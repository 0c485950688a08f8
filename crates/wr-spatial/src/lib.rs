//! `wr-spatial` — walk network, spatial indexing, routing, and graph loaders.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`network`]   | `WalkNetwork` (CSR + R-tree), `WalkNetworkBuilder`, `Snap`|
//! | [`router`]    | `Router` trait, `Route`, `DijkstraRouter`                 |
//! | [`walk`]      | pedestrian tag rules, way → network assembly              |
//! | [`bundle`]    | prepared JSON / CSV graph bundles                         |
//! | [`overpass`]  | Overpass QL query and `[out:json]` parsing                |
//! | [`osm`]       | `load_from_pbf` (feature = `"osm"` only)                  |
//! | [`error`]     | `SpatialError`, `SpatialResult<T>`                        |
//!
//! # Feature flags
//!
//! | Flag  | Effect                                           |
//! |-------|--------------------------------------------------|
//! | `osm` | Enables OSM PBF loading via the `osmpbf` crate.  |

pub mod bundle;
pub mod error;
pub mod network;
pub mod overpass;
pub mod router;
pub mod walk;

#[cfg(feature = "osm")]
pub mod osm;


pub use bundle::GraphBundle;
pub use error::{SpatialError, SpatialResult};
pub use network::{Snap, WalkNetwork, WalkNetworkBuilder};
pub use router::{DijkstraRouter, Route, Router};
