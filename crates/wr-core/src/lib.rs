//! `wr-core` — foundational types for the `walkroute` service.
//!
//! This crate is a dependency of every other `wr-*` crate.  It has no `wr-*`
//! dependencies and a single required external one (`thiserror`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module    | Contents                                   |
//! |-----------|--------------------------------------------|
//! | [`ids`]   | `NodeId`, `EdgeId`                         |
//! | [`geo`]   | `GeoPoint`, haversine distance, `BBox`     |
//! | [`error`] | `CoreError`, `CoreResult`                  |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                              |
//! |---------|-----------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types. |

pub mod error;
pub mod geo;
pub mod ids;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use geo::{BBox, GeoPoint};
pub use ids::{EdgeId, NodeId};
