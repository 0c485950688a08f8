//! `wr-server` — the walking-route HTTP service.
//!
//! # Crate layout
//!
//! | Module      | Contents                                              |
//! |-------------|-------------------------------------------------------|
//! | [`config`]  | `Config::from_env`, geocoder / graph source selection |
//! | [`graph`]   | startup network loading, Overpass fetch               |
//! | [`service`] | `RouteService`: geocode → snap → route pipeline       |
//! | [`api`]     | axum router, handlers, wire types, CORS               |
//! | [`error`]   | `RouteError` and its HTTP mapping                     |
//! | [`logging`] | `tracing` subscriber setup                            |
//!
//! # Feature flags
//!
//! | Flag  | Effect                                   |
//! |-------|------------------------------------------|
//! | `osm` | `GRAPH_SOURCE=pbf` and `prepare_bundle --pbf` |

pub mod api;
pub mod config;
pub mod error;
pub mod graph;
pub mod logging;
pub mod service;

#[cfg(test)]
mod tests;

pub use config::Config;
pub use error::RouteError;
pub use service::RouteService;
