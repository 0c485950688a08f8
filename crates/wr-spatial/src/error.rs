//! Spatial-subsystem error type.

use thiserror::Error;

use wr_core::{CoreError, NodeId};

/// Errors produced by `wr-spatial`.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("no route from {from} to {to}")]
    NoRoute { from: NodeId, to: NodeId },

    #[error("node {0} not found in network")]
    NodeNotFound(NodeId),

    #[error("network has no nodes")]
    EmptyNetwork,

    #[error("edge {from} -> {to} has invalid length {length}")]
    InvalidEdge { from: u64, to: u64, length: f64 },

    #[error("edge references unknown node {0}")]
    UnknownNodeRef(u64),

    #[error("node {0} is defined more than once")]
    DuplicateNodeRef(u64),

    #[error("graph parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "osm")]
    #[error("OSM parse error: {0}")]
    Osm(String),
}

impl From<serde_json::Error> for SpatialError {
    fn from(e: serde_json::Error) -> Self {
        SpatialError::Parse(e.to_string())
    }
}

impl From<csv::Error> for SpatialError {
    fn from(e: csv::Error) -> Self {
        SpatialError::Parse(e.to_string())
    }
}

pub type SpatialResult<T> = Result<T, SpatialError>;
