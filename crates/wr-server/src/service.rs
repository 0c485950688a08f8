//! The route lookup pipeline: geocode both addresses, snap to the network,
//! search, and shape the response.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::Instrument;

use wr_core::{GeoPoint, NodeId};
use wr_geocode::Geocoder;
use wr_spatial::{Route, Router, SpatialError, WalkNetwork};

use crate::error::RouteError;

/// Successful lookup, as sent to the client.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RouteResponse {
    /// `[lat, lon]` per node, start to end inclusive.
    pub path:       Vec<[f64; 2]>,
    pub directions: Vec<String>,
    /// Sum of traversed edge lengths, in metres.
    pub distance_m: f64,
}

/// Everything a request needs, shared read-only across handlers.
pub struct RouteService {
    network:     Arc<WalkNetwork>,
    geocoder:    Arc<dyn Geocoder>,
    router:      Arc<dyn Router>,
    snap_warn_m: f64,
}

impl RouteService {
    pub fn new(
        network: Arc<WalkNetwork>,
        geocoder: Arc<dyn Geocoder>,
        router: Arc<dyn Router>,
        snap_warn_m: f64,
    ) -> Self {
        Self { network, geocoder, router, snap_warn_m }
    }

    pub fn network(&self) -> &WalkNetwork {
        &self.network
    }

    /// Address → coordinate via the configured geocoder.
    pub async fn resolve_address(&self, address: &str) -> Result<GeoPoint, RouteError> {
        match self.geocoder.geocode(address).await {
            Ok(point) => {
                tracing::debug!(address, %point, backend = self.geocoder.name(), "geocoded");
                Ok(point)
            }
            Err(err) => {
                if err.is_not_found() {
                    tracing::info!(address, "address not found");
                } else {
                    tracing::warn!(address, error = %err, backend = self.geocoder.name(), "geocoding failed");
                }
                Err(RouteError::from_geocode(address, err))
            }
        }
    }

    /// Coordinate → nearest network node.  Never rejects on distance; a
    /// snap beyond the warning threshold is only logged.
    pub fn nearest_node(&self, point: GeoPoint) -> Result<NodeId, RouteError> {
        let Some(snap) = self.network.snap(point) else {
            tracing::error!(%point, "cannot snap: walk network is empty");
            return Err(RouteError::Internal(SpatialError::EmptyNetwork.to_string()));
        };
        if snap.distance_m > self.snap_warn_m {
            tracing::warn!(
                %point,
                node = %snap.node,
                distance_m = snap.distance_m,
                "coordinate is far from the walk network"
            );
        } else {
            tracing::debug!(%point, node = %snap.node, distance_m = snap.distance_m, "snapped");
        }
        Ok(snap.node)
    }

    /// Minimum-length route between two nodes, computed off the async
    /// executor.
    pub async fn shortest_path(&self, from: NodeId, to: NodeId) -> Result<Route, RouteError> {
        let network = Arc::clone(&self.network);
        let router = Arc::clone(&self.router);
        let result = tokio::task::spawn_blocking(move || router.route(&network, from, to))
            .await
            .map_err(|e| {
                tracing::error!(%from, %to, error = %e, "routing task failed");
                RouteError::Internal(format!("routing task failed: {e}"))
            })?;

        match result {
            Ok(route) => {
                if route.is_trivial() {
                    tracing::debug!(node = %from, "start and end snap to the same node");
                }
                Ok(route)
            }
            Err(SpatialError::NoRoute { from, to }) => {
                tracing::info!(%from, %to, "no walking path");
                Err(RouteError::NoPathFound)
            }
            Err(e) => {
                tracing::error!(%from, %to, error = %e, "routing failed");
                Err(RouteError::Internal(e.to_string()))
            }
        }
    }

    /// Full pipeline for one request.  The first failing stage ends it.
    pub async fn route(&self, start: &str, end: &str) -> Result<RouteResponse, RouteError> {
        let span = tracing::info_span!("route", start, end);
        async move {
            let start_point = self.resolve_address(start).await?;
            let end_point = self.resolve_address(end).await?;

            let from = self.nearest_node(start_point)?;
            let to = self.nearest_node(end_point)?;

            let route = self.shortest_path(from, to).await?;
            tracing::info!(
                nodes = route.nodes.len(),
                distance_m = route.total_length_m,
                "route found"
            );

            Ok(RouteResponse {
                path: route.coords(&self.network).into_iter().map(GeoPoint::to_array).collect(),
                directions: directions(start, end),
                distance_m: route.total_length_m,
            })
        }
        .instrument(span)
        .await
    }
}

/// Placeholder directions: one sentence naming both addresses as given.
pub fn directions(start: &str, end: &str) -> Vec<String> {
    vec![format!("Walk from {start} to {end}.")]
}
