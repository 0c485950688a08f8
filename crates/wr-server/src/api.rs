//! HTTP surface: wire types, handlers, and the axum `Router`.

use std::sync::Arc;

use anyhow::Context;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Json;
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::CorsOrigins;
use crate::error::RouteError;
use crate::service::RouteService;

pub use crate::service::RouteResponse;

pub const ROUTE_PATH: &str = "/api/py/shortest-path";
pub const HEALTH_PATH: &str = "/api/py/health";

// ── Wire types ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteRequest {
    pub start_address: String,
    pub end_address:   String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub nodes:  usize,
    pub edges:  usize,
}

// ── Router ────────────────────────────────────────────────────────────────────

pub fn router(service: Arc<RouteService>, cors: CorsLayer) -> axum::Router {
    axum::Router::new()
        .route(ROUTE_PATH, post(shortest_path))
        .route(HEALTH_PATH, get(health))
        .with_state(service)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Any method and header; origins per config.
pub fn cors_layer(origins: &CorsOrigins) -> anyhow::Result<CorsLayer> {
    let allow_origin = match origins {
        CorsOrigins::Any => AllowOrigin::any(),
        CorsOrigins::List(list) => {
            let values = list
                .iter()
                .map(|o| HeaderValue::from_str(o).with_context(|| format!("CORS_ORIGINS: invalid origin {o:?}")))
                .collect::<anyhow::Result<Vec<_>>>()?;
            AllowOrigin::list(values)
        }
    };
    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any))
}

// ── Handlers ──────────────────────────────────────────────────────────────────

async fn shortest_path(
    State(service): State<Arc<RouteService>>,
    payload: Result<Json<RouteRequest>, JsonRejection>,
) -> Result<Json<RouteResponse>, RouteError> {
    let Json(req) = payload.map_err(|rejection| RouteError::InvalidBody {
        status:  rejection.status(),
        message: rejection.body_text(),
    })?;
    service
        .route(&req.start_address, &req.end_address)
        .await
        .map(Json)
}

async fn health(State(service): State<Arc<RouteService>>) -> Json<HealthResponse> {
    let network = service.network();
    Json(HealthResponse {
        status: "ok".into(),
        nodes:  network.node_count(),
        edges:  network.edge_count(),
    })
}
