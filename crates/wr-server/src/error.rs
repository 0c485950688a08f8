//! Request-level error type and its HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use wr_geocode::GeocodeError;

/// Why a route lookup failed.  Every variant maps to one HTTP status and
/// a `{"detail": ...}` body.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("Address '{0}' not found.")]
    AddressNotFound(String),

    #[error("Failed to geocode address.")]
    UpstreamGeocoding,

    #[error("No walking path found between the given addresses.")]
    NoPathFound,

    /// Underlying text stays server-side; the stage that failed logs it.
    #[error("Internal server error.")]
    Internal(String),

    /// Request body did not match the schema.
    #[error("{message}")]
    InvalidBody { status: StatusCode, message: String },
}

impl RouteError {
    pub fn status(&self) -> StatusCode {
        match self {
            RouteError::AddressNotFound(_) => StatusCode::BAD_REQUEST,
            RouteError::UpstreamGeocoding
            | RouteError::NoPathFound
            | RouteError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RouteError::InvalidBody { status, .. } => *status,
        }
    }

    /// Classify a geocoder failure for `address`.
    pub fn from_geocode(address: &str, err: GeocodeError) -> Self {
        match err {
            GeocodeError::NotFound(_) => RouteError::AddressNotFound(address.to_string()),
            GeocodeError::Upstream(_) | GeocodeError::Http(_) => RouteError::UpstreamGeocoding,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl IntoResponse for RouteError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(ErrorBody { detail: self.to_string() })).into_response()
    }
}
