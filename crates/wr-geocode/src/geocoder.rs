//! The [`Geocoder`] seam and shared HTTP client setup.

use std::time::Duration;

use async_trait::async_trait;

use wr_core::GeoPoint;

use crate::{GeocodeError, GeocodeResult};

/// Resolves a free-text address to a coordinate.
///
/// Implementations must be `Send + Sync`: one instance serves every
/// in-flight request.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve `address` to its best match.
    ///
    /// # Errors
    ///
    /// [`GeocodeError::NotFound`] if the address is blank or has no match;
    /// [`GeocodeError::Upstream`] / [`GeocodeError::Http`] if the backend
    /// itself fails.  No retry is attempted.
    async fn geocode(&self, address: &str) -> GeocodeResult<GeoPoint>;

    /// Short backend name for logs.
    fn name(&self) -> &'static str;
}

/// Settings shared by the HTTP-backed geocoders.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Sent as `User-Agent`; Nominatim's usage policy requires one that
    /// identifies the application.
    pub user_agent: String,
    /// Whole-request timeout.  A hung upstream surfaces as `Http`.
    pub timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            user_agent: concat!("walkroute/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl ClientSettings {
    pub(crate) fn build_client(&self) -> GeocodeResult<reqwest::Client> {
        Ok(reqwest::Client::builder()
            .user_agent(self.user_agent.clone())
            .timeout(self.timeout)
            .build()?)
    }
}

/// Trim `address`, rejecting blank input before any upstream call.
pub(crate) fn require_address(address: &str) -> GeocodeResult<&str> {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        Err(GeocodeError::NotFound(address.to_string()))
    } else {
        Ok(trimmed)
    }
}

/// Validate a coordinate returned by a backend.
pub(crate) fn upstream_point(lat: f64, lon: f64) -> GeocodeResult<GeoPoint> {
    GeoPoint::checked(lat, lon).map_err(|e| GeocodeError::Upstream(e.to_string()))
}
