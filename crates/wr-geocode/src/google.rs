//! Google Geocoding API backend.
//!
//! `GET {base}/maps/api/geocode/json?address=…&key=…`.  The API reports
//! outcome in a `status` field rather than the HTTP status:
//!
//! | `status`          | Result                      |
//! |-------------------|-----------------------------|
//! | `OK`              | first result's location     |
//! | `ZERO_RESULTS`    | `NotFound`                  |
//! | anything else     | `Upstream` (quota, denied…) |

use async_trait::async_trait;
use serde::Deserialize;

use wr_core::GeoPoint;

use crate::geocoder::{require_address, upstream_point};
use crate::{ClientSettings, GeocodeError, GeocodeResult, Geocoder};

pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com";

#[derive(Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResultItem>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Deserialize)]
struct GeocodeResultItem {
    geometry: Geometry,
}

#[derive(Deserialize)]
struct Geometry {
    location: Location,
}

#[derive(Deserialize)]
struct Location {
    lat: f64,
    lng: f64,
}

pub struct GoogleGeocoder {
    client:   reqwest::Client,
    api_key:  String,
    base_url: String,
}

impl GoogleGeocoder {
    pub fn new(api_key: impl Into<String>, settings: &ClientSettings) -> GeocodeResult<Self> {
        Ok(Self {
            client:   settings.build_client()?,
            api_key:  api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Point at a different host (proxy, test stub).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn geocode(&self, address: &str) -> GeocodeResult<GeoPoint> {
        let query = require_address(address)?;
        let url = format!("{}/maps/api/geocode/json", self.base_url);
        tracing::debug!(address = query, "google geocode request");

        let response = self
            .client
            .get(&url)
            .query(&[("address", query), ("key", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Upstream(format!("HTTP {status}")));
        }

        let body: GeocodeResponse = response
            .json()
            .await
            .map_err(|e| GeocodeError::Upstream(format!("malformed response: {e}")))?;

        match body.status.as_str() {
            "OK" => {
                let location = body
                    .results
                    .first()
                    .map(|r| &r.geometry.location)
                    .ok_or_else(|| GeocodeError::NotFound(address.to_string()))?;
                upstream_point(location.lat, location.lng)
            }
            "ZERO_RESULTS" => Err(GeocodeError::NotFound(address.to_string())),
            other => Err(GeocodeError::Upstream(match body.error_message {
                Some(msg) => format!("{other}: {msg}"),
                None => other.to_string(),
            })),
        }
    }

    fn name(&self) -> &'static str {
        "google"
    }
}
