//! Nominatim (OpenStreetMap) backend.
//!
//! `GET {base}/search?q=…&format=jsonv2&limit=1`.  The response is a JSON
//! array; an empty array means no match.  Nominatim encodes coordinates as
//! strings.

use async_trait::async_trait;
use serde::Deserialize;

use wr_core::GeoPoint;

use crate::geocoder::{require_address, upstream_point};
use crate::{ClientSettings, GeocodeError, GeocodeResult, Geocoder};

pub const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

#[derive(Deserialize)]
struct Place {
    lat: String,
    lon: String,
}

pub struct NominatimGeocoder {
    client:   reqwest::Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(settings: &ClientSettings) -> GeocodeResult<Self> {
        Ok(Self {
            client:   settings.build_client()?,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

fn parse_coord(field: &str, value: &str) -> GeocodeResult<f64> {
    value
        .parse()
        .map_err(|_| GeocodeError::Upstream(format!("invalid {field} {value:?}")))
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, address: &str) -> GeocodeResult<GeoPoint> {
        let query = require_address(address)?;
        let url = format!("{}/search", self.base_url);
        tracing::debug!(address = query, "nominatim geocode request");

        let response = self
            .client
            .get(&url)
            .query(&[("q", query), ("format", "jsonv2"), ("limit", "1")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Upstream(format!("HTTP {status}")));
        }

        let places: Vec<Place> = response
            .json()
            .await
            .map_err(|e| GeocodeError::Upstream(format!("malformed response: {e}")))?;

        let place = places
            .first()
            .ok_or_else(|| GeocodeError::NotFound(address.to_string()))?;

        upstream_point(parse_coord("lat", &place.lat)?, parse_coord("lon", &place.lon)?)
    }

    fn name(&self) -> &'static str {
        "nominatim"
    }
}
