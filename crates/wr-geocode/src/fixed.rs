//! In-memory geocoder.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use wr_core::GeoPoint;

use crate::geocoder::require_address;
use crate::{GeocodeError, GeocodeResult, Geocoder};

/// Answers from a fixed address table.  Lookups use the trimmed address,
/// case-sensitively.
///
/// ```
/// use wr_core::GeoPoint;
/// use wr_geocode::StaticGeocoder;
///
/// let g = StaticGeocoder::new()
///     .with("Ferry Building", GeoPoint::new(37.7955, -122.3937))
///     .with_failure("Flaky Street");
/// ```
#[derive(Debug, Default, Clone)]
pub struct StaticGeocoder {
    entries:  HashMap<String, GeoPoint>,
    failures: HashSet<String>,
}

impl StaticGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, address: impl Into<String>, point: GeoPoint) -> Self {
        self.entries.insert(address.into(), point);
        self
    }

    /// Make `address` fail as if the backend were down.
    pub fn with_failure(mut self, address: impl Into<String>) -> Self {
        self.failures.insert(address.into());
        self
    }
}

#[async_trait]
impl Geocoder for StaticGeocoder {
    async fn geocode(&self, address: &str) -> GeocodeResult<GeoPoint> {
        let key = require_address(address)?;
        if self.failures.contains(key) {
            return Err(GeocodeError::Upstream(format!("simulated failure for {key:?}")));
        }
        self.entries
            .get(key)
            .copied()
            .ok_or_else(|| GeocodeError::NotFound(address.to_string()))
    }

    fn name(&self) -> &'static str {
        "static"
    }
}
