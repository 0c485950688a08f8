//! Geographic coordinate types and spatial utilities.
//!
//! `GeoPoint` uses `f64` latitude/longitude: coordinates arrive from
//! geocoders and OSM as double precision and are echoed back to clients
//! unchanged, so there is nothing to gain from narrowing them.

use std::fmt;
use std::str::FromStr;

use crate::{CoreError, CoreResult};

/// A WGS-84 geographic coordinate.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Construct a point, rejecting non-finite values and anything outside
    /// `[-90, 90] × [-180, 180]`.
    pub fn checked(lat: f64, lon: f64) -> CoreResult<Self> {
        let p = Self { lat, lon };
        if p.is_valid() {
            Ok(p)
        } else {
            Err(CoreError::OutOfRange { lat, lon })
        }
    }

    pub fn is_valid(self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// Haversine great-circle distance in metres.
    pub fn distance_m(self, other: GeoPoint) -> f64 {
        const R: f64 = 6_371_000.0; // mean Earth radius, metres

        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        R * c
    }

    /// `[lat, lon]` pair, the shape used on the wire and in the R-tree.
    #[inline]
    pub fn to_array(self) -> [f64; 2] {
        [self.lat, self.lon]
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

// ── BBox ──────────────────────────────────────────────────────────────────────

/// Axis-aligned lat/lon bounding box, in Overpass order
/// (`south, west, north, east`).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BBox {
    pub south: f64,
    pub west:  f64,
    pub north: f64,
    pub east:  f64,
}

impl BBox {
    pub fn new(south: f64, west: f64, north: f64, east: f64) -> CoreResult<Self> {
        GeoPoint::checked(south, west)?;
        GeoPoint::checked(north, east)?;
        if south >= north || west >= east {
            return Err(CoreError::Parse(format!(
                "empty bounding box: south {south} must be < north {north}, west {west} < east {east}"
            )));
        }
        Ok(Self { south, west, north, east })
    }
}

impl FromStr for BBox {
    type Err = CoreError;

    /// Parse `"south,west,north,east"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<f64> = s
            .split(',')
            .map(|p| {
                p.trim()
                    .parse::<f64>()
                    .map_err(|e| CoreError::Parse(format!("invalid bbox component {p:?}: {e}")))
            })
            .collect::<CoreResult<_>>()?;

        match parts.as_slice() {
            &[south, west, north, east] => BBox::new(south, west, north, east),
            _ => Err(CoreError::Parse(format!(
                "expected 4 comma-separated values (south,west,north,east), got {}",
                parts.len()
            ))),
        }
    }
}

impl fmt::Display for BBox {
    /// Formats in Overpass QL order.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.south, self.west, self.north, self.east)
    }
}
