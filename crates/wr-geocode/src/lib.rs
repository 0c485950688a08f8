//! `wr-geocode` — free-text address → coordinate.
//!
//! # Crate layout
//!
//! | Module          | Contents                                          |
//! |-----------------|---------------------------------------------------|
//! | [`geocoder`]    | `Geocoder` trait, `ClientSettings`, HTTP client   |
//! | [`google`]      | `GoogleGeocoder` (commercial Geocoding API)       |
//! | [`nominatim`]   | `NominatimGeocoder` (open OSM geocoder)           |
//! | [`fixed`]       | `StaticGeocoder` (in-memory table, for tests/demos) |
//! | [`error`]       | `GeocodeError`, `GeocodeResult<T>`                |

pub mod error;
pub mod fixed;
pub mod geocoder;
pub mod google;
pub mod nominatim;


pub use error::{GeocodeError, GeocodeResult};
pub use fixed::StaticGeocoder;
pub use geocoder::{ClientSettings, Geocoder};
pub use google::GoogleGeocoder;
pub use nominatim::NominatimGeocoder;
