//! Geocoding error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeocodeError {
    /// The geocoder answered, but had no match for the address.
    #[error("address {0:?} not found")]
    NotFound(String),

    /// The geocoder answered with an error status (quota, denied, bad body).
    #[error("geocoder error: {0}")]
    Upstream(String),

    /// The request never completed: connect failure, timeout, TLS.
    #[error("geocoder request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl GeocodeError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, GeocodeError::NotFound(_))
    }
}

pub type GeocodeResult<T> = Result<T, GeocodeError>;
