//! Shared error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` where a core
//! operation (bounding-box parsing, coordinate validation) can fail.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("coordinate out of range: lat {lat}, lon {lon}")]
    OutOfRange { lat: f64, lon: f64 },
}

pub type CoreResult<T> = Result<T, CoreError>;
