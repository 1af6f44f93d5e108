//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias. Fatal
//! variants (`InvalidConfig`, `InvalidGeometry`, `Cancelled`) abort a render before or between
//! rows. `SampleFailure` and `ShapeEmitFailure` are produced by fields and renderers for a
//! single cell; the engine recovers from them and keeps going.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("brightness sample failed: {0}")]
    SampleFailure(String),

    #[error("shape emit failed: {0}")]
    ShapeEmitFailure(String),

    #[error("render cancelled after {shapes_created} shapes")]
    Cancelled { shapes_created: usize },

    #[cfg(feature = "image")]
    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Returns `true` for errors the engine recovers from on a per-cell basis.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::SampleFailure(_) | Error::ShapeEmitFailure(_))
    }
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error::Other(value)
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Error::Other(value.to_owned())
    }
}
