use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading links tables, fitting converters or
/// exporting plots.
///
/// A failed fit never produces a converter, so every constructor in this
/// crate returns `Result<_, ConversionError>`.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// Bad bound or input value, or an unknown regression kind.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Malformed table rows, values a log transform cannot take, or a
    /// sample set that cannot support the requested fit.
    #[error("data format error: {0}")]
    DataFormat(String),

    /// Unknown linkset, or a project without linksets.
    #[error("not found: {0}")]
    NotFound(String),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write image {}: {source}", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

pub type Result<T> = std::result::Result<T, ConversionError>;
