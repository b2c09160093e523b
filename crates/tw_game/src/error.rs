use std::path::PathBuf;
use thiserror::Error;

/// Asset and map load failures. Always caught at the load boundary and
/// logged; nothing here is fatal to the process.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse JSON {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("map description {path} is missing required field '{field}'")]
    MissingField { path: PathBuf, field: &'static str },
    #[error("map description {path} is invalid: {reason}")]
    InvalidMap { path: PathBuf, reason: String },
    #[error("config {path} is invalid: {reason}")]
    InvalidConfig { path: PathBuf, reason: String },
    #[error("failed to decode image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}
