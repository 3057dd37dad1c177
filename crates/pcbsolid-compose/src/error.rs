use std::path::PathBuf;

use pcbsolid_core::LayerError;
use pcbsolid_geometry::{GeometryError, UnknownAlgorithm};

/// Invalid caller input: fatal, reported before any geometry is built.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid shape kind: {0}")]
    InvalidKind(String),
    #[error(transparent)]
    Layer(#[from] LayerError),
    #[error(transparent)]
    Algorithm(#[from] UnknownAlgorithm),
    #[error("invalid config: {0}")]
    Parse(String),
    #[error("failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error("no copper layer found")]
    NoCopperLayer,
    #[error("pad shape {shape} not implemented (pad {pad} of {reference})")]
    UnsupportedPadShape {
        shape: &'static str,
        pad: String,
        reference: String,
    },
    #[error("cannot find 3D model directory {0:?}")]
    ModelDirectory(PathBuf),
}

impl From<LayerError> for ComposeError {
    fn from(e: LayerError) -> Self {
        ComposeError::Config(ConfigError::Layer(e))
    }
}

/// A component model that could not be loaded. Logged, never fatal.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model not found: {0:?}")]
    NotFound(PathBuf),
    #[error("failed to read model {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ComposeError>;
