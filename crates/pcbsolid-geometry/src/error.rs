#[derive(Debug, Clone, thiserror::Error)]
pub enum GeometryError {
    #[error("invalid edge: {0}")]
    InvalidEdge(String),
    #[error("cannot sort edges into wires: {0}")]
    WireSorting(String),
    #[error("wire does not define a plane for offsetting")]
    PlaneUndefined,
    #[error("offset failed: {0}")]
    OffsetFailed(String),
    #[error("null shape")]
    NullShape,
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),
}

pub type Result<T> = std::result::Result<T, GeometryError>;
