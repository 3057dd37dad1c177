#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("nothing to export")]
    Empty,
    #[error("JSCAD export needs solids (found a {0})")]
    NotExtrudable(&'static str),
}
