use thiserror::Error;

/// Consistency violations surfaced by the tessellation cache.
///
/// These indicate a broken contract between the scene and the tessellator
/// (keys out of sync), never bad authored geometry; degenerate geometry is
/// handled as legitimate empty output instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("shape `{0}` is not registered with the tessellator")]
    UnknownShape(String),

    #[error("registered shape `{0}` no longer resolves to any geometry; deregister before dropping shapes")]
    MissingGeometry(String),
}
