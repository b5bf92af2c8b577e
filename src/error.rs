use std::io;
use thiserror::Error;

/// Per-document failure kinds. Everything except `Io` aborts only the
/// document that raised it; `Io` is fatal for the whole batch.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The input is not a well-formed document container.
    #[error("not a valid document container: {0}")]
    Format(String),

    /// An image relationship id has no resolvable target.
    #[error("unresolved image relationship '{0}'")]
    MissingRelationship(String),

    /// The content tree cannot be rendered as structured HTML.
    #[error("document structure cannot be rendered: {0}")]
    Serialization(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}
