use thiserror::Error;

/// Conditions that stop a caret overlay from being created.
///
/// Everything that can go wrong after construction is handled by falling back (hiding the caret,
/// using the field's origin, using the default preset) rather than by returning an error.
#[derive(Debug, Error)]
pub enum CaretError {
    #[error("overlay rendering context is unavailable: {0}")]
    RenderContextUnavailable(String),
}
