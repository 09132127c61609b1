/// Convenience result type used across facefx.
pub type FaceFxResult<T> = Result<T, FaceFxError>;

/// Top-level error taxonomy used by the frame pipeline.
///
/// Capture and detection errors are fatal to the tick they occur in. Backend errors are
/// contained to the face that produced them.
#[derive(thiserror::Error, Debug)]
pub enum FaceFxError {
    /// Invalid parameters or mismatched buffer sizes.
    #[error("validation error: {0}")]
    Validation(String),

    /// The frame source failed to deliver a frame.
    #[error("capture error: {0}")]
    Capture(String),

    /// The face detector failed.
    #[error("detection error: {0}")]
    Detection(String),

    /// An effect backend failed to transform a face region.
    #[error("backend error: {0}")]
    Backend(String),

    /// Errors when serializing or deserializing configuration or detections.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FaceFxError {
    /// Build a [`FaceFxError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`FaceFxError::Capture`] value.
    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture(msg.into())
    }

    /// Build a [`FaceFxError::Detection`] value.
    pub fn detection(msg: impl Into<String>) -> Self {
        Self::Detection(msg.into())
    }

    /// Build a [`FaceFxError::Backend`] value.
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Build a [`FaceFxError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Return `true` for errors that abort the whole tick rather than a single face.
    pub fn is_tick_fatal(&self) -> bool {
        matches!(self, Self::Capture(_) | Self::Detection(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
