/// Convenience result type used across checkergen.
pub type CheckergenResult<T> = Result<T, CheckergenError>;

/// Top-level error taxonomy used by engine and session APIs.
#[derive(thiserror::Error, Debug)]
pub enum CheckergenError {
    /// A board or project was given parameters it cannot be built from.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Invalid user-provided arguments outside of board/project construction.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrong file extension or unsupported image format.
    #[error("file format error: {0}")]
    Format(String),

    /// An export would produce more frames than the configured ceiling allows.
    #[error("large number ({frames}) of frames to be exported, limit is {max}")]
    FrameOverflow {
        /// Frames the export would have produced.
        frames: u64,
        /// Configured ceiling.
        max: u64,
    },

    /// The user declined an export at the confirmation gate.
    #[error("export cancelled")]
    ExportCancelled,

    /// A display session is already running.
    #[error("animation is already being displayed")]
    SessionBusy,

    /// Errors when serializing or deserializing projects.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CheckergenError {
    /// Build a [`CheckergenError::InvalidConfiguration`] value.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Build a [`CheckergenError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`CheckergenError::Format`] value.
    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    /// Build a [`CheckergenError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
