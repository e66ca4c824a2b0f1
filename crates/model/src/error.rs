use thiserror::Error;

/// Result type for token model operations
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors raised while parsing or shaping token graphs
#[derive(Error, Debug)]
pub enum ModelError {
    /// Pointer text does not follow `<package>/<file>.json#/<path>`
    #[error("Malformed pointer '{pointer}': {reason}")]
    MalformedPointer { pointer: String, reason: String },

    /// JSON value that has no place in a token graph (null, array)
    #[error("Unsupported {kind} at '{path}'")]
    UnsupportedValue { path: String, kind: &'static str },

    /// A token file must be a JSON object at its root
    #[error("Token file root must be an object")]
    RootNotObject,

    /// JSON parse error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ModelError {
    /// Create a malformed pointer error
    pub fn malformed(pointer: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedPointer {
            pointer: pointer.into(),
            reason: reason.into(),
        }
    }
}
