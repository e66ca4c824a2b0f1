use thiserror::Error;
use tokens_model::ModelError;

pub type Result<T> = std::result::Result<T, ResolveError>;

/// Why a reference could not be turned into a literal
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Malformed pointer '{pointer}': {reason}")]
    MalformedPointer { pointer: String, reason: String },

    #[error("File not found for '{pointer}': {package}/{file}")]
    FileNotFound {
        pointer: String,
        package: String,
        file: String,
    },

    #[error("Path not found for '{pointer}': {reason}")]
    PathNotFound { pointer: String, reason: String },

    #[error("Reference chain from '{pointer}' exceeds {limit} hops")]
    CycleDetected { pointer: String, limit: usize },
}

impl From<ModelError> for ResolveError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::MalformedPointer { pointer, reason } => {
                Self::MalformedPointer { pointer, reason }
            }
            other => Self::MalformedPointer {
                pointer: String::new(),
                reason: other.to_string(),
            },
        }
    }
}
