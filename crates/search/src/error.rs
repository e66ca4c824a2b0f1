use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("Empty query")]
    EmptyQuery,

    #[error("Token '{0}' not found in any package")]
    NotFound(String),

    #[error("Unknown category '{0}' (expected color, typography, spacing, radius or other)")]
    UnknownCategory(String),
}
