use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProjectError>;

#[derive(Error, Debug)]
pub enum ProjectError {
    #[error("'{file}' names no known token domain")]
    UnknownLayout { file: String },

    #[error("{file}: {reason}")]
    Shape { file: String, reason: String },

    #[error("Invalid color group pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

impl ProjectError {
    pub(crate) fn shape(file: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Shape {
            file: file.into(),
            reason: reason.into(),
        }
    }
}
