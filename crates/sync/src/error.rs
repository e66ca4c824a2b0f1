use thiserror::Error;
use tokens_model::ModelError;

pub type Result<T> = std::result::Result<T, SyncError>;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Invalid sync configuration: {0}")]
    Config(String),

    #[error("Failed to parse sync configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Source export is not valid JSON: {0}")]
    SourceJson(#[from] serde_json::Error),

    #[error("Source export must be an object of collections")]
    SourceShape,

    #[error("Collection '{collection}' has an unexpected shape: {reason}")]
    Structural { collection: String, reason: String },

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl SyncError {
    pub(crate) fn structural(collection: &str, reason: impl Into<String>) -> Self {
        Self::Structural {
            collection: collection.to_string(),
            reason: reason.into(),
        }
    }
}
