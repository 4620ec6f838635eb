use thiserror::Error;

#[derive(Debug, Error)]
pub enum SlicerError {
    #[error("No images available in the catalog")]
    EmptyCatalog,

    #[error("Invalid image selection '{0}'")]
    InvalidImageChoice(String),

    #[error("Select exactly two VMs to connect ({0} selected)")]
    SelectionSize(usize),

    #[error("The topology has no VMs")]
    EmptyTopology,

    #[error("VM '{0}' not found")]
    UnknownVm(String),

    #[error("Image '{0}' not found in the catalog")]
    UnknownImage(String),

    #[error("The slice must be saved before it can be deployed")]
    NotSaved,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Failed to decode backend response: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Serde(String),
}

impl SlicerError {
    /// Errors raised before any backend call was attempted.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SlicerError::EmptyCatalog
                | SlicerError::InvalidImageChoice(_)
                | SlicerError::SelectionSize(_)
                | SlicerError::EmptyTopology
                | SlicerError::UnknownVm(_)
                | SlicerError::UnknownImage(_)
        )
    }

    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            SlicerError::Http(_) | SlicerError::Api { .. } | SlicerError::Decode(_)
        )
    }
}

impl From<toml::de::Error> for SlicerError {
    fn from(err: toml::de::Error) -> Self {
        SlicerError::Serde(err.to_string())
    }
}

impl From<toml::ser::Error> for SlicerError {
    fn from(err: toml::ser::Error) -> Self {
        SlicerError::Serde(err.to_string())
    }
}

impl From<serde_json::Error> for SlicerError {
    fn from(err: serde_json::Error) -> Self {
        SlicerError::Decode(err.to_string())
    }
}
