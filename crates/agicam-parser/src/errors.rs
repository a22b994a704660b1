use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReadingError {
    #[error("reading is missing field '{path}'")]
    MissingField { path: String },

    #[error("reading field '{path}' invalid: {message}")]
    InvalidField { path: String, message: String },

    #[error("reading is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReadingError {
    pub fn missing(path: impl Into<String>) -> Self {
        Self::MissingField { path: path.into() }
    }

    pub fn invalid(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidField {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Dotted path of the offending field, when the error points at one.
    pub fn path(&self) -> Option<&str> {
        match self {
            ReadingError::MissingField { path } | ReadingError::InvalidField { path, .. } => {
                Some(path)
            }
            ReadingError::Json(_) => None,
        }
    }
}
