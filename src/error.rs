use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessingError>;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to persist '{path}'")]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write failure log '{path}'")]
    FailureLog {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("HTTP client setup failed: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

impl ProcessingError {
    pub fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ProcessingError::Persistence {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_persistence_cause_is_reported_once() {
        let error = ProcessingError::persistence(
            "output/grid.json",
            std::io::Error::new(std::io::ErrorKind::Other, "Not a directory"),
        );

        assert_eq!(error.to_string(), "Failed to persist 'output/grid.json'");
        assert_eq!(error.source().map(|e| e.to_string()).as_deref(), Some("Not a directory"));

        let chained = format!("{:#}", anyhow::Error::from(error));
        assert_eq!(chained.matches("Not a directory").count(), 1);
    }
}
