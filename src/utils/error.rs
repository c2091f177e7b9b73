use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Remote returned HTTP {status} for {url}")]
    RemoteStatusError { url: String, status: u16 },

    #[error("Malformed remote response: {message}")]
    MalformedResponseError { message: String },

    #[error("Classification store error: {0}")]
    StoreError(#[from] rusqlite::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid configuration value for {field} ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Candidate job failed: {message}")]
    TaskFailed { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl SyncError {
    /// Remote failures only cost the affected candidate its entries for this pass.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SyncError::ApiError(_)
                | SyncError::RemoteStatusError { .. }
                | SyncError::MalformedResponseError { .. }
        )
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            SyncError::ApiError(_)
            | SyncError::RemoteStatusError { .. }
            | SyncError::MalformedResponseError { .. } => ErrorSeverity::Medium,
            SyncError::ConfigError { .. }
            | SyncError::InvalidConfigValueError { .. }
            | SyncError::ConfigValidationError { .. }
            | SyncError::CsvError(_)
            | SyncError::SerializationError(_) => ErrorSeverity::High,
            SyncError::StoreError(_) | SyncError::IoError(_) | SyncError::TaskFailed { .. } => {
                ErrorSeverity::Critical
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            SyncError::ApiError(_) | SyncError::RemoteStatusError { .. } => {
                "Check network connectivity and the remote base_url; the candidate is retried on the next pass"
            }
            SyncError::MalformedResponseError { .. } => {
                "The remote returned a page instead of data; refresh the session cookie"
            }
            SyncError::StoreError(_) => {
                "Check that the database file is writable and not locked by another process"
            }
            SyncError::CsvError(_) => "Check that the library inventory has 'artist,path' columns",
            SyncError::IoError(_) => "Check file paths and permissions",
            SyncError::SerializationError(_) => "Check the JSON payload format",
            SyncError::ConfigError { .. }
            | SyncError::InvalidConfigValueError { .. }
            | SyncError::ConfigValidationError { .. } => "Fix the configuration file and retry",
            SyncError::TaskFailed { .. } => "This is a bug; please report it with the logs",
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_errors_are_recoverable() {
        let err = SyncError::MalformedResponseError {
            message: "html".to_string(),
        };
        assert!(err.is_recoverable());
        assert_eq!(err.severity(), ErrorSeverity::Medium);

        let err = SyncError::StoreError(rusqlite::Error::QueryReturnedNoRows);
        assert!(!err.is_recoverable());
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }
}
