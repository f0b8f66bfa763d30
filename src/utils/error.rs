use thiserror::Error;

/// Failure reported by an object-storage backend.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("transport failure: {message}")]
    Transport { message: String },

    #[error("object not found: {path}")]
    NotFound { path: String },

    #[error("backend responded with {status}: {message}")]
    Status { status: u16, message: String },

    #[error("failed to build request: {message}")]
    Request { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Network error: {message}")]
    NetworkError { message: String },

    #[error("{operation} failed with {status}")]
    UploadStatusError {
        operation: &'static str,
        status: u16,
    },

    #[error(transparent)]
    BackendError(ClientError),

    #[error(transparent)]
    RetrievalError(ClientError),

    #[error(transparent)]
    DeletionError(ClientError),

    #[error(transparent)]
    LocalWriteError(std::io::Error),

    #[error("Failed to read {path}: {source}")]
    LocalReadError {
        path: String,
        source: std::io::Error,
    },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

impl StoreError {
    /// HTTP status carried by the error, when the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            StoreError::UploadStatusError { status, .. } => Some(*status),
            StoreError::BackendError(ClientError::Status { status, .. })
            | StoreError::RetrievalError(ClientError::Status { status, .. })
            | StoreError::DeletionError(ClientError::Status { status, .. }) => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::RetrievalError(ClientError::NotFound { .. })
                | StoreError::DeletionError(ClientError::NotFound { .. })
        )
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            StoreError::NetworkError { .. } => "Check connectivity to the storage endpoint and retry",
            StoreError::UploadStatusError { status: 403, .. } => {
                "Check the credentials and the bucket policy"
            }
            StoreError::UploadStatusError { .. } => "Inspect the backend response and retry",
            StoreError::RetrievalError(ClientError::NotFound { .. }) => {
                "Check that the key was uploaded under the configured folder"
            }
            StoreError::LocalWriteError(_) => "Check that the destination path is writable",
            StoreError::ConfigError { .. }
            | StoreError::MissingConfigError { .. }
            | StoreError::InvalidConfigValueError { .. } => "Fix the configuration and try again",
            _ => "Inspect the backend error and retry",
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
