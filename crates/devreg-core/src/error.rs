use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for registration workflow operations
pub type Result<T> = std::result::Result<T, DevRegError>;

/// Result type alias for calls against the fleet-management backend
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Errors returned by the fleet-management backend or the transport to it
#[derive(Error, Debug)]
pub enum ApiError {
    /// Device credentials were rejected
    #[error("authentication failed: device credentials rejected")]
    Unauthorized,

    /// Backend answered but refused the request (`success: false`)
    #[error("request rejected: {message}")]
    Rejected {
        /// Reason given by the backend
        message: String,
    },

    /// API returned an error response
    #[error("API error ({code}): {message}")]
    Api {
        /// HTTP status code
        code: u16,
        /// Error message from the API
        message: String,
    },

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Request timed out
    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    /// Connection failed
    #[error("connection failed: {0}")]
    Connection(String),

    /// JSON parsing/serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid URL
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Returns true if the error is transient and the call may succeed later
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::Connection(_) | Self::Http(_) => true,
            Self::Api { code, .. } => *code >= 500,
            _ => false,
        }
    }

    /// Returns true if the error is due to authentication
    #[must_use]
    pub const fn is_auth_error(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Returns the HTTP status code if this is an API error
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::Api { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Errors that can occur while registering or renaming a device
#[derive(Error, Debug)]
pub enum DevRegError {
    /// A local file could not be read, written, flushed or removed
    #[error("io error on {}: {source}", path.display())]
    Io {
        /// File the operation targeted
        path: PathBuf,
        /// Underlying cause
        #[source]
        source: std::io::Error,
    },

    /// The node-id record does not end in a numeric device ID
    #[error("node id record '{record}' has no numeric device id")]
    UnparseableRecord {
        /// Raw record text
        record: String,
    },

    /// The remote registration or rename call failed
    #[error("registration failed: {0}")]
    Registration(#[from] ApiError),

    /// Rename requested but the device has no identity yet
    #[error("device is not registered")]
    NotRegistered,

    /// Rename requested with no new name, group or password
    #[error("a new name, group or password must be given")]
    NothingToChange,

    /// Persisted identity could not be encoded or decoded
    #[error("identity record error: {0}")]
    Identity(String),

    /// Pending telemetry could not be flushed
    #[error("telemetry flush failed: {0}")]
    Flush(String),

    /// Network never became reachable
    #[error("connectivity error: {0}")]
    Connectivity(String),

    /// Reboot or another host-level action failed
    #[error("system control error: {0}")]
    System(String),

    /// Configuration is invalid
    #[error("configuration error: {0}")]
    Config(String),

    /// Retry loop stopped by a shutdown request
    #[error("cancelled before the device was registered")]
    Cancelled,
}

impl DevRegError {
    /// Wrap an I/O error with the path it occurred on
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Returns true if a later `register` attempt could succeed
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Registration(_) | Self::Connectivity(_) | Self::Flush(_)
        )
    }
}
