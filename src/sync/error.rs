use thiserror::Error;

/// Failures of one progress fetch. None of these are fatal: the tick is
/// abandoned and the next one runs as usual.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Connection, TLS or body read failure
    #[error("Progress request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Progress endpoint returned HTTP {0}")]
    Status(u16),

    /// Body was not a JSON array of snapshots
    #[error("Failed to decode progress batch: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid progress endpoint {endpoint}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
}

/// Result type for sync operations
pub type SyncResult<T> = Result<T, SyncError>;

impl SyncError {
    pub fn invalid_endpoint(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidEndpoint {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }

    /// True for a well-formed non-success response, as opposed to a broken
    /// exchange
    pub fn is_rejection(&self) -> bool {
        matches!(self, SyncError::Status(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            SyncError::Status(503).to_string(),
            "Progress endpoint returned HTTP 503"
        );
        assert_eq!(
            SyncError::invalid_endpoint("ftp://x", "unsupported scheme").to_string(),
            "Invalid progress endpoint ftp://x: unsupported scheme"
        );
    }

    #[test]
    fn test_decode_error_is_not_rejection() {
        let err: SyncError = serde_json::from_str::<Vec<u8>>("nope").unwrap_err().into();
        assert!(!err.is_rejection());
        assert!(SyncError::Status(404).is_rejection());
    }
}
