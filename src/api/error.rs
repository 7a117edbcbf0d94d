use thiserror::Error;

/// Coarse classification used by the worker to pick a status label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    CredentialInvalid,
    RemoteFailure,
    ApplicationRejected,
}

/// Every way a remote operation can fail
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid credential: {0}")]
    CredentialInvalid(String),

    #[error("client setup failed: {0}")]
    Setup(String),

    #[error("{operation} request failed: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{operation} timed out")]
    Timeout { operation: &'static str },

    #[error("{operation} returned HTTP {status}")]
    Status { operation: &'static str, status: u16 },

    #[error("{operation} returned a malformed body: {message}")]
    Malformed {
        operation: &'static str,
        message: String,
    },

    #[error("{operation} rejected by server (status {status:?})")]
    Rejected {
        operation: &'static str,
        status: Option<String>,
    },
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::CredentialInvalid(_) => ErrorKind::CredentialInvalid,
            ApiError::Rejected { .. } => ErrorKind::ApplicationRejected,
            ApiError::Setup(_)
            | ApiError::Transport { .. }
            | ApiError::Timeout { .. }
            | ApiError::Status { .. }
            | ApiError::Malformed { .. } => ErrorKind::RemoteFailure,
        }
    }

    /// A body the client could not make sense of. The worker treats this as
    /// an unexpected failure rather than an ordinary step failure.
    pub fn is_malformed(&self) -> bool {
        matches!(self, ApiError::Malformed { .. })
    }

    /// Short form for the status column
    pub fn short_message(&self) -> String {
        let full = match self {
            ApiError::Malformed { message, .. } => message.clone(),
            other => other.to_string(),
        };
        truncate_chars(&full, 24)
    }

    pub(crate) fn from_reqwest(operation: &'static str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            ApiError::Timeout { operation }
        } else {
            ApiError::Transport { operation, source }
        }
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let rejected = ApiError::Rejected {
            operation: "plant",
            status: Some("error".to_string()),
        };
        assert_eq!(rejected.kind(), ErrorKind::ApplicationRejected);

        let status = ApiError::Status { operation: "login", status: 502 };
        assert_eq!(status.kind(), ErrorKind::RemoteFailure);
        assert!(!status.is_malformed());

        let invalid = ApiError::CredentialInvalid("missing user".to_string());
        assert_eq!(invalid.kind(), ErrorKind::CredentialInvalid);
    }

    #[test]
    fn test_short_message_truncates() {
        let err = ApiError::Malformed {
            operation: "profile",
            message: "expected value at line 1 column 1 of the body".to_string(),
        };
        let short = err.short_message();
        assert!(short.ends_with('…'));
        assert_eq!(short.chars().count(), 25);
    }
}
