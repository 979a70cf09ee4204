//! Error types for the browsing layer.
//!
//! Transport failures and payloads of the wrong shape are kept apart so each
//! data source can apply its own recovery policy.

use thiserror::Error;

/// Failure reported by a [`Transport`](crate::transport::Transport).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The request never produced a response (connection refused, timeout, ...).
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },

    /// The backend answered with a non-2xx status.
    #[error("{}", status_text(*status, message.as_deref()))]
    Status {
        status: u16,
        /// The `error` field of the JSON body, when the backend sent one.
        message: Option<String>,
    },

    /// A 2xx response whose body is not JSON.
    #[error("response from {url} is not valid JSON: {message}")]
    Decode { url: String, message: String },
}

impl TransportError {
    pub fn status(status: u16, message: Option<String>) -> Self {
        Self::Status { status, message }
    }

    /// Text for operator-facing messages; the backend's own message wins when present.
    pub fn user_message(&self) -> String {
        match self {
            Self::Status {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.trim().to_string(),
            other => other.to_string(),
        }
    }
}

fn status_text(status: u16, message: Option<&str>) -> String {
    match message.map(str::trim).filter(|message| !message.is_empty()) {
        Some(message) => format!("HTTP {status}: {message}"),
        None => format!("HTTP {status}"),
    }
}

/// Outcome of a fetch that reached the decoding stage.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("malformed payload: expected {expected}")]
    MalformedPayload { expected: &'static str },
}

impl FetchError {
    pub fn malformed(expected: &'static str) -> Self {
        Self::MalformedPayload { expected }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Self::MalformedPayload { .. } | Self::Transport(TransportError::Decode { .. })
        )
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::Transport(error) => error.user_message(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FetchError, TransportError};

    #[test]
    fn backend_message_is_preferred() {
        let error = TransportError::status(500, Some("etcd unavailable".to_string()));
        assert_eq!(error.user_message(), "etcd unavailable");
        assert_eq!(error.to_string(), "HTTP 500: etcd unavailable");
    }

    #[test]
    fn status_without_body_falls_back_to_generic_text() {
        let error = TransportError::status(502, None);
        assert_eq!(error.user_message(), "HTTP 502");

        let blank = TransportError::status(503, Some("  ".to_string()));
        assert_eq!(blank.user_message(), "HTTP 503");
    }

    #[test]
    fn decode_errors_count_as_malformed() {
        let decode = FetchError::from(TransportError::Decode {
            url: "http://backend/api/crds".to_string(),
            message: "expected value".to_string(),
        });
        assert!(decode.is_malformed());
        assert!(FetchError::malformed("a JSON array").is_malformed());
        assert!(!FetchError::from(TransportError::status(404, None)).is_malformed());
    }
}
