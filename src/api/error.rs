//! API error taxonomy.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use super::request::Operation;

/// Errors that can occur while talking to the text analytics service.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Remote rejected the request (HTTP 4xx)
    #[error("{operation} request rejected (HTTP {status}): {message}")]
    Client {
        operation: Operation,
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// Remote failed to process the request (HTTP 5xx)
    #[error("{operation} failed on the server (HTTP {status}): {message}")]
    Server {
        operation: Operation,
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// Any other non-success status
    #[error("{operation} returned unexpected HTTP {status}: {message}")]
    UnexpectedStatus {
        operation: Operation,
        status: u16,
        message: String,
    },

    /// No status was received (connect, TLS, timeout, broken body)
    #[error("connection to the text analytics service failed during {operation}: {source}")]
    Transport {
        operation: Operation,
        #[source]
        source: reqwest::Error,
    },

    /// Successful response whose body does not decode
    #[error("could not decode {operation} response: {source}")]
    Decode {
        operation: Operation,
        #[source]
        source: serde_json::Error,
    },

    #[error("API configuration error: {0}")]
    Config(String),

    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
}

/// Error body returned by the service on failures.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    code: Option<String>,
    message: Option<String>,
}

impl ApiError {
    /// Classify a non-success response.
    pub fn from_status(operation: Operation, status: StatusCode, body: &str) -> Self {
        let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
        let message = parsed
            .message
            .filter(|m| !m.trim().is_empty())
            .or_else(|| {
                let trimmed = body.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("no message")
                    .to_string()
            });
        let code = parsed.code;

        if status.is_client_error() {
            ApiError::Client {
                operation,
                status: status.as_u16(),
                code,
                message,
            }
        } else if status.is_server_error() {
            ApiError::Server {
                operation,
                status: status.as_u16(),
                code,
                message,
            }
        } else {
            ApiError::UnexpectedStatus {
                operation,
                status: status.as_u16(),
                message,
            }
        }
    }

    /// HTTP status, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Client { status, .. }
            | ApiError::Server { status, .. }
            | ApiError::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message supplied by the remote service, if any.
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            ApiError::Client { message, .. }
            | ApiError::Server { message, .. }
            | ApiError::UnexpectedStatus { message, .. } => Some(message),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_keeps_remote_message() {
        let body = r#"{"code":"unauthorized","message":"Invalid API key"}"#;
        let err = ApiError::from_status(Operation::Language, StatusCode::UNAUTHORIZED, body);
        match &err {
            ApiError::Client {
                status,
                code,
                message,
                ..
            } => {
                assert_eq!(*status, 401);
                assert_eq!(code.as_deref(), Some("unauthorized"));
                assert_eq!(message, "Invalid API key");
            }
            other => panic!("expected client error, got {:?}", other),
        }
        assert_eq!(
            err.to_string(),
            "language request rejected (HTTP 401): Invalid API key"
        );
    }

    #[test]
    fn test_server_error() {
        let err = ApiError::from_status(
            Operation::Entities,
            StatusCode::SERVICE_UNAVAILABLE,
            r#"{"code":"unavailable","message":"try later"}"#,
        );
        assert!(matches!(err, ApiError::Server { status: 503, .. }));
        assert_eq!(err.remote_message(), Some("try later"));
    }

    #[test]
    fn test_plain_text_body_used_as_message() {
        let err = ApiError::from_status(
            Operation::Categories,
            StatusCode::BAD_GATEWAY,
            "upstream exploded",
        );
        assert_eq!(err.remote_message(), Some("upstream exploded"));
    }

    #[test]
    fn test_empty_body_falls_back_to_reason() {
        let err = ApiError::from_status(Operation::Sentiment, StatusCode::NOT_FOUND, "");
        assert_eq!(err.remote_message(), Some("Not Found"));
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_redirect_is_unexpected() {
        let err = ApiError::from_status(Operation::Language, StatusCode::FOUND, "");
        assert!(matches!(err, ApiError::UnexpectedStatus { status: 302, .. }));
    }
}
