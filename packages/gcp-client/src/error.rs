//! Error types for the Google Cloud client.
//!
//! Google APIs report failures as
//! `{"error": {"code": 404, "message": "...", "status": "NOT_FOUND"}}`.
//! The Cloud Storage JSON API omits `status`, so the HTTP status code is the
//! fallback when deriving a [`Code`].

use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// Result type for Google Cloud client operations.
pub type Result<T> = std::result::Result<T, GcpError>;

/// Canonical Google status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Code {
    Ok,
    Cancelled,
    Unknown,
    InvalidArgument,
    DeadlineExceeded,
    NotFound,
    AlreadyExists,
    PermissionDenied,
    ResourceExhausted,
    FailedPrecondition,
    Aborted,
    OutOfRange,
    Unimplemented,
    Internal,
    Unavailable,
    DataLoss,
    Unauthenticated,
}

impl Code {
    /// Parse the `error.status` string of a JSON error envelope.
    pub fn from_status_name(name: &str) -> Option<Self> {
        let code = match name {
            "OK" => Code::Ok,
            "CANCELLED" => Code::Cancelled,
            "UNKNOWN" => Code::Unknown,
            "INVALID_ARGUMENT" => Code::InvalidArgument,
            "DEADLINE_EXCEEDED" => Code::DeadlineExceeded,
            "NOT_FOUND" => Code::NotFound,
            "ALREADY_EXISTS" => Code::AlreadyExists,
            "PERMISSION_DENIED" => Code::PermissionDenied,
            "RESOURCE_EXHAUSTED" => Code::ResourceExhausted,
            "FAILED_PRECONDITION" => Code::FailedPrecondition,
            "ABORTED" => Code::Aborted,
            "OUT_OF_RANGE" => Code::OutOfRange,
            "UNIMPLEMENTED" => Code::Unimplemented,
            "INTERNAL" => Code::Internal,
            "UNAVAILABLE" => Code::Unavailable,
            "DATA_LOSS" => Code::DataLoss,
            "UNAUTHENTICATED" => Code::Unauthenticated,
            _ => return None,
        };
        Some(code)
    }

    /// Best-effort mapping from an HTTP status code.
    pub fn from_http(status: u16) -> Self {
        match status {
            200..=299 => Code::Ok,
            400 => Code::InvalidArgument,
            401 => Code::Unauthenticated,
            403 => Code::PermissionDenied,
            404 => Code::NotFound,
            409 => Code::AlreadyExists,
            412 => Code::FailedPrecondition,
            429 => Code::ResourceExhausted,
            499 => Code::Cancelled,
            500 => Code::Internal,
            501 => Code::Unimplemented,
            503 => Code::Unavailable,
            504 => Code::DeadlineExceeded,
            _ => Code::Unknown,
        }
    }

    /// Map the numeric code carried by `google.rpc.Status` (operation errors).
    pub fn from_i32(value: i32) -> Self {
        match value {
            0 => Code::Ok,
            1 => Code::Cancelled,
            3 => Code::InvalidArgument,
            4 => Code::DeadlineExceeded,
            5 => Code::NotFound,
            6 => Code::AlreadyExists,
            7 => Code::PermissionDenied,
            8 => Code::ResourceExhausted,
            9 => Code::FailedPrecondition,
            10 => Code::Aborted,
            11 => Code::OutOfRange,
            12 => Code::Unimplemented,
            13 => Code::Internal,
            14 => Code::Unavailable,
            15 => Code::DataLoss,
            16 => Code::Unauthenticated,
            _ => Code::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Code::Ok => "OK",
            Code::Cancelled => "CANCELLED",
            Code::Unknown => "UNKNOWN",
            Code::InvalidArgument => "INVALID_ARGUMENT",
            Code::DeadlineExceeded => "DEADLINE_EXCEEDED",
            Code::NotFound => "NOT_FOUND",
            Code::AlreadyExists => "ALREADY_EXISTS",
            Code::PermissionDenied => "PERMISSION_DENIED",
            Code::ResourceExhausted => "RESOURCE_EXHAUSTED",
            Code::FailedPrecondition => "FAILED_PRECONDITION",
            Code::Aborted => "ABORTED",
            Code::OutOfRange => "OUT_OF_RANGE",
            Code::Unimplemented => "UNIMPLEMENTED",
            Code::Internal => "INTERNAL",
            Code::Unavailable => "UNAVAILABLE",
            Code::DataLoss => "DATA_LOSS",
            Code::Unauthenticated => "UNAUTHENTICATED",
        }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded API error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub code: Code,
    /// HTTP status of the failed response, `None` for operation errors.
    pub http_status: Option<u16>,
    pub message: String,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.http_status {
            Some(http) => write!(f, "{} (HTTP {}): {}", self.code, http, self.message),
            None => write!(f, "{}: {}", self.code, self.message),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<u16>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

/// Body of a failed long-running operation (`google.rpc.Status`).
#[derive(Debug, Clone, Default, Deserialize, serde::Serialize)]
pub struct RpcStatus {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
}

impl Status {
    /// Decode a non-2xx response body.
    pub fn from_response(http_status: u16, body: &str) -> Self {
        if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
            let err = envelope.error;
            let code = err
                .status
                .as_deref()
                .and_then(Code::from_status_name)
                .unwrap_or_else(|| Code::from_http(err.code.unwrap_or(http_status)));
            return Self {
                code,
                http_status: Some(http_status),
                message: err.message.unwrap_or_else(|| "Unknown error".to_string()),
            };
        }

        let message = if body.trim().is_empty() {
            format!("HTTP {}", http_status)
        } else {
            body.chars().take(500).collect()
        };
        Self {
            code: Code::from_http(http_status),
            http_status: Some(http_status),
            message,
        }
    }
}

impl From<RpcStatus> for Status {
    fn from(status: RpcStatus) -> Self {
        Self {
            code: Code::from_i32(status.code),
            http_status: None,
            message: status.message,
        }
    }
}

/// Google Cloud client errors.
#[derive(Debug, Error)]
pub enum GcpError {
    /// Configuration error (bad resource id, missing setting)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Credential discovery or token exchange failed
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Network error (connection failed, timeout)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// API error (non-2xx response)
    #[error("API error: {0}")]
    Api(Status),

    /// Parse error (invalid JSON, unexpected response format)
    #[error("Parse error: {0}")]
    Parse(String),

    /// A long-running operation finished with an error
    #[error("Operation failed: {0}")]
    Operation(Status),

    /// A long-running operation did not finish in time
    #[error("Timed out waiting for operation {0}")]
    Timeout(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GcpError {
    /// Status code of an API or operation failure.
    pub fn code(&self) -> Option<Code> {
        match self {
            GcpError::Api(status) | GcpError::Operation(status) => Some(status.code),
            _ => None,
        }
    }

    /// Server-provided message of an API or operation failure.
    pub fn message(&self) -> Option<&str> {
        match self {
            GcpError::Api(status) | GcpError::Operation(status) => Some(&status.message),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.code() == Some(Code::NotFound)
    }

    pub fn is_already_exists(&self) -> bool {
        self.code() == Some(Code::AlreadyExists)
    }

    pub fn is_permission_denied(&self) -> bool {
        self.code() == Some(Code::PermissionDenied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_with_status_name() {
        let body = r#"{"error":{"code":404,"message":"Secret [projects/1/secrets/x] not found","status":"NOT_FOUND"}}"#;
        let status = Status::from_response(404, body);
        assert_eq!(status.code, Code::NotFound);
        assert_eq!(status.http_status, Some(404));
        assert!(status.message.contains("not found"));
    }

    #[test]
    fn test_status_name_wins_over_http_code() {
        let body = r#"{"error":{"code":409,"message":"exists","status":"ABORTED"}}"#;
        assert_eq!(Status::from_response(409, body).code, Code::Aborted);
    }

    #[test]
    fn test_storage_style_envelope_falls_back_to_http() {
        let body = r#"{"error":{"code":409,"message":"The folder you tried to create already exists.","errors":[]}}"#;
        let status = Status::from_response(409, body);
        assert_eq!(status.code, Code::AlreadyExists);
    }

    #[test]
    fn test_non_json_body() {
        let status = Status::from_response(403, "<html>denied</html>");
        assert_eq!(status.code, Code::PermissionDenied);
        assert_eq!(status.message, "<html>denied</html>");

        let empty = Status::from_response(503, "");
        assert_eq!(empty.code, Code::Unavailable);
        assert_eq!(empty.message, "HTTP 503");
    }

    #[test]
    fn test_long_body_is_truncated() {
        let body = "x".repeat(2000);
        assert_eq!(Status::from_response(500, &body).message.len(), 500);
    }

    #[test]
    fn test_rpc_status_conversion() {
        let status: Status = RpcStatus {
            code: 6,
            message: "lake exists".into(),
        }
        .into();
        assert_eq!(status.code, Code::AlreadyExists);
        assert_eq!(status.http_status, None);
    }

    #[test]
    fn test_predicates() {
        let err = GcpError::Api(Status {
            code: Code::PermissionDenied,
            http_status: Some(403),
            message: "nope".into(),
        });
        assert!(err.is_permission_denied());
        assert!(!err.is_not_found());
        assert_eq!(err.message(), Some("nope"));

        let err = GcpError::Config("bad".into());
        assert_eq!(err.code(), None);
        assert!(!err.is_already_exists());
    }

    #[test]
    fn test_code_names_round_trip() {
        for name in ["NOT_FOUND", "ALREADY_EXISTS", "PERMISSION_DENIED", "UNAUTHENTICATED"] {
            assert_eq!(Code::from_status_name(name).unwrap().as_str(), name);
        }
        assert_eq!(Code::from_status_name("BOGUS"), None);
    }
}
