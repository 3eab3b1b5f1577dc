//! Reporting of expected API failures.
//!
//! NotFound, AlreadyExists and PermissionDenied are outcomes a sample
//! describes to the user; every other error is returned to the caller.

use anyhow::Result;
use gcp_client::GcpError;
use std::io::Write;

/// Print the friendly message for an expected failure, or return the error.
pub fn report(out: &mut dyn Write, err: GcpError, kind: &str, id: &str) -> Result<()> {
    if err.is_not_found() {
        writeln!(out, "{} {} not found.", kind, id)?;
    } else if err.is_already_exists() {
        writeln!(out, "{} {} already exists.", kind, id)?;
    } else if err.is_permission_denied() {
        writeln!(out, "Permission denied: {}", err.message().unwrap_or_default())?;
    } else {
        return Err(err.into());
    }
    tracing::debug!(kind, id, error = %err, "Reported expected failure");
    Ok(())
}

/// Unwrap a successful result, or report an expected failure and yield `None`.
pub fn handled<T>(
    out: &mut dyn Write,
    result: gcp_client::Result<T>,
    kind: &str,
    id: &str,
) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) => report(out, err, kind, id).map(|()| None),
    }
}

/// `k=v` pairs from repeated `--label` flags.
pub fn parse_label(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gcp_client::{Code, Status};

    fn api(code: Code, message: &str) -> GcpError {
        GcpError::Api(Status {
            code,
            http_status: Some(400),
            message: message.to_string(),
        })
    }

    fn printed(err: GcpError) -> (String, bool) {
        let mut out = Vec::new();
        let ok = report(&mut out, err, "Secret", "db-password").is_ok();
        (String::from_utf8(out).unwrap(), ok)
    }

    #[test]
    fn test_report_friendly_codes() {
        assert_eq!(
            printed(api(Code::NotFound, "gone")),
            ("Secret db-password not found.\n".to_string(), true)
        );
        assert_eq!(
            printed(api(Code::AlreadyExists, "dup")),
            ("Secret db-password already exists.\n".to_string(), true)
        );
        assert_eq!(
            printed(api(Code::PermissionDenied, "caller lacks secretmanager.secrets.get")),
            (
                "Permission denied: caller lacks secretmanager.secrets.get\n".to_string(),
                true
            )
        );
    }

    #[test]
    fn test_report_propagates_other_errors() {
        let (text, ok) = printed(api(Code::InvalidArgument, "bad ttl"));
        assert!(text.is_empty());
        assert!(!ok);
    }

    #[test]
    fn test_parse_label() {
        assert_eq!(parse_label("env=prod"), Ok(("env".into(), "prod".into())));
        assert_eq!(parse_label("empty="), Ok(("empty".into(), String::new())));
        assert!(parse_label("=prod").is_err());
        assert!(parse_label("novalue").is_err());
    }
}
