//! Hints shown under a failed request.
//!
//! The error itself is always printed verbatim. These helpers only look at
//! the FastAPI-style `{"detail": ...}` body to suggest a next step.

use rabbit_client::{ApiError, StatusCode};
use serde_json::Value;

/// The `detail` string from an error body, if it has one.
#[must_use]
pub fn error_detail(body: &str) -> Option<String> {
    let payload: Value = serde_json::from_str(body.trim()).ok()?;
    payload
        .get("detail")
        .and_then(Value::as_str)
        .or_else(|| payload.pointer("/error/message").and_then(Value::as_str))
        .or_else(|| payload.get("message").and_then(Value::as_str))
        .map(ToString::to_string)
}

/// A one-line suggestion for a failed call, when the failure is one the
/// user can fix locally.
#[must_use]
pub fn hint_for(err: &ApiError, debug: bool) -> Option<&'static str> {
    match err {
        ApiError::InvalidUrl { .. } => {
            Some("set an API base with --api-base, RABBIT_API_BASE or `rabbit dev set --base`")
        }
        ApiError::InvalidHeader { .. } => {
            Some("a stored credential contains invalid characters; reset it with `rabbit dev set`")
        }
        ApiError::Http { status, body } => {
            let detail = error_detail(body).unwrap_or_default();
            match (*status, detail.as_str()) {
                (_, "not_logged_in") => Some("sign in first with `rabbit login`"),
                (StatusCode::UNAUTHORIZED, "unauthorized") if !debug => {
                    Some("dev credentials are only sent with --debug")
                }
                (StatusCode::UNAUTHORIZED, "unauthorized") => {
                    Some("check the dev API key with `rabbit dev show`")
                }
                (StatusCode::FORBIDDEN, _) => {
                    Some("this needs an admin session; run `rabbit admin login <token>`")
                }
                _ => None,
            }
        }
        ApiError::Transport(_) | ApiError::Decode(_) => None,
    }
}
