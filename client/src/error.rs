use reqwest::StatusCode;
use thiserror::Error;

/// The single failure type of every backend call.
///
/// A non-2xx response carries the raw body text, which is also its `Display`
/// so callers can show it verbatim. Nothing is retried or classified further.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{body}")]
    Http { status: StatusCode, body: String },
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("invalid request URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("invalid value for header {name}")]
    InvalidHeader { name: &'static str },
    #[error("failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),
}

impl ApiError {
    /// Whether the backend reported that no user session exists.
    #[must_use]
    pub fn is_not_logged_in(&self) -> bool {
        matches!(self, Self::Http { body, .. } if body.contains("not_logged_in"))
    }

    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Transport(err) => err.status(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err)
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::ApiError;

    #[test]
    fn http_error_displays_body_verbatim() {
        let err = ApiError::Http {
            status: StatusCode::BAD_REQUEST,
            body: r#"{"detail":"plan not found"}"#.to_string(),
        };
        assert_eq!(err.to_string(), r#"{"detail":"plan not found"}"#);
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn not_logged_in_detection() {
        let err = ApiError::Http {
            status: StatusCode::UNAUTHORIZED,
            body: r#"{"detail":"not_logged_in"}"#.to_string(),
        };
        assert!(err.is_not_logged_in());

        let other = ApiError::Http {
            status: StatusCode::UNAUTHORIZED,
            body: "unauthorized".to_string(),
        };
        assert!(!other.is_not_logged_in());
    }
}
