use std::fmt;
use thiserror::Error;

/// A single failed form rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Everything that can go wrong between the user and the two remote collections.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or malformed input, caught before any network call.
    #[error("{}", join_fields(.0))]
    Validation(Vec<FieldError>),

    /// The remote answered with a non-success status.
    #[error("request failed ({status}): {message}")]
    Http { status: u16, message: String },

    #[error("User with this email or username already exists")]
    DuplicateUser,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Not logged in. Run 'taskdeck login' first.")]
    NotAuthenticated,

    /// Persisted session data could not be parsed.
    #[error("stored session is corrupt: {0}")]
    MalformedState(String),

    /// The delete endpoint answered but did not report the task as deleted.
    #[error("task {0} was not deleted")]
    DeleteRejected(u64),

    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Shorthand for a single-field validation failure.
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldError::new(field, message)])
    }

    /// Errors raised by the auth layer. These also reset the session.
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            Self::DuplicateUser
                | Self::InvalidCredentials
                | Self::NotAuthenticated
                | Self::MalformedState(_)
        )
    }

    /// Builds an `Http` error from a failed response body.
    ///
    /// Prefers the JSON `error` or `message` field, then the raw text, then the
    /// status reason when the body is empty.
    pub fn from_response(status: reqwest::StatusCode, body: &str) -> Self {
        let message = match serde_json::from_str::<serde_json::Value>(body) {
            Ok(json) => json["error"]
                .as_str()
                .or_else(|| json["message"].as_str())
                .map(str::to_string)
                .unwrap_or_else(|| body.to_string()),
            Err(_) => body.trim().to_string(),
        };

        let message = if message.is_empty() {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string()
        } else {
            message
        };

        Self::Http {
            status: status.as_u16(),
            message,
        }
    }
}

fn join_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn http_error_prefers_json_message() {
        let err = Error::from_response(StatusCode::NOT_FOUND, r#"{"message":"Todo with id '999' not found"}"#);
        match err {
            Error::Http { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Todo with id '999' not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn http_error_falls_back_to_reason() {
        let err = Error::from_response(StatusCode::BAD_GATEWAY, "");
        assert_eq!(err.to_string(), "request failed (502): Bad Gateway");
    }

    #[test]
    fn validation_joins_messages() {
        let err = Error::Validation(vec![
            FieldError::new("email", "Email is required"),
            FieldError::new("password", "Password is required"),
        ]);
        assert_eq!(err.to_string(), "Email is required; Password is required");
    }

    #[test]
    fn auth_family() {
        assert!(Error::DuplicateUser.is_auth());
        assert!(Error::InvalidCredentials.is_auth());
        assert!(!Error::DeleteRejected(3).is_auth());
    }
}
