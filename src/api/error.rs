use reqwest::StatusCode;
use thiserror::Error;

/// Shown when a failure carries no server-provided message.
const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

/// Errors returned by [`super::ArticlesApi`] calls.
///
/// Every variant owns plain data so results can travel through message
/// channels and be cloned into UI state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The backend answered with a non-success status.
    #[error("Request rejected with status {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Rejected {
        status: u16,
        message: Option<String>,
    },

    /// The request never produced a response (connection refused, timeout, ...).
    #[error("Could not reach the server: {0}")]
    Transport(String),

    /// The response body did not have the expected shape.
    #[error("Unexpected response from the server: {0}")]
    Decode(String),
}

impl ApiError {
    /// True for a 401 rejection, meaning the session token is missing or stale.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Rejected { status, .. } if *status == StatusCode::UNAUTHORIZED.as_u16())
    }

    /// Message suitable for the status line.
    ///
    /// Prefers the server's own message and falls back to a generic note.
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            Self::Transport(_) => "Could not reach the server.".to_string(),
            _ => GENERIC_FAILURE.to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Rejected {
                status: status.as_u16(),
                message: None,
            }
        } else {
            Self::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_only_for_401() {
        let unauthorized = ApiError::Rejected {
            status: 401,
            message: None,
        };
        let forbidden = ApiError::Rejected {
            status: 403,
            message: None,
        };

        assert!(unauthorized.is_unauthorized());
        assert!(!forbidden.is_unauthorized());
        assert!(!ApiError::Transport("refused".into()).is_unauthorized());
    }

    #[test]
    fn user_message_prefers_server_text() {
        let err = ApiError::Rejected {
            status: 422,
            message: Some("title is required".into()),
        };
        assert_eq!(err.user_message(), "title is required");
    }

    #[test]
    fn user_message_falls_back() {
        let blank = ApiError::Rejected {
            status: 500,
            message: Some("  ".into()),
        };
        assert_eq!(blank.user_message(), GENERIC_FAILURE);

        let decode = ApiError::Decode("missing field `token`".into());
        assert_eq!(decode.user_message(), GENERIC_FAILURE);

        let transport = ApiError::Transport("connection refused".into());
        assert_eq!(transport.user_message(), "Could not reach the server.");
    }
}
