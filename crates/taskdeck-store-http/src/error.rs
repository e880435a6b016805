use reqwest::{Response, StatusCode};
use serde::Deserialize;

/// Errors produced while talking to the task service.
#[derive(Debug, thiserror::Error)]
pub enum HttpStoreError {
    /// Transport failure or undecodable body.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("server error ({status}): {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Server-provided message, or the status reason when there is none.
        message: String,
    },

    /// The request was rejected locally before being sent.
    #[error("invalid request: {0}")]
    Invalid(String),
}

impl HttpStoreError {
    /// HTTP status carried by a [`HttpStoreError::Status`] error.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Pass successful responses through; turn the rest into [`HttpStoreError::Status`].
pub(crate) async fn check(response: Response) -> Result<Response, HttpStoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().await.unwrap_or_default();
    Err(HttpStoreError::Status {
        status: status.as_u16(),
        message: error_message(status, &text),
    })
}

fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|body| body.message)
        .filter(|message| !message.trim().is_empty())
        .or_else(|| (!body.trim().is_empty()).then(|| body.trim().to_owned()))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_json_message_field() {
        let message = error_message(StatusCode::BAD_REQUEST, r#"{"message":"title is required"}"#);
        assert_eq!(message, "title is required");
    }

    #[test]
    fn falls_back_to_body_then_reason() {
        assert_eq!(error_message(StatusCode::BAD_GATEWAY, "upstream down\n"), "upstream down");
        assert_eq!(error_message(StatusCode::NOT_FOUND, ""), "Not Found");
        assert_eq!(error_message(StatusCode::FORBIDDEN, r#"{"message":""}"#), r#"{"message":""}"#);
    }

    #[test]
    fn status_display() {
        let err = HttpStoreError::Status {
            status: 401,
            message: "Unauthorized".into(),
        };
        assert_eq!(err.to_string(), "server error (401): Unauthorized");
        assert_eq!(err.status(), Some(401));
        assert_eq!(HttpStoreError::Invalid("x".into()).status(), None);
    }
}
