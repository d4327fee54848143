//! Error types surfaced by the try-on flows.
//!
//! Only two kinds exist: a precondition that was not met on the client, and
//! anything that went wrong with a backend request. Both end up in the error
//! banner; neither is fatal.

use thiserror::Error;

/// A client-side precondition was not met. No request was sent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please upload both model and bag images.")]
    MissingImages,

    #[error("Please generate a try-on image first.")]
    MissingTryOn,

    #[error("No generated model to confirm.")]
    MissingCandidate,

    #[error("failed to load image: {0}")]
    UnreadableImage(String),
}

/// A backend call failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// Network or transport failure, including timeouts.
    #[error("{0}")]
    Transport(String),

    /// The response body was not valid JSON for the endpoint.
    #[error("invalid response: {0}")]
    Parse(String),

    /// The server answered with `success: false`.
    #[error("{message}")]
    Rejected {
        message: String,
        detail: Option<String>,
    },

    /// `success: true` but the payload lacks the field the flow needs.
    #[error("response missing field `{0}`")]
    MissingField(&'static str),

    /// Fetching a hosted image returned a non-success status.
    #[error("HTTP {status} while fetching {url}")]
    Status { status: u16, url: String },
}

impl RequestError {
    /// Text shown in the error banner.
    pub fn banner_text(&self) -> String {
        match self {
            RequestError::Rejected {
                message,
                detail: Some(detail),
            } => format!("{message}: {detail}"),
            RequestError::Rejected { message, .. } => message.clone(),
            other => format!("Error: {other}"),
        }
    }
}

impl From<reqwest::Error> for RequestError {
    fn from(err: reqwest::Error) -> Self {
        RequestError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for RequestError {
    fn from(err: serde_json::Error) -> Self {
        RequestError::Parse(err.to_string())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TryOnError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Request(#[from] RequestError),
}

impl TryOnError {
    pub fn banner_text(&self) -> String {
        match self {
            TryOnError::Validation(err) => err.to_string(),
            TryOnError::Request(err) => err.banner_text(),
        }
    }
}

pub type Result<T, E = TryOnError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_with_detail_appends_detail() {
        let err = RequestError::Rejected {
            message: "Failed to generate video.".into(),
            detail: Some("Try-on image not found".into()),
        };
        assert_eq!(
            err.banner_text(),
            "Failed to generate video.: Try-on image not found"
        );
    }

    #[test]
    fn transport_errors_are_prefixed() {
        let err = TryOnError::from(RequestError::Transport("connection refused".into()));
        assert_eq!(err.banner_text(), "Error: connection refused");
    }

    #[test]
    fn validation_text_is_verbatim() {
        let err = TryOnError::from(ValidationError::MissingImages);
        assert_eq!(err.banner_text(), "Please upload both model and bag images.");
    }
}
