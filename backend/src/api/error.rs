use axum::http::StatusCode;

pub const FALLBACK_MESSAGE: &str = "System error. Please try again.";

/// ApiError
///
/// Every way a call to the remote API can fail. `endpoint` is the method and path
/// template (e.g. `GET /articles`) so log lines stay groupable.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{endpoint}: request failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint}: responded {status}: {message}")]
    Status {
        endpoint: String,
        status: StatusCode,
        message: String,
    },
    #[error("{endpoint}: unexpected response body: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{endpoint}: cannot build request URL: {reason}")]
    InvalidUrl { endpoint: String, reason: String },
    #[error("upload rejected: {0}")]
    InvalidUpload(String),
}

impl ApiError {
    /// Upstream status, when the API answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Text suitable for a toast. The API's own message for rejected requests, a
    /// generic one for everything the user cannot act on.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Status {
                status, message, ..
            } if status.is_client_error() => message.clone(),
            ApiError::InvalidUpload(reason) => reason.clone(),
            _ => FALLBACK_MESSAGE.to_string(),
        }
    }
}
