use std::collections::BTreeMap;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;
use validator::ValidationErrors;

use crate::{api::ApiError, list::ListError, views::Notification};

/// AppError
///
/// Everything a portal handler can fail with. Each variant renders as an error toast;
/// validation failures additionally carry the per-field messages for the form.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    List(#[from] ListError),
    #[error("invalid upload: {0}")]
    Upload(String),
}

/// ErrorBody
///
/// Response body of every failed portal request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ErrorBody {
    pub notification: Notification,
    // Field name -> messages. Empty unless the request failed validation.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, Vec<String>>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Api(ApiError::InvalidUpload(_)) | AppError::Upload(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Api(err) => match err.status() {
                Some(status) if status.is_client_error() => status,
                _ => StatusCode::BAD_GATEWAY,
            },
            AppError::List(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn body(&self) -> ErrorBody {
        match self {
            AppError::Validation(errors) => ErrorBody {
                notification: Notification::error("Please correct the highlighted fields.")
                    .with_title("Invalid input"),
                fields: field_messages(errors),
            },
            AppError::Api(err) => ErrorBody {
                notification: Notification::error(err.user_message()).with_title("Error"),
                fields: BTreeMap::new(),
            },
            AppError::List(err) => ErrorBody {
                notification: Notification::error(err.to_string()).with_title("Error"),
                fields: BTreeMap::new(),
            },
            AppError::Upload(reason) => ErrorBody {
                notification: Notification::error(reason.clone()).with_title("Upload failed"),
                fields: BTreeMap::new(),
            },
        }
    }
}

fn field_messages(errors: &ValidationErrors) -> BTreeMap<String, Vec<String>> {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let messages = errs
                .iter()
                .map(|err| {
                    err.message
                        .as_ref()
                        .map(|msg| msg.to_string())
                        .unwrap_or_else(|| err.code.to_string())
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::Api(_) => tracing::warn!(error = %self, %status, "blog API call failed"),
            _ => tracing::debug!(error = %self, %status, "request rejected"),
        }
        (status, Json(self.body())).into_response()
    }
}
