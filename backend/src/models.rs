use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::{
    list::{ListRequest, ListResult},
    session::Role,
};

// --- Remote API Schemas (Responses) ---

/// Article
///
/// An article as returned by `GET /articles` and `GET /articles/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub title: String,
    // HTML markup produced by the rich-text editor.
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub category: Option<CategoryRef>,
    // The API embeds the author as `user`.
    #[serde(default, alias = "user")]
    pub author: Option<Author>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CategoryRef {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Author {
    pub username: String,
}

/// Category
///
/// A category as returned by `GET /categories`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// ListEnvelope
///
/// Paged response wrapper shared by both listing endpoints. Articles report `total`,
/// categories report `total` or only `totalPages`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEnvelope<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
}

impl<T> ListEnvelope<T> {
    /// Normalizes the envelope into a `ListResult`, computing the page count once.
    ///
    /// `total` wins when present. Without it, a server-supplied `totalPages` is taken
    /// as is; with neither, the returned rows are the whole set.
    pub fn into_result(self, request: &ListRequest) -> ListResult<T> {
        let page_size = self.limit.filter(|limit| *limit > 0).unwrap_or(request.limit);

        match (self.total, self.total_pages) {
            (Some(total), _) => ListResult::new(self.data, total, page_size),
            (None, Some(pages)) => ListResult::from_page_count(self.data, pages, page_size),
            (None, None) => {
                let total = self.data.len() as u64;
                ListResult::new(self.data, total, page_size)
            }
        }
    }
}

/// Profile
///
/// `GET /auth/profile`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub username: String,
    pub role: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// LoginResponse
///
/// `POST /auth/login`. A role outside `Admin`/`User` fails decoding, so no session is
/// ever opened with an unusable role.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: Role,
}

/// UploadResponse
///
/// `POST /upload`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub image_url: String,
}

// --- Request Payloads (Input Schemas) ---

/// LoginRequest
///
/// Login form, forwarded to `POST /auth/login` once valid.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema, TS)]
#[ts(export)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// RegisterRequest
///
/// Registration form, forwarded to `POST /auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema, TS)]
#[ts(export)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(custom(function = "validate_role"))]
    pub role: String,
}

fn validate_role(role: &str) -> Result<(), ValidationError> {
    if role.is_empty() {
        return Err(ValidationError::new("required").with_message("Role is required".into()));
    }
    role.parse::<Role>().map(|_| ()).map_err(|_| {
        ValidationError::new("role").with_message("Role must be Admin or User".into())
    })
}

/// ArticlePayload
///
/// Create/edit article form (`POST /articles`, `PUT /articles/{id}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ArticlePayload {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Category is required"))]
    pub category_id: String,
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
    #[validate(url(message = "Thumbnail URL is required"))]
    pub image_url: String,
}

/// CategoryPayload
///
/// Add/edit category modal (`POST /categories`, `PUT /categories/{id}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema, TS)]
#[ts(export)]
pub struct CategoryPayload {
    #[validate(length(min = 3, message = "Category name must be at least 3 characters"))]
    pub name: String,
}

/// Identifiers arrive as strings from some deployments of the API and as integers from
/// others; both are kept as strings.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(text) => text,
        Id::Number(number) => number.to_string(),
    })
}
