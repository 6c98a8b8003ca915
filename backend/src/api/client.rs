use std::{path::Path, sync::Arc};

use async_trait::async_trait;
use axum::http::StatusCode;
use reqwest::{RequestBuilder, Url, multipart};
use serde::{Deserialize, de::DeserializeOwned};

use super::ApiError;
use crate::{
    list::{ListRequest, ListResult},
    models::{
        Article, ArticlePayload, Category, CategoryPayload, ListEnvelope, LoginRequest,
        LoginResponse, Profile, RegisterRequest, UploadResponse,
    },
    session::SharedSession,
};

/// BlogApi
///
/// Contract for every call the portal makes to the remote blog API. Handlers depend on
/// this trait only, so tests swap in a mock the same way the HTTP client is swapped for
/// a different deployment.
#[async_trait]
pub trait BlogApi: Send + Sync {
    /// A client bound to `session`: its token (if any) authenticates every call.
    fn with_session(&self, session: SharedSession) -> ApiState;

    // --- Auth ---
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError>;
    async fn register(&self, request: &RegisterRequest) -> Result<(), ApiError>;
    async fn profile(&self) -> Result<Profile, ApiError>;

    // --- Articles ---
    async fn list_articles(&self, request: &ListRequest) -> Result<ListResult<Article>, ApiError>;
    async fn get_article(&self, id: &str) -> Result<Article, ApiError>;
    async fn create_article(&self, payload: &ArticlePayload) -> Result<(), ApiError>;
    async fn update_article(&self, id: &str, payload: &ArticlePayload) -> Result<(), ApiError>;
    async fn delete_article(&self, id: &str) -> Result<(), ApiError>;

    // --- Categories ---
    async fn list_categories(
        &self,
        request: &ListRequest,
    ) -> Result<ListResult<Category>, ApiError>;
    async fn create_category(&self, payload: &CategoryPayload) -> Result<(), ApiError>;
    async fn update_category(&self, id: &str, payload: &CategoryPayload)
    -> Result<(), ApiError>;
    async fn delete_category(&self, id: &str) -> Result<(), ApiError>;

    // --- Media ---
    async fn upload_image(&self, upload: ImageUpload) -> Result<UploadResponse, ApiError>;
}

/// ApiState
///
/// The type used to share API access across the application state.
pub type ApiState = Arc<dyn BlogApi>;

const ALLOWED_IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// ImageUpload
///
/// A thumbnail or inline image on its way to `POST /upload`. Only `.jpg`, `.jpeg` and
/// `.png` files are accepted.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(
        file_name: impl Into<String>,
        content_type: Option<String>,
        bytes: Vec<u8>,
    ) -> Result<Self, ApiError> {
        let file_name = file_name.into();
        let extension = Path::new(&file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .ok_or_else(|| ApiError::InvalidUpload("file has no extension".to_string()))?;

        if !ALLOWED_IMAGE_EXTENSIONS.contains(&extension.as_str()) {
            return Err(ApiError::InvalidUpload(format!(
                "only .jpg, .jpeg and .png images are accepted (got .{extension})"
            )));
        }
        if bytes.is_empty() {
            return Err(ApiError::InvalidUpload("file is empty".to_string()));
        }

        let content_type = content_type.unwrap_or_else(|| match extension.as_str() {
            "png" => "image/png".to_string(),
            _ => "image/jpeg".to_string(),
        });

        Ok(Self {
            file_name,
            content_type,
            bytes,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }
}

/// HttpBlogApi
///
/// The reqwest implementation. Cloning is cheap: the connection pool is shared and only
/// the session handle differs between per-request clients.
#[derive(Clone)]
pub struct HttpBlogApi {
    http: reqwest::Client,
    base_url: Arc<str>,
    session: SharedSession,
}

impl HttpBlogApi {
    pub fn new(base_url: &str, session: SharedSession) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, session)
    }

    pub fn with_client(http: reqwest::Client, base_url: &str, session: SharedSession) -> Self {
        Self {
            http,
            base_url: Arc::from(base_url.trim_end_matches('/')),
            session,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `<collection>/<id>` with `id` percent-encoded as a single path segment.
    fn resource_url(&self, endpoint: &str, collection: &str, id: &str) -> Result<Url, ApiError> {
        let invalid = |reason: String| ApiError::InvalidUrl {
            endpoint: endpoint.to_string(),
            reason,
        };
        let mut url =
            Url::parse(&self.url(collection)).map_err(|err| invalid(err.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| invalid("base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .push(id);
        Ok(url)
    }

    /// Attaches `Authorization: Bearer <token>` when the session holds a token.
    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.session.get().token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Sends the request and returns the body of a successful response.
    async fn dispatch(&self, endpoint: &str, builder: RequestBuilder) -> Result<Vec<u8>, ApiError> {
        tracing::debug!(endpoint, "calling blog API");

        let response = self
            .authorize(builder)
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                endpoint: endpoint.to_string(),
                source,
            })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|source| ApiError::Transport {
                endpoint: endpoint.to_string(),
                source,
            })?;

        if !status.is_success() {
            return Err(ApiError::Status {
                endpoint: endpoint.to_string(),
                status,
                message: error_message(&body, status),
            });
        }

        Ok(body.to_vec())
    }

    async fn fetch<T: DeserializeOwned + Send>(
        &self,
        endpoint: &str,
        builder: RequestBuilder,
    ) -> Result<T, ApiError> {
        let body = self.dispatch(endpoint, builder).await?;
        decode(endpoint, &body)
    }

    async fn list<T: DeserializeOwned + Send>(
        &self,
        endpoint: &str,
        path: &str,
        text_key: &str,
        request: &ListRequest,
    ) -> Result<ListResult<T>, ApiError> {
        let builder = self
            .http
            .get(self.url(path))
            .query(&request.query_pairs(text_key));
        let envelope: ListEnvelope<T> = self.fetch(endpoint, builder).await?;
        Ok(envelope.into_result(request))
    }
}

// Body shape the API uses for rejected requests.
#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

fn error_message(body: &[u8], status: StatusCode) -> String {
    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|body| body.error.or(body.message))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        })
}

fn decode<T: DeserializeOwned>(endpoint: &str, body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|source| ApiError::Decode {
        endpoint: endpoint.to_string(),
        source,
    })
}

#[async_trait]
impl BlogApi for HttpBlogApi {
    fn with_session(&self, session: SharedSession) -> ApiState {
        Arc::new(Self {
            http: self.http.clone(),
            base_url: Arc::clone(&self.base_url),
            session,
        })
    }

    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        let builder = self.http.post(self.url("/auth/login")).json(request);
        self.fetch("POST /auth/login", builder).await
    }

    async fn register(&self, request: &RegisterRequest) -> Result<(), ApiError> {
        let builder = self.http.post(self.url("/auth/register")).json(request);
        self.dispatch("POST /auth/register", builder).await.map(drop)
    }

    async fn profile(&self) -> Result<Profile, ApiError> {
        let builder = self.http.get(self.url("/auth/profile"));
        self.fetch("GET /auth/profile", builder).await
    }

    async fn list_articles(&self, request: &ListRequest) -> Result<ListResult<Article>, ApiError> {
        self.list("GET /articles", "/articles", "title", request)
            .await
    }

    async fn get_article(&self, id: &str) -> Result<Article, ApiError> {
        let url = self.resource_url("GET /articles/{id}", "/articles", id)?;
        let builder = self.http.get(url);
        self.fetch("GET /articles/{id}", builder).await
    }

    async fn create_article(&self, payload: &ArticlePayload) -> Result<(), ApiError> {
        let builder = self.http.post(self.url("/articles")).json(payload);
        self.dispatch("POST /articles", builder).await.map(drop)
    }

    async fn update_article(&self, id: &str, payload: &ArticlePayload) -> Result<(), ApiError> {
        let url = self.resource_url("PUT /articles/{id}", "/articles", id)?;
        let builder = self.http.put(url).json(payload);
        self.dispatch("PUT /articles/{id}", builder).await.map(drop)
    }

    async fn delete_article(&self, id: &str) -> Result<(), ApiError> {
        let url = self.resource_url("DELETE /articles/{id}", "/articles", id)?;
        let builder = self.http.delete(url);
        self.dispatch("DELETE /articles/{id}", builder).await.map(drop)
    }

    async fn list_categories(
        &self,
        request: &ListRequest,
    ) -> Result<ListResult<Category>, ApiError> {
        self.list("GET /categories", "/categories", "name", request)
            .await
    }

    async fn create_category(&self, payload: &CategoryPayload) -> Result<(), ApiError> {
        let builder = self.http.post(self.url("/categories")).json(payload);
        self.dispatch("POST /categories", builder).await.map(drop)
    }

    async fn update_category(
        &self,
        id: &str,
        payload: &CategoryPayload,
    ) -> Result<(), ApiError> {
        let url = self.resource_url("PUT /categories/{id}", "/categories", id)?;
        let builder = self.http.put(url).json(payload);
        self.dispatch("PUT /categories/{id}", builder).await.map(drop)
    }

    async fn delete_category(&self, id: &str) -> Result<(), ApiError> {
        let url = self.resource_url("DELETE /categories/{id}", "/categories", id)?;
        let builder = self.http.delete(url);
        self.dispatch("DELETE /categories/{id}", builder)
            .await
            .map(drop)
    }

    async fn upload_image(&self, upload: ImageUpload) -> Result<UploadResponse, ApiError> {
        let ImageUpload {
            file_name,
            content_type,
            bytes,
        } = upload;

        let part = multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(&content_type)
            .map_err(|source| ApiError::Transport {
                endpoint: "POST /upload".to_string(),
                source,
            })?;
        let form = multipart::Form::new().part("image", part);

        let builder = self.http.post(self.url("/upload")).multipart(form);
        self.fetch("POST /upload", builder).await
    }
}
