use axum::{Router, extract::FromRef, http::HeaderName, middleware};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Remote blog API client and its errors.
pub mod api;
// Request-scoped session + API client extractor.
pub mod auth;
pub mod config;
pub mod error;
// Route gating on the `token`/`role` cookies.
pub mod guard;
pub mod handlers;
// Generic filter/pagination controller for listing screens.
pub mod list;
pub mod models;
pub mod session;
pub mod views;

// Module for routing segregation (Public, Reader, Admin).
pub mod routes;
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

pub use api::{ApiState, BlogApi, HttpBlogApi};
pub use config::AppConfig;

/// ApiDoc
///
/// OpenAPI description of every portal route and view model, served by Swagger UI at
/// `/swagger-ui` (JSON at `/api-docs/openapi.json`).
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::get_login_page, handlers::login, handlers::register, handlers::logout,
        handlers::get_home, handlers::get_article_detail, handlers::get_profile,
        handlers::get_unauthorized, handlers::get_admin_articles, handlers::create_article,
        handlers::get_article_edit, handlers::update_article, handlers::delete_article,
        handlers::upload_image, handlers::get_admin_categories, handlers::create_category,
        handlers::update_category, handlers::delete_category, handlers::get_admin_profile
    ),
    components(
        schemas(
            models::LoginRequest, models::RegisterRequest, models::ArticlePayload,
            models::CategoryPayload, models::UploadResponse, session::Role,
            views::LoginPage, views::ArticleListPage, views::AdminArticlePage,
            views::CategoryPage, views::ArticleDetailPage, views::ArticleEditPage,
            views::ProfileView, views::Notification, error::ErrorBody,
        )
    ),
    tags(
        (name = "blog-portal", description = "Cookie-gated blog portal")
    )
)]
pub struct ApiDoc;

/// AppState
///
/// Shared by every request: the process-wide API client (bound to no session) and the
/// configuration. Handlers never use `api` directly; the `ApiSession` extractor derives
/// a per-request client from it.
#[derive(Clone)]
pub struct AppState {
    pub api: ApiState,
    pub config: AppConfig,
}

impl FromRef<AppState> for ApiState {
    fn from_ref(app_state: &AppState) -> ApiState {
        app_state.api.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the portal: Swagger UI, the three route tiers, the access guard over all
/// of them, then the observability layers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(authenticated::authenticated_routes())
        .nest("/admin", admin::admin_routes())
        // Also wraps the fallback, so unknown paths under a guarded prefix redirect too.
        .layer(middleware::from_fn(guard::access_guard))
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span for one request, tagged with the `x-request-id` set by `SetRequestIdLayer` so
/// every log line of the request (guard redirects, API failures) correlates.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
