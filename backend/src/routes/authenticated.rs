use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Reader Router Module
///
/// Pages for signed-in readers. Every handler receives the caller's session through
/// the `ApiSession` extractor, so calls to the blog API carry the reader's token.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /?title=&category=&page=
        // The article grid with its filters and paginator.
        .route("/", get(handlers::get_home))
        // GET /articles/{id}
        // Article detail plus related articles from the same category.
        .route("/articles/{id}", get(handlers::get_article_detail))
        // GET /profile
        .route("/profile", get(handlers::get_profile))
}
