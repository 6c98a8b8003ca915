use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post, put},
};

/// Admin Router Module
///
/// The admin console. Mounted under `/admin`, which the access guard reserves for the
/// `Admin` role; other signed-in callers are redirected to `/unauthorized` before any
/// of these handlers run.
///
/// Mutations answer with a success notification only. The client closes its modal and
/// re-fetches the table.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET/POST /admin/articles
        // Article table (title, category, page filters) and article creation.
        .route(
            "/articles",
            get(handlers::get_admin_articles).post(handlers::create_article),
        )
        // GET/PUT/DELETE /admin/articles/{id}
        .route(
            "/articles/{id}",
            get(handlers::get_article_edit)
                .put(handlers::update_article)
                .delete(handlers::delete_article),
        )
        // POST /admin/upload
        // Thumbnail and inline-image upload (.jpg, .jpeg, .png).
        .route("/upload", post(handlers::upload_image))
        // GET/POST /admin/category
        .route(
            "/category",
            get(handlers::get_admin_categories).post(handlers::create_category),
        )
        // PUT/DELETE /admin/category/{id}
        .route(
            "/category/{id}",
            put(handlers::update_category).delete(handlers::delete_category),
        )
        // GET /admin/profile
        .route("/profile", get(handlers::get_admin_profile))
}
