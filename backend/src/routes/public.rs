use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a session. `/login` is listed here too: the guard lets
/// anonymous callers in and sends signed-in ones to their home page.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers. Not guarded.
        .route("/health", get(|| async { "ok" }))
        // GET/POST /login
        // Login form model, and the form submission that sets the session cookies.
        .route("/login", get(handlers::get_login_page).post(handlers::login))
        // POST /register
        // Account creation, forwarded to the blog API.
        .route("/register", post(handlers::register))
        // POST /logout
        // Clears the `token` and `role` cookies together.
        .route("/logout", post(handlers::logout))
        // GET /unauthorized
        // Redirect target for non-admin callers in the admin section.
        .route("/unauthorized", get(handlers::get_unauthorized))
}
