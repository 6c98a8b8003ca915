//! Access guard.
//!
//! Every navigation request passes through [`access_guard`] before any page handler
//! runs. The decision itself ([`check`]) is pure: it looks only at the session read
//! from the request cookies and at the request path, and performs no I/O.
//!
//! Rules, first match wins:
//! 1. signed in and on the login page: go to the role's home page
//! 2. not signed in and not on the login page: go to `/login`
//! 3. admin section without the Admin role: go to `/unauthorized`
//! 4. user section without the User role: go to `/admin/articles`
//! 5. otherwise the request proceeds untouched
//!
//! An unrecognized role label never reaches these rules: the session normalizes it to
//! anonymous, so such a request is treated exactly like one without a token.

use std::sync::Arc;

use axum::{
    extract::{OriginalUri, Request},
    http::Method,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::session::{MemorySessionStore, Role, Session, SessionStore, SharedSession};

pub const LOGIN_PATH: &str = "/login";
pub const UNAUTHORIZED_PATH: &str = "/unauthorized";
pub const ADMIN_HOME: &str = "/admin/articles";

/// Which part of the guarded surface a path belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathScope {
    Login,
    Admin,
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(&'static str),
}

/// Maps a request path onto the guarded surface. `None` means the path is not
/// guarded at all (health checks, API docs, `/unauthorized`, `/register`, ...).
///
/// Guarded patterns: `/login`, `/admin/*`, `/user/*`, `/`, `/articles/*`, `/profile`.
pub fn classify(path: &str) -> Option<PathScope> {
    let path = match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    };

    if path == LOGIN_PATH {
        Some(PathScope::Login)
    } else if within(path, "/admin") {
        Some(PathScope::Admin)
    } else if path == "/"
        || path == "/profile"
        || within(path, "/user")
        || within(path, "/articles")
    {
        Some(PathScope::User)
    } else {
        None
    }
}

// Segment-wise prefix match: `/admin` and `/admin/x`, never `/administrator`.
fn within(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Applies the rules to a guarded scope.
pub fn evaluate(session: &Session, scope: PathScope) -> GuardDecision {
    match (scope, session.role()) {
        (PathScope::Login, Some(role)) => GuardDecision::Redirect(role.home_path()),
        (PathScope::Login, None) => GuardDecision::Allow,
        (_, None) => GuardDecision::Redirect(LOGIN_PATH),
        (PathScope::Admin, Some(Role::Admin)) => GuardDecision::Allow,
        (PathScope::Admin, Some(Role::User)) => GuardDecision::Redirect(UNAUTHORIZED_PATH),
        (PathScope::User, Some(Role::User)) => GuardDecision::Allow,
        (PathScope::User, Some(Role::Admin)) => GuardDecision::Redirect(ADMIN_HOME),
    }
}

/// Full decision for a request path. Unguarded paths are always allowed.
pub fn check(session: &Session, path: &str) -> GuardDecision {
    classify(path).map_or(GuardDecision::Allow, |scope| evaluate(session, scope))
}

/// access_guard
///
/// Middleware wrapping the whole router. Builds the request-scoped session store from
/// the `token`/`role` cookies, decides, and either redirects or hands the store to the
/// handlers through the request extensions. Navigations (GET/HEAD) get a 307; any other
/// method gets a 303 so the redirect target is fetched with GET and no body.
pub async fn access_guard(jar: CookieJar, mut request: Request, next: Next) -> Response {
    let store = Arc::new(MemorySessionStore::from_jar(&jar));
    // Nested routers see a stripped URI; decide on the one the client sent.
    let path = match request.extensions().get::<OriginalUri>() {
        Some(OriginalUri(uri)) => uri.path().to_string(),
        None => request.uri().path().to_string(),
    };

    if let GuardDecision::Redirect(target) = check(&store.get(), &path) {
        tracing::debug!(path = %path, redirect = target, "access guard redirect");
        let redirect = if matches!(*request.method(), Method::GET | Method::HEAD) {
            Redirect::temporary(target)
        } else {
            Redirect::to(target)
        };
        return redirect.into_response();
    }

    request.extensions_mut().insert::<SharedSession>(store);
    next.run(request).await
}
