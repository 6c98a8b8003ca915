use std::{convert::Infallible, sync::Arc};

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    api::ApiState,
    session::{MemorySessionStore, Session, SharedSession},
};

/// ApiSession Extractor Result
///
/// The request-scoped view of the caller: the session read from the `token`/`role`
/// cookies, and an API client bound to that session so every outbound call carries
/// the caller's bearer token.
#[derive(Clone)]
pub struct ApiSession {
    pub session: SharedSession,
    pub api: ApiState,
}

impl ApiSession {
    /// Snapshot of the current session.
    pub fn current(&self) -> Session {
        self.session.get()
    }
}

/// ApiSession Extractor Implementation
///
/// The access guard stores the session it decided on in the request extensions, so
/// handlers act on exactly the credentials that were checked. Routes mounted outside
/// the guard fall back to reading the cookies directly.
///
/// Rejection: none. An anonymous caller still gets a (tokenless) client; the guard is
/// what keeps anonymous callers off protected pages.
impl<S> FromRequestParts<S> for ApiSession
where
    S: Send + Sync,
    ApiState: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = match parts.extensions.get::<SharedSession>() {
            Some(session) => Arc::clone(session),
            None => {
                let jar = CookieJar::from_headers(&parts.headers);
                Arc::new(MemorySessionStore::from_jar(&jar)) as SharedSession
            }
        };

        let api = ApiState::from_ref(state).with_session(Arc::clone(&session));
        Ok(ApiSession { session, api })
    }
}
