use std::{
    fmt,
    str::FromStr,
    sync::{Arc, RwLock},
};

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

/// Cookie holding the opaque session credential issued by the blog API.
pub const TOKEN_COOKIE: &str = "token";
/// Cookie holding the role label issued alongside the token.
pub const ROLE_COOKIE: &str = "role";

/// Role
///
/// The two role labels the blog API issues at login. The wire format is the exact
/// label (`Admin` / `User`); anything else is not a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::User => "User",
        }
    }

    /// Landing page for a signed-in user of this role.
    pub fn home_path(&self) -> &'static str {
        match self {
            Role::Admin => "/admin/articles",
            Role::User => "/",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized role label `{0}`")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        match label {
            "Admin" => Ok(Role::Admin),
            "User" => Ok(Role::User),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Credentials
///
/// A token paired with its role. Only ever constructed as a pair, which is what keeps
/// the "set and cleared together" invariant of the session.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub token: String,
    pub role: Role,
}

impl Credentials {
    pub fn new(token: impl Into<String>, role: Role) -> Self {
        Self {
            token: token.into(),
            role,
        }
    }
}

// The token never shows up in logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}

/// Session
///
/// Either anonymous or holding a complete set of credentials. A token without a
/// recognized role, or a role without a token, normalizes to anonymous.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    credentials: Option<Credentials>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(credentials: Credentials) -> Self {
        if credentials.token.is_empty() {
            return Self::anonymous();
        }
        Self {
            credentials: Some(credentials),
        }
    }

    /// Builds a session from the two raw credential values, applying the pairing
    /// invariant. Absent, empty or malformed values yield an anonymous session.
    pub fn from_parts(token: Option<&str>, role: Option<&str>) -> Self {
        let token = token.map(str::trim).filter(|token| !token.is_empty());
        let role = role.and_then(|label| label.trim().parse::<Role>().ok());

        match (token, role) {
            (Some(token), Some(role)) => Self::authenticated(Credentials::new(token, role)),
            _ => Self::anonymous(),
        }
    }

    pub fn from_jar(jar: &CookieJar) -> Self {
        Self::from_parts(
            jar.get(TOKEN_COOKIE).map(|cookie| cookie.value()),
            jar.get(ROLE_COOKIE).map(|cookie| cookie.value()),
        )
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.credentials.as_ref().map(|c| c.token.as_str())
    }

    pub fn role(&self) -> Option<Role> {
        self.credentials.as_ref().map(|c| c.role)
    }

    pub fn is_authenticated(&self) -> bool {
        self.credentials.is_some()
    }
}

/// SessionStore
///
/// Access to the current session, injected wherever the credentials are needed (the
/// access guard and the API client) instead of being read from ambient globals.
pub trait SessionStore: Send + Sync {
    fn get(&self) -> Session;
    fn set(&self, credentials: Credentials);
    fn clear(&self);
}

/// Shared handle to a session store.
pub type SharedSession = Arc<dyn SessionStore>;

/// In-memory session store. The portal creates one per request, seeded from the
/// request's cookies; long-lived clients keep one for their whole lifetime.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    inner: RwLock<Session>,
}

impl MemorySessionStore {
    pub fn new(session: Session) -> Self {
        Self {
            inner: RwLock::new(session),
        }
    }

    pub fn from_jar(jar: &CookieJar) -> Self {
        Self::new(Session::from_jar(jar))
    }

    pub fn shared(session: Session) -> SharedSession {
        Arc::new(Self::new(session))
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self) -> Session {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn set(&self, credentials: Credentials) {
        *self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Session::authenticated(credentials);
    }

    fn clear(&self) {
        *self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Session::anonymous();
    }
}

fn session_cookie(name: &'static str, value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build()
}

/// Writes both credential cookies.
pub fn write_cookies(jar: CookieJar, credentials: &Credentials, secure: bool) -> CookieJar {
    jar.add(session_cookie(TOKEN_COOKIE, credentials.token.clone(), secure))
        .add(session_cookie(
            ROLE_COOKIE,
            credentials.role.as_str().to_string(),
            secure,
        ))
}

/// Removes both credential cookies.
pub fn clear_cookies(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build((TOKEN_COOKIE, "")).path("/"))
        .remove(Cookie::build((ROLE_COOKIE, "")).path("/"))
}
