use std::{env, time::Duration};

/// AppConfig
///
/// Holds the portal's entire configuration state. Loaded once at startup and shared
/// (immutably) through `AppState` via `FromRef`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Base URL of the remote blog API (articles, categories, auth, upload).
    pub api_base_url: String,
    // Address the portal listens on.
    pub bind_addr: String,
    // Marks the session cookies `Secure`. Always on in production.
    pub cookie_secure: bool,
    // Quiet period applied to free-text filter edits before a list is re-fetched.
    pub list_debounce: Duration,
    // Runtime environment marker.
    pub env: Env,
}

/// Env
///
/// Runtime context. Local development tolerates missing settings, production fails fast.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_LIST_DEBOUNCE_MS: u64 = 300;

impl Default for AppConfig {
    /// Safe, non-panicking values for test state setup.
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            cookie_secure: false,
            list_debounce: Duration::from_millis(DEFAULT_LIST_DEBOUNCE_MS),
            env: Env::Local,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables.
    ///
    /// # Panics
    /// Panics in production when `API_BASE_URL` is not set, so the portal never starts
    /// pointed at a development API.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let api_base_url = match env {
            Env::Production => {
                env::var("API_BASE_URL").expect("FATAL: API_BASE_URL must be set in production.")
            }
            Env::Local => {
                env::var("API_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string())
            }
        };

        let list_debounce = env::var("LIST_DEBOUNCE_MS")
            .ok()
            .and_then(|raw| raw.parse::<u64>().ok())
            .unwrap_or(DEFAULT_LIST_DEBOUNCE_MS);

        Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            cookie_secure: env == Env::Production,
            list_debounce: Duration::from_millis(list_debounce),
            env,
        }
    }
}
