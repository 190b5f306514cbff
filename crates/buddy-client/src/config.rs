//! Backend location, credentials and timeouts.

use std::time::Duration;

use crate::error::ClientError;

pub const PROJECT_ID_ENV: &str = "SPORTSBUDDY_PROJECT_ID";
pub const ANON_KEY_ENV: &str = "SPORTSBUDDY_ANON_KEY";
pub const BASE_URL_ENV: &str = "SPORTSBUDDY_BASE_URL";

/// Name of the deployed backend function.
pub const FUNCTION_NAME: &str = "sportsbuddy";

/// Default cap on one remote call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(5000);
/// Cap on reading the current session before a remote call.
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_millis(2000);
/// Cap on restoring the session at startup.
pub const DEFAULT_BOOTSTRAP_TIMEOUT: Duration = Duration::from_millis(3000);
/// Cap on a remote password sign-in.
pub const DEFAULT_LOGIN_TIMEOUT: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend project identifier; determines the default base URL.
    pub project_id: String,
    /// Public key sent as bearer token when no user session exists.
    pub anon_key: String,
    /// Overrides the URL derived from `project_id`, e.g. a local server.
    pub base_url: Option<String>,
    pub request_timeout: Duration,
    pub session_timeout: Duration,
    pub bootstrap_timeout: Duration,
    pub login_timeout: Duration,
}

impl ClientConfig {
    pub fn new(project_id: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            anon_key: anon_key.into(),
            base_url: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            session_timeout: DEFAULT_SESSION_TIMEOUT,
            bootstrap_timeout: DEFAULT_BOOTSTRAP_TIMEOUT,
            login_timeout: DEFAULT_LOGIN_TIMEOUT,
        }
    }

    /// Config pointing straight at `base_url`.
    pub fn with_base_url(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        let mut config = Self::new("local", anon_key);
        config.base_url = Some(base_url.into());
        config
    }

    /// Reads the `SPORTSBUDDY_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; missing base URL is allowed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ClientError> {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let anon_key = non_empty(ANON_KEY_ENV)
            .ok_or_else(|| ClientError::Config(format!("{ANON_KEY_ENV} is not set")))?;
        let base_url = non_empty(BASE_URL_ENV);
        let project_id = match (non_empty(PROJECT_ID_ENV), &base_url) {
            (Some(project_id), _) => project_id,
            (None, Some(_)) => "local".to_string(),
            (None, None) => {
                return Err(ClientError::Config(format!(
                    "either {PROJECT_ID_ENV} or {BASE_URL_ENV} must be set"
                )));
            }
        };

        let mut config = Self::new(project_id, anon_key);
        config.base_url = base_url;
        Ok(config)
    }

    /// Root under which every backend endpoint lives, without trailing slash.
    pub fn base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!(
                "https://{}.supabase.co/functions/v1/{FUNCTION_NAME}",
                self.project_id
            ),
        }
    }

    /// Absolute URL of `endpoint`, which must start with `/`.
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}{endpoint}", self.base_url())
    }
}
