//! Remote Store Client: the single place where network failures become values.
//!
//! [`RemoteStore::call`] never fails. Session lookup, the HTTP exchange and
//! both timeouts collapse into a [`RemoteResponse`], and callers branch on it.

use std::{sync::Arc, time::Duration};

use buddy_core::wire::ErrorBody;
use http::{HeaderValue, Method, StatusCode, header};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

use crate::{
    config::ClientConfig,
    session::SessionProvider,
    transport::{RemoteRequest, Transport},
};

/// Why a call produced no real reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnavailableReason {
    Timeout(Duration),
    Network(String),
    InvalidRequest(String),
}

impl std::fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout(after) => write!(f, "request timed out after {}ms", after.as_millis()),
            Self::Network(e) => write!(f, "network error: {e}"),
            Self::InvalidRequest(e) => write!(f, "request could not be built: {e}"),
        }
    }
}

/// Outcome of one remote call.
#[derive(Debug, Clone)]
pub enum RemoteResponse {
    /// The backend answered, with any status.
    Reply {
        status: StatusCode,
        body: serde_json::Value,
    },
    /// The backend could not be reached in time.
    Unavailable(UnavailableReason),
}

impl RemoteResponse {
    /// HTTP status; `503` for an unreachable backend.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Reply { status, .. } => *status,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status().is_success()
    }

    /// JSON body; a synthetic `{error, message}` body for an unreachable backend.
    pub fn body(&self) -> serde_json::Value {
        match self {
            Self::Reply { body, .. } => body.clone(),
            Self::Unavailable(reason) => serde_json::json!({
                "error": "Service unavailable",
                "message": reason.to_string(),
            }),
        }
    }

    /// Decodes a successful reply into `T`.
    pub fn into_payload<T: DeserializeOwned>(self) -> Result<T, RemoteFailure> {
        match self {
            Self::Unavailable(reason) => Err(RemoteFailure::Unavailable(reason)),
            Self::Reply { status, body } if !status.is_success() => {
                let error = serde_json::from_value::<ErrorBody>(body)
                    .map_or_else(|_| status.to_string(), |body| body.error);
                Err(RemoteFailure::Status { status, error })
            }
            Self::Reply { body, .. } => {
                serde_json::from_value(body).map_err(|e| RemoteFailure::Decode(e.to_string()))
            }
        }
    }
}

/// A remote call that did not yield the expected payload.
#[derive(Error, Debug, Clone)]
pub enum RemoteFailure {
    #[error("backend unavailable: {0}")]
    Unavailable(UnavailableReason),

    #[error("backend answered {status}: {error}")]
    Status { status: StatusCode, error: String },

    #[error("unexpected payload: {0}")]
    Decode(String),
}

#[derive(Debug, Clone)]
pub struct CallOptions {
    pub method: Method,
    pub body: Option<serde_json::Value>,
    /// Overrides the configured per-call timeout.
    pub timeout: Option<Duration>,
    encode_error: Option<String>,
}

impl Default for CallOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            body: None,
            timeout: None,
            encode_error: None,
        }
    }
}

impl CallOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn delete() -> Self {
        Self {
            method: Method::DELETE,
            ..Self::default()
        }
    }

    /// A `method` call carrying `body` as JSON.
    ///
    /// A body that fails to encode is reported by [`RemoteStore::call`] as
    /// [`UnavailableReason::InvalidRequest`] without sending anything.
    pub fn with_json<B: Serialize>(method: Method, body: &B) -> Self {
        match serde_json::to_value(body) {
            Ok(value) => Self {
                method,
                body: Some(value),
                ..Self::default()
            },
            Err(e) => {
                tracing::error!("Error encoding request body: {e}");
                Self {
                    method,
                    encode_error: Some(e.to_string()),
                    ..Self::default()
                }
            }
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[derive(Clone)]
pub struct RemoteStore {
    config: Arc<ClientConfig>,
    transport: Arc<dyn Transport>,
    sessions: Arc<dyn SessionProvider>,
}

impl RemoteStore {
    pub fn new(
        config: Arc<ClientConfig>,
        transport: Arc<dyn Transport>,
        sessions: Arc<dyn SessionProvider>,
    ) -> Self {
        Self {
            config,
            transport,
            sessions,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn sessions(&self) -> &Arc<dyn SessionProvider> {
        &self.sessions
    }

    /// Calls `endpoint` (e.g. `/profile`) on the backend function.
    pub async fn call(&self, endpoint: &str, options: CallOptions) -> RemoteResponse {
        if let Some(e) = options.encode_error {
            return RemoteResponse::Unavailable(UnavailableReason::InvalidRequest(e));
        }
        let token = self.bearer_token().await;

        let mut request = RemoteRequest::new(options.method, self.config.endpoint_url(endpoint));
        request.body = options.body;
        request.headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        match HeaderValue::from_str(&format!("Bearer {token}")) {
            Ok(value) => {
                request.headers.insert(header::AUTHORIZATION, value);
            }
            Err(e) => {
                return RemoteResponse::Unavailable(UnavailableReason::InvalidRequest(
                    e.to_string(),
                ));
            }
        }

        let timeout = options.timeout.unwrap_or(self.config.request_timeout);
        match tokio::time::timeout(timeout, self.transport.execute(request)).await {
            Ok(Ok(raw)) => {
                let body = if raw.body.trim().is_empty() {
                    serde_json::Value::Null
                } else {
                    serde_json::from_str(&raw.body)
                        .unwrap_or(serde_json::Value::String(raw.body))
                };
                RemoteResponse::Reply {
                    status: raw.status,
                    body,
                }
            }
            Ok(Err(err)) => {
                tracing::debug!("Remote call to {endpoint} failed: {err}");
                RemoteResponse::Unavailable(UnavailableReason::Network(err.to_string()))
            }
            Err(_) => {
                tracing::debug!(
                    "Remote call to {endpoint} timed out after {}ms",
                    timeout.as_millis()
                );
                RemoteResponse::Unavailable(UnavailableReason::Timeout(timeout))
            }
        }
    }

    /// The session's access token, or the anonymous key when there is none.
    async fn bearer_token(&self) -> String {
        let lookup =
            tokio::time::timeout(self.config.session_timeout, self.sessions.current_session())
                .await;
        match lookup {
            Ok(Ok(Some(session))) => session.access_token,
            Ok(Ok(None)) => self.config.anon_key.clone(),
            Ok(Err(err)) => {
                tracing::debug!("Session lookup failed, using anonymous key: {err}");
                self.config.anon_key.clone()
            }
            Err(_) => {
                tracing::debug!("Session lookup timed out, using anonymous key");
                self.config.anon_key.clone()
            }
        }
    }
}
