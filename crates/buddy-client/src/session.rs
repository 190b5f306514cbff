//! Remote authentication sessions.

use std::sync::Arc;

use async_trait::async_trait;
use buddy_core::wire::{ErrorBody, LoginRequest, SessionGrant};
use chrono::Utc;
use http::{HeaderValue, Method, header};

use crate::{
    config::ClientConfig,
    error::ClientError,
    storage::{SESSION_KEY, Storage, load_json, save_json},
    transport::{RemoteRequest, Transport},
};

/// A signed-in remote session.
pub type Session = SessionGrant;

/// Source of the current remote session, e.g. the backend's auth service.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// The active session, if any. Expired sessions count as none.
    async fn current_session(&self) -> Result<Option<Session>, ClientError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, ClientError>;

    /// Revokes the session with the auth service and forgets it locally.
    async fn sign_out(&self) -> Result<(), ClientError>;

    /// Forgets the locally kept session without contacting anyone.
    fn forget(&self) -> Result<(), ClientError>;
}

/// Signs in against `/auth/login` and keeps the token in local storage.
pub struct HttpSessionProvider {
    config: Arc<ClientConfig>,
    transport: Arc<dyn Transport>,
    storage: Arc<dyn Storage>,
}

impl HttpSessionProvider {
    pub fn new(
        config: Arc<ClientConfig>,
        transport: Arc<dyn Transport>,
        storage: Arc<dyn Storage>,
    ) -> Self {
        Self {
            config,
            transport,
            storage,
        }
    }

    fn stored(&self) -> Option<Session> {
        load_json(self.storage.as_ref(), SESSION_KEY)
    }
}

#[async_trait]
impl SessionProvider for HttpSessionProvider {
    async fn current_session(&self) -> Result<Option<Session>, ClientError> {
        let Some(session) = self.stored() else {
            return Ok(None);
        };
        if session.expires_at <= Utc::now() {
            tracing::debug!("Stored session for {} has expired", session.user_id);
            self.storage.remove_item(SESSION_KEY)?;
            return Ok(None);
        }
        Ok(Some(session))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, ClientError> {
        let mut request = RemoteRequest::new(Method::POST, self.config.endpoint_url("/auth/login"));
        request.body = Some(serde_json::to_value(LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        })?);

        let response = self.transport.execute(request).await?;
        if !response.status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&response.body)
                .map(|body| body.error)
                .unwrap_or(response.body);
            return Err(ClientError::Status {
                status: response.status.as_u16(),
                message,
            });
        }

        let session: Session = serde_json::from_str(&response.body)?;
        save_json(self.storage.as_ref(), SESSION_KEY, &session)?;
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), ClientError> {
        let Some(session) = self.stored() else {
            return Ok(());
        };
        self.forget()?;

        let mut request =
            RemoteRequest::new(Method::POST, self.config.endpoint_url("/auth/logout"));
        let bearer = HeaderValue::from_str(&format!("Bearer {}", session.access_token))
            .map_err(|e| ClientError::Config(format!("unusable access token: {e}")))?;
        request.headers.insert(header::AUTHORIZATION, bearer);

        let response = self.transport.execute(request).await?;
        if !response.status.is_success() {
            return Err(ClientError::Status {
                status: response.status.as_u16(),
                message: response.body,
            });
        }
        Ok(())
    }

    fn forget(&self) -> Result<(), ClientError> {
        self.storage.remove_item(SESSION_KEY)?;
        Ok(())
    }
}
