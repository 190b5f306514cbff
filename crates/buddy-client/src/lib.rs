//! SportsBuddy client sync layer.
//!
//! Talks to the backend function through [`remote::RemoteStore`], keeps a
//! per-user copy of the interaction record in local [`storage`], and falls back
//! to a local mock mode when the backend cannot be reached.

#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod context;
pub mod error;
pub mod remote;
pub mod session;
pub mod storage;
pub mod transport;
pub mod user_data;

use std::sync::Arc;

pub use api::BackendApi;
pub use auth::{AuthService, BootstrapState, MockAccount};
pub use cache::LocalCache;
pub use config::ClientConfig;
pub use context::ClientContext;
pub use error::{ClientError, StorageError};
pub use remote::{CallOptions, RemoteFailure, RemoteResponse, RemoteStore, UnavailableReason};
pub use session::{HttpSessionProvider, Session, SessionProvider};
pub use storage::{FileStorage, MemoryStorage, Preferences, Storage};
pub use transport::{HttpTransport, Transport};
pub use user_data::UserDataService;

/// All client components wired to one context and one storage.
pub struct SportsBuddy {
    context: ClientContext,
    auth: AuthService,
    preferences: Preferences,
}

impl SportsBuddy {
    /// A client talking HTTP to the configured backend.
    pub fn new(config: ClientConfig, storage: Arc<dyn Storage>) -> Self {
        let config = Arc::new(config);
        let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new());
        let sessions = Arc::new(HttpSessionProvider::new(
            config.clone(),
            transport.clone(),
            storage.clone(),
        ));
        Self::with_parts(config, transport, sessions, storage)
    }

    pub fn with_parts(
        config: Arc<ClientConfig>,
        transport: Arc<dyn Transport>,
        sessions: Arc<dyn SessionProvider>,
        storage: Arc<dyn Storage>,
    ) -> Self {
        let context = ClientContext::new(config.clone());
        let api = BackendApi::new(RemoteStore::new(config, transport, sessions));
        let user_data = UserDataService::new(
            context.clone(),
            api.clone(),
            LocalCache::new(storage.clone()),
        );
        let auth = AuthService::new(context.clone(), api, user_data, storage.clone());

        Self {
            context,
            auth,
            preferences: Preferences::new(storage),
        }
    }

    pub fn context(&self) -> &ClientContext {
        &self.context
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    pub fn auth_mut(&mut self) -> &mut AuthService {
        &mut self.auth
    }

    pub fn user_data(&self) -> &UserDataService {
        self.auth.user_data()
    }

    pub fn api(&self) -> &BackendApi {
        self.auth.api()
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }
}
