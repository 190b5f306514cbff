//! Session bootstrap and the login/logout actions.
//!
//! Startup tries to restore a remote session within a bounded time. Any failure
//! on that path (lookup error or timeout, profile fetch failure) moves the
//! shared [`ClientContext`] to local mock mode for the rest of the process and
//! restores the mock session from storage instead.

use std::sync::Arc;

use buddy_core::{ProfileDetails, ProfileUpdate, SessionMode, SkillLevel, UserProfile};
use chrono::{TimeZone, Utc};

use crate::{
    api::BackendApi,
    context::ClientContext,
    remote::RemoteFailure,
    session::SessionProvider,
    storage::{MOCK_USER_KEY, Storage, save_json},
    user_data::UserDataService,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapState {
    Initializing,
    RestoringRemote,
    RemoteRestored,
    FallingBackToMock,
    MockRestored,
    Unauthenticated,
}

impl BootstrapState {
    pub fn is_authenticated(self) -> bool {
        matches!(self, Self::RemoteRestored | Self::MockRestored)
    }
}

/// A credential pair accepted while in mock mode.
#[derive(Debug, Clone)]
pub struct MockAccount {
    pub email: String,
    pub password: String,
    pub profile: UserProfile,
}

/// The fixed demo allow-list.
pub fn demo_accounts() -> Vec<MockAccount> {
    let demo_joined = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).single();
    let admin_joined = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single();

    let mut demo = UserProfile::new("demo-user-1", "demo@sportsbuddy.com", "Demo User");
    demo.created_at = demo_joined.unwrap_or(demo.created_at);
    demo.profile = ProfileDetails {
        bio: "Sports enthusiast and fitness lover".to_string(),
        location: "San Francisco, CA".to_string(),
        preferred_sports: vec!["Tennis".to_string(), "Basketball".to_string()],
        skill_levels: [
            ("Tennis".to_string(), SkillLevel::Intermediate),
            ("Basketball".to_string(), SkillLevel::Intermediate),
        ]
        .into(),
        availability: vec!["weekend-morning".to_string()],
        ..Default::default()
    };

    let mut admin = UserProfile::new("admin-user-1", "admin@sportsbuddy.com", "Admin User");
    admin.is_admin = true;
    admin.created_at = admin_joined.unwrap_or(admin.created_at);
    admin.profile = ProfileDetails {
        bio: "Platform administrator".to_string(),
        location: "New York, NY".to_string(),
        preferred_sports: vec!["Soccer".to_string(), "Running".to_string()],
        skill_levels: [
            ("Soccer".to_string(), SkillLevel::Advanced),
            ("Running".to_string(), SkillLevel::Advanced),
        ]
        .into(),
        availability: vec!["weekday-evening".to_string()],
        ..Default::default()
    };

    vec![
        MockAccount {
            email: "demo@sportsbuddy.com".to_string(),
            password: "demo123".to_string(),
            profile: demo,
        },
        MockAccount {
            email: "admin@sportsbuddy.com".to_string(),
            password: "admin123".to_string(),
            profile: admin,
        },
    ]
}

pub struct AuthService {
    context: ClientContext,
    api: BackendApi,
    sessions: Arc<dyn SessionProvider>,
    user_data: UserDataService,
    storage: Arc<dyn Storage>,
    mock_accounts: Vec<MockAccount>,
    state: BootstrapState,
    user: Option<UserProfile>,
}

impl AuthService {
    pub fn new(
        context: ClientContext,
        api: BackendApi,
        user_data: UserDataService,
        storage: Arc<dyn Storage>,
    ) -> Self {
        let sessions = api.remote().sessions().clone();
        Self {
            context,
            api,
            sessions,
            user_data,
            storage,
            mock_accounts: demo_accounts(),
            state: BootstrapState::Initializing,
            user: None,
        }
    }

    /// Replaces the demo allow-list.
    #[must_use]
    pub fn with_mock_accounts(mut self, accounts: Vec<MockAccount>) -> Self {
        self.mock_accounts = accounts;
        self
    }

    pub fn state(&self) -> BootstrapState {
        self.state
    }

    pub fn mode(&self) -> SessionMode {
        self.context.mode()
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn user_data(&self) -> &UserDataService {
        &self.user_data
    }

    pub fn api(&self) -> &BackendApi {
        &self.api
    }

    /// Restores whichever session is available. Runs once at startup.
    pub async fn bootstrap(&mut self) -> BootstrapState {
        self.state = BootstrapState::Initializing;
        self.user = None;

        if !self.context.is_remote() {
            return self.restore_mock_session().await;
        }

        self.state = BootstrapState::RestoringRemote;
        let timeout = self.context.config().bootstrap_timeout;
        let session = match tokio::time::timeout(timeout, self.sessions.current_session()).await {
            Ok(Ok(Some(session))) => session,
            Ok(Ok(None)) => {
                tracing::debug!("No remote session to restore");
                self.state = BootstrapState::Unauthenticated;
                return self.state;
            }
            Ok(Err(err)) => {
                return self
                    .fall_back_to_mock(&format!("session check failed: {err}"))
                    .await;
            }
            Err(_) => {
                return self
                    .fall_back_to_mock(&format!(
                        "session check timed out after {}ms",
                        timeout.as_millis()
                    ))
                    .await;
            }
        };

        match self.api.get_profile().await {
            Ok(profile) => {
                self.user_data.load(&profile.id).await;
                tracing::info!(user_id = %profile.id, "Session restored");
                self.user = Some(profile);
                self.state = BootstrapState::RemoteRestored;
                self.state
            }
            Err(err) => {
                tracing::debug!("Profile fetch for {} failed: {err}", session.user_id);
                self.fall_back_to_mock(&format!("profile fetch failed: {err}"))
                    .await
            }
        }
    }

    async fn fall_back_to_mock(&mut self, reason: &str) -> BootstrapState {
        self.context.downgrade_to_mock(reason);
        self.restore_mock_session().await
    }

    async fn restore_mock_session(&mut self) -> BootstrapState {
        self.state = BootstrapState::FallingBackToMock;

        let raw = match self.storage.get_item(MOCK_USER_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                self.state = BootstrapState::Unauthenticated;
                return self.state;
            }
            Err(err) => {
                tracing::error!("Error reading mock session: {err}");
                self.state = BootstrapState::Unauthenticated;
                return self.state;
            }
        };

        match serde_json::from_str::<UserProfile>(&raw) {
            Ok(user) => {
                self.user_data.load(&user.id).await;
                tracing::info!(user_id = %user.id, "Mock session restored");
                self.user = Some(user);
                self.state = BootstrapState::MockRestored;
            }
            Err(err) => {
                tracing::error!("Error parsing mock user: {err}");
                self.state = BootstrapState::Unauthenticated;
            }
        }
        self.state
    }

    /// Signs in. Any remote failure switches to mock mode and retries the
    /// credentials against the mock allow-list within the same call.
    pub async fn login(&mut self, email: &str, password: &str) -> bool {
        tracing::info!(email, "Login attempt");

        if self.context.is_remote() {
            match self.remote_login(email, password).await {
                Ok(profile) => {
                    self.user_data.load(&profile.id).await;
                    tracing::info!(user_id = %profile.id, admin = profile.is_admin, "Login succeeded");
                    self.user = Some(profile);
                    self.state = BootstrapState::RemoteRestored;
                    return true;
                }
                Err(reason) => {
                    tracing::debug!("Remote login failed, trying mock auth: {reason}");
                    self.context.downgrade_to_mock(&reason);
                }
            }
        }

        self.login_with_mock(email, password).await
    }

    /// Password sign-in followed by a profile fetch.
    async fn remote_login(&self, email: &str, password: &str) -> Result<UserProfile, String> {
        let timeout = self.context.config().login_timeout;
        match tokio::time::timeout(timeout, self.sessions.sign_in(email, password)).await {
            Ok(Ok(_session)) => {}
            Ok(Err(err)) => return Err(format!("sign-in failed: {err}")),
            Err(_) => return Err(format!("sign-in timed out after {}ms", timeout.as_millis())),
        }

        match self.api.get_profile().await {
            Ok(profile) => Ok(profile),
            Err(err) => {
                self.remote_sign_out().await;
                Err(format!("profile fetch after login failed: {err}"))
            }
        }
    }

    async fn login_with_mock(&mut self, email: &str, password: &str) -> bool {
        let Some(account) = self
            .mock_accounts
            .iter()
            .find(|account| account.email == email && account.password == password)
        else {
            tracing::info!(email, "Login failed: invalid credentials");
            return false;
        };

        let profile = account.profile.clone();
        self.remember_mock_user(&profile);
        self.user_data.load(&profile.id).await;
        tracing::info!(user_id = %profile.id, "Mock login succeeded");
        self.user = Some(profile);
        self.state = BootstrapState::MockRestored;
        true
    }

    /// Creates an account and signs in with it.
    ///
    /// With the backend unreachable (or already in mock mode) a local mock
    /// user is created instead. A rejection by the backend returns `false`.
    pub async fn register(&mut self, email: &str, password: &str, name: &str) -> bool {
        tracing::info!(email, name, "Register attempt");

        if !self.context.is_remote() {
            self.create_mock_user(email, name);
            return true;
        }

        match self.api.signup(email, password, name).await {
            Ok(created) => tracing::debug!("Account {} created", created.id),
            Err(RemoteFailure::Unavailable(reason)) => {
                self.context
                    .downgrade_to_mock(&format!("signup unavailable: {reason}"));
                self.create_mock_user(email, name);
                return true;
            }
            Err(err) => {
                tracing::info!(email, "Registration rejected: {err}");
                return false;
            }
        }

        match self.remote_login(email, password).await {
            Ok(profile) => {
                tracing::info!(user_id = %profile.id, "Registration succeeded");
                self.user = Some(profile);
                self.state = BootstrapState::RemoteRestored;
                true
            }
            Err(reason) => {
                tracing::error!("Auto-login after registration failed: {reason}");
                false
            }
        }
    }

    fn create_mock_user(&mut self, email: &str, name: &str) {
        let id = format!("mock-user-{}", Utc::now().timestamp_millis());
        let user = UserProfile::new(id, email, name);
        self.remember_mock_user(&user);
        tracing::info!(user_id = %user.id, "Mock registration succeeded");
        self.user = Some(user);
        self.state = BootstrapState::MockRestored;
    }

    fn remember_mock_user(&self, user: &UserProfile) {
        if let Err(err) = save_json(self.storage.as_ref(), MOCK_USER_KEY, user) {
            tracing::error!("Error storing mock session: {err}");
        }
    }

    /// Applies `update` to the current user; `false` when nobody is signed in.
    ///
    /// Falls back to a local-only update when the backend refuses or is absent.
    pub async fn update_user(&mut self, update: ProfileUpdate) -> bool {
        let Some(current) = self.user.clone() else {
            return false;
        };

        if self.context.is_remote() {
            match self.api.update_profile(&update).await {
                Ok(profile) => {
                    tracing::info!(user_id = %profile.id, "Profile updated");
                    self.user = Some(profile);
                    return true;
                }
                Err(err) => tracing::error!("Failed to update user profile remotely: {err}"),
            }
        }

        let mut updated = current;
        updated.apply(update);
        updated.updated_at = Some(Utc::now());
        self.remember_mock_user(&updated);
        self.user = Some(updated);
        true
    }

    /// Forgets the local session and the current user's cached data.
    pub async fn logout(&mut self) {
        let user = self.user.take();
        tracing::info!(user_id = user.as_ref().map(|u| u.id.as_str()), "Logout");

        if let Some(user) = &user {
            self.user_data.clear(&user.id);
        }
        if self.context.is_remote() {
            self.remote_sign_out().await;
        }
        if let Err(err) = self.sessions.forget() {
            tracing::error!("Error clearing remote session: {err}");
        }
        if let Err(err) = self.storage.remove_item(MOCK_USER_KEY) {
            tracing::error!("Error clearing mock session: {err}");
        }
        self.state = BootstrapState::Unauthenticated;
    }

    async fn remote_sign_out(&self) {
        let timeout = self.context.config().request_timeout;
        match tokio::time::timeout(timeout, self.sessions.sign_out()).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => tracing::debug!("Remote sign-out failed: {err}"),
            Err(_) => tracing::debug!("Remote sign-out timed out"),
        }
    }
}
