//! Typed wrappers over the backend function endpoints.

use buddy_core::{
    EventUpdate, NewEvent, ProfileUpdate, SportsEvent, UserDataRecord, UserProfile,
    wire::{
        ChangePasswordRequest, EventEnvelope, EventsEnvelope, HealthBody, ProfileEnvelope,
        PutUserDataRequest, ResetPasswordRequest, SignedUpUser, SignupRequest, SignupResponse,
        SuccessBody, UserDataEnvelope,
    },
};
use http::Method;

use crate::remote::{CallOptions, RemoteFailure, RemoteStore};

#[derive(Clone)]
pub struct BackendApi {
    remote: RemoteStore,
}

impl BackendApi {
    pub fn new(remote: RemoteStore) -> Self {
        Self { remote }
    }

    pub fn remote(&self) -> &RemoteStore {
        &self.remote
    }

    pub async fn health(&self) -> Result<HealthBody, RemoteFailure> {
        self.remote
            .call("/health", CallOptions::get())
            .await
            .into_payload()
    }

    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<SignedUpUser, RemoteFailure> {
        let body = SignupRequest {
            email: email.to_string(),
            password: password.to_string(),
            name: name.to_string(),
        };
        self.remote
            .call("/signup", CallOptions::with_json(Method::POST, &body))
            .await
            .into_payload::<SignupResponse>()
            .map(|response| response.user)
    }

    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), RemoteFailure> {
        let body = ChangePasswordRequest {
            current_password: current_password.to_string(),
            new_password: new_password.to_string(),
        };
        self.remote
            .call("/change-password", CallOptions::with_json(Method::POST, &body))
            .await
            .into_payload::<SuccessBody>()
            .map(|_| ())
    }

    pub async fn reset_password(&self, email: &str) -> Result<(), RemoteFailure> {
        let body = ResetPasswordRequest {
            email: email.to_string(),
        };
        self.remote
            .call("/reset-password", CallOptions::with_json(Method::POST, &body))
            .await
            .into_payload::<SuccessBody>()
            .map(|_| ())
    }

    pub async fn get_profile(&self) -> Result<UserProfile, RemoteFailure> {
        self.remote
            .call("/profile", CallOptions::get())
            .await
            .into_payload::<ProfileEnvelope>()
            .map(|envelope| envelope.profile)
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile, RemoteFailure> {
        self.remote
            .call("/profile", CallOptions::with_json(Method::PUT, update))
            .await
            .into_payload::<ProfileEnvelope>()
            .map(|envelope| envelope.profile)
    }

    pub async fn get_user_data(&self, user_id: &str) -> Result<UserDataRecord, RemoteFailure> {
        self.remote
            .call(&format!("/user-data/{user_id}"), CallOptions::get())
            .await
            .into_payload::<UserDataEnvelope>()
            .map(|envelope| envelope.user_data)
    }

    pub async fn put_user_data(
        &self,
        user_id: &str,
        record: &UserDataRecord,
    ) -> Result<(), RemoteFailure> {
        let body = PutUserDataRequest {
            user_id: user_id.to_string(),
            user_data: record.clone(),
        };
        self.remote
            .call("/user-data", CallOptions::with_json(Method::PUT, &body))
            .await
            .into_payload::<SuccessBody>()
            .map(|_| ())
    }

    pub async fn list_events(&self) -> Result<Vec<SportsEvent>, RemoteFailure> {
        self.remote
            .call("/events", CallOptions::get())
            .await
            .into_payload::<EventsEnvelope>()
            .map(|envelope| envelope.events)
    }

    pub async fn create_event(&self, event: &NewEvent) -> Result<SportsEvent, RemoteFailure> {
        self.remote
            .call("/events", CallOptions::with_json(Method::POST, event))
            .await
            .into_payload::<EventEnvelope>()
            .map(|envelope| envelope.event)
    }

    pub async fn update_event(
        &self,
        event_id: &str,
        update: &EventUpdate,
    ) -> Result<SportsEvent, RemoteFailure> {
        self.remote
            .call(
                &format!("/events/{event_id}"),
                CallOptions::with_json(Method::PUT, update),
            )
            .await
            .into_payload::<EventEnvelope>()
            .map(|envelope| envelope.event)
    }

    pub async fn delete_event(&self, event_id: &str) -> Result<(), RemoteFailure> {
        self.remote
            .call(&format!("/events/{event_id}"), CallOptions::delete())
            .await
            .into_payload::<SuccessBody>()
            .map(|_| ())
    }
}
