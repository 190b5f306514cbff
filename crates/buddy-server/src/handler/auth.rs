//! Session token issue and revocation.

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use buddy_core::wire::{LoginRequest, SessionGrant, SuccessBody};

use super::{jwt::AuthenticatedUser, run_blocking};
use crate::{AppState, error::ApiError};

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<SessionGrant>, ApiError> {
    let Json(request) = payload?;
    let database = state.database.clone();
    let user_id = run_blocking(move || {
        Ok(database.verify_credentials(&request.email, &request.password)?)
    })
    .await?;

    let (access_token, expires_at) = state
        .jwt
        .generate_token(&user_id)
        .map_err(|e| ApiError::Internal(format!("failed to issue token: {e}")))?;

    tracing::info!("User signed in: {user_id}");
    Ok(Json(SessionGrant {
        access_token,
        user_id,
        expires_at,
    }))
}

pub async fn logout(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Json<SuccessBody> {
    state.database.revoke_token(&user.token, user.expires_at);
    tracing::info!("User signed out: {}", user.user_id);
    Json(SuccessBody::OK)
}
