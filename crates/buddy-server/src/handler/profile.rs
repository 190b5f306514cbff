use axum::{Json, extract::State, extract::rejection::JsonRejection};
use buddy_core::{ProfileUpdate, wire::ProfileEnvelope};

use super::jwt::AuthenticatedUser;
use crate::{AppState, error::ApiError};

pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<ProfileEnvelope>, ApiError> {
    let profile = state.database.get_profile(&user.user_id)?;
    Ok(Json(ProfileEnvelope { profile }))
}

pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    payload: Result<Json<ProfileUpdate>, JsonRejection>,
) -> Result<Json<ProfileEnvelope>, ApiError> {
    let Json(update) = payload?;
    let profile = state.database.update_profile(&user.user_id, update)?;
    tracing::info!("Profile updated for user: {}", user.user_id);
    Ok(Json(ProfileEnvelope { profile }))
}
