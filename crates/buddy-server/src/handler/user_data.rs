//! Per-user interaction records. Users only ever see and write their own.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use buddy_core::wire::{PutUserDataRequest, SuccessBody, UserDataEnvelope};

use super::jwt::AuthenticatedUser;
use crate::{AppState, error::ApiError};

pub async fn get_user_data(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(user_id): Path<String>,
) -> Result<Json<UserDataEnvelope>, ApiError> {
    if user_id != user.user_id {
        return Err(ApiError::Forbidden(
            "Cannot read another user's data".to_string(),
        ));
    }
    let user_data = state.database.get_user_data(&user_id)?;
    Ok(Json(UserDataEnvelope { user_data }))
}

/// Rejects a record whose revision is not newer than the stored one with 409.
pub async fn put_user_data(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    payload: Result<Json<PutUserDataRequest>, JsonRejection>,
) -> Result<Json<SuccessBody>, ApiError> {
    let Json(request) = payload?;
    if request.user_id != user.user_id {
        return Err(ApiError::Forbidden(
            "Cannot write another user's data".to_string(),
        ));
    }

    let revision = request.user_data.revision;
    state
        .database
        .put_user_data(&request.user_id, request.user_data)?;
    tracing::debug!("User data for {} stored at revision {revision}", user.user_id);
    Ok(Json(SuccessBody::OK))
}
