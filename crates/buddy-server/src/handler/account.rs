use axum::{Json, extract::State, extract::rejection::JsonRejection};
use buddy_core::wire::{
    ChangePasswordRequest, ResetPasswordRequest, SignedUpUser, SignupRequest, SignupResponse,
    SuccessBody,
};

use super::{jwt::AuthenticatedUser, run_blocking};
use crate::{AppState, error::ApiError};

const MIN_PASSWORD_LEN: usize = 8;

pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<Json<SignupResponse>, ApiError> {
    let Json(request) = payload?;
    if request.email.trim().is_empty()
        || request.password.is_empty()
        || request.name.trim().is_empty()
    {
        return Err(ApiError::BadRequest(
            "Email, password, and name are required".to_string(),
        ));
    }
    if request.password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let database = state.database.clone();
    let profile = run_blocking(move || {
        Ok(database.create_account(&request.email, &request.password, &request.name)?)
    })
    .await?;

    tracing::info!("User created successfully: {}", profile.id);
    Ok(Json(SignupResponse {
        user: SignedUpUser {
            id: profile.id,
            email: profile.email,
            name: profile.name,
        },
    }))
}

pub async fn change_password(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> Result<Json<SuccessBody>, ApiError> {
    let Json(request) = payload?;
    if request.current_password.is_empty() || request.new_password.is_empty() {
        return Err(ApiError::BadRequest(
            "Current password and new password are required".to_string(),
        ));
    }
    if request.new_password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::BadRequest(format!(
            "New password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let database = state.database.clone();
    let user_id = user.user_id.clone();
    run_blocking(move || {
        Ok(database.change_password(
            &user_id,
            &request.current_password,
            &request.new_password,
        )?)
    })
    .await?;

    tracing::info!("Password changed successfully for user: {}", user.user_id);
    Ok(Json(SuccessBody::OK))
}

/// Always succeeds for a well-formed request, whether or not the email exists.
pub async fn reset_password(
    State(state): State<AppState>,
    payload: Result<Json<ResetPasswordRequest>, JsonRejection>,
) -> Result<Json<SuccessBody>, ApiError> {
    let Json(request) = payload?;
    if request.email.trim().is_empty() {
        return Err(ApiError::BadRequest("Email is required".to_string()));
    }

    if state.database.has_account(&request.email) {
        tracing::info!("Password reset email would be sent to: {}", request.email);
    } else {
        tracing::debug!("Password reset requested for unknown email");
    }
    Ok(Json(SuccessBody::OK))
}
