pub mod account;
pub mod auth;
pub mod events;
pub mod jwt;
pub mod profile;
pub mod user_data;

use axum::Json;
use buddy_core::wire::HealthBody;

use crate::error::ApiError;

/// Runs `work` on the blocking pool. Password hashing goes through here.
pub(crate) async fn run_blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::Internal(format!("blocking task failed: {e}")))?
}

pub async fn health() -> Json<HealthBody> {
    Json(HealthBody {
        status: "ok".to_string(),
    })
}
