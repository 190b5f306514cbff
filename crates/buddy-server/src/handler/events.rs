use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use buddy_core::{
    EventUpdate, NewEvent,
    wire::{EventEnvelope, EventsEnvelope, SuccessBody},
};

use super::jwt::AuthenticatedUser;
use crate::{AppState, error::ApiError};

pub async fn list_events(State(state): State<AppState>) -> Json<EventsEnvelope> {
    Json(EventsEnvelope {
        events: state.database.list_events(),
    })
}

pub async fn create_event(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    payload: Result<Json<NewEvent>, JsonRejection>,
) -> Result<Json<EventEnvelope>, ApiError> {
    let Json(input) = payload?;
    if input.title.trim().is_empty() || input.sport.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Title and sport are required".to_string(),
        ));
    }
    if input.max_participants == 0 {
        return Err(ApiError::BadRequest(
            "maxParticipants must be at least 1".to_string(),
        ));
    }

    let event = state.database.create_event(&user.user_id, input);
    tracing::info!("Event created: {}", event.id);
    Ok(Json(EventEnvelope { event }))
}

pub async fn update_event(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(event_id): Path<String>,
    payload: Result<Json<EventUpdate>, JsonRejection>,
) -> Result<Json<EventEnvelope>, ApiError> {
    let Json(update) = payload?;
    let event = state
        .database
        .update_event(&user.user_id, &event_id, update)?;
    tracing::info!("Event updated: {event_id}");
    Ok(Json(EventEnvelope { event }))
}

pub async fn delete_event(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(event_id): Path<String>,
) -> Result<Json<SuccessBody>, ApiError> {
    state.database.delete_event(&user.user_id, &event_id)?;
    tracing::info!("Event deleted: {event_id}");
    Ok(Json(SuccessBody::OK))
}
