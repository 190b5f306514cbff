//! SportsBuddy backend.
//!
//! Axum service behind the client sync layer: accounts and session tokens,
//! profiles, per-user interaction records and events, all held in memory.

#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod handler;
pub mod service;

use std::time::Duration;

use axum::{
    Router,
    routing::{get, post, put},
};
use http::{Method, header};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    handler::{account, auth, events, jwt::JwtManager, profile, user_data},
    service::database::Database,
};

pub use config::ServerConfig;
pub use error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub database: Database,
    pub jwt: JwtManager,
}

impl AppState {
    pub fn new(database: Database, jwt: JwtManager) -> Self {
        Self { database, jwt }
    }
}

/// Every endpoint, with CORS and request tracing.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .expose_headers([header::CONTENT_LENGTH])
        .max_age(Duration::from_secs(600));

    Router::new()
        .route("/health", get(handler::health))
        .route("/signup", post(account::signup))
        .route("/change-password", post(account::change_password))
        .route("/reset-password", post(account::reset_password))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route(
            "/profile",
            get(profile::get_profile).put(profile::update_profile),
        )
        .route("/user-data", put(user_data::put_user_data))
        .route("/user-data/{user_id}", get(user_data::get_user_data))
        .route(
            "/events",
            get(events::list_events).post(events::create_event),
        )
        .route(
            "/events/{id}",
            put(events::update_event).delete(events::delete_event),
        )
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use buddy_core::UserDataRecord;
    use http::{Request, StatusCode};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;

    fn state() -> AppState {
        AppState::new(
            Database::new(),
            JwtManager::new("test-secret".to_string(), 1),
        )
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    /// Signs up and logs in, returning (user id, token).
    async fn sign_up(app: &Router, email: &str) -> (String, String) {
        let (status, _) = send(
            app,
            Method::POST,
            "/signup",
            None,
            Some(json!({"email": email, "password": "password123", "name": "Tester"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, grant) = send(
            app,
            Method::POST,
            "/auth/login",
            None,
            Some(json!({"email": email, "password": "password123"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        (
            grant["userId"].as_str().unwrap().to_string(),
            grant["accessToken"].as_str().unwrap().to_string(),
        )
    }

    #[tokio::test]
    async fn test_health() {
        let app = router(state());
        let (status, body) = send(&app, Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn test_protected_endpoints_need_token() {
        let app = router(state());
        let (status, body) = send(&app, Method::GET, "/profile", Some("anon-key"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Unauthorized");

        let (status, _) = send(&app, Method::GET, "/events", None, None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_signup_validation() {
        let app = router(state());
        let (status, body) = send(
            &app,
            Method::POST,
            "/signup",
            None,
            Some(json!({"email": "a@b.c", "password": "short", "name": "A"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Password must be at least 8 characters");

        let (status, _) = send(&app, Method::POST, "/signup", None, Some(json!({"email": 1}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_login_profile_and_logout() {
        let app = router(state());
        let (user_id, token) = sign_up(&app, "pat@example.com").await;

        let (status, body) = send(&app, Method::GET, "/profile", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["profile"]["id"], user_id.as_str());

        let (status, body) = send(
            &app,
            Method::PUT,
            "/profile",
            Some(&token),
            Some(json!({"name": "Pat Renamed"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["profile"]["name"], "Pat Renamed");

        let (status, _) = send(&app, Method::POST, "/auth/logout", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, Method::GET, "/profile", Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_wrong_password_is_rejected() {
        let app = router(state());
        sign_up(&app, "pat@example.com").await;
        let (status, body) = send(
            &app,
            Method::POST,
            "/auth/login",
            None,
            Some(json!({"email": "pat@example.com", "password": "not-it"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid login credentials");
    }

    #[tokio::test]
    async fn test_user_data_roundtrip_and_conflict() {
        let app = router(state());
        let (user_id, token) = sign_up(&app, "pat@example.com").await;
        let uri = format!("/user-data/{user_id}");

        let (status, _) = send(&app, Method::GET, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let mut record = UserDataRecord::empty();
        record.join_event("evt-1");
        record.revision = 1;
        let put = json!({"userId": user_id, "userData": record});
        let (status, body) = send(&app, Method::PUT, "/user-data", Some(&token), Some(put.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true}));

        let (status, body) = send(&app, Method::GET, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["userData"]["events"], json!(["evt-1"]));
        assert_eq!(body["userData"]["revision"], 1);

        let (status, _) = send(&app, Method::PUT, "/user-data", Some(&token), Some(put)).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_user_data_is_private() {
        let app = router(state());
        let (owner, _) = sign_up(&app, "owner@example.com").await;
        let (_, intruder_token) = sign_up(&app, "intruder@example.com").await;

        let (status, _) = send(
            &app,
            Method::GET,
            &format!("/user-data/{owner}"),
            Some(&intruder_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let put = json!({"userId": owner, "userData": UserDataRecord::empty()});
        let (status, _) = send(&app, Method::PUT, "/user-data", Some(&intruder_token), Some(put)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_event_lifecycle() {
        let app = router(state());
        let (organizer, token) = sign_up(&app, "org@example.com").await;
        let (_, other_token) = sign_up(&app, "other@example.com").await;

        let new_event = json!({
            "title": "Sunday Run",
            "sport": "Running",
            "date": "2025-06-01",
            "startTime": "08:00",
            "endTime": "09:00",
            "location": {"name": "Park"},
            "maxParticipants": 20
        });
        let (status, body) = send(&app, Method::POST, "/events", Some(&token), Some(new_event)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["event"]["organizerId"], organizer.as_str());
        let id = body["event"]["id"].as_str().unwrap().to_string();
        let uri = format!("/events/{id}");

        let (status, _) = send(
            &app,
            Method::PUT,
            &uri,
            Some(&other_token),
            Some(json!({"title": "Hijacked"})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(
            &app,
            Method::PUT,
            &uri,
            Some(&token),
            Some(json!({"title": "Sunday Long Run"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["event"]["title"], "Sunday Long Run");

        let (_, body) = send(&app, Method::GET, "/events", None, None).await;
        assert_eq!(body["events"].as_array().unwrap().len(), 1);

        let (status, _) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Event not found");
    }

    #[tokio::test]
    async fn test_change_password() {
        let app = router(state());
        let (_, token) = sign_up(&app, "pat@example.com").await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/change-password",
            Some(&token),
            Some(json!({"currentPassword": "wrong-one", "newPassword": "brand-new-pass"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Current password is incorrect");

        let (status, _) = send(
            &app,
            Method::POST,
            "/change-password",
            Some(&token),
            Some(json!({"currentPassword": "password123", "newPassword": "brand-new-pass"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(
            &app,
            Method::POST,
            "/auth/login",
            None,
            Some(json!({"email": "pat@example.com", "password": "brand-new-pass"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_reset_password_never_reveals_accounts() {
        let app = router(state());
        let (status, body) = send(
            &app,
            Method::POST,
            "/reset-password",
            None,
            Some(json!({"email": "nobody@example.com"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true}));
    }
}
