//! The client against an in-process backend, online and offline.

use std::sync::Arc;

use buddy_client::{
    BootstrapState, ClientConfig, FileStorage, MemoryStorage, RemoteFailure, SportsBuddy, Storage,
};
use buddy_core::{EventLocation, EventUpdate, NewEvent, RequiredSkill, SessionMode};
use chrono::NaiveDate;
use http::StatusCode;
use buddy_server::{AppState, handler::jwt::JwtManager, router, service::database::Database};

async fn spawn_server() -> String {
    let database = Database::new();
    database.seed_demo_accounts().unwrap();
    let state = AppState::new(database, JwtManager::new("integration-secret".to_string(), 1));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.unwrap();
    });
    format!("http://{addr}")
}

/// A base URL nothing listens on.
async fn dead_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

fn client(base_url: &str, storage: Arc<dyn Storage>) -> SportsBuddy {
    SportsBuddy::new(ClientConfig::with_base_url(base_url, "anon-key"), storage)
}

#[tokio::test]
async fn test_login_and_sync_against_backend() {
    let url = spawn_server().await;
    let mut laptop = client(&url, Arc::new(MemoryStorage::new()));

    assert_eq!(laptop.auth_mut().bootstrap().await, BootstrapState::Unauthenticated);
    assert!(laptop.auth_mut().login("john.doe@example.com", "password123").await);
    assert_eq!(laptop.auth().state(), BootstrapState::RemoteRestored);
    assert_eq!(laptop.context().mode(), SessionMode::RemoteBackend);

    let user_id = laptop.auth().user().unwrap().id.clone();
    assert!(laptop.user_data().join_event(&user_id, "evt-1").await);
    assert!(laptop.user_data().like_match(&user_id, "m-9").await);

    let remote = laptop.api().get_user_data(&user_id).await.unwrap();
    assert!(remote.has_joined_event("evt-1"));
    assert!(remote.has_liked_match("m-9"));
    assert_eq!(remote.revision, 2);
}

#[tokio::test]
async fn test_two_devices_converge() {
    let url = spawn_server().await;
    let mut laptop = client(&url, Arc::new(MemoryStorage::new()));
    let mut phone = client(&url, Arc::new(MemoryStorage::new()));
    assert!(laptop.auth_mut().login("john.doe@example.com", "password123").await);
    assert!(phone.auth_mut().login("john.doe@example.com", "password123").await);
    let user_id = laptop.auth().user().unwrap().id.clone();

    assert!(laptop.user_data().join_event(&user_id, "evt-1").await);
    assert!(phone.user_data().join_event(&user_id, "evt-2").await);
    assert!(laptop.user_data().unlock_achievement(&user_id, "first-event").await);

    let record = phone.user_data().load(&user_id).await;
    assert!(record.has_joined_event("evt-1"));
    assert!(record.has_joined_event("evt-2"));
    assert!(record.achievements.contains("first-event"));
}

#[tokio::test]
async fn test_session_survives_restart() {
    let url = spawn_server().await;
    let dir = tempfile::tempdir().unwrap();

    {
        let storage: Arc<dyn Storage> = Arc::new(FileStorage::open(dir.path()).unwrap());
        let mut first = client(&url, storage);
        assert!(first.auth_mut().login("admin@sportsbuddy.com", "admin123").await);
        let user_id = first.auth().user().unwrap().id.clone();
        assert!(first.user_data().join_event(&user_id, "evt-7").await);
    }

    let storage: Arc<dyn Storage> = Arc::new(FileStorage::open(dir.path()).unwrap());
    let mut second = client(&url, storage);
    assert_eq!(second.auth_mut().bootstrap().await, BootstrapState::RemoteRestored);
    let user = second.auth().user().unwrap().clone();
    assert!(user.is_admin);
    assert!(second.user_data().load(&user.id).await.has_joined_event("evt-7"));

    second.auth_mut().logout().await;
    assert_eq!(second.auth_mut().bootstrap().await, BootstrapState::Unauthenticated);
}

#[tokio::test]
async fn test_register_creates_remote_account() {
    let url = spawn_server().await;
    let mut buddy = client(&url, Arc::new(MemoryStorage::new()));

    assert!(buddy.auth_mut().register("new@example.com", "longpassword", "Newbie").await);
    assert_eq!(buddy.auth().state(), BootstrapState::RemoteRestored);
    assert_eq!(buddy.auth().user().unwrap().name, "Newbie");

    let mut again = client(&url, Arc::new(MemoryStorage::new()));
    assert!(!again.auth_mut().register("new@example.com", "longpassword", "Dup").await);
    assert_eq!(again.context().mode(), SessionMode::RemoteBackend);
}

#[tokio::test]
async fn test_offline_falls_back_to_mock_mode() {
    let url = dead_url().await;
    let storage = MemoryStorage::new();
    let mut buddy = client(&url, Arc::new(storage.clone()));

    assert_eq!(buddy.auth_mut().bootstrap().await, BootstrapState::Unauthenticated);
    assert!(buddy.auth_mut().login("demo@sportsbuddy.com", "demo123").await);
    assert_eq!(buddy.context().mode(), SessionMode::LocalMock);

    assert!(buddy.user_data().join_event("demo-user-1", "evt-1").await);
    assert!(buddy.user_data().pass_match("demo-user-1", "m-1").await);
    let record = buddy.user_data().load("demo-user-1").await;
    assert!(record.has_joined_event("evt-1"));
    assert!(record.has_passed_match("m-1"));

    let mut restarted = client(&url, Arc::new(storage));
    assert_eq!(restarted.auth_mut().bootstrap().await, BootstrapState::Unauthenticated);
    assert_eq!(restarted.context().mode(), SessionMode::RemoteBackend);
}

#[tokio::test]
async fn test_logout_while_offline_forgets_remote_session() {
    let url = spawn_server().await;
    let storage = MemoryStorage::new();
    let mut online = client(&url, Arc::new(storage.clone()));
    assert!(online.auth_mut().login("john.doe@example.com", "password123").await);

    let mut offline = client(&dead_url().await, Arc::new(storage.clone()));
    offline.auth_mut().bootstrap().await;
    assert_eq!(offline.context().mode(), SessionMode::LocalMock);
    offline.auth_mut().logout().await;

    let mut restarted = client(&url, Arc::new(storage));
    assert_eq!(restarted.auth_mut().bootstrap().await, BootstrapState::Unauthenticated);
}

#[tokio::test]
async fn test_change_and_reset_password() {
    let url = spawn_server().await;
    let mut buddy = client(&url, Arc::new(MemoryStorage::new()));
    assert!(buddy.auth_mut().register("pw@example.com", "first-password", "Pw").await);

    match buddy.api().change_password("not-the-password", "second-password").await {
        Err(RemoteFailure::Status { status, error }) => {
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(error, "Current password is incorrect");
        }
        unexpected => panic!("unexpected result: {unexpected:?}"),
    }
    buddy
        .api()
        .change_password("first-password", "second-password")
        .await
        .unwrap();
    buddy.auth_mut().logout().await;

    let mut again = client(&url, Arc::new(MemoryStorage::new()));
    assert!(again.auth_mut().login("pw@example.com", "second-password").await);
    assert_eq!(again.context().mode(), SessionMode::RemoteBackend);

    again.api().reset_password("pw@example.com").await.unwrap();
    again.api().reset_password("nobody@example.com").await.unwrap();
}

#[tokio::test]
async fn test_event_update_and_delete() {
    let url = spawn_server().await;
    let mut organizer = client(&url, Arc::new(MemoryStorage::new()));
    let mut other = client(&url, Arc::new(MemoryStorage::new()));
    assert!(organizer.auth_mut().login("john.doe@example.com", "password123").await);
    assert!(other.auth_mut().login("admin@sportsbuddy.com", "admin123").await);

    let input = NewEvent {
        title: "Evening Tennis".to_string(),
        description: String::new(),
        sport: "Tennis".to_string(),
        skill_level_required: RequiredSkill::Intermediate,
        date: NaiveDate::from_ymd_opt(2025, 7, 4).unwrap(),
        start_time: "18:00".to_string(),
        end_time: "19:30".to_string(),
        location: EventLocation {
            name: "City Courts".to_string(),
            ..Default::default()
        },
        max_participants: 4,
        is_public: true,
        tags: Vec::new(),
    };
    let event = organizer.api().create_event(&input).await.unwrap();

    let rename = EventUpdate {
        title: Some("Late Tennis".to_string()),
        ..Default::default()
    };
    match other.api().update_event(&event.id, &rename).await {
        Err(RemoteFailure::Status { status, .. }) => assert_eq!(status, StatusCode::FORBIDDEN),
        unexpected => panic!("unexpected result: {unexpected:?}"),
    }
    let updated = organizer.api().update_event(&event.id, &rename).await.unwrap();
    assert_eq!(updated.title, "Late Tennis");
    assert_eq!(updated.max_participants, 4);

    organizer.api().delete_event(&event.id).await.unwrap();
    match organizer.api().delete_event(&event.id).await {
        Err(RemoteFailure::Status { status, error }) => {
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(error, "Event not found");
        }
        unexpected => panic!("unexpected result: {unexpected:?}"),
    }
    assert!(organizer.api().list_events().await.unwrap().is_empty());
}
