use std::{collections::HashMap, sync::Arc};

use buddy_core::{
    EventUpdate, NewEvent, ProfileDetails, ProfileUpdate, SkillLevel, SportsEvent,
    UserDataRecord, UserProfile,
};
use chrono::{DateTime, Utc};
use http::StatusCode;
use parking_lot::RwLock;
use rand::{Rng, distr::Alphanumeric};
use thiserror::Error;

use super::password::{hash_password, verify_password};

/// Login credentials of one account, keyed by normalized email.
#[derive(Debug, Clone)]
struct Account {
    user_id: String,
    password_hash: String,
}

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("User already registered")]
    EmailTaken,

    #[error("Invalid login credentials")]
    InvalidCredentials,

    #[error("Current password is incorrect")]
    IncorrectPassword,

    #[error("Profile not found")]
    ProfileNotFound,

    #[error("User data not found")]
    UserDataNotFound,

    #[error("Event not found")]
    EventNotFound,

    #[error("Only the organizer can modify this event")]
    NotOrganizer,

    #[error("Stale user data: revision {incoming} is not newer than {stored}")]
    StaleRevision { stored: u64, incoming: u64 },

    #[error("{0}")]
    PasswordHash(String),
}

impl DatabaseError {
    pub fn status(&self) -> StatusCode {
        match self {
            DatabaseError::EmailTaken
            | DatabaseError::InvalidCredentials
            | DatabaseError::IncorrectPassword => StatusCode::BAD_REQUEST,
            DatabaseError::ProfileNotFound
            | DatabaseError::UserDataNotFound
            | DatabaseError::EventNotFound => StatusCode::NOT_FOUND,
            DatabaseError::NotOrganizer => StatusCode::FORBIDDEN,
            DatabaseError::StaleRevision { .. } => StatusCode::CONFLICT,
            DatabaseError::PasswordHash(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// In-memory store behind every endpoint. Clones share the same tables.
#[derive(Clone, Default)]
pub struct Database {
    accounts: Arc<RwLock<HashMap<String, Account>>>,
    profiles: Arc<RwLock<HashMap<String, UserProfile>>>,
    user_data: Arc<RwLock<HashMap<String, UserDataRecord>>>,
    events: Arc<RwLock<HashMap<String, SportsEvent>>>,
    /// Signed-out tokens and when they would have expired.
    revoked_tokens: Arc<RwLock<HashMap<String, DateTime<Utc>>>>,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the two demo accounts unless they already exist.
    pub fn seed_demo_accounts(&self) -> Result<(), DatabaseError> {
        let demo = [
            ("john.doe@example.com", "password123", "John Doe", false),
            ("admin@sportsbuddy.com", "admin123", "Admin User", true),
        ];

        for (email, password, name, is_admin) in demo {
            let mut profile = match self.create_account(email, password, name) {
                Ok(profile) => profile,
                Err(DatabaseError::EmailTaken) => continue,
                Err(err) => return Err(err),
            };
            profile.is_admin = is_admin;
            profile.profile = ProfileDetails {
                bio: if is_admin {
                    "System Administrator".to_string()
                } else {
                    "Sports enthusiast".to_string()
                },
                location: "New York, NY".to_string(),
                preferred_sports: vec!["Basketball".to_string(), "Soccer".to_string()],
                skill_levels: [
                    ("Basketball".to_string(), SkillLevel::Intermediate),
                    ("Soccer".to_string(), SkillLevel::Intermediate),
                ]
                .into(),
                availability: vec!["weekday-evening".to_string(), "weekend-morning".to_string()],
                ..Default::default()
            };
            self.profiles.write().insert(profile.id.clone(), profile);
            tracing::info!("Demo account created: {email}");
        }
        Ok(())
    }

    /// Registers an account with an empty profile.
    pub fn create_account(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<UserProfile, DatabaseError> {
        let key = normalize_email(email);
        if self.accounts.read().contains_key(&key) {
            return Err(DatabaseError::EmailTaken);
        }
        let password_hash = hash_password(password)?;

        let user_id = uuid::Uuid::new_v4().to_string();
        {
            let mut accounts = self.accounts.write();
            if accounts.contains_key(&key) {
                return Err(DatabaseError::EmailTaken);
            }
            accounts.insert(
                key.clone(),
                Account {
                    user_id: user_id.clone(),
                    password_hash,
                },
            );
        }

        let profile = UserProfile::new(user_id.clone(), key, name);
        self.profiles.write().insert(user_id, profile.clone());
        Ok(profile)
    }

    /// Returns the user id owning `email` if `password` matches.
    pub fn verify_credentials(&self, email: &str, password: &str) -> Result<String, DatabaseError> {
        let account = self
            .accounts
            .read()
            .get(&normalize_email(email))
            .cloned()
            .ok_or(DatabaseError::InvalidCredentials)?;

        if verify_password(password, &account.password_hash)? {
            Ok(account.user_id)
        } else {
            Err(DatabaseError::InvalidCredentials)
        }
    }

    pub fn change_password(
        &self,
        user_id: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), DatabaseError> {
        let email = self.get_profile(user_id)?.email;
        let key = normalize_email(&email);
        let current_hash = self
            .accounts
            .read()
            .get(&key)
            .map(|account| account.password_hash.clone())
            .ok_or(DatabaseError::ProfileNotFound)?;

        if !verify_password(current_password, &current_hash)? {
            return Err(DatabaseError::IncorrectPassword);
        }
        let new_hash = hash_password(new_password)?;

        let mut accounts = self.accounts.write();
        let account = accounts.get_mut(&key).ok_or(DatabaseError::ProfileNotFound)?;
        account.password_hash = new_hash;
        Ok(())
    }

    pub fn has_account(&self, email: &str) -> bool {
        self.accounts.read().contains_key(&normalize_email(email))
    }

    pub fn get_profile(&self, user_id: &str) -> Result<UserProfile, DatabaseError> {
        self.profiles
            .read()
            .get(user_id)
            .cloned()
            .ok_or(DatabaseError::ProfileNotFound)
    }

    pub fn update_profile(
        &self,
        user_id: &str,
        update: ProfileUpdate,
    ) -> Result<UserProfile, DatabaseError> {
        let mut profiles = self.profiles.write();
        let profile = profiles
            .get_mut(user_id)
            .ok_or(DatabaseError::ProfileNotFound)?;
        profile.apply(update);
        profile.updated_at = Some(Utc::now());
        Ok(profile.clone())
    }

    pub fn get_user_data(&self, user_id: &str) -> Result<UserDataRecord, DatabaseError> {
        self.user_data
            .read()
            .get(user_id)
            .cloned()
            .ok_or(DatabaseError::UserDataNotFound)
    }

    /// Stores `record` unless the stored copy has the same or a newer revision.
    pub fn put_user_data(
        &self,
        user_id: &str,
        mut record: UserDataRecord,
    ) -> Result<(), DatabaseError> {
        let mut user_data = self.user_data.write();
        if let Some(stored) = user_data.get(user_id)
            && record.revision <= stored.revision
        {
            return Err(DatabaseError::StaleRevision {
                stored: stored.revision,
                incoming: record.revision,
            });
        }
        record.normalize();
        user_data.insert(user_id.to_string(), record);
        Ok(())
    }

    /// Every event, ordered by date and start time.
    pub fn list_events(&self) -> Vec<SportsEvent> {
        let mut events: Vec<SportsEvent> = self.events.read().values().cloned().collect();
        events.sort_by(|a, b| {
            (a.date, &a.start_time, &a.id).cmp(&(b.date, &b.start_time, &b.id))
        });
        events
    }

    pub fn create_event(&self, organizer_id: &str, input: NewEvent) -> SportsEvent {
        let suffix: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(9)
            .map(|b| char::from(b).to_ascii_lowercase())
            .collect();
        let now = Utc::now();
        let id = format!("{}-{suffix}", now.timestamp_millis());

        let event = SportsEvent::create(id, organizer_id.to_string(), input, now);
        self.events.write().insert(event.id.clone(), event.clone());
        event
    }

    pub fn update_event(
        &self,
        user_id: &str,
        event_id: &str,
        update: EventUpdate,
    ) -> Result<SportsEvent, DatabaseError> {
        let mut events = self.events.write();
        let Some(event) = events.get_mut(event_id) else {
            return Err(DatabaseError::EventNotFound);
        };
        if event.organizer_id != user_id {
            return Err(DatabaseError::NotOrganizer);
        }
        event.apply(update, Utc::now());
        Ok(event.clone())
    }

    pub fn delete_event(&self, user_id: &str, event_id: &str) -> Result<(), DatabaseError> {
        let mut events = self.events.write();
        let Some(event) = events.get(event_id) else {
            return Err(DatabaseError::EventNotFound);
        };
        if event.organizer_id != user_id {
            return Err(DatabaseError::NotOrganizer);
        }
        events.remove(event_id);
        Ok(())
    }

    /// Refuses `token` until `expires_at`. Tokens past their expiry are
    /// dropped from the list, the signature check rejects them anyway.
    pub fn revoke_token(&self, token: &str, expires_at: DateTime<Utc>) {
        let now = Utc::now();
        let mut revoked = self.revoked_tokens.write();
        revoked.retain(|_, expiry| *expiry > now);
        revoked.insert(token.to_string(), expires_at);
    }

    pub fn is_token_revoked(&self, token: &str) -> bool {
        self.revoked_tokens.read().contains_key(token)
    }
}

#[cfg(test)]
mod tests {
    use buddy_core::EventLocation;
    use chrono::NaiveDate;

    use super::*;

    fn new_event(title: &str) -> NewEvent {
        NewEvent {
            title: title.to_string(),
            description: String::new(),
            sport: "Tennis".to_string(),
            skill_level_required: Default::default(),
            date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            start_time: "09:00".to_string(),
            end_time: "10:00".to_string(),
            location: EventLocation {
                name: "Court 3".to_string(),
                ..Default::default()
            },
            max_participants: 4,
            is_public: true,
            tags: Vec::new(),
        }
    }

    #[test]
    fn test_create_account_and_login() {
        let db = Database::new();
        let profile = db.create_account("Pat@Example.com", "password123", "Pat").unwrap();
        assert_eq!(profile.email, "pat@example.com");

        assert_eq!(
            db.verify_credentials("pat@example.com", "password123").unwrap(),
            profile.id
        );
        assert!(matches!(
            db.verify_credentials("pat@example.com", "nope"),
            Err(DatabaseError::InvalidCredentials)
        ));
        assert!(matches!(
            db.create_account("pat@example.com", "password123", "Pat"),
            Err(DatabaseError::EmailTaken)
        ));
    }

    #[test]
    fn test_seed_is_idempotent() {
        let db = Database::new();
        db.seed_demo_accounts().unwrap();
        db.seed_demo_accounts().unwrap();

        let admin_id = db.verify_credentials("admin@sportsbuddy.com", "admin123").unwrap();
        assert!(db.get_profile(&admin_id).unwrap().is_admin);
        assert!(db.has_account("john.doe@example.com"));
    }

    #[test]
    fn test_change_password() {
        let db = Database::new();
        let profile = db.create_account("sam@example.com", "password123", "Sam").unwrap();

        assert!(matches!(
            db.change_password(&profile.id, "wrong-pass", "newpassword1"),
            Err(DatabaseError::IncorrectPassword)
        ));
        db.change_password(&profile.id, "password123", "newpassword1").unwrap();
        assert!(db.verify_credentials("sam@example.com", "newpassword1").is_ok());
    }

    #[test]
    fn test_user_data_revision_check() {
        let db = Database::new();
        assert!(matches!(
            db.get_user_data("u1"),
            Err(DatabaseError::UserDataNotFound)
        ));

        let mut record = UserDataRecord::empty();
        record.revision = 2;
        db.put_user_data("u1", record.clone()).unwrap();

        let err = db.put_user_data("u1", record.clone()).unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);

        record.revision = 3;
        record.join_event("evt-1");
        db.put_user_data("u1", record).unwrap();
        assert!(db.get_user_data("u1").unwrap().has_joined_event("evt-1"));
    }

    #[test]
    fn test_only_organizer_modifies_event() {
        let db = Database::new();
        let event = db.create_event("org", new_event("Doubles"));
        assert_eq!(event.current_participants, vec!["org".to_string()]);

        let update = EventUpdate {
            title: Some("Singles".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            db.update_event("someone-else", &event.id, update.clone()),
            Err(DatabaseError::NotOrganizer)
        ));
        assert_eq!(
            db.update_event("org", &event.id, update).unwrap().title,
            "Singles"
        );

        assert!(matches!(
            db.delete_event("someone-else", &event.id),
            Err(DatabaseError::NotOrganizer)
        ));
        db.delete_event("org", &event.id).unwrap();
        assert!(matches!(
            db.delete_event("org", &event.id),
            Err(DatabaseError::EventNotFound)
        ));
    }

    #[test]
    fn test_list_events_sorted() {
        let db = Database::new();
        let mut later = new_event("Later");
        later.date = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        db.create_event("org", later);
        db.create_event("org", new_event("Sooner"));

        let titles: Vec<_> = db.list_events().into_iter().map(|e| e.title).collect();
        assert_eq!(titles, vec!["Sooner", "Later"]);
    }

    #[test]
    fn test_revoked_tokens_are_pruned_after_expiry() {
        let db = Database::new();
        db.revoke_token("old", Utc::now() - chrono::Duration::minutes(5));
        assert!(db.is_token_revoked("old"));

        db.revoke_token("fresh", Utc::now() + chrono::Duration::hours(1));
        assert!(!db.is_token_revoked("old"));
        assert!(db.is_token_revoked("fresh"));
        assert_eq!(db.revoked_tokens.read().len(), 1);
    }
}
