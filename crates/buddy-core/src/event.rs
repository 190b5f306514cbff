//! Sports events as stored by the backend.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Skill a participant needs, or `any`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequiredSkill {
    #[default]
    Any,
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventLocation {
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city_id: String,
    #[serde(default)]
    pub area_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SportsEvent {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub sport: String,
    #[serde(default)]
    pub skill_level_required: RequiredSkill,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub location: EventLocation,
    pub max_participants: u32,
    #[serde(default)]
    pub current_participants: Vec<String>,
    pub organizer_id: String,
    #[serde(default = "default_public")]
    pub is_public: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_public() -> bool {
    true
}

impl SportsEvent {
    /// Materializes a new event; the organizer starts as the only participant.
    pub fn create(id: String, organizer_id: String, input: NewEvent, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: input.title,
            description: input.description,
            sport: input.sport,
            skill_level_required: input.skill_level_required,
            date: input.date,
            start_time: input.start_time,
            end_time: input.end_time,
            location: input.location,
            max_participants: input.max_participants,
            current_participants: vec![organizer_id.clone()],
            organizer_id,
            is_public: input.is_public,
            tags: input.tags,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies the fields present in `update`; id and organizer are fixed.
    pub fn apply(&mut self, update: EventUpdate, now: DateTime<Utc>) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(sport) = update.sport {
            self.sport = sport;
        }
        if let Some(skill) = update.skill_level_required {
            self.skill_level_required = skill;
        }
        if let Some(date) = update.date {
            self.date = date;
        }
        if let Some(start_time) = update.start_time {
            self.start_time = start_time;
        }
        if let Some(end_time) = update.end_time {
            self.end_time = end_time;
        }
        if let Some(location) = update.location {
            self.location = location;
        }
        if let Some(max) = update.max_participants {
            self.max_participants = max;
        }
        if let Some(is_public) = update.is_public {
            self.is_public = is_public;
        }
        if let Some(tags) = update.tags {
            self.tags = tags;
        }
        self.updated_at = now;
    }
}

/// Body of `POST /events`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub sport: String,
    #[serde(default)]
    pub skill_level_required: RequiredSkill,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub location: EventLocation,
    pub max_participants: u32,
    #[serde(default = "default_public")]
    pub is_public: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Body of `PUT /events/:id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sport: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_level_required: Option<RequiredSkill>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<EventLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_participants: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}
