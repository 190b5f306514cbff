//! SportsBuddy Core Library
//!
//! Data model shared by the client sync layer and the backend functions:
//! per-user interaction records, profiles, events and the JSON bodies that
//! travel between them.

#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod event;
pub mod mode;
pub mod profile;
pub mod record;
pub mod wire;

pub use event::{EventLocation, EventUpdate, NewEvent, RequiredSkill, SportsEvent};
pub use mode::SessionMode;
pub use profile::{ProfileDetails, ProfileUpdate, SkillLevel, UserProfile, default_avatar_url};
pub use record::{AchievementId, EventId, MatchId, UserDataPatch, UserDataRecord};
