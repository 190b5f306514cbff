//! Per-user interaction state and its idempotent mutations.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a sports event.
pub type EventId = String;

/// Identifier of a potential partner shown on the matching page.
pub type MatchId = String;

/// Identifier of an unlockable achievement.
pub type AchievementId = String;

/// Everything the application remembers about one user's interactions.
///
/// The record is always read and written as a whole. Two invariants hold after
/// every mutation in this module:
/// - every created event is also a joined event;
/// - a match id is never both liked and passed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDataRecord {
    #[serde(default)]
    pub events: BTreeSet<EventId>,
    #[serde(default)]
    pub liked_matches: BTreeSet<MatchId>,
    #[serde(default)]
    pub passed_matches: BTreeSet<MatchId>,
    /// Opaque conversation references, most relevant first.
    #[serde(default)]
    pub conversations: Vec<serde_json::Value>,
    #[serde(default)]
    pub created_events: BTreeSet<EventId>,
    #[serde(default)]
    pub achievements: BTreeSet<AchievementId>,
    pub last_updated: DateTime<Utc>,
    /// Bumped by one on every save; used to refuse stale remote writes.
    #[serde(default)]
    pub revision: u64,
}

impl Default for UserDataRecord {
    fn default() -> Self {
        Self::empty()
    }
}

impl UserDataRecord {
    /// A record with no interactions, stamped now.
    pub fn empty() -> Self {
        Self {
            events: BTreeSet::new(),
            liked_matches: BTreeSet::new(),
            passed_matches: BTreeSet::new(),
            conversations: Vec::new(),
            created_events: BTreeSet::new(),
            achievements: BTreeSet::new(),
            last_updated: Utc::now(),
            revision: 0,
        }
    }

    /// True when the record carries no interaction at all.
    pub fn is_blank(&self) -> bool {
        self.events.is_empty()
            && self.liked_matches.is_empty()
            && self.passed_matches.is_empty()
            && self.conversations.is_empty()
            && self.created_events.is_empty()
            && self.achievements.is_empty()
    }

    pub fn has_joined_event(&self, event_id: &str) -> bool {
        self.events.contains(event_id)
    }

    pub fn has_liked_match(&self, match_id: &str) -> bool {
        self.liked_matches.contains(match_id)
    }

    pub fn has_passed_match(&self, match_id: &str) -> bool {
        self.passed_matches.contains(match_id)
    }

    /// Adds the event to the joined set. Returns whether anything changed.
    pub fn join_event(&mut self, event_id: &str) -> bool {
        self.events.insert(event_id.to_string())
    }

    /// Removes the event from the joined set.
    ///
    /// Leaving an event also drops it from `created_events`.
    pub fn leave_event(&mut self, event_id: &str) -> bool {
        let left = self.events.remove(event_id);
        let uncreated = self.created_events.remove(event_id);
        left || uncreated
    }

    /// Records a like. A previously passed match moves over to the liked set.
    pub fn like_match(&mut self, match_id: &str) -> bool {
        let unpassed = self.passed_matches.remove(match_id);
        let liked = self.liked_matches.insert(match_id.to_string());
        liked || unpassed
    }

    /// Records a pass. A previously liked match moves over to the passed set.
    pub fn pass_match(&mut self, match_id: &str) -> bool {
        let unliked = self.liked_matches.remove(match_id);
        let passed = self.passed_matches.insert(match_id.to_string());
        passed || unliked
    }

    /// Forgets every passed match; liked matches are untouched.
    pub fn reset_passed_matches(&mut self) -> bool {
        if self.passed_matches.is_empty() {
            return false;
        }
        self.passed_matches.clear();
        true
    }

    /// Records the user as organizer of the event, which implies joining it.
    pub fn mark_event_created(&mut self, event_id: &str) -> bool {
        let created = self.created_events.insert(event_id.to_string());
        let joined = self.events.insert(event_id.to_string());
        created || joined
    }

    pub fn unlock_achievement(&mut self, achievement_id: &str) -> bool {
        self.achievements.insert(achievement_id.to_string())
    }

    /// Shallow-merges `patch` over this record, field by field.
    ///
    /// The merged record is normalized so the invariants still hold: created
    /// events are added to `events`, and liked matches win over passed ones.
    pub fn apply(&mut self, patch: UserDataPatch) {
        let UserDataPatch {
            events,
            liked_matches,
            passed_matches,
            conversations,
            created_events,
            achievements,
        } = patch;

        if let Some(events) = events {
            self.events = events;
        }
        if let Some(liked) = liked_matches {
            self.liked_matches = liked;
        }
        if let Some(passed) = passed_matches {
            self.passed_matches = passed;
        }
        if let Some(conversations) = conversations {
            self.conversations = conversations;
        }
        if let Some(created) = created_events {
            self.created_events = created;
        }
        if let Some(achievements) = achievements {
            self.achievements = achievements;
        }
        self.normalize();
    }

    /// Restores the set invariants after an arbitrary field replacement.
    pub fn normalize(&mut self) {
        self.events.extend(self.created_events.iter().cloned());
        let liked = &self.liked_matches;
        self.passed_matches.retain(|id| !liked.contains(id));
    }

    /// Stamps `last_updated`, never moving it backwards.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        if now > self.last_updated {
            self.last_updated = now;
        }
    }
}

/// Partial update for [`UserDataRecord`]; `None` fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDataPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<BTreeSet<EventId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liked_matches: Option<BTreeSet<MatchId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passed_matches: Option<BTreeSet<MatchId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversations: Option<Vec<serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_events: Option<BTreeSet<EventId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub achievements: Option<BTreeSet<AchievementId>>,
}

impl UserDataPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl From<UserDataRecord> for UserDataPatch {
    /// A patch that replaces every interaction field with the record's.
    fn from(record: UserDataRecord) -> Self {
        Self {
            events: Some(record.events),
            liked_matches: Some(record.liked_matches),
            passed_matches: Some(record.passed_matches),
            conversations: Some(record.conversations),
            created_events: Some(record.created_events),
            achievements: Some(record.achievements),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_join_event_idempotent() {
        let mut record = UserDataRecord::empty();
        assert!(record.join_event("evt-1"));
        assert!(!record.join_event("evt-1"));
        assert_eq!(record.events.len(), 1);
    }

    #[test]
    fn test_like_and_pass_never_overlap() {
        let mut record = UserDataRecord::empty();
        record.like_match("m1");
        record.pass_match("m1");
        record.pass_match("m2");
        record.like_match("m2");
        record.like_match("m3");

        assert!(record.liked_matches.is_disjoint(&record.passed_matches));
        assert!(record.has_passed_match("m1"));
        assert!(record.has_liked_match("m2"));
        assert!(record.has_liked_match("m3"));
    }

    #[test]
    fn test_mark_event_created_implies_join() {
        let mut record = UserDataRecord::empty();
        assert!(record.mark_event_created("evt-9"));
        assert!(record.has_joined_event("evt-9"));
        assert!(record.created_events.contains("evt-9"));
        assert!(!record.mark_event_created("evt-9"));
    }

    #[test]
    fn test_leave_created_event_keeps_subset() {
        let mut record = UserDataRecord::empty();
        record.mark_event_created("evt-2");
        assert!(record.leave_event("evt-2"));
        assert!(record.created_events.is_subset(&record.events));
        assert!(!record.leave_event("evt-2"));
    }

    #[test]
    fn test_reset_passed_keeps_liked() {
        let mut record = UserDataRecord::empty();
        record.like_match("a");
        record.pass_match("b");
        record.pass_match("c");

        assert!(record.reset_passed_matches());
        assert!(record.passed_matches.is_empty());
        assert_eq!(record.liked_matches, BTreeSet::from(["a".to_string()]));
        assert!(!record.reset_passed_matches());
    }

    #[test]
    fn test_apply_patch_normalizes() {
        let mut record = UserDataRecord::empty();
        record.join_event("evt-1");
        record.unlock_achievement("first-match");

        record.apply(UserDataPatch {
            created_events: Some(BTreeSet::from(["evt-7".to_string()])),
            liked_matches: Some(BTreeSet::from(["m1".to_string()])),
            passed_matches: Some(BTreeSet::from(["m1".to_string(), "m2".to_string()])),
            ..Default::default()
        });

        assert!(record.has_joined_event("evt-1"));
        assert!(record.has_joined_event("evt-7"));
        assert_eq!(record.passed_matches, BTreeSet::from(["m2".to_string()]));
        // Untouched fields survive the merge.
        assert!(record.achievements.contains("first-match"));
    }

    #[test]
    fn test_touch_is_monotonic() {
        let mut record = UserDataRecord::empty();
        let stamped = record.last_updated;
        record.touch(stamped - Duration::seconds(30));
        assert_eq!(record.last_updated, stamped);
        record.touch(stamped + Duration::seconds(30));
        assert!(record.last_updated > stamped);
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let mut record = UserDataRecord::empty();
        record.like_match("m1");
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("likedMatches").is_some());
        assert!(json.get("lastUpdated").is_some());

        // Older payloads without a revision still parse.
        let legacy = serde_json::json!({
            "events": ["e1"],
            "likedMatches": [],
            "passedMatches": [],
            "conversations": [],
            "createdEvents": [],
            "achievements": [],
            "lastUpdated": "2024-05-01T10:00:00.000Z"
        });
        let parsed: UserDataRecord = serde_json::from_value(legacy).unwrap();
        assert_eq!(parsed.revision, 0);
        assert!(parsed.has_joined_event("e1"));
    }
}
