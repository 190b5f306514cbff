//! Per-user copy of [`UserDataRecord`] in local storage.

use std::sync::Arc;

use buddy_core::UserDataRecord;
use chrono::Utc;

use crate::{
    error::StorageError,
    storage::{Storage, load_json, save_json},
};

const USER_DATA_KEY_PREFIX: &str = "sportsbuddy_user_data_";

#[derive(Clone)]
pub struct LocalCache {
    storage: Arc<dyn Storage>,
}

impl LocalCache {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub fn key_for(user_id: &str) -> String {
        format!("{USER_DATA_KEY_PREFIX}{user_id}")
    }

    /// The cached record, or `None` when absent or corrupted.
    pub fn read(&self, user_id: &str) -> Option<UserDataRecord> {
        load_json(self.storage.as_ref(), &Self::key_for(user_id))
    }

    /// Stamps `last_updated` and persists the record.
    pub fn write(&self, user_id: &str, record: &mut UserDataRecord) -> Result<(), StorageError> {
        record.touch(Utc::now());
        save_json(self.storage.as_ref(), &Self::key_for(user_id), record)
    }

    pub fn clear(&self, user_id: &str) -> Result<(), StorageError> {
        self.storage.remove_item(&Self::key_for(user_id))
    }
}
