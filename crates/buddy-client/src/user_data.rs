//! User Data Reconciliation Service.
//!
//! Reads go remote-first, then local cache, then an empty record. Writes go to
//! the local cache first; that write decides the result, and the remote copy is
//! updated on a best-effort basis afterwards.
//!
//! The service keeps the last record it loaded or saved per user in memory;
//! clones share that copy.

use std::{collections::HashMap, sync::Arc};

use buddy_core::{UserDataPatch, UserDataRecord};
use http::StatusCode;
use parking_lot::RwLock;

use crate::{api::BackendApi, cache::LocalCache, context::ClientContext, remote::RemoteFailure};

#[derive(Clone)]
pub struct UserDataService {
    context: ClientContext,
    api: BackendApi,
    cache: LocalCache,
    current: Arc<RwLock<HashMap<String, UserDataRecord>>>,
}

impl UserDataService {
    pub fn new(context: ClientContext, api: BackendApi, cache: LocalCache) -> Self {
        Self {
            context,
            api,
            cache,
            current: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn cache(&self) -> &LocalCache {
        &self.cache
    }

    /// The in-memory record for `user_id` as of the last load or save.
    pub fn current(&self, user_id: &str) -> Option<UserDataRecord> {
        self.current.read().get(user_id).cloned()
    }

    fn remember(&self, user_id: &str, record: &UserDataRecord) {
        self.current
            .write()
            .insert(user_id.to_string(), record.clone());
    }

    /// The freshest record available for `user_id`. Never fails.
    ///
    /// A newly built empty record is not persisted until the next save.
    pub async fn load(&self, user_id: &str) -> UserDataRecord {
        let record = self.fetch(user_id).await;
        self.remember(user_id, &record);
        record
    }

    async fn fetch(&self, user_id: &str) -> UserDataRecord {
        if self.context.is_remote() {
            match self.api.get_user_data(user_id).await {
                Ok(remote) => return self.adopt_remote(user_id, remote),
                Err(err) => {
                    tracing::debug!("Loading user data for {user_id} remotely failed, using local cache: {err}");
                }
            }
        }

        if let Some(local) = self.cache.read(user_id) {
            return local;
        }
        UserDataRecord::empty()
    }

    /// Mirrors a remote record into the cache unless the cache is ahead of it.
    fn adopt_remote(&self, user_id: &str, mut remote: UserDataRecord) -> UserDataRecord {
        if let Some(local) = self.cache.read(user_id)
            && local.revision > remote.revision
        {
            tracing::debug!(
                "Remote user data for {user_id} is stale (revision {} < {}), keeping local copy",
                remote.revision,
                local.revision
            );
            return local;
        }

        remote.normalize();
        if let Err(err) = self.cache.write(user_id, &mut remote) {
            tracing::warn!("Failed to cache remote user data for {user_id}: {err}");
        }
        remote
    }

    /// Merges `patch` over the current record and persists it.
    ///
    /// Returns whether the local write succeeded; the remote sync outcome is
    /// only logged.
    pub async fn save(&self, user_id: &str, patch: UserDataPatch) -> bool {
        let mut record = self.load(user_id).await;
        record.apply(patch);
        record.revision += 1;

        if let Err(err) = self.cache.write(user_id, &mut record) {
            tracing::error!("Error saving user data for {user_id}: {err}");
            return false;
        }
        self.remember(user_id, &record);

        if !self.context.is_remote() {
            return true;
        }
        match self.api.put_user_data(user_id, &record).await {
            Ok(()) => tracing::debug!("User data for {user_id} synced to backend"),
            Err(RemoteFailure::Status { status, .. }) if status == StatusCode::CONFLICT => {
                tracing::debug!(
                    "Backend holds newer user data for {user_id}, revision {} saved locally only",
                    record.revision
                );
            }
            Err(err) => tracing::debug!("Backend sync failed, data saved locally only: {err}"),
        }
        true
    }

    /// Loads, applies `mutation`, and saves when it reports a change.
    async fn mutate(&self, user_id: &str, mutation: impl FnOnce(&mut UserDataRecord) -> bool) -> bool {
        let mut record = self.load(user_id).await;
        if !mutation(&mut record) {
            return true;
        }
        self.save(user_id, UserDataPatch::from(record)).await
    }

    pub async fn join_event(&self, user_id: &str, event_id: &str) -> bool {
        self.mutate(user_id, |record| record.join_event(event_id)).await
    }

    pub async fn leave_event(&self, user_id: &str, event_id: &str) -> bool {
        self.mutate(user_id, |record| record.leave_event(event_id)).await
    }

    pub async fn like_match(&self, user_id: &str, match_id: &str) -> bool {
        self.mutate(user_id, |record| record.like_match(match_id)).await
    }

    pub async fn pass_match(&self, user_id: &str, match_id: &str) -> bool {
        self.mutate(user_id, |record| record.pass_match(match_id)).await
    }

    pub async fn reset_passed_matches(&self, user_id: &str) -> bool {
        self.mutate(user_id, UserDataRecord::reset_passed_matches).await
    }

    /// Records `event_id` as created by the user, which also joins it.
    pub async fn mark_event_created(&self, user_id: &str, event_id: &str) -> bool {
        self.mutate(user_id, |record| record.mark_event_created(event_id)).await
    }

    pub async fn unlock_achievement(&self, user_id: &str, achievement_id: &str) -> bool {
        self.mutate(user_id, |record| record.unlock_achievement(achievement_id))
            .await
    }

    /// Drops the local and in-memory copies. The remote copy is kept.
    pub fn clear(&self, user_id: &str) {
        self.current.write().remove(user_id);
        if let Err(err) = self.cache.clear(user_id) {
            tracing::error!("Error clearing user data for {user_id}: {err}");
        }
    }
}
