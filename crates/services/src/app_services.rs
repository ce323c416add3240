use std::sync::Arc;

use levelup_core::model::UserId;
use storage::repository::Storage;

use crate::error::AppServicesError;
use crate::progression_service::ProgressionService;
use crate::{Clock, RewardSource};

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    progression: Arc<ProgressionService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// When `user_id` is given and the stored progress still belongs to the
    /// guest, the id is persisted.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or the user id
    /// write fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        user_id: Option<UserId>,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Self::from_storage(&storage, clock, RewardSource::Random, user_id).await
    }

    /// Build services over an existing storage backend.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the user id cannot be read or written.
    pub async fn from_storage(
        storage: &Storage,
        clock: Clock,
        rewards: RewardSource,
        user_id: Option<UserId>,
    ) -> Result<Self, AppServicesError> {
        let progression =
            ProgressionService::new(clock, Arc::clone(&storage.kv)).with_rewards(rewards);

        if let Some(user_id) = user_id {
            let mut progress = progression.load().await?;
            progression.claim_user_id(&mut progress, user_id).await?;
        }

        Ok(Self {
            progression: Arc::new(progression),
        })
    }

    #[must_use]
    pub fn progression(&self) -> Arc<ProgressionService> {
        Arc::clone(&self.progression)
    }
}
