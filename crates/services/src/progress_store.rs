use std::sync::Arc;

use chrono::NaiveDate;
use levelup_core::model::{DailyRefresh, LevelUp, SignInOutcome, UserProgress};
use serde::Serialize;

use crate::error::ProgressionServiceError;
use crate::progression_service::ProgressionService;

/// Flat, UI-ready copy of the current progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressSnapshot {
    pub user_id: String,
    pub level: u32,
    pub experience: u64,
    pub experience_to_next_level: u64,
    pub level_progress: u8,
    pub is_signed_today: bool,
    pub total_sign_days: u32,
    pub last_sign_date: Option<NaiveDate>,
}

impl From<&UserProgress> for ProgressSnapshot {
    fn from(progress: &UserProgress) -> Self {
        let sign_in = progress.sign_in();
        Self {
            user_id: progress.user_id().to_string(),
            level: progress.level(),
            experience: progress.experience(),
            experience_to_next_level: progress.experience_to_next_level(),
            level_progress: progress.level_progress_percent(),
            is_signed_today: sign_in.is_signed_today(),
            total_sign_days: sign_in.total_sign_days(),
            last_sign_date: sign_in.last_sign_date(),
        }
    }
}

/// The progress state owned by the UI, paired with the service that mutates it.
///
/// `do_sign` and `init_sign` are the two actions the view layer binds to.
#[derive(Clone)]
pub struct ProgressStore {
    service: Arc<ProgressionService>,
    progress: UserProgress,
}

impl ProgressStore {
    /// Hydrate a store from persisted progress.
    ///
    /// # Errors
    ///
    /// Returns `ProgressionServiceError` if the persisted state cannot be read.
    pub async fn open(service: Arc<ProgressionService>) -> Result<Self, ProgressionServiceError> {
        let progress = service.load().await?;
        Ok(Self { service, progress })
    }

    #[must_use]
    pub fn progress(&self) -> &UserProgress {
        &self.progress
    }

    #[must_use]
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot::from(&self.progress)
    }

    /// Percentage of the way to the next level.
    #[must_use]
    pub fn level_progress(&self) -> u8 {
        self.progress.level_progress_percent()
    }

    /// Sign in for today.
    ///
    /// # Errors
    ///
    /// Returns `ProgressionServiceError` if persistence fails.
    pub async fn do_sign(&mut self) -> Result<SignInOutcome, ProgressionServiceError> {
        self.service.record_sign_in(&mut self.progress).await
    }

    /// Refresh the daily sign-in flag; call once when the page loads.
    ///
    /// # Errors
    ///
    /// Returns `ProgressionServiceError` if persistence fails.
    pub async fn init_sign(&mut self) -> Result<DailyRefresh, ProgressionServiceError> {
        self.service.refresh_daily_state(&mut self.progress).await
    }

    /// Grant experience from some other activity.
    ///
    /// # Errors
    ///
    /// Returns `ProgressionServiceError` if persistence fails.
    pub async fn award(&mut self, amount: u32) -> Result<LevelUp, ProgressionServiceError> {
        self.service
            .award_experience(&mut self.progress, amount)
            .await
    }

    /// Grant experience given as a signed number; negatives are rejected.
    ///
    /// # Errors
    ///
    /// Returns `ProgressionServiceError::InvalidAward` for negative or
    /// oversized amounts, or a storage error if persistence fails.
    pub async fn try_award(&mut self, amount: i64) -> Result<LevelUp, ProgressionServiceError> {
        self.service
            .try_award_experience(&mut self.progress, amount)
            .await
    }
}
