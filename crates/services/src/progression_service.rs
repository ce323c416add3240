use std::sync::Arc;

use levelup_core::model::{
    DailyRefresh, LevelUp, ProgressField, SignInOutcome, UserId, UserProgress, validate_award,
};
use storage::progress_record::{load_progress, save_fields};
use storage::repository::KeyValueStore;
use tracing::{debug, info};

use crate::error::ProgressionServiceError;
use crate::{Clock, RewardSource};

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// Applies progression operations to a caller-owned `UserProgress` and
/// mirrors the changed fields into the key-value store.
///
/// The in-memory value is updated before the store is written, so on a
/// storage error the caller still holds the new state.
#[derive(Clone)]
pub struct ProgressionService {
    clock: Clock,
    rewards: RewardSource,
    store: Arc<dyn KeyValueStore>,
}

impl ProgressionService {
    #[must_use]
    pub fn new(clock: Clock, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            clock,
            rewards: RewardSource::default(),
            store,
        }
    }

    /// Override the reward source (usually for deterministic testing).
    #[must_use]
    pub fn with_rewards(mut self, rewards: RewardSource) -> Self {
        self.rewards = rewards;
        self
    }

    /// Hydrate progress from the store, falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns `ProgressionServiceError::Storage` if the store cannot be read.
    pub async fn load(&self) -> Result<UserProgress, ProgressionServiceError> {
        let progress = load_progress(self.store.as_ref()).await?;
        debug!(
            user_id = %progress.user_id(),
            level = progress.level(),
            experience = progress.experience(),
            "hydrated progress"
        );
        Ok(progress)
    }

    /// Adopt `user_id` when the stored progress still belongs to the guest.
    ///
    /// Returns `true` if the id was changed and persisted.
    ///
    /// # Errors
    ///
    /// Returns `ProgressionServiceError::Storage` if the id cannot be written.
    pub async fn claim_user_id(
        &self,
        progress: &mut UserProgress,
        user_id: UserId,
    ) -> Result<bool, ProgressionServiceError> {
        if !progress.user_id().is_guest() || user_id.is_guest() {
            return Ok(false);
        }
        progress.set_user_id(user_id);
        self.persist(progress, &[ProgressField::UserId]).await?;
        Ok(true)
    }

    /// Add experience, leveling up as many times as it pays for.
    ///
    /// # Errors
    ///
    /// Returns `ProgressionServiceError::Storage` if level or experience
    /// cannot be written.
    pub async fn award_experience(
        &self,
        progress: &mut UserProgress,
        amount: u32,
    ) -> Result<LevelUp, ProgressionServiceError> {
        let award = progress.award_experience(amount);
        log_level_up(progress, &award);
        self.persist(progress, ProgressField::AWARD).await?;
        Ok(award)
    }

    /// Like `award_experience`, for amounts that arrive as signed numbers.
    ///
    /// # Errors
    ///
    /// Returns `ProgressionServiceError::InvalidAward` for negative or
    /// oversized amounts, leaving `progress` untouched.
    pub async fn try_award_experience(
        &self,
        progress: &mut UserProgress,
        amount: i64,
    ) -> Result<LevelUp, ProgressionServiceError> {
        let amount = validate_award(amount)?;
        self.award_experience(progress, amount).await
    }

    /// Sign in for today. A second call on the same day changes nothing.
    ///
    /// # Errors
    ///
    /// Returns `ProgressionServiceError::Storage` if the sign-in fields cannot
    /// be written.
    pub async fn record_sign_in(
        &self,
        progress: &mut UserProgress,
    ) -> Result<SignInOutcome, ProgressionServiceError> {
        let today = self.clock.today();
        let rewards = self.rewards;
        let outcome = progress.record_sign_in(today, || rewards.draw());

        match &outcome {
            SignInOutcome::AlreadySigned => {
                debug!(%today, "already signed in today");
            }
            SignInOutcome::Signed {
                total_sign_days,
                award,
                ..
            } => {
                info!(
                    %today,
                    reward = award.amount,
                    total_sign_days,
                    "daily sign-in recorded"
                );
                log_level_up(progress, award);
            }
        }

        self.persist(progress, outcome.changed_fields()).await?;
        Ok(outcome)
    }

    /// Clear a signed flag left over from an earlier day.
    ///
    /// # Errors
    ///
    /// Returns `ProgressionServiceError::Storage` if the flag cannot be written.
    pub async fn refresh_daily_state(
        &self,
        progress: &mut UserProgress,
    ) -> Result<DailyRefresh, ProgressionServiceError> {
        let refresh = progress.refresh_daily_state(self.clock.today());
        if refresh == DailyRefresh::Reset {
            debug!("new day; sign-in flag cleared");
        }
        self.persist(progress, refresh.changed_fields()).await?;
        Ok(refresh)
    }

    async fn persist(
        &self,
        progress: &UserProgress,
        fields: &[ProgressField],
    ) -> Result<(), ProgressionServiceError> {
        if fields.is_empty() {
            return Ok(());
        }
        save_fields(self.store.as_ref(), progress, fields).await?;
        Ok(())
    }
}

fn log_level_up(progress: &UserProgress, award: &LevelUp) {
    if award.leveled_up() {
        info!(
            user_id = %progress.user_id(),
            levels_gained = award.levels_gained,
            level = award.level,
            next_threshold = progress.experience_to_next_level(),
            "level up"
        );
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
