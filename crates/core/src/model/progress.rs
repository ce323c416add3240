use chrono::NaiveDate;
use serde::Serialize;

use crate::model::ids::UserId;
use crate::model::level::{LevelTrack, LevelUp};
use crate::model::sign_in::{DailyRefresh, SignInState};

//
// ─── FIELDS ───────────────────────────────────────────────────────────────────
//

/// A persisted field of `UserProgress`.
///
/// Operations report which fields they touched so adapters only write those.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgressField {
    UserId,
    Level,
    Experience,
    IsSignedToday,
    TotalSignDays,
    LastSignDate,
}

impl ProgressField {
    pub const ALL: &'static [ProgressField] = &[
        ProgressField::UserId,
        ProgressField::Level,
        ProgressField::Experience,
        ProgressField::IsSignedToday,
        ProgressField::TotalSignDays,
        ProgressField::LastSignDate,
    ];

    /// Fields written after an experience award.
    pub const AWARD: &'static [ProgressField] =
        &[ProgressField::Experience, ProgressField::Level];

    /// Fields written after a successful sign-in, including its award.
    pub const SIGN_IN: &'static [ProgressField] = &[
        ProgressField::Experience,
        ProgressField::Level,
        ProgressField::IsSignedToday,
        ProgressField::TotalSignDays,
        ProgressField::LastSignDate,
    ];

    /// Fields written when a new day clears the signed flag.
    pub const DAILY_RESET: &'static [ProgressField] = &[ProgressField::IsSignedToday];
}

//
// ─── OUTCOMES ─────────────────────────────────────────────────────────────────
//

/// Result of `UserProgress::record_sign_in`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignInOutcome {
    /// The user had already signed in on this date.
    AlreadySigned,
    Signed {
        date: NaiveDate,
        total_sign_days: u32,
        award: LevelUp,
    },
}

impl SignInOutcome {
    #[must_use]
    pub fn changed_fields(&self) -> &'static [ProgressField] {
        match self {
            SignInOutcome::AlreadySigned => &[],
            SignInOutcome::Signed { .. } => ProgressField::SIGN_IN,
        }
    }

    #[must_use]
    pub fn reward(&self) -> Option<u32> {
        match self {
            SignInOutcome::AlreadySigned => None,
            SignInOutcome::Signed { award, .. } => Some(award.amount),
        }
    }
}

impl DailyRefresh {
    #[must_use]
    pub fn changed_fields(&self) -> &'static [ProgressField] {
        match self {
            DailyRefresh::Current => &[],
            DailyRefresh::Reset => ProgressField::DAILY_RESET,
        }
    }
}

//
// ─── USER PROGRESS ────────────────────────────────────────────────────────────
//

/// Level, experience and sign-in state of one user.
///
/// Every mutation is a pure in-memory transition; persistence is left to the
/// caller, guided by the fields each operation reports as changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserProgress {
    user_id: UserId,
    #[serde(flatten)]
    track: LevelTrack,
    sign_in: SignInState,
}

impl UserProgress {
    /// Fresh level-1 progress for `user_id`.
    #[must_use]
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            track: LevelTrack::new(),
            sign_in: SignInState::default(),
        }
    }

    #[must_use]
    pub fn from_parts(user_id: UserId, track: LevelTrack, sign_in: SignInState) -> Self {
        Self {
            user_id,
            track,
            sign_in,
        }
    }

    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    #[must_use]
    pub fn level(&self) -> u32 {
        self.track.level()
    }

    #[must_use]
    pub fn experience(&self) -> u64 {
        self.track.experience()
    }

    #[must_use]
    pub fn experience_to_next_level(&self) -> u64 {
        self.track.experience_to_next_level()
    }

    #[must_use]
    pub fn sign_in(&self) -> &SignInState {
        &self.sign_in
    }

    pub fn set_user_id(&mut self, user_id: UserId) {
        self.user_id = user_id;
    }

    pub fn award_experience(&mut self, amount: u32) -> LevelUp {
        self.track.award(amount)
    }

    /// Signs in for `today`, drawing the reward only if the sign-in counts.
    pub fn record_sign_in(
        &mut self,
        today: NaiveDate,
        draw_reward: impl FnOnce() -> u32,
    ) -> SignInOutcome {
        if !self.sign_in.sign(today) {
            return SignInOutcome::AlreadySigned;
        }
        let award = self.track.award(draw_reward());
        SignInOutcome::Signed {
            date: today,
            total_sign_days: self.sign_in.total_sign_days(),
            award,
        }
    }

    pub fn refresh_daily_state(&mut self, today: NaiveDate) -> DailyRefresh {
        self.sign_in.refresh(today)
    }

    #[must_use]
    pub fn level_progress_percent(&self) -> u8 {
        self.track.progress_percent()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
