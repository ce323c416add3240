use chrono::NaiveDate;
use serde::Serialize;

/// Smallest experience reward for a daily sign-in.
pub const MIN_SIGN_IN_REWARD: u32 = 10;
/// Largest experience reward for a daily sign-in.
pub const MAX_SIGN_IN_REWARD: u32 = 49;

/// Daily sign-in bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SignInState {
    is_signed_today: bool,
    total_sign_days: u32,
    last_sign_date: Option<NaiveDate>,
}

/// What `SignInState::refresh` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DailyRefresh {
    /// Last sign-in was today; nothing changed.
    Current,
    /// A new day started since the last sign-in; the flag was cleared.
    Reset,
}

impl SignInState {
    #[must_use]
    pub fn from_persisted(
        is_signed_today: bool,
        total_sign_days: u32,
        last_sign_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            is_signed_today,
            total_sign_days,
            last_sign_date,
        }
    }

    #[must_use]
    pub fn is_signed_today(&self) -> bool {
        self.is_signed_today
    }

    #[must_use]
    pub fn total_sign_days(&self) -> u32 {
        self.total_sign_days
    }

    #[must_use]
    pub fn last_sign_date(&self) -> Option<NaiveDate> {
        self.last_sign_date
    }

    /// True when the last recorded sign-in happened on `today`.
    #[must_use]
    pub fn has_signed_on(&self, today: NaiveDate) -> bool {
        self.last_sign_date == Some(today)
    }

    /// Marks `today` as signed. Returns `false` if it already was.
    pub fn sign(&mut self, today: NaiveDate) -> bool {
        if self.has_signed_on(today) {
            return false;
        }
        self.is_signed_today = true;
        self.total_sign_days = self.total_sign_days.saturating_add(1);
        self.last_sign_date = Some(today);
        true
    }

    /// Clears a stale signed flag left over from an earlier day.
    pub fn refresh(&mut self, today: NaiveDate) -> DailyRefresh {
        if self.has_signed_on(today) {
            return DailyRefresh::Current;
        }
        self.is_signed_today = false;
        DailyRefresh::Reset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn first_sign_sets_all_fields() {
        let mut state = SignInState::default();
        assert!(state.sign(day(1)));
        assert!(state.is_signed_today());
        assert_eq!(state.total_sign_days(), 1);
        assert_eq!(state.last_sign_date(), Some(day(1)));
    }

    #[test]
    fn second_sign_same_day_is_ignored() {
        let mut state = SignInState::default();
        state.sign(day(1));
        let before = state.clone();
        assert!(!state.sign(day(1)));
        assert_eq!(state, before);
    }

    #[test]
    fn distinct_days_each_count_once() {
        let mut state = SignInState::default();
        for d in [1, 1, 2, 2, 2, 5] {
            state.sign(day(d));
        }
        assert_eq!(state.total_sign_days(), 3);
        assert_eq!(state.last_sign_date(), Some(day(5)));
    }

    #[test]
    fn refresh_on_new_day_clears_flag_only() {
        let mut state = SignInState::from_persisted(true, 7, Some(day(1)));
        assert_eq!(state.refresh(day(2)), DailyRefresh::Reset);
        assert!(!state.is_signed_today());
        assert_eq!(state.total_sign_days(), 7);
        assert_eq!(state.last_sign_date(), Some(day(1)));
    }

    #[test]
    fn refresh_same_day_keeps_flag() {
        let mut state = SignInState::from_persisted(true, 7, Some(day(2)));
        assert_eq!(state.refresh(day(2)), DailyRefresh::Current);
        assert!(state.is_signed_today());
    }

    #[test]
    fn refresh_without_history_resets() {
        let mut state = SignInState::default();
        assert_eq!(state.refresh(day(2)), DailyRefresh::Reset);
        assert!(!state.is_signed_today());
    }
}
