use serde::Serialize;
use thiserror::Error;

/// Experience required to leave level 1.
pub const BASE_EXPERIENCE_TO_NEXT_LEVEL: u64 = 100;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExperienceError {
    #[error("experience award cannot be negative: {0}")]
    Negative(i64),
    #[error("experience award is out of range: {0}")]
    OutOfRange(i64),
}

/// Validates an award coming from signed input.
///
/// # Errors
///
/// Returns `ExperienceError::Negative` for negative amounts and
/// `ExperienceError::OutOfRange` for amounts that do not fit in a `u32`.
pub fn validate_award(amount: i64) -> Result<u32, ExperienceError> {
    if amount < 0 {
        return Err(ExperienceError::Negative(amount));
    }
    u32::try_from(amount).map_err(|_| ExperienceError::OutOfRange(amount))
}

//
// ─── THRESHOLDS ───────────────────────────────────────────────────────────────
//

/// Threshold that follows `current` after one level-up: `floor(current * 1.5)`.
#[must_use]
pub fn next_threshold(current: u64) -> u64 {
    current.saturating_add(current / 2)
}

/// Threshold a user at `level` has to reach to level up again.
///
/// Level 0 is treated as level 1.
#[must_use]
pub fn threshold_for_level(level: u32) -> u64 {
    let mut threshold = BASE_EXPERIENCE_TO_NEXT_LEVEL;
    for _ in 1..level {
        let grown = next_threshold(threshold);
        if grown == threshold {
            break;
        }
        threshold = grown;
    }
    threshold
}

//
// ─── LEVEL TRACK ──────────────────────────────────────────────────────────────
//

/// Result of adding experience to a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelUp {
    pub amount: u32,
    pub levels_gained: u32,
    pub level: u32,
}

impl LevelUp {
    #[must_use]
    pub fn leveled_up(&self) -> bool {
        self.levels_gained > 0
    }
}

/// Level, experience and the threshold to the next level.
///
/// `experience < experience_to_next_level` holds after every public call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelTrack {
    level: u32,
    experience: u64,
    experience_to_next_level: u64,
}

impl LevelTrack {
    #[must_use]
    pub fn new() -> Self {
        Self {
            level: 1,
            experience: 0,
            experience_to_next_level: BASE_EXPERIENCE_TO_NEXT_LEVEL,
        }
    }

    /// Rebuild a track from a stored level and experience.
    ///
    /// The threshold is derived from the level. Experience at or above it is
    /// folded into further level-ups.
    #[must_use]
    pub fn from_persisted(level: u32, experience: u64) -> Self {
        let level = level.max(1);
        let mut track = Self {
            level,
            experience,
            experience_to_next_level: threshold_for_level(level),
        };
        track.normalize();
        track
    }

    #[must_use]
    pub fn level(&self) -> u32 {
        self.level
    }

    #[must_use]
    pub fn experience(&self) -> u64 {
        self.experience
    }

    #[must_use]
    pub fn experience_to_next_level(&self) -> u64 {
        self.experience_to_next_level
    }

    /// Adds experience and applies every level-up it pays for.
    pub fn award(&mut self, amount: u32) -> LevelUp {
        self.experience = self.experience.saturating_add(u64::from(amount));
        let levels_gained = self.normalize();
        LevelUp {
            amount,
            levels_gained,
            level: self.level,
        }
    }

    /// Percentage of the way to the next level, in `0..=99`.
    #[must_use]
    pub fn progress_percent(&self) -> u8 {
        let pct = u128::from(self.experience) * 100 / u128::from(self.experience_to_next_level);
        u8::try_from(pct.min(99)).unwrap_or(99)
    }

    fn normalize(&mut self) -> u32 {
        let mut gained = 0_u32;
        while self.experience >= self.experience_to_next_level {
            self.experience -= self.experience_to_next_level;
            self.level = self.level.saturating_add(1);
            self.experience_to_next_level = next_threshold(self.experience_to_next_level);
            gained = gained.saturating_add(1);
        }
        gained
    }
}

impl Default for LevelTrack {
    fn default() -> Self {
        Self::new()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_grow_by_half_and_floor() {
        assert_eq!(threshold_for_level(0), 100);
        assert_eq!(threshold_for_level(1), 100);
        assert_eq!(threshold_for_level(2), 150);
        assert_eq!(threshold_for_level(3), 225);
        assert_eq!(threshold_for_level(4), 337);
        assert_eq!(threshold_for_level(5), 505);
    }

    #[test]
    fn threshold_for_huge_level_saturates_quickly() {
        assert_eq!(threshold_for_level(u32::MAX), u64::MAX);
    }

    #[test]
    fn award_below_threshold_keeps_level() {
        let mut track = LevelTrack::new();
        let up = track.award(99);
        assert!(!up.leveled_up());
        assert_eq!(track.level(), 1);
        assert_eq!(track.experience(), 99);
        assert_eq!(track.progress_percent(), 99);
    }

    #[test]
    fn award_exactly_threshold_levels_up_to_zero() {
        let mut track = LevelTrack::new();
        let up = track.award(100);
        assert_eq!(up.levels_gained, 1);
        assert_eq!(track.level(), 2);
        assert_eq!(track.experience(), 0);
        assert_eq!(track.experience_to_next_level(), 150);
    }

    #[test]
    fn large_award_levels_up_multiple_times() {
        let mut track = LevelTrack::new();
        let up = track.award(250);
        assert_eq!(up.levels_gained, 2);
        assert_eq!(up.level, 3);
        assert_eq!(track.level(), 3);
        assert_eq!(track.experience_to_next_level(), 225);
        assert_eq!(track.experience(), 50);
        assert_eq!(track.progress_percent(), 22);
    }

    #[test]
    fn experience_always_stays_below_threshold() {
        let mut track = LevelTrack::new();
        for amount in [0, 1, 49, 99, 100, 101, 1_000, 65_535, 1_000_000, u32::MAX] {
            track.award(amount);
            assert!(track.experience() < track.experience_to_next_level());
            assert!(track.progress_percent() <= 99);
            assert!(track.level() >= 1);
        }
    }

    #[test]
    fn zero_award_is_a_no_op() {
        let mut track = LevelTrack::from_persisted(2, 10);
        let before = track.clone();
        let up = track.award(0);
        assert!(!up.leveled_up());
        assert_eq!(track, before);
    }

    #[test]
    fn from_persisted_derives_threshold_and_normalizes() {
        let track = LevelTrack::from_persisted(3, 50);
        assert_eq!(track.experience_to_next_level(), 225);
        assert_eq!(track.experience(), 50);

        let overflowing = LevelTrack::from_persisted(1, 250);
        assert_eq!(overflowing.level(), 3);
        assert_eq!(overflowing.experience(), 50);

        let zero_level = LevelTrack::from_persisted(0, 0);
        assert_eq!(zero_level.level(), 1);
    }

    #[test]
    fn signed_awards_reject_negatives() {
        assert_eq!(validate_award(25), Ok(25));
        assert_eq!(validate_award(-1), Err(ExperienceError::Negative(-1)));
        assert!(matches!(
            validate_award(i64::MAX),
            Err(ExperienceError::OutOfRange(_))
        ));
    }
}
