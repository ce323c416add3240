use levelup_core::model::{MAX_SIGN_IN_REWARD, MIN_SIGN_IN_REWARD};
use rand::Rng;

/// Source of daily sign-in rewards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RewardSource {
    /// Uniform draw from `MIN_SIGN_IN_REWARD..=MAX_SIGN_IN_REWARD`.
    #[default]
    Random,
    /// Always the same amount; for tests and scripted runs.
    Fixed(u32),
}

impl RewardSource {
    #[must_use]
    pub fn draw(&self) -> u32 {
        match self {
            RewardSource::Random => {
                rand::rng().random_range(MIN_SIGN_IN_REWARD..=MAX_SIGN_IN_REWARD)
            }
            RewardSource::Fixed(amount) => *amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_rewards_stay_in_range() {
        let source = RewardSource::Random;
        for _ in 0..1_000 {
            let reward = source.draw();
            assert!((MIN_SIGN_IN_REWARD..=MAX_SIGN_IN_REWARD).contains(&reward));
        }
    }

    #[test]
    fn fixed_reward_is_constant() {
        let source = RewardSource::Fixed(42);
        assert_eq!(source.draw(), 42);
        assert_eq!(source.draw(), 42);
    }
}
