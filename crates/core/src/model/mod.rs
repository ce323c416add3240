mod ids;
mod level;
mod progress;
mod sign_in;

pub use ids::{GUEST_USER_ID, UserId};
pub use level::{
    BASE_EXPERIENCE_TO_NEXT_LEVEL, ExperienceError, LevelTrack, LevelUp, next_threshold,
    threshold_for_level, validate_award,
};
pub use progress::{ProgressField, SignInOutcome, UserProgress};
pub use sign_in::{DailyRefresh, MAX_SIGN_IN_REWARD, MIN_SIGN_IN_REWARD, SignInState};
