use levelup_core::model::SignInOutcome;
use services::ProgressSnapshot;

use crate::vm::time_fmt::format_date;

/// UI-ready representation of the progress card.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgressVm {
    pub user_label: String,
    pub level_label: String,
    pub experience_label: String,
    pub progress_pct: u8,
    pub signed_today: bool,
    pub sign_days_label: String,
    pub last_sign_label: String,
}

impl ProgressVm {
    /// Inline style for the progress bar fill.
    #[must_use]
    pub fn bar_style(&self) -> String {
        format!("width: {}%;", self.progress_pct)
    }

    #[must_use]
    pub fn sign_button_label(&self) -> &'static str {
        if self.signed_today {
            "Signed in today"
        } else {
            "Sign in"
        }
    }
}

impl From<&ProgressSnapshot> for ProgressVm {
    fn from(snapshot: &ProgressSnapshot) -> Self {
        let sign_days_label = match snapshot.total_sign_days {
            1 => "Signed in on 1 day".to_owned(),
            days => format!("Signed in on {days} days"),
        };
        let last_sign_label = snapshot.last_sign_date.map_or_else(
            || "Never signed in".to_owned(),
            |date| format!("Last sign-in: {}", format_date(date)),
        );

        Self {
            user_label: snapshot.user_id.clone(),
            level_label: format!("Level {}", snapshot.level),
            experience_label: format!(
                "{} / {} XP",
                snapshot.experience, snapshot.experience_to_next_level
            ),
            progress_pct: snapshot.level_progress,
            signed_today: snapshot.is_signed_today,
            sign_days_label,
            last_sign_label,
        }
    }
}

/// Short message shown after pressing the sign-in button.
#[must_use]
pub fn sign_in_message(outcome: &SignInOutcome) -> String {
    match outcome {
        SignInOutcome::AlreadySigned => "Already signed in today.".to_owned(),
        SignInOutcome::Signed { award, .. } if award.leveled_up() => {
            format!("+{} XP. Level up! You are now level {}.", award.amount, award.level)
        }
        SignInOutcome::Signed { award, .. } => format!("+{} XP.", award.amount),
    }
}
