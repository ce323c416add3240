//! Key layout and string codec for persisting `UserProgress`.

use chrono::NaiveDate;
use levelup_core::model::{LevelTrack, ProgressField, SignInState, UserId, UserProgress};
use tracing::{debug, warn};

use crate::repository::{KeyValueStore, StorageError};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Store keys, one per persisted field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgressKey {
    UserId,
    Level,
    Experience,
    IsSigned,
    SignDays,
    LastSignDate,
}

impl ProgressKey {
    pub const ALL: [ProgressKey; 6] = [
        ProgressKey::UserId,
        ProgressKey::Level,
        ProgressKey::Experience,
        ProgressKey::IsSigned,
        ProgressKey::SignDays,
        ProgressKey::LastSignDate,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ProgressKey::UserId => "userId",
            ProgressKey::Level => "userLevel",
            ProgressKey::Experience => "userExp",
            ProgressKey::IsSigned => "isSigned",
            ProgressKey::SignDays => "signDays",
            ProgressKey::LastSignDate => "lastSignDate",
        }
    }
}

impl From<ProgressField> for ProgressKey {
    fn from(field: ProgressField) -> Self {
        match field {
            ProgressField::UserId => ProgressKey::UserId,
            ProgressField::Level => ProgressKey::Level,
            ProgressField::Experience => ProgressKey::Experience,
            ProgressField::IsSignedToday => ProgressKey::IsSigned,
            ProgressField::TotalSignDays => ProgressKey::SignDays,
            ProgressField::LastSignDate => ProgressKey::LastSignDate,
        }
    }
}

/// Raw string values as found in the store.
///
/// Decoding never fails: missing or malformed values fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressRecord {
    pub user_id: Option<String>,
    pub level: Option<String>,
    pub experience: Option<String>,
    pub is_signed: Option<String>,
    pub sign_days: Option<String>,
    pub last_sign_date: Option<String>,
}

impl ProgressRecord {
    /// Read every progress key from `store`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    pub async fn load(store: &dyn KeyValueStore) -> Result<Self, StorageError> {
        Ok(Self {
            user_id: store.get(ProgressKey::UserId.as_str()).await?,
            level: store.get(ProgressKey::Level.as_str()).await?,
            experience: store.get(ProgressKey::Experience.as_str()).await?,
            is_signed: store.get(ProgressKey::IsSigned.as_str()).await?,
            sign_days: store.get(ProgressKey::SignDays.as_str()).await?,
            last_sign_date: store.get(ProgressKey::LastSignDate.as_str()).await?,
        })
    }

    #[must_use]
    pub fn into_progress(self) -> UserProgress {
        let user_id = self.user_id.map(UserId::new).unwrap_or_default();
        let level = decode_level(self.level.as_deref());
        let experience = decode_number::<u64>(ProgressKey::Experience, self.experience.as_deref())
            .unwrap_or(0);
        let is_signed = self.is_signed.as_deref() == Some("true");
        let sign_days =
            decode_number::<u32>(ProgressKey::SignDays, self.sign_days.as_deref()).unwrap_or(0);
        let last_sign_date = decode_date(self.last_sign_date.as_deref());

        UserProgress::from_parts(
            user_id,
            LevelTrack::from_persisted(level, experience),
            SignInState::from_persisted(is_signed, sign_days, last_sign_date),
        )
    }
}

/// String form of one field of `progress`.
#[must_use]
pub fn encode_field(progress: &UserProgress, field: ProgressField) -> String {
    let sign_in = progress.sign_in();
    match field {
        ProgressField::UserId => progress.user_id().as_str().to_owned(),
        ProgressField::Level => progress.level().to_string(),
        ProgressField::Experience => progress.experience().to_string(),
        ProgressField::IsSignedToday => sign_in.is_signed_today().to_string(),
        ProgressField::TotalSignDays => sign_in.total_sign_days().to_string(),
        ProgressField::LastSignDate => sign_in
            .last_sign_date()
            .map(|date| date.format(DATE_FORMAT).to_string())
            .unwrap_or_default(),
    }
}

/// Hydrate progress from `store`, using defaults for anything missing.
///
/// # Errors
///
/// Returns `StorageError` if the store cannot be read.
pub async fn load_progress(store: &dyn KeyValueStore) -> Result<UserProgress, StorageError> {
    let record = ProgressRecord::load(store).await?;
    Ok(record.into_progress())
}

/// Write the given fields of `progress`, one key at a time.
///
/// # Errors
///
/// Returns `StorageError` on the first failed write. Keys written before the
/// failure keep their new values.
pub async fn save_fields(
    store: &dyn KeyValueStore,
    progress: &UserProgress,
    fields: &[ProgressField],
) -> Result<(), StorageError> {
    for field in fields {
        let key = ProgressKey::from(*field).as_str();
        let value = encode_field(progress, *field);
        debug!(key, value = %value, "persist progress field");
        store.set(key, &value).await?;
    }
    Ok(())
}

fn decode_level(raw: Option<&str>) -> u32 {
    match decode_number::<u32>(ProgressKey::Level, raw) {
        Some(0) | None => 1,
        Some(level) => level,
    }
}

fn decode_number<T: std::str::FromStr>(key: ProgressKey, raw: Option<&str>) -> Option<T> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key = key.as_str(), raw, "malformed stored number; using default");
            None
        }
    }
}

fn decode_date(raw: Option<&str>) -> Option<NaiveDate> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    match NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(_) => {
            warn!(
                key = ProgressKey::LastSignDate.as_str(),
                raw, "unrecognized stored date; treating as never signed"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryKeyValueStore;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn empty_store_hydrates_defaults() {
        let store = InMemoryKeyValueStore::new();
        let progress = load_progress(&store).await.unwrap();
        assert_eq!(progress, UserProgress::default());
        assert!(progress.user_id().is_guest());
    }

    #[tokio::test]
    async fn stored_values_are_parsed() {
        let store = InMemoryKeyValueStore::with_entries([
            ("userId", "alice"),
            ("userLevel", "3"),
            ("userExp", "50"),
            ("isSigned", "true"),
            ("signDays", "12"),
            ("lastSignDate", "2024-05-09"),
        ]);
        let progress = load_progress(&store).await.unwrap();
        assert_eq!(progress.user_id().as_str(), "alice");
        assert_eq!(progress.level(), 3);
        assert_eq!(progress.experience(), 50);
        assert_eq!(progress.experience_to_next_level(), 225);
        assert!(progress.sign_in().is_signed_today());
        assert_eq!(progress.sign_in().total_sign_days(), 12);
        assert_eq!(progress.sign_in().last_sign_date(), Some(date(2024, 5, 9)));
    }

    #[test]
    fn malformed_values_coerce_to_defaults() {
        let record = ProgressRecord {
            user_id: Some("   ".into()),
            level: Some("abc".into()),
            experience: Some("-5".into()),
            is_signed: Some("yes".into()),
            sign_days: Some("1.5".into()),
            last_sign_date: Some("5/9/2024".into()),
        };
        let progress = record.into_progress();
        assert_eq!(progress, UserProgress::default());
    }

    #[test]
    fn zero_level_is_treated_as_level_one() {
        let record = ProgressRecord {
            level: Some("0".into()),
            ..ProgressRecord::default()
        };
        assert_eq!(record.into_progress().level(), 1);
    }

    #[test]
    fn fields_encode_as_plain_strings() {
        let mut progress = UserProgress::new(UserId::new("bob"));
        progress.record_sign_in(date(2024, 1, 2), || 30);

        assert_eq!(encode_field(&progress, ProgressField::UserId), "bob");
        assert_eq!(encode_field(&progress, ProgressField::Level), "1");
        assert_eq!(encode_field(&progress, ProgressField::Experience), "30");
        assert_eq!(encode_field(&progress, ProgressField::IsSignedToday), "true");
        assert_eq!(encode_field(&progress, ProgressField::TotalSignDays), "1");
        assert_eq!(
            encode_field(&progress, ProgressField::LastSignDate),
            "2024-01-02"
        );
        assert_eq!(
            encode_field(&UserProgress::default(), ProgressField::LastSignDate),
            ""
        );
    }

    #[tokio::test]
    async fn save_fields_writes_only_requested_keys() {
        let store = InMemoryKeyValueStore::new();
        let mut progress = UserProgress::default();
        progress.award_experience(250);

        save_fields(&store, &progress, ProgressField::AWARD)
            .await
            .unwrap();

        let snapshot = store.snapshot().unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get("userExp").map(String::as_str), Some("50"));
        assert_eq!(snapshot.get("userLevel").map(String::as_str), Some("3"));
    }

    #[tokio::test]
    async fn saved_progress_hydrates_back() {
        let store = InMemoryKeyValueStore::new();
        let mut progress = UserProgress::new(UserId::new("carol"));
        progress.award_experience(400);
        progress.record_sign_in(date(2024, 2, 29), || 10);

        save_fields(&store, &progress, ProgressField::ALL)
            .await
            .unwrap();
        let reloaded = load_progress(&store).await.unwrap();
        assert_eq!(reloaded, progress);
    }

    #[test]
    fn every_field_maps_to_a_distinct_key() {
        let keys: std::collections::HashSet<_> = ProgressField::ALL
            .iter()
            .map(|field| ProgressKey::from(*field))
            .collect();
        assert_eq!(keys.len(), ProgressKey::ALL.len());
    }
}
