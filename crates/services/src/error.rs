//! Shared error types for the services crate.

use thiserror::Error;

use levelup_core::model::ExperienceError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `ProgressionService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressionServiceError {
    #[error(transparent)]
    InvalidAward(#[from] ExperienceError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Progression(#[from] ProgressionServiceError),
}
