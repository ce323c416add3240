#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod progress_store;
pub mod progression_service;
pub mod reward;

pub use levelup_core::Clock;

pub use app_services::AppServices;
pub use error::{AppServicesError, ProgressionServiceError};
pub use progress_store::{ProgressSnapshot, ProgressStore};
pub use progression_service::ProgressionService;
pub use reward::RewardSource;
