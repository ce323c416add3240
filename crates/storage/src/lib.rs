#![forbid(unsafe_code)]

pub mod progress_record;
pub mod repository;
pub mod sqlite;
