//! Domain layer - core business types.
//!
//! This layer contains pure domain models and error types
//! without any I/O of its own.

pub mod error;
pub mod models;
pub mod sync;

pub use error::{AppError, Result};
pub use models::{default_quotes, CategoryFilter, ImportReport, Quote, SyncReport};
pub use sync::{AppConfig, RemoteConfig, SyncState};
