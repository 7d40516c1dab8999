pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod prefs;
pub mod query;
pub mod storage;
pub mod store;
pub mod transfer;
pub mod trips;
pub mod undo;

pub use config::AppConfig;
pub use error::{ExitCode, Result, RouteStampError};
pub use models::*;

pub use cache::QueryCache;
pub use query::{CountryFilter, CountryStats, SortKey, SortOrder};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use store::{CountryCommand, CountryStore};
pub use transfer::{ExportDocument, ImportSummary, validate_import};
pub use trips::{TripStore, days_until};
pub use undo::UndoHistory;
