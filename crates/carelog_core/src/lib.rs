//! Core domain logic for carelog.
//! Owns the weekly summary aggregation and the record-entry rules that feed it.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod summary;

pub use config::{ConfigError, FeedAggregation, MilestoneScope, SummaryConfig, UserLayout};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::collection::{Collection, RowId, StoredRow};
pub use model::record::{DailyLogEntry, GrowthEntry, MilestoneEntry, UserProfile};
pub use model::summary::{summary_header, summary_rows, SummaryRecord};
pub use repo::collection_store::{
    CollectionStore, SqliteCollectionStore, StoreError, StoreResult, SummaryRefresh,
};
pub use repo::memory_store::MemoryCollectionStore;
pub use repo::record_repo::{resolve_user_layout, seed_headers, RecordSnapshot};
pub use service::summary_service::{SummaryService, SummaryView};
pub use service::tracker_service::{
    NewDailyLog, NewGrowthEntry, NewMilestone, NewUser, TrackerError, TrackerResult,
    TrackerService,
};
pub use summary::{recompute_summary, SummaryWindow};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
