//! Collection store abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the worksheet-style store contract the tracker depends on.
//! - Isolate SQLite details from aggregation and service orchestration.
//! - Decode input collections into typed records.
//!
//! # Invariants
//! - Rows are addressed by stable `RowId`, never by position.
//! - Store failures surface as `StoreError`; per-cell decoding never fails.

pub mod collection_store;
pub mod memory_store;
pub mod record_repo;
