//! Weekly summary aggregation.
//!
//! # Responsibility
//! - Join input records to users and fold them into one summary per user.
//! - Own the rolling window rules and latest-wins growth selection.
//!
//! # Invariants
//! - Output order and cardinality follow the user list exactly.
//! - The window start is computed once per run and shared by every user.
//! - Bad dates and bad numbers exclude a value or a record, never the run.

mod aggregate;

pub use aggregate::{recompute_summary, SummaryWindow};
