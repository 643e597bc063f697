//! Record model for child-care collections.
//!
//! # Responsibility
//! - Name the tabular collections and their canonical header rows.
//! - Decode raw string cells into typed entries without failing.
//! - Shape summary rows for the output collection.
//!
//! # Invariants
//! - Every stored row is addressed by a stable `RowId`, never by position.
//! - Decoding is lenient: blank or malformed cells become `None`/raw text and
//!   are judged by the consumer.

pub mod cells;
pub mod collection;
pub mod record;
pub mod summary;
