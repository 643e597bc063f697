//! Summary refresh use-case service.
//!
//! # Responsibility
//! - Read input collections, run the aggregator, and swap the summary
//!   collection in one `replace_all` call.
//! - Look up one user's summary row for display.
//!
//! # Invariants
//! - The summary is fully built in memory before anything is written.
//! - Store failures abort the refresh and are returned unchanged; there is
//!   no retry.
//! - Input collections are never written by this service.

use crate::config::SummaryConfig;
use crate::model::cells::cell;
use crate::model::collection::Collection;
use crate::model::summary::{summary_rows, SummaryRecord};
use crate::repo::collection_store::{CollectionStore, StoreResult};
use crate::repo::record_repo::RecordSnapshot;
use crate::summary::recompute_summary;
use chrono::{Local, NaiveDateTime};
use log::{error, info};
use std::time::Instant;

/// One user's summary row paired with header labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryView {
    pub fields: Vec<(String, String)>,
}

impl SummaryView {
    /// Value under the given header label.
    pub fn get(&self, label: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == label)
            .map(|(_, value)| value.as_str())
    }
}

/// Rebuilds and serves the weekly summary collection.
pub struct SummaryService<S: CollectionStore> {
    store: S,
    config: SummaryConfig,
}

impl<S: CollectionStore> SummaryService<S> {
    pub fn new(store: S, config: SummaryConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &SummaryConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Recomputes every user's summary against `now` and replaces the
    /// summary collection.
    ///
    /// Returns the records written, in user order.
    pub fn refresh(&mut self, now: NaiveDateTime) -> StoreResult<Vec<SummaryRecord>> {
        let started_at = Instant::now();
        info!(
            "event=summary_refresh module=summary status=start window_days={} feed={:?} milestones={:?}",
            self.config.window_days, self.config.feed_aggregation, self.config.milestone_scope
        );

        match self.rebuild(now) {
            Ok(records) => {
                info!(
                    "event=summary_refresh module=summary status=ok users={} duration_ms={}",
                    records.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(records)
            }
            Err(err) => {
                error!(
                    "event=summary_refresh module=summary status=error duration_ms={} error={err}",
                    started_at.elapsed().as_millis()
                );
                Err(err)
            }
        }
    }

    /// Same as `refresh` with the local wall clock as the reference instant.
    pub fn refresh_now(&mut self) -> StoreResult<Vec<SummaryRecord>> {
        self.refresh(Local::now().naive_local())
    }

    /// Reads the stored summary row for `username`, if present.
    pub fn find_summary(&self, username: &str) -> StoreResult<Option<SummaryView>> {
        let mut rows = self.store.read_all(Collection::Summary)?.into_iter();
        let Some(header) = rows.next() else {
            return Ok(None);
        };

        let view = rows
            .find(|row| cell(&row.cells, 0) == username)
            .map(|row| SummaryView {
                fields: header
                    .cells
                    .iter()
                    .enumerate()
                    .map(|(index, label)| (label.clone(), cell(&row.cells, index).to_string()))
                    .collect(),
            });
        Ok(view)
    }

    fn rebuild(&mut self, now: NaiveDateTime) -> StoreResult<Vec<SummaryRecord>> {
        let snapshot = RecordSnapshot::load(&self.store, self.config.user_layout)?;
        let records = recompute_summary(
            &snapshot.users,
            &snapshot.daily_logs,
            &snapshot.growth,
            &snapshot.milestones,
            now,
            &self.config,
        );
        self.store.replace_all(
            Collection::Summary,
            summary_rows(&records, self.config.feed_aggregation),
        )?;
        Ok(records)
    }
}
