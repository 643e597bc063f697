//! Typed reads over the input collections.
//!
//! # Responsibility
//! - Load all four input collections into typed entries in one pass.
//! - Seed canonical header rows into empty input collections.
//!
//! # Invariants
//! - The first stored row of every collection is treated as the header and
//!   never decoded as a record.
//! - Input collections are only read here, never rewritten.

use crate::config::UserLayout;
use crate::model::collection::{
    header_cells, Collection, StoredRow, DAILY_LOG_HEADER, GROWTH_HEADER, MILESTONE_HEADER,
};
use crate::model::record::{user_header, DailyLogEntry, GrowthEntry, MilestoneEntry, UserProfile};
use crate::repo::collection_store::{CollectionStore, StoreResult};
use log::{info, warn};

/// Input collections decoded for one aggregation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSnapshot {
    pub users: Vec<UserProfile>,
    pub daily_logs: Vec<DailyLogEntry>,
    pub growth: Vec<GrowthEntry>,
    pub milestones: Vec<MilestoneEntry>,
}

impl RecordSnapshot {
    /// Reads the four input collections. Any store failure aborts the load.
    ///
    /// User rows are decoded with the layout of the stored header when it is
    /// recognizable, `layout` otherwise.
    pub fn load<S: CollectionStore + ?Sized>(store: &S, layout: UserLayout) -> StoreResult<Self> {
        let user_rows = store.read_all(Collection::Users)?;
        let layout = resolve_user_layout(&user_rows, layout);
        Ok(Self {
            users: data_rows(user_rows)
                .map(|row| UserProfile::from_cells(&row.cells, layout))
                .collect(),
            daily_logs: data_rows(store.read_all(Collection::DailyLogs)?)
                .map(|row| DailyLogEntry::from_cells(&row.cells))
                .collect(),
            growth: data_rows(store.read_all(Collection::Growth)?)
                .map(|row| GrowthEntry::from_cells(&row.cells))
                .collect(),
            milestones: data_rows(store.read_all(Collection::Milestones)?)
                .map(|row| MilestoneEntry::from_cells(&row.cells))
                .collect(),
        })
    }
}

/// Picks the user layout for stored user rows.
///
/// The stored header wins over `configured`; a mismatch is logged. Empty
/// collections and unrecognized headers fall back to `configured`.
pub fn resolve_user_layout(user_rows: &[StoredRow], configured: UserLayout) -> UserLayout {
    let Some(detected) = user_rows.first().and_then(|header| UserLayout::detect(&header.cells))
    else {
        return configured;
    };
    if detected != configured {
        warn!(
            "event=user_layout_resolve module=store status=mismatch configured={configured:?} detected={detected:?}"
        );
    }
    detected
}

/// Drops the header row.
pub fn data_rows(rows: Vec<StoredRow>) -> impl Iterator<Item = StoredRow> {
    rows.into_iter().skip(1)
}

/// Canonical header row for an input collection; `None` for `Summary`,
/// whose header depends on the feed mode.
pub fn input_header(collection: Collection, layout: UserLayout) -> Option<Vec<String>> {
    match collection {
        Collection::Users => Some(user_header(layout)),
        Collection::DailyLogs => Some(header_cells(&DAILY_LOG_HEADER)),
        Collection::Growth => Some(header_cells(&GROWTH_HEADER)),
        Collection::Milestones => Some(header_cells(&MILESTONE_HEADER)),
        Collection::Summary => None,
    }
}

/// Writes the canonical header into every empty input collection.
///
/// Returns the collections that were seeded. Non-empty collections are left
/// untouched even when their header differs.
pub fn seed_headers<S: CollectionStore + ?Sized>(
    store: &mut S,
    layout: UserLayout,
) -> StoreResult<Vec<Collection>> {
    let mut seeded = Vec::new();
    for collection in Collection::ALL {
        let Some(header) = input_header(collection, layout) else {
            continue;
        };
        if store.read_all(collection)?.is_empty() {
            store.append_row(collection, header)?;
            seeded.push(collection);
        }
    }
    if !seeded.is_empty() {
        info!(
            "event=seed_headers module=store status=ok collections={}",
            seeded
                .iter()
                .map(|collection| collection.name())
                .collect::<Vec<_>>()
                .join(",")
        );
    }
    Ok(seeded)
}
