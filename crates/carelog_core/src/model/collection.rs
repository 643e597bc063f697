//! Collection names, row identity and canonical headers.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier assigned to every stored row on append.
pub type RowId = Uuid;

/// One tabular collection in the backing store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Users,
    DailyLogs,
    Growth,
    Milestones,
    Summary,
}

impl Collection {
    /// Every collection, inputs first.
    pub const ALL: [Collection; 5] = [
        Collection::Users,
        Collection::DailyLogs,
        Collection::Growth,
        Collection::Milestones,
        Collection::Summary,
    ];

    /// Storage name, matching the worksheet names of the tracker workbook.
    pub fn name(self) -> &'static str {
        match self {
            Self::Users => "user_info",
            Self::DailyLogs => "daily_logs",
            Self::Growth => "growth",
            Self::Milestones => "milestones",
            Self::Summary => "summary",
        }
    }
}

/// One row as returned by `CollectionStore::read_all`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRow {
    pub id: RowId,
    pub cells: Vec<String>,
}

impl StoredRow {
    pub fn new(cells: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            cells,
        }
    }
}

pub const DAILY_LOG_HEADER: [&str; 6] = [
    "Username",
    "Log Date",
    "Sleep (hours)",
    "Feed (ml)",
    "Wet Diapers",
    "Dirty Diapers",
];

pub const GROWTH_HEADER: [&str; 4] = ["Username", "Log Date", "Weight (kg)", "Height (cm)"];

pub const MILESTONE_HEADER: [&str; 3] = ["Username", "Log Date", "Milestone"];

/// Converts a static header into an owned row.
pub fn header_cells(header: &[&str]) -> Vec<String> {
    header.iter().map(|label| (*label).to_string()).collect()
}
