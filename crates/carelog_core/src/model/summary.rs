//! Weekly summary row.

use crate::config::FeedAggregation;
use crate::model::cells::format_amount;
use serde::{Deserialize, Serialize};

/// Derived per-user weekly summary. Rebuilt wholesale on every run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub username: String,
    /// Rounded to two decimals.
    pub total_sleep_hours: f64,
    /// Sum or mean per `FeedAggregation`, rounded to two decimals.
    pub feed_ml: f64,
    pub milestone_count: u32,
    /// Raw text of the latest growth row, empty when none exists.
    pub latest_weight: String,
    pub latest_height: String,
    pub wet_diaper_total: i64,
    pub dirty_diaper_total: i64,
}

impl SummaryRecord {
    /// Row for a user with nothing logged.
    pub fn empty(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            total_sleep_hours: 0.0,
            feed_ml: 0.0,
            milestone_count: 0,
            latest_weight: String::new(),
            latest_height: String::new(),
            wet_diaper_total: 0,
            dirty_diaper_total: 0,
        }
    }

    pub fn to_cells(&self) -> Vec<String> {
        vec![
            self.username.clone(),
            format_amount(self.total_sleep_hours),
            format_amount(self.feed_ml),
            self.milestone_count.to_string(),
            self.latest_weight.clone(),
            self.latest_height.clone(),
            self.wet_diaper_total.to_string(),
            self.dirty_diaper_total.to_string(),
        ]
    }
}

/// Summary header. Downstream readers look columns up by these labels.
pub fn summary_header(feed: FeedAggregation) -> Vec<String> {
    let feed_label = match feed {
        FeedAggregation::Sum => "Total Feed (ml)",
        FeedAggregation::Mean => "Average Feed (ml)",
    };
    [
        "Username",
        "Total Sleep (hrs)",
        feed_label,
        "Milestones Achieved",
        "Latest Weight",
        "Latest Height",
        "Total Wet Diapers",
        "Total Dirty Diapers",
    ]
    .iter()
    .map(|label| (*label).to_string())
    .collect()
}

/// Header row followed by one row per record, in record order.
pub fn summary_rows(records: &[SummaryRecord], feed: FeedAggregation) -> Vec<Vec<String>> {
    let mut rows = Vec::with_capacity(records.len() + 1);
    rows.push(summary_header(feed));
    rows.extend(records.iter().map(SummaryRecord::to_cells));
    rows
}
