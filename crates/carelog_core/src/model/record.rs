//! Typed views over input collection rows.
//!
//! # Responsibility
//! - Map positional cells to named fields for each input collection.
//! - Map validated writer input back to cells in canonical column order.
//!
//! # Invariants
//! - `from_cells` never fails; short rows read blank trailing cells.
//! - Dates stay raw text; callers parse with `date()` and skip on `None`.

use crate::config::UserLayout;
use crate::model::cells::{cell, parse_amount, parse_count, parse_date};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Registered parent account and child birth details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    /// Absent in the six-column layout.
    pub secret: Option<String>,
    pub child_name: String,
    pub date_of_birth: String,
    /// Derived once at registration; not refreshed afterwards.
    pub age_in_months: Option<i64>,
    pub birth_weight: String,
    pub birth_height: String,
}

impl UserProfile {
    pub fn from_cells(cells: &[String], layout: UserLayout) -> Self {
        let shift = layout.shift();
        let secret = match layout {
            UserLayout::WithSecret => Some(cell(cells, 1).to_string()),
            UserLayout::WithoutSecret => None,
        };
        Self {
            username: cell(cells, 0).to_string(),
            secret,
            child_name: cell(cells, 1 + shift).to_string(),
            date_of_birth: cell(cells, 2 + shift).to_string(),
            age_in_months: parse_count(cell(cells, 3 + shift)),
            birth_weight: cell(cells, 4 + shift).to_string(),
            birth_height: cell(cells, 5 + shift).to_string(),
        }
    }

    pub fn to_cells(&self, layout: UserLayout) -> Vec<String> {
        let mut cells = Vec::with_capacity(layout.column_count());
        cells.push(self.username.clone());
        if layout == UserLayout::WithSecret {
            cells.push(self.secret.clone().unwrap_or_default());
        }
        cells.push(self.child_name.clone());
        cells.push(self.date_of_birth.clone());
        cells.push(
            self.age_in_months
                .map(|months| months.to_string())
                .unwrap_or_default(),
        );
        cells.push(self.birth_weight.clone());
        cells.push(self.birth_height.clone());
        cells
    }
}

/// Canonical user header for the given layout.
pub fn user_header(layout: UserLayout) -> Vec<String> {
    let mut header = vec!["Username".to_string()];
    if layout == UserLayout::WithSecret {
        header.push("Secret".to_string());
    }
    header.extend(
        [
            "Baby Name",
            "Date of Birth",
            "Age (months)",
            "Birth Weight (kg)",
            "Birth Height (cm)",
        ]
        .iter()
        .map(|label| (*label).to_string()),
    );
    header
}

/// One day of sleep, feeding and diaper counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyLogEntry {
    pub username: String,
    pub log_date: String,
    pub sleep_hours: Option<f64>,
    pub feed_ml: Option<f64>,
    pub wet_diapers: Option<i64>,
    pub dirty_diapers: Option<i64>,
}

impl DailyLogEntry {
    pub const DATE_COLUMN: usize = 1;

    pub fn from_cells(cells: &[String]) -> Self {
        Self {
            username: cell(cells, 0).to_string(),
            log_date: cell(cells, 1).to_string(),
            sleep_hours: parse_amount(cell(cells, 2)),
            feed_ml: parse_amount(cell(cells, 3)),
            wet_diapers: parse_count(cell(cells, 4)),
            dirty_diapers: parse_count(cell(cells, 5)),
        }
    }

    pub fn to_cells(&self) -> Vec<String> {
        vec![
            self.username.clone(),
            self.log_date.clone(),
            self.sleep_hours
                .map(|hours| hours.to_string())
                .unwrap_or_default(),
            self.feed_ml
                .map(|volume| volume.to_string())
                .unwrap_or_default(),
            self.wet_diapers
                .map(|count| count.to_string())
                .unwrap_or_default(),
            self.dirty_diapers
                .map(|count| count.to_string())
                .unwrap_or_default(),
        ]
    }

    pub fn date(&self) -> Option<NaiveDate> {
        parse_date(&self.log_date)
    }
}

/// One weight/height measurement.
///
/// Measurements are kept as raw cell text so the summary reports exactly what
/// was recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrowthEntry {
    pub username: String,
    pub log_date: String,
    pub weight_kg: String,
    pub height_cm: String,
}

impl GrowthEntry {
    pub fn from_cells(cells: &[String]) -> Self {
        Self {
            username: cell(cells, 0).to_string(),
            log_date: cell(cells, 1).to_string(),
            weight_kg: cell(cells, 2).to_string(),
            height_cm: cell(cells, 3).to_string(),
        }
    }

    pub fn to_cells(&self) -> Vec<String> {
        vec![
            self.username.clone(),
            self.log_date.clone(),
            self.weight_kg.clone(),
            self.height_cm.clone(),
        ]
    }

    pub fn date(&self) -> Option<NaiveDate> {
        parse_date(&self.log_date)
    }
}

/// Free-text developmental milestone, or a "none" sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneEntry {
    pub username: String,
    pub log_date: String,
    pub description: String,
}

impl MilestoneEntry {
    pub fn from_cells(cells: &[String]) -> Self {
        Self {
            username: cell(cells, 0).to_string(),
            log_date: cell(cells, 1).to_string(),
            description: cell(cells, 2).to_string(),
        }
    }

    pub fn to_cells(&self) -> Vec<String> {
        vec![
            self.username.clone(),
            self.log_date.clone(),
            self.description.clone(),
        ]
    }

    pub fn date(&self) -> Option<NaiveDate> {
        parse_date(&self.log_date)
    }

    /// Returns the trimmed description when it names a real milestone.
    ///
    /// Blank text and anything containing `none` (any case) do not count.
    /// Milestones are deduplicated on this trimmed text, so `" Crawling"`
    /// and `"Crawling"` are the same achievement.
    pub fn achievement(&self) -> Option<&str> {
        let trimmed = self.description.trim();
        if trimmed.is_empty() || trimmed.to_lowercase().contains("none") {
            return None;
        }
        Some(trimmed)
    }
}
