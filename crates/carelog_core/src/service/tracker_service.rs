//! Record-entry use-case service.
//!
//! # Responsibility
//! - Validate single records before they are appended to input collections.
//! - Enforce one entry per (username, date) for daily, growth and milestone
//!   logs.
//! - Correct a daily log date in place, addressed by stable row id.
//!
//! # Invariants
//! - Every write goes through validation first; nothing invalid is appended.
//! - Dates are stored normalized as `YYYY-MM-DD`.
//! - Log entries can only be written for registered users.

use crate::config::UserLayout;
use crate::model::cells::{parse_date, DATE_FORMAT};
use crate::model::collection::{Collection, RowId, StoredRow};
use crate::model::record::{DailyLogEntry, GrowthEntry, MilestoneEntry, UserProfile};
use crate::repo::collection_store::{CollectionStore, StoreError};
use crate::repo::record_repo::{data_rows, input_header, resolve_user_layout};
use chrono::{Datelike, NaiveDate};
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.\-]{0,31}$").expect("valid username regex"));

pub type TrackerResult<T> = Result<T, TrackerError>;

/// Service error for record-entry use-cases.
#[derive(Debug)]
pub enum TrackerError {
    /// One input field failed validation.
    InvalidField {
        field: &'static str,
        message: String,
    },
    UsernameTaken(String),
    UnknownUser(String),
    /// An entry for the same user and date already exists.
    DuplicateEntry {
        collection: Collection,
        log_date: NaiveDate,
    },
    Store(StoreError),
}

impl Display for TrackerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidField { field, message } => write!(f, "invalid {field}: {message}"),
            Self::UsernameTaken(username) => write!(f, "username already taken: `{username}`"),
            Self::UnknownUser(username) => write!(f, "username not found: `{username}`"),
            Self::DuplicateEntry {
                collection,
                log_date,
            } => write!(
                f,
                "an entry for {log_date} already exists in `{}`",
                collection.name()
            ),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TrackerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for TrackerError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Registration input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    /// Required by the seven-column layout, ignored otherwise.
    pub secret: Option<String>,
    pub child_name: String,
    pub date_of_birth: String,
    pub birth_weight: String,
    pub birth_height: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewDailyLog {
    pub username: String,
    pub log_date: String,
    pub sleep_hours: f64,
    pub feed_ml: f64,
    pub wet_diapers: i64,
    pub dirty_diapers: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewGrowthEntry {
    pub username: String,
    pub log_date: String,
    pub weight_kg: f64,
    pub height_cm: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMilestone {
    pub username: String,
    pub log_date: String,
    /// Free text; `None` records that nothing new happened.
    pub description: String,
}

/// Registration, login check and log-entry service over a collection store.
pub struct TrackerService<S: CollectionStore> {
    store: S,
    layout: UserLayout,
}

impl<S: CollectionStore> TrackerService<S> {
    pub fn new(store: S, layout: UserLayout) -> Self {
        Self { store, layout }
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Registers a user and derives the child's age in months from `today`.
    pub fn register_user(
        &mut self,
        input: &NewUser,
        today: NaiveDate,
    ) -> TrackerResult<UserProfile> {
        let username = input.username.trim();
        if !USERNAME_RE.is_match(username) {
            return Err(invalid(
                "username",
                "use 1-32 letters, digits, `.`, `_` or `-`, starting with a letter or digit",
            ));
        }
        let (layout, user_rows) = self.user_rows()?;
        if find_in(&user_rows, layout, username).is_some() {
            return Err(TrackerError::UsernameTaken(username.to_string()));
        }

        let secret = match layout {
            UserLayout::WithSecret => {
                let secret = input.secret.as_deref().unwrap_or("");
                if secret.is_empty() {
                    return Err(invalid("secret", "cannot be empty"));
                }
                Some(secret.to_string())
            }
            UserLayout::WithoutSecret => None,
        };

        let child_name = input.child_name.trim();
        if child_name.is_empty() {
            return Err(invalid("child_name", "cannot be empty"));
        }
        let date_of_birth = require_date("date_of_birth", &input.date_of_birth)?;
        if date_of_birth > today {
            return Err(invalid("date_of_birth", "cannot be in the future"));
        }
        let birth_weight = require_positive("birth_weight", &input.birth_weight)?;
        let birth_height = require_positive("birth_height", &input.birth_height)?;

        let profile = UserProfile {
            username: username.to_string(),
            secret,
            child_name: child_name.to_string(),
            date_of_birth: date_of_birth.format(DATE_FORMAT).to_string(),
            age_in_months: Some(age_in_months(date_of_birth, today)),
            birth_weight: birth_weight.to_string(),
            birth_height: birth_height.to_string(),
        };
        self.append(Collection::Users, profile.to_cells(layout))?;
        info!("event=user_register module=tracker status=ok");
        Ok(profile)
    }

    pub fn user_exists(&self, username: &str) -> TrackerResult<bool> {
        Ok(self.find_profile(username)?.is_some())
    }

    /// First profile registered under `username`.
    pub fn find_profile(&self, username: &str) -> TrackerResult<Option<UserProfile>> {
        let (layout, user_rows) = self.user_rows()?;
        Ok(find_in(&user_rows, layout, username.trim()))
    }

    /// Plain login check.
    ///
    /// The six-column layout stores no secret, so only existence is checked.
    pub fn verify_credentials(&self, username: &str, secret: Option<&str>) -> TrackerResult<bool> {
        let (layout, user_rows) = self.user_rows()?;
        let Some(profile) = find_in(&user_rows, layout, username.trim()) else {
            warn!("event=login_check module=tracker status=rejected reason=unknown_user");
            return Ok(false);
        };
        let accepted = match (layout, profile.secret.as_deref()) {
            (UserLayout::WithoutSecret, _) => true,
            (UserLayout::WithSecret, stored) => stored.is_some() && stored == secret,
        };
        if !accepted {
            warn!("event=login_check module=tracker status=rejected reason=secret_mismatch");
        }
        Ok(accepted)
    }

    pub fn log_daily(&mut self, input: &NewDailyLog) -> TrackerResult<RowId> {
        let log_date = require_date("log_date", &input.log_date)?;
        require_non_negative("sleep_hours", input.sleep_hours)?;
        require_non_negative("feed_ml", input.feed_ml)?;
        if input.wet_diapers < 0 {
            return Err(invalid("wet_diapers", "cannot be negative"));
        }
        if input.dirty_diapers < 0 {
            return Err(invalid("dirty_diapers", "cannot be negative"));
        }
        let username = input.username.trim();
        self.require_user(username)?;
        self.require_free_date(Collection::DailyLogs, username, log_date, None)?;

        let entry = DailyLogEntry {
            username: username.to_string(),
            log_date: log_date.format(DATE_FORMAT).to_string(),
            sleep_hours: Some(input.sleep_hours),
            feed_ml: Some(input.feed_ml),
            wet_diapers: Some(input.wet_diapers),
            dirty_diapers: Some(input.dirty_diapers),
        };
        self.append(Collection::DailyLogs, entry.to_cells())
    }

    pub fn log_growth(&mut self, input: &NewGrowthEntry) -> TrackerResult<RowId> {
        let log_date = require_date("log_date", &input.log_date)?;
        require_positive_value("weight_kg", input.weight_kg)?;
        require_positive_value("height_cm", input.height_cm)?;
        let username = input.username.trim();
        self.require_user(username)?;
        self.require_free_date(Collection::Growth, username, log_date, None)?;

        let entry = GrowthEntry {
            username: username.to_string(),
            log_date: log_date.format(DATE_FORMAT).to_string(),
            weight_kg: input.weight_kg.to_string(),
            height_cm: input.height_cm.to_string(),
        };
        self.append(Collection::Growth, entry.to_cells())
    }

    pub fn log_milestone(&mut self, input: &NewMilestone) -> TrackerResult<RowId> {
        let log_date = require_date("log_date", &input.log_date)?;
        let description = input.description.trim();
        if description.is_empty() {
            return Err(invalid("description", "type `None` if there is no milestone"));
        }
        if description.chars().all(|ch| ch.is_ascii_digit()) {
            return Err(invalid("description", "cannot be numeric only"));
        }
        let username = input.username.trim();
        self.require_user(username)?;
        self.require_free_date(Collection::Milestones, username, log_date, None)?;

        let entry = MilestoneEntry {
            username: username.to_string(),
            log_date: log_date.format(DATE_FORMAT).to_string(),
            description: description.to_string(),
        };
        self.append(Collection::Milestones, entry.to_cells())
    }

    /// Rewrites the date of one daily log, keeping the row identity.
    pub fn correct_daily_log_date(&mut self, row_id: RowId, new_date: &str) -> TrackerResult<()> {
        let log_date = require_date("log_date", new_date)?;
        let target = data_rows(self.store.read_all(Collection::DailyLogs)?)
            .find(|row| row.id == row_id)
            .ok_or(StoreError::RowNotFound {
                collection: Collection::DailyLogs,
                row_id,
            })?;
        let username = DailyLogEntry::from_cells(&target.cells).username;
        self.require_free_date(Collection::DailyLogs, &username, log_date, Some(row_id))?;

        self.store.update_cell(
            Collection::DailyLogs,
            row_id,
            DailyLogEntry::DATE_COLUMN,
            log_date.format(DATE_FORMAT).to_string(),
        )?;
        info!("event=daily_log_correct_date module=tracker status=ok");
        Ok(())
    }

    /// Stored user rows and the layout they are written in.
    fn user_rows(&self) -> TrackerResult<(UserLayout, Vec<StoredRow>)> {
        let rows = self.store.read_all(Collection::Users)?;
        Ok((resolve_user_layout(&rows, self.layout), rows))
    }

    fn require_user(&self, username: &str) -> TrackerResult<()> {
        if self.user_exists(username)? {
            Ok(())
        } else {
            Err(TrackerError::UnknownUser(username.to_string()))
        }
    }

    /// Rejects a second entry for (username, date); `ignore` skips the row
    /// being corrected.
    fn require_free_date(
        &self,
        collection: Collection,
        username: &str,
        log_date: NaiveDate,
        ignore: Option<RowId>,
    ) -> TrackerResult<()> {
        let taken = data_rows(self.store.read_all(collection)?)
            .filter(|row| Some(row.id) != ignore)
            .any(|row| {
                row.cells.first().map(String::as_str) == Some(username)
                    && row.cells.get(1).and_then(|raw| parse_date(raw)) == Some(log_date)
            });
        if taken {
            return Err(TrackerError::DuplicateEntry {
                collection,
                log_date,
            });
        }
        Ok(())
    }

    /// Appends one record, writing the canonical header first into an empty
    /// collection so the record is never read back as a header.
    fn append(&mut self, collection: Collection, cells: Vec<String>) -> TrackerResult<RowId> {
        if self.store.read_all(collection)?.is_empty() {
            if let Some(header) = input_header(collection, self.layout) {
                self.store.append_row(collection, header)?;
            }
        }
        let row_id = self.store.append_row(collection, cells)?;
        info!(
            "event=record_append module=tracker status=ok collection={}",
            collection.name()
        );
        Ok(row_id)
    }
}

fn find_in(user_rows: &[StoredRow], layout: UserLayout, username: &str) -> Option<UserProfile> {
    user_rows
        .iter()
        .skip(1)
        .map(|row| UserProfile::from_cells(&row.cells, layout))
        .find(|profile| profile.username == username)
}

/// Whole months between birth and `today`, ignoring the day of month.
pub fn age_in_months(date_of_birth: NaiveDate, today: NaiveDate) -> i64 {
    i64::from(today.year() - date_of_birth.year()) * 12 + i64::from(today.month())
        - i64::from(date_of_birth.month())
}

fn invalid(field: &'static str, message: &str) -> TrackerError {
    TrackerError::InvalidField {
        field,
        message: message.to_string(),
    }
}

fn require_date(field: &'static str, raw: &str) -> TrackerResult<NaiveDate> {
    parse_date(raw).ok_or_else(|| invalid(field, "expected a YYYY-MM-DD date"))
}

fn require_non_negative(field: &'static str, value: f64) -> TrackerResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(invalid(field, "expected a non-negative number"));
    }
    Ok(())
}

fn require_positive_value(field: &'static str, value: f64) -> TrackerResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid(field, "expected a positive number"));
    }
    Ok(())
}

fn require_positive(field: &'static str, raw: &str) -> TrackerResult<f64> {
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| invalid(field, "expected a number"))?;
    require_positive_value(field, value)?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::{age_in_months, USERNAME_RE};
    use chrono::NaiveDate;

    #[test]
    fn age_counts_calendar_months() {
        let dob = NaiveDate::from_ymd_opt(2023, 11, 28).unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        assert_eq!(age_in_months(dob, today), 3);
        assert_eq!(age_in_months(today, today), 0);
    }

    #[test]
    fn username_pattern_rejects_spaces_and_leading_symbols() {
        assert!(USERNAME_RE.is_match("alice_01"));
        assert!(!USERNAME_RE.is_match("al ice"));
        assert!(!USERNAME_RE.is_match("-alice"));
        assert!(!USERNAME_RE.is_match(""));
    }
}
