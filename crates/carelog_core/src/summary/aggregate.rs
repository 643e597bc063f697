use crate::config::{FeedAggregation, MilestoneScope, SummaryConfig};
use crate::model::cells::round2;
use crate::model::record::{DailyLogEntry, GrowthEntry, MilestoneEntry, UserProfile};
use crate::model::summary::SummaryRecord;
use chrono::{Days, NaiveDate, NaiveDateTime};
use log::debug;
use std::collections::{HashMap, HashSet};

/// Trailing window `[start, ∞)` at calendar-date granularity.
///
/// Future-dated records are inside the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryWindow {
    start: NaiveDate,
}

impl SummaryWindow {
    /// Window covering `days` days back from the date of `now`.
    pub fn ending_at(now: NaiveDateTime, days: u32) -> Self {
        let start = now
            .date()
            .checked_sub_days(Days::new(u64::from(days)))
            .unwrap_or(NaiveDate::MIN);
        Self { start }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start
    }
}

/// Computes one summary per user, in user order.
///
/// Pure: nothing is read from or written to a store. Records referencing
/// unknown users are ignored.
pub fn recompute_summary(
    users: &[UserProfile],
    daily_logs: &[DailyLogEntry],
    growth: &[GrowthEntry],
    milestones: &[MilestoneEntry],
    now: NaiveDateTime,
    config: &SummaryConfig,
) -> Vec<SummaryRecord> {
    let window = SummaryWindow::ending_at(now, config.window_days);
    let daily_by_user = group_by_user(daily_logs, |entry| entry.username.as_str());
    let growth_by_user = group_by_user(growth, |entry| entry.username.as_str());
    let milestones_by_user = group_by_user(milestones, |entry| entry.username.as_str());

    let undated_logs = daily_logs
        .iter()
        .filter(|entry| entry.date().is_none())
        .count();
    debug!(
        "event=summary_aggregate module=summary status=start users={} daily_logs={} growth={} milestones={} undated_daily_logs={} window_start={}",
        users.len(),
        daily_logs.len(),
        growth.len(),
        milestones.len(),
        undated_logs,
        window.start()
    );

    users
        .iter()
        .map(|user| {
            let username = user.username.as_str();
            let mut record = SummaryRecord::empty(username);
            apply_daily_logs(
                &mut record,
                entries_for(&daily_by_user, username),
                window,
                config.feed_aggregation,
            );
            record.milestone_count = count_milestones(
                entries_for(&milestones_by_user, username),
                window,
                config.milestone_scope,
            );
            if let Some(latest) = latest_growth(entries_for(&growth_by_user, username)) {
                record.latest_weight = latest.weight_kg.clone();
                record.latest_height = latest.height_cm.clone();
            }
            record
        })
        .collect()
}

fn group_by_user<'a, T>(
    entries: &'a [T],
    username: impl Fn(&'a T) -> &'a str,
) -> HashMap<&'a str, Vec<&'a T>> {
    let mut grouped: HashMap<&str, Vec<&T>> = HashMap::new();
    for entry in entries {
        grouped.entry(username(entry)).or_default().push(entry);
    }
    grouped
}

fn entries_for<'m, 'a, T>(grouped: &'m HashMap<&str, Vec<&'a T>>, username: &str) -> &'m [&'a T] {
    grouped.get(username).map(Vec::as_slice).unwrap_or(&[])
}

fn apply_daily_logs(
    record: &mut SummaryRecord,
    logs: &[&DailyLogEntry],
    window: SummaryWindow,
    feed_aggregation: FeedAggregation,
) {
    let mut sleep_total = 0.0;
    let mut feed_total = 0.0;
    let mut feed_samples = 0usize;

    for entry in logs
        .iter()
        .filter(|entry| entry.date().is_some_and(|date| window.contains(date)))
    {
        if let Some(hours) = entry.sleep_hours {
            sleep_total += hours;
        }
        if let Some(volume) = entry.feed_ml {
            feed_total += volume;
            feed_samples += 1;
        }
        if let Some(count) = entry.wet_diapers {
            record.wet_diaper_total = record.wet_diaper_total.saturating_add(count);
        }
        if let Some(count) = entry.dirty_diapers {
            record.dirty_diaper_total = record.dirty_diaper_total.saturating_add(count);
        }
    }

    record.total_sleep_hours = round2(sleep_total);
    record.feed_ml = match feed_aggregation {
        FeedAggregation::Sum => round2(feed_total),
        FeedAggregation::Mean if feed_samples == 0 => 0.0,
        FeedAggregation::Mean => round2(feed_total / feed_samples as f64),
    };
}

fn count_milestones(
    milestones: &[&MilestoneEntry],
    window: SummaryWindow,
    scope: MilestoneScope,
) -> u32 {
    let distinct: HashSet<&str> = milestones
        .iter()
        .filter(|entry| match scope {
            MilestoneScope::AllTime => true,
            MilestoneScope::Rolling => entry.date().is_some_and(|date| window.contains(date)),
        })
        .filter_map(|entry| entry.achievement())
        .collect();
    u32::try_from(distinct.len()).unwrap_or(u32::MAX)
}

/// Latest-wins: maximum parseable date, later rows winning ties.
fn latest_growth<'a>(entries: &[&'a GrowthEntry]) -> Option<&'a GrowthEntry> {
    let mut latest: Option<(NaiveDate, &GrowthEntry)> = None;
    for entry in entries {
        let Some(date) = entry.date() else {
            continue;
        };
        match latest {
            Some((best, _)) if best > date => {}
            _ => latest = Some((date, *entry)),
        }
    }
    latest.map(|(_, entry)| entry)
}
