//! Hour bucketer
//!
//! Groups a project's time entries into at most [`MAX_BUCKETS`] buckets. The span of the
//! requested range picks the bucket size:
//!
//! | Span (days) | Granularity | Label       |
//! |-------------|-------------|-------------|
//! | 0 - 13      | day         | `MM/DD`     |
//! | 14 - 91     | ISO week    | `WW nn`     |
//! | 92 and up   | month       | `YYYY/MM`   |
//!
//! Buckets are generated from the end of the range backwards, one step at a time, until the
//! next step would fall before the start. The most recent period is therefore always a whole
//! bucket. Output is chronological.
//!
//! An entry whose label matches no generated bucket is handled by the configured
//! [`UnmatchedEntries`] policy and counted in [`Chart::unmatched`].

use chrono::{Datelike, Days, NaiveDate};
use hb_core::types::{DateRange, UnmatchedEntries};
use hb_db::{RepositoryResult, Store};
use hb_models::{Project, TimeEntry};
use serde::Serialize;

/// Upper bound on the number of buckets in a chart
pub const MAX_BUCKETS: u32 = 13;

/// Largest span (in days) charted per day
const DAY_SPAN: i64 = 13;

/// Largest span (in days) charted per week
const WEEK_SPAN: i64 = 91;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Days,
    Weeks,
    Months,
}

impl Granularity {
    pub fn for_span(days: i64) -> Self {
        if days <= DAY_SPAN {
            Granularity::Days
        } else if days <= WEEK_SPAN {
            Granularity::Weeks
        } else {
            Granularity::Months
        }
    }

    pub fn label(&self, date: NaiveDate) -> String {
        match self {
            Granularity::Days => date.format("%m/%d").to_string(),
            Granularity::Weeks => format!("WW {:02}", date.iso_week().week()),
            Granularity::Months => date.format("%Y/%m").to_string(),
        }
    }

    /// One period before `date`.
    ///
    /// A month step keeps the day of month and rolls over when the previous month is shorter,
    /// so Dec 31 steps to Dec 1 (Nov 31) and Mar 30 to Mar 2 (Feb 30).
    pub fn step_back(&self, date: NaiveDate) -> Option<NaiveDate> {
        match self {
            Granularity::Days => date.checked_sub_days(Days::new(1)),
            Granularity::Weeks => date.checked_sub_days(Days::new(7)),
            Granularity::Months => {
                let (year, month) = match date.month() {
                    1 => (date.year() - 1, 12),
                    m => (date.year(), m - 1),
                };
                NaiveDate::from_ymd_opt(year, month, 1)?
                    .checked_add_days(Days::new(u64::from(date.day() - 1)))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub label: String,
    pub hours: f64,
}

/// Charted hours, oldest bucket first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub granularity: Granularity,
    pub buckets: Vec<Bucket>,
    /// Entries whose label matched no bucket
    pub unmatched: usize,
}

/// Parallel label/value arrays, as served to chart widgets
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub data: Vec<f64>,
}

impl Chart {
    /// Bucket `entries` over `range`. Entries dated outside the range are ignored.
    pub fn from_entries(range: DateRange, entries: &[TimeEntry], policy: UnmatchedEntries) -> Self {
        let granularity = Granularity::for_span(range.span_days());
        let mut buckets = empty_buckets(granularity, range);

        let mut unmatched = 0;
        for entry in entries.iter().filter(|e| range.contains(e.date)) {
            let label = granularity.label(entry.date);
            match buckets.iter_mut().find(|b| b.label == label) {
                Some(bucket) => bucket.hours += entry.hours,
                None => {
                    unmatched += 1;
                    if policy == UnmatchedEntries::FoldIntoOldest {
                        if let Some(oldest) = buckets.first_mut() {
                            oldest.hours += entry.hours;
                        }
                    }
                }
            }
        }

        Self {
            granularity,
            buckets,
            unmatched,
        }
    }

    pub fn labels(&self) -> Vec<String> {
        self.buckets.iter().map(|b| b.label.clone()).collect()
    }

    pub fn data(&self) -> Vec<f64> {
        self.buckets.iter().map(|b| b.hours).collect()
    }

    pub fn hours_for(&self, label: &str) -> Option<f64> {
        self.buckets
            .iter()
            .find(|b| b.label == label)
            .map(|b| b.hours)
    }

    pub fn series(&self) -> ChartSeries {
        ChartSeries {
            labels: self.labels(),
            data: self.data(),
        }
    }
}

/// Zeroed buckets anchored at `range.end`, oldest first
fn empty_buckets(granularity: Granularity, range: DateRange) -> Vec<Bucket> {
    let mut buckets: Vec<Bucket> = Vec::new();
    let mut cursor = range.end;

    // A step that repeats a label still counts towards the limit
    for _ in 0..MAX_BUCKETS {
        let label = granularity.label(cursor);
        if !buckets.iter().any(|b| b.label == label) {
            buckets.push(Bucket { label, hours: 0.0 });
        }

        match granularity.step_back(cursor) {
            Some(previous) if previous >= range.start => cursor = previous,
            _ => break,
        }
    }

    buckets.reverse();
    buckets
}

/// Charts a project's hours from the data store
pub struct HourBucketer<'a, S: Store + ?Sized> {
    store: &'a S,
    policy: UnmatchedEntries,
}

impl<'a, S: Store + ?Sized> HourBucketer<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            policy: UnmatchedEntries::default(),
        }
    }

    pub fn with_policy(mut self, policy: UnmatchedEntries) -> Self {
        self.policy = policy;
        self
    }

    /// Chart the hours logged against `project` within `range`
    #[tracing::instrument(skip(self, project), fields(project_id = project.id))]
    pub async fn chart_hours(&self, project: &Project, range: DateRange) -> RepositoryResult<Chart> {
        let entries = self.store.time_entries_between(project.id, range).await?;
        let chart = Chart::from_entries(range, &entries, self.policy);

        tracing::debug!(
            granularity = ?chart.granularity,
            buckets = chart.buckets.len(),
            entries = entries.len(),
            unmatched = chart.unmatched,
            "Charted project hours"
        );
        if chart.unmatched > 0 {
            tracing::warn!(
                unmatched = chart.unmatched,
                policy = %self.policy,
                "Time entries fell outside every chart bucket"
            );
        }

        Ok(chart)
    }
}
