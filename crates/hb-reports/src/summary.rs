//! Project summary
//!
//! Everything the summary page and the summary e-mail show about a project. Only the chart
//! is limited to the requested range; the hour totals cover the project's whole history.

use std::collections::HashMap;

use chrono::NaiveDate;
use hb_core::traits::Id;
use hb_core::types::{DateRange, UnmatchedEntries};
use hb_db::{RepositoryResult, Store};
use hb_models::{Project, TimeEntry};
use serde::Serialize;

use crate::chart::{ChartSeries, HourBucketer};

/// One row of the per-work-item table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkItemSummary {
    pub id: Id,
    pub name: String,
    pub start_date: NaiveDate,
    pub is_open: bool,
    pub hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectSummary {
    pub project: Project,
    pub range: DateRange,
    /// Sum of the absolute hours of every rebate
    pub rebated: f64,
    /// Sum of every non-negative entry
    pub total: f64,
    pub chart: ChartSeries,
    pub hours_ordered: f64,
    /// Ordered hours minus all logged hours (rebates included)
    pub hours_remaining: f64,
    pub work_item_count: usize,
    pub open_work_item_count: usize,
    pub work_items: Vec<WorkItemSummary>,
}

/// Split hours into (rebated, total)
pub fn rebated_and_total(entries: &[TimeEntry]) -> (f64, f64) {
    entries.iter().fold((0.0, 0.0), |(rebated, total), e| {
        if e.is_rebate() {
            (rebated + e.hours.abs(), total)
        } else {
            (rebated, total + e.hours)
        }
    })
}

pub struct SummaryGenerator<'a, S: Store + ?Sized> {
    store: &'a S,
    policy: UnmatchedEntries,
}

impl<'a, S: Store + ?Sized> SummaryGenerator<'a, S> {
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

    #[tracing::instrument(skip(self, project), fields(project_id = project.id))]
    pub async fn generate(&self, project: &Project, range: DateRange) -> RepositoryResult<ProjectSummary> {
        let chart = HourBucketer::new(self.store)
            .with_policy(self.policy)
            .chart_hours(project, range)
            .await?;

        let entries = self.store.time_entries_for_project(project.id).await?;
        let work_items = self.store.work_items_for_project(project.id).await?;
        let orders = self.store.orders_for_project(project.id).await?;

        let (rebated, total) = rebated_and_total(&entries);
        let used: f64 = entries.iter().map(|e| e.hours).sum();
        let hours_ordered: f64 = orders.iter().map(|o| o.hours).sum();

        let mut hours_by_item: HashMap<Id, f64> = HashMap::new();
        for entry in &entries {
            *hours_by_item.entry(entry.work_item_id).or_default() += entry.hours;
        }

        let rows: Vec<WorkItemSummary> = work_items
            .iter()
            .map(|wi| WorkItemSummary {
                id: wi.id,
                name: wi.name.clone(),
                start_date: wi.start_date,
                is_open: wi.is_open,
                hours: hours_by_item.get(&wi.id).copied().unwrap_or_default(),
            })
            .collect();

        let summary = ProjectSummary {
            project: project.clone(),
            range,
            rebated,
            total,
            chart: chart.series(),
            hours_ordered,
            hours_remaining: hours_ordered - used,
            work_item_count: rows.len(),
            open_work_item_count: rows.iter().filter(|r| r.is_open).count(),
            work_items: rows,
        };

        tracing::debug!(
            rebated = summary.rebated,
            total = summary.total,
            work_items = summary.work_item_count,
            "Generated project summary"
        );
        Ok(summary)
    }
}
