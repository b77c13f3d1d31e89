//! # hb-reports
//!
//! Reporting for Hourbook.
//!
//! - `chart`: the hour bucketer, which groups a project's hours into at most 13 day, week or
//!   month buckets
//! - `summary`: the project summary shown on screen and mailed to customers
//! - `project_log`: the per-work-item CSV export
//! - `hours`: hour formatting shared by the log and the summary mail

pub mod chart;
pub mod hours;
pub mod project_log;
pub mod summary;

pub use chart::{Bucket, Chart, ChartSeries, Granularity, HourBucketer, MAX_BUCKETS};
pub use hours::format_hours;
pub use project_log::ProjectLog;
pub use summary::{ProjectSummary, SummaryGenerator, WorkItemSummary};
