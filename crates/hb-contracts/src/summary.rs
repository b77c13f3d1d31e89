//! Project summary request contracts
//!
//! Both requests arrive as loosely typed input (path segments, JSON) and are turned into
//! typed requests here, collecting every problem instead of stopping at the first.

use chrono::{DateTime, Duration, NaiveDate};
use hb_core::error::ValidationErrors;
use hb_core::traits::Id;
use hb_core::types::DateRange;
use serde::{Deserialize, Serialize};

/// Days covered by a summary view when no start date is given
pub const DEFAULT_SUMMARY_DAYS: i64 = 30;

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp (its date part is kept)
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
}

fn required_date(field: &str, value: Option<&str>, errors: &mut ValidationErrors) -> Option<NaiveDate> {
    match value.map(str::trim) {
        None | Some("") => {
            errors.add(field, "is required");
            None
        }
        Some(raw) => optional_date(field, Some(raw), errors),
    }
}

fn optional_date(field: &str, value: Option<&str>, errors: &mut ValidationErrors) -> Option<NaiveDate> {
    let raw = value.map(str::trim).filter(|v| !v.is_empty())?;
    let parsed = parse_date(raw);
    if parsed.is_none() {
        errors.add(field, "is not a valid date");
    }
    parsed
}

/// Request to view the summary of a project
#[derive(Debug, Clone, PartialEq)]
pub struct ViewProjectSummaryRequest {
    pub id: Id,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl ViewProjectSummaryRequest {
    /// `id` must be numeric; both dates are optional but must parse when present
    pub fn parse(id: &str, start: Option<&str>, end: Option<&str>) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let id = match id.trim() {
            "" => {
                errors.add("id", "is required");
                None
            }
            raw => {
                let parsed = raw.parse::<Id>().ok();
                if parsed.is_none() {
                    errors.add("id", "must be a number");
                }
                parsed
            }
        };
        let start = optional_date("startDate", start, &mut errors);
        let end = optional_date("endDate", end, &mut errors);

        match id {
            Some(id) if errors.is_empty() => Ok(Self { id, start, end }),
            _ => Err(errors),
        }
    }

    /// The requested range; a missing end means `today`, a missing start means
    /// `DEFAULT_SUMMARY_DAYS` before the end
    pub fn range(&self, today: NaiveDate) -> DateRange {
        let end = self.end.unwrap_or(today);
        let start = self
            .start
            .unwrap_or_else(|| end - Duration::days(DEFAULT_SUMMARY_DAYS));
        DateRange::new(start, end)
    }
}

/// Raw body of the "email the project summary" mutation
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EmailProjectSummaryInput {
    pub id: Option<Id>,
    pub start: Option<String>,
    pub end: Option<String>,
    #[serde(default)]
    pub email: Option<Vec<String>>,
}

/// Validated request to email a project summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailProjectSummaryRequest {
    pub id: Id,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Additional recipients besides the project's customer
    pub email: Vec<String>,
}

impl EmailProjectSummaryRequest {
    pub fn range(&self) -> DateRange {
        DateRange::new(self.start, self.end)
    }
}

impl TryFrom<EmailProjectSummaryInput> for EmailProjectSummaryRequest {
    type Error = ValidationErrors;

    fn try_from(input: EmailProjectSummaryInput) -> Result<Self, Self::Error> {
        let mut errors = ValidationErrors::new();

        if input.id.is_none() {
            errors.add("id", "is required");
        }
        let start = required_date("start", input.start.as_deref(), &mut errors);
        let end = required_date("end", input.end.as_deref(), &mut errors);

        let email = input.email.unwrap_or_default();
        for (index, address) in email.iter().enumerate() {
            if !validator::validate_email(address.as_str()) {
                errors.add(format!("email.{}", index), "must be a valid email address");
            }
        }

        match (input.id, start, end) {
            (Some(id), Some(start), Some(end)) if errors.is_empty() => Ok(Self {
                id,
                start,
                end,
                email,
            }),
            _ => Err(errors),
        }
    }
}
