//! Project summary page and mail

use std::fmt::Write;

use hb_reports::{format_hours as hours, ProjectSummary};

use crate::email::{EmailAddress, EmailMessage};

/// Pixel height of the tallest chart bar
const CHART_HEIGHT: f64 = 600.0;

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Renders a `ProjectSummary` as an HTML page, a text body, or a complete mail
pub struct SummaryMailRenderer {
    from_address: EmailAddress,
    base_url: String,
}

impl SummaryMailRenderer {
    pub fn new(base_url: impl Into<String>, from_address: EmailAddress) -> Self {
        Self {
            from_address,
            base_url: base_url.into(),
        }
    }

    pub fn subject(summary: &ProjectSummary) -> String {
        format!("Project {} Summary", summary.project.name)
    }

    pub fn render(&self, summary: &ProjectSummary, to: Vec<EmailAddress>) -> EmailMessage {
        EmailMessage::new(
            self.from_address.clone(),
            to,
            Self::subject(summary),
            self.render_text(summary),
        )
        .with_html(self.render_html(summary))
        .header("X-Hourbook-Project", summary.project.id.to_string())
    }

    pub fn render_text(&self, summary: &ProjectSummary) -> String {
        let mut body = String::new();
        let _ = writeln!(body, "{}", summary.project.name);
        let _ = writeln!(
            body,
            "{} to {}\n",
            summary.range.start.format("%Y-%m-%d"),
            summary.range.end.format("%Y-%m-%d")
        );
        let _ = writeln!(body, "Total Hours: {}", hours(summary.hours_ordered));
        let _ = writeln!(body, "Hours Remaining: {}", hours(summary.hours_remaining));
        let _ = writeln!(body, "Work Items: {}", summary.work_item_count);
        let _ = writeln!(body, "Open Items: {}\n", summary.open_work_item_count);

        body.push_str("Hours\n");
        for (label, value) in summary.chart.labels.iter().zip(&summary.chart.data) {
            let _ = writeln!(body, "  {}: {}", label, hours(*value));
        }

        body.push_str("\nWork Items\n");
        for item in &summary.work_items {
            let _ = writeln!(
                body,
                "  #{} {} ({}): {}",
                item.id,
                item.name,
                item.start_date.format("%Y-%m-%d"),
                hours(item.hours)
            );
        }

        let _ = writeln!(
            body,
            "\nTotal Hours: {}  Rebated: {}",
            hours(summary.total),
            hours(summary.rebated)
        );
        let _ = writeln!(body, "\n{}/projects/{}", self.base_url, summary.project.id);
        body
    }

    pub fn render_html(&self, summary: &ProjectSummary) -> String {
        let name = escape(&summary.project.name);
        let max = summary.chart.data.iter().copied().fold(0.0_f64, f64::max);

        let mut bars = String::new();
        for value in &summary.chart.data {
            if *value <= 0.0 || max <= 0.0 {
                let _ = write!(bars, "<td>{}</td>", hours(*value));
            } else {
                let height = value / max * CHART_HEIGHT;
                let _ = write!(
                    bars,
                    r#"<td><div style="background-color: lightblue; height: {:.0}px;">{}</div></td>"#,
                    height,
                    hours(*value)
                );
            }
        }

        let mut labels = String::new();
        for label in &summary.chart.labels {
            let _ = write!(labels, r#"<td class="border" align="center">{}</td>"#, escape(label));
        }

        let mut rows = String::new();
        for item in &summary.work_items {
            let _ = write!(
                rows,
                r#"<tr style="border-bottom: 1px solid black;"><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>"#,
                item.id,
                escape(&item.name),
                item.start_date.format("%Y-%m-%d"),
                hours(item.hours)
            );
        }

        format!(
            r#"<!DOCTYPE html>
<html lang="en-us">
<head>
    <meta charset="utf-8">
    <title>Project {name} Summary</title>
    <style>
        body {{ margin: 0; padding: 0; font-family: sans-serif; }}
        table {{ border-collapse: collapse; }}
        .border {{ border: 1px solid black; }}
        .tile {{ width: 200px; background: lightgray; border: 1px solid white; padding: 5px; text-align: center; }}
    </style>
</head>
<body>
<table align="center">
    <tr><td colspan="4" align="center" style="font-size: x-large; font-weight: bold; padding: 5px;">{name}</td></tr>
    <tr>
        <td class="tile">Total Hours<br/><b>{ordered}</b></td>
        <td class="tile">Hours Remaining<br/><b>{remaining}</b></td>
        <td class="tile">Work Items<br/><b>{work_items}</b></td>
        <td class="tile">Open Items<br/><b>{open_items}</b></td>
    </tr>
    <tr><td colspan="4">
        <table width="100%">
            <tr><td colspan="{columns}" align="center" style="font-weight: bold; font-size: large;">Hours</td></tr>
            <tr class="border" style="height: 600px;" valign="bottom" align="center">{bars}</tr>
            <tr>{labels}</tr>
        </table>
    </td></tr>
    <tr><td colspan="4" class="border">
        <table width="100%">
            <thead>
            <tr style="background-color: lightgray;">
                <th align="left">Work Item</th>
                <th align="left">Title</th>
                <th align="left">Date</th>
                <th align="left">Total Hours</th>
            </tr>
            </thead>
            <tbody>{rows}</tbody>
            <tfoot>
            <tr style="background-color: lightgray;">
                <td colspan="3"></td>
                <td>Total Hours: <b>{total}</b>&nbsp;&nbsp;Rebated: <b>{rebated}</b></td>
            </tr>
            </tfoot>
        </table>
    </td></tr>
    <tr><td colspan="4"><a href="{base_url}/projects/{id}">Open in Hourbook</a></td></tr>
</table>
</body>
</html>"#,
            name = name,
            ordered = hours(summary.hours_ordered),
            remaining = hours(summary.hours_remaining),
            work_items = summary.work_item_count,
            open_items = summary.open_work_item_count,
            columns = summary.chart.labels.len(),
            bars = bars,
            labels = labels,
            rows = rows,
            total = hours(summary.total),
            rebated = hours(summary.rebated),
            base_url = self.base_url,
            id = summary.project.id,
        )
    }
}
