//! Hour display

/// Hours rounded to two decimals, without trailing zeros or a bare decimal point
pub fn format_hours(hours: f64) -> String {
    let text = format!("{:.2}", hours);
    let trimmed = text.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}
