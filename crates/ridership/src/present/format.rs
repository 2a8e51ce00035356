//! Number and date labels in the dashboard's display conventions.

use chrono::NaiveDate;

/// Integer with `.` as the thousands separator (`1234567` -> `1.234.567`)
pub fn thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}

/// Rounded float with `.` thousands; negative values keep their sign
pub fn thousands_f64(value: f64) -> String {
    if !value.is_finite() {
        return "-".to_string();
    }
    let rounded = value.round();
    let body = thousands(rounded.abs() as u64);
    if rounded < 0.0 {
        format!("-{body}")
    } else {
        body
    }
}

pub fn percent(value: f64) -> String {
    format!("{value:.1}%")
}

/// Percentage with an explicit sign, `-` when undefined
pub fn signed_percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:+.1}%"),
        None => "-".to_string(),
    }
}

/// `Jan 2021`
pub fn month_label(month: NaiveDate) -> String {
    month.format("%b %Y").to_string()
}

/// `2021-01`
pub fn month_key(month: NaiveDate) -> String {
    month.format("%Y-%m").to_string()
}
