//! Currency and date formatting for the rendered invoice.
//!
//! Amounts are rupiah with comma thousands groups and two decimals
//! (`Rp 700,000.00`); dates render as `Jan 15, 2024`. Missing dates render
//! as an empty string so blank form fields stay blank on the sheet.

use chrono::NaiveDate;

/// Format a rupiah amount: `Rp 1,234,567.89`.
///
/// Negative amounts keep the sign between the currency marker and the
/// digits (`Rp -300,000.00`) — balance due may go negative and is not
/// clamped. Non-finite input formats as zero.
pub fn format_rupiah(amount: f64) -> String {
    let amount = if amount.is_finite() { amount } else { 0.0 };
    // Round to whole cents first so e.g. 0.005 doesn't split inconsistently
    // between the integer and fractional parts.
    let cents = (amount * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    let whole = cents / 100;
    let frac = cents % 100;
    format!("Rp {}{}.{:02}", sign, group_thousands(whole), frac)
}

/// Insert comma separators every three digits: `1234567` → `1,234,567`.
fn group_thousands(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut groups: Vec<String> = Vec::new();
    while value > 0 {
        groups.push(format!("{:03}", value % 1000));
        value /= 1000;
    }
    // The most significant group loses its zero padding.
    let mut out = groups.pop().map(|g| g.trim_start_matches('0').to_string()).unwrap_or_default();
    if out.is_empty() {
        out = "0".to_string();
    }
    for g in groups.iter().rev() {
        out.push(',');
        out.push_str(g);
    }
    out
}

/// Format an optional calendar date as `Jan 15, 2024`; `None` is blank.
pub fn format_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(d) => d.format("%b %d, %Y").to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn format_basic_amounts() {
        assert_eq!(format_rupiah(700_000.0), "Rp 700,000.00");
        assert_eq!(format_rupiah(350_000.0), "Rp 350,000.00");
        assert_eq!(format_rupiah(1_234_567.89), "Rp 1,234,567.89");
        assert_eq!(format_rupiah(0.0), "Rp 0.00");
    }

    #[test]
    fn format_small_and_negative() {
        assert_eq!(format_rupiah(12.5), "Rp 12.50");
        assert_eq!(format_rupiah(-300_000.0), "Rp -300,000.00");
        assert_eq!(format_rupiah(-0.25), "Rp -0.25");
    }

    #[test]
    fn non_finite_formats_as_zero() {
        assert_eq!(format_rupiah(f64::NAN), "Rp 0.00");
        assert_eq!(format_rupiah(f64::INFINITY), "Rp 0.00");
    }

    #[test]
    fn grouping_edge_cases() {
        assert_eq!(format_rupiah(1_000.0), "Rp 1,000.00");
        assert_eq!(format_rupiah(999.99), "Rp 999.99");
        assert_eq!(format_rupiah(100_000_000.0), "Rp 100,000,000.00");
    }

    #[test]
    fn date_formatting() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 15);
        assert_eq!(format_date(d), "Jan 15, 2024");
        assert_eq!(format_date(None), "");
    }
}
