//! Price formatting for user-facing output

/// Format a price as dollars with thousands separators and two decimals.
///
/// `456789.126` becomes `"$456,789.13"`; negatives are rendered `"-$1,000.00"`.
pub fn format_price(value: f64) -> String {
    if !value.is_finite() {
        return format!("${}", value);
    }

    let rounded = format!("{:.2}", value.abs());
    let (whole, cents) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    // "-0.00" should not carry a sign
    let sign = if value < 0.0 && rounded != "0.00" { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, cents)
}
