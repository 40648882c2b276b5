/// Round to an integer and group thousands with `,` (`1234567.4` → `"1,234,567"`).
pub fn format_thousands(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0.0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `£` amount for table cells.
pub fn format_pounds(value: f64) -> String {
    format!("£{}", format_thousands(value))
}

/// Shorten long labels (axis ticks) to `max` characters with an ellipsis.
pub fn truncate(label: &str, max: usize) -> String {
    if label.chars().count() <= max {
        label.to_string()
    } else {
        let kept: String = label.chars().take(max.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousands() {
        assert_eq!(format_thousands(0.0), "0");
        assert_eq!(format_thousands(999.0), "999");
        assert_eq!(format_thousands(1000.0), "1,000");
        assert_eq!(format_thousands(1_234_567.4), "1,234,567");
        assert_eq!(format_thousands(999_999.6), "1,000,000");
        assert_eq!(format_thousands(-4_000_000.0), "-4,000,000");
        assert_eq!(format_thousands(-0.2), "0");
    }

    #[test]
    fn pounds_and_truncation() {
        assert_eq!(format_pounds(1_500_000.0), "£1,500,000");
        assert_eq!(truncate("Short", 10), "Short");
        assert_eq!(truncate("A very long provider name", 8), "A very …");
    }
}
