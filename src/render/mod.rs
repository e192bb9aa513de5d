//! Print (HTML) and PDF renderers.
//!
//! Both paths take finished builder output and an [`InvoiceSummary`]; neither
//! does any arithmetic beyond formatting.
//!
//! [`InvoiceSummary`]: crate::billing::InvoiceSummary

pub mod pdf;
pub mod print;

/// Two decimals with Indian digit grouping: `1,50,000.00`.
pub fn format_money(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (int_part, dec_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let digits: Vec<char> = int_part.chars().collect();
    let mut groups: Vec<String> = Vec::new();
    let mut end = digits.len();
    let mut width = 3;
    while end > 0 {
        let start = end.saturating_sub(width);
        groups.push(digits[start..end].iter().collect());
        end = start;
        width = 2;
    }
    groups.reverse();

    let sign = if value < 0.0 && formatted != "0.00" { "-" } else { "" };
    format!("{}{}.{}", sign, groups.join(","), dec_part)
}

pub fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(pct) if pct > 0.0 => format!("{}%", pct),
        _ => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_money_grouping() {
        assert_eq!(format_money(0.0), "0.00");
        assert_eq!(format_money(999.5), "999.50");
        assert_eq!(format_money(1000.0), "1,000.00");
        assert_eq!(format_money(150000.0), "1,50,000.00");
        assert_eq!(format_money(12345678.9), "1,23,45,678.90");
        assert_eq!(format_money(-2500.0), "-2,500.00");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(Some(18.0)), "18%");
        assert_eq!(format_percent(Some(0.0)), "-");
        assert_eq!(format_percent(None), "-");
    }
}
