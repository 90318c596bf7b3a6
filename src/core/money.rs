//! Rupee amounts as integers, rendered with South Asian digit grouping.
//
// The last three digits form one group and the remaining digits are grouped
// in pairs from the right: 1234567 renders as "₹ 12,34,567". Parsing is the
// strict inverse; text that is not a grouped amount is an error rather than
// a silent zero.

use std::fmt;

/// Currency marker prefixed to every formatted amount.
pub const CURRENCY_MARKER: &str = "₹";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    /// The text did not reduce to digits after stripping the marker and
    /// grouping separators.
    InvalidAmount(String),
}

impl fmt::Display for MoneyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoneyError::InvalidAmount(text) => write!(f, "invalid amount: {text:?}"),
        }
    }
}

impl std::error::Error for MoneyError {}

/// Formats a whole-rupee amount for display. Negative amounts format their
/// absolute value with a leading `-`.
pub fn format(amount: i64) -> String {
    let grouped = group_digits(&amount.unsigned_abs().to_string());
    if amount < 0 {
        format!("-{CURRENCY_MARKER} {grouped}")
    } else {
        format!("{CURRENCY_MARKER} {grouped}")
    }
}

fn group_digits(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{tail}", groups.join(","))
}

/// Parses a display string produced by [`format`], also accepting plain
/// integers with or without grouping separators.
pub fn parse(text: &str) -> Result<i64, MoneyError> {
    let invalid = || MoneyError::InvalidAmount(text.to_string());
    let mut rest = text.trim();
    let negative = rest.starts_with('-');
    if negative {
        rest = rest[1..].trim_start();
    }
    rest = rest.strip_prefix(CURRENCY_MARKER).unwrap_or(rest).trim_start();
    let digits: String = rest
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .collect();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let value: i64 = digits.parse().map_err(|_| invalid())?;
    Ok(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_last_three_then_pairs() {
        assert_eq!(format(0), "₹ 0");
        assert_eq!(format(999), "₹ 999");
        assert_eq!(format(1000), "₹ 1,000");
        assert_eq!(format(100000), "₹ 1,00,000");
        assert_eq!(format(1234567), "₹ 12,34,567");
        assert_eq!(format(123456789), "₹ 12,34,56,789");
    }

    #[test]
    fn negative_amounts_keep_grouping() {
        assert_eq!(format(-500), "-₹ 500");
        assert_eq!(format(-1234567), "-₹ 12,34,567");
    }

    #[test]
    fn parse_inverts_format() {
        for n in [0, 7, 999, 1000, 100000, 1234567, 999999999, -40000] {
            assert_eq!(parse(&format(n)).unwrap(), n);
        }
    }

    #[test]
    fn parse_accepts_plain_integers() {
        assert_eq!(parse("30000").unwrap(), 30000);
        assert_eq!(parse("  1,00,000 ").unwrap(), 100000);
        assert_eq!(parse("-250").unwrap(), -250);
    }

    #[test]
    fn parse_rejects_non_numeric_residue() {
        assert!(parse("").is_err());
        assert!(parse("₹ ").is_err());
        assert!(parse("12x34").is_err());
        assert!(parse("₹ 12.50").is_err());
    }
}
