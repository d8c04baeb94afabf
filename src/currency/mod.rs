use serde::{Deserialize, Serialize};

use crate::ledger::Amount;

/// Display preferences for wallet amounts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CurrencyFormat {
    pub symbol: String,
    #[serde(default = "CurrencyFormat::default_decimal_separator")]
    pub decimal_separator: char,
    #[serde(default = "CurrencyFormat::default_grouping_separator")]
    pub grouping_separator: Option<char>,
    /// Fixed number of fraction digits; `None` prints only significant digits.
    #[serde(default)]
    pub precision: Option<u8>,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self {
            symbol: "₹".into(),
            decimal_separator: Self::default_decimal_separator(),
            grouping_separator: Self::default_grouping_separator(),
            precision: None,
        }
    }
}

impl CurrencyFormat {
    pub fn default_decimal_separator() -> char {
        '.'
    }

    pub fn default_grouping_separator() -> Option<char> {
        Some(',')
    }
}

/// Renders `amount` as e.g. `₹4,800` or `-₹12.50`.
pub fn format_amount(amount: Amount, format: &CurrencyFormat) -> String {
    let mut value = amount.value().abs();
    let body = match format.precision {
        Some(precision) => {
            value.rescale(u32::from(precision));
            value.to_string()
        }
        None => value.normalize().to_string(),
    };
    let (int_part, fraction) = match body.split_once('.') {
        Some((int_part, fraction)) => (int_part, Some(fraction)),
        None => (body.as_str(), None),
    };
    let mut rendered = match format.grouping_separator {
        Some(separator) => group_digits(int_part, separator),
        None => int_part.to_string(),
    };
    if let Some(fraction) = fraction {
        rendered.push(format.decimal_separator);
        rendered.push_str(fraction);
    }
    let sign = if amount.is_negative() { "-" } else { "" };
    format!("{sign}{}{rendered}", format.symbol)
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::new();
    for (count, ch) in digits.chars().rev().enumerate() {
        if count != 0 && count % 3 == 0 {
            grouped.insert(0, separator);
        }
        grouped.insert(0, ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_format_uses_rupee_symbol_and_grouping() {
        let format = CurrencyFormat::default();
        assert_eq!(format_amount(Amount::from_units(4800), &format), "₹4,800");
        assert_eq!(format_amount(Amount::from_units(125), &format), "₹125");
        assert_eq!(
            format_amount("1234567.5".parse().unwrap(), &format),
            "₹1,234,567.5"
        );
    }

    #[test]
    fn fixed_precision_pads_and_rounds() {
        let format = CurrencyFormat {
            symbol: "$".into(),
            precision: Some(2),
            ..CurrencyFormat::default()
        };
        assert_eq!(format_amount(Amount::from_units(5000), &format), "$5,000.00");
        assert_eq!(format_amount("-12.5".parse().unwrap(), &format), "-$12.50");
    }

    #[test]
    fn separators_are_configurable() {
        let format = CurrencyFormat {
            symbol: "€".into(),
            decimal_separator: ',',
            grouping_separator: Some('.'),
            precision: Some(2),
        };
        assert_eq!(format_amount("9876.5".parse().unwrap(), &format), "€9.876,50");
    }
}
