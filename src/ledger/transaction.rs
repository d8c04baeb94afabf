use std::{cmp::Ordering, fmt};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{amount::Amount, category::Category};

/// A single categorized expense.
///
/// `date` keeps the text it was created with; it is only interpreted when the
/// feed is ordered, so a record with an unreadable date still round-trips.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transaction {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub title: String,
    pub amount: Amount,
    pub date: String,
    pub category: Category,
}

impl Transaction {
    pub fn new(
        title: impl Into<String>,
        amount: Amount,
        date: impl Into<String>,
        category: Category,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            amount,
            date: date.into(),
            category,
        }
    }

    /// Parsed calendar timestamp of `date`, or `None` when it cannot be read.
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.date)
    }

    /// Newest-first ordering used by the feed; unreadable dates sort last.
    pub fn cmp_recent_first(&self, other: &Transaction) -> Ordering {
        match (self.timestamp(), other.timestamp()) {
            (Some(a), Some(b)) => b.cmp(&a),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) {} on {}",
            self.title, self.category, self.amount, self.date
        )
    }
}

/// Identifies a transaction either by insertion position or by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionRef {
    Index(usize),
    Id(Uuid),
}

impl From<usize> for TransactionRef {
    fn from(index: usize) -> Self {
        TransactionRef::Index(index)
    }
}

impl From<Uuid> for TransactionRef {
    fn from(id: Uuid) -> Self {
        TransactionRef::Id(id)
    }
}

impl fmt::Display for TransactionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionRef::Index(index) => write!(f, "#{index}"),
            TransactionRef::Id(id) => write!(f, "{id}"),
        }
    }
}

/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps and `YYYY-MM-DDTHH:MM[:SS]`.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    if let Ok(stamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(stamp.naive_utc());
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn txn(date: &str) -> Transaction {
        Transaction::new("Lunch", Amount::from_units(10), date, Category::Food)
    }

    #[test]
    fn parses_supported_date_shapes() {
        assert!(parse_timestamp("2024-03-01").is_some());
        assert!(parse_timestamp("2024-03-01T10:15:00Z").is_some());
        assert!(parse_timestamp("2024-03-01T10:15").is_some());
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn unreadable_dates_order_after_readable_ones() {
        let good = txn("1960-01-01");
        let bad = txn("not a date");
        assert_eq!(good.cmp_recent_first(&bad), Ordering::Less);
        assert_eq!(bad.cmp_recent_first(&good), Ordering::Greater);
        assert_eq!(bad.cmp_recent_first(&txn("??")), Ordering::Equal);
    }

    #[test]
    fn missing_id_is_assigned_on_deserialize() {
        let raw = r#"{"title":"Taxi","amount":50,"date":"2024-01-01","category":"Travel"}"#;
        let parsed: Transaction = serde_json::from_str(raw).unwrap();
        assert!(!parsed.id.is_nil());
        assert_eq!(parsed.category, Category::Travel);
        assert_eq!(parsed.amount, Amount::from_units(50));
    }
}
