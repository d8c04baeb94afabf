//! Read-only views the presentation layer draws from.

use rust_decimal::{prelude::ToPrimitive, Decimal};
use serde::Serialize;

use crate::currency::{format_amount, CurrencyFormat};
use crate::ledger::{Amount, Category, Ledger, Transaction};

/// One category's share of total spending.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategorySlice {
    pub category: Category,
    pub total: Amount,
    /// Percentage of all spending, `0.0` when nothing has been spent.
    pub share_percent: f64,
}

/// A feed row; `index` addresses the transaction for delete and edit.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FeedEntry {
    pub index: usize,
    pub transaction: Transaction,
}

/// Everything a wallet screen shows, recomputed on every call.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Dashboard {
    pub balance: Amount,
    pub total_expense: Amount,
    pub categories: Vec<CategorySlice>,
    pub feed: Vec<FeedEntry>,
}

impl Dashboard {
    /// The largest category by spending, if anything has been spent.
    pub fn top_category(&self) -> Option<&CategorySlice> {
        self.categories
            .iter()
            .filter(|slice| slice.total.is_positive())
            .fold(None, |best: Option<&CategorySlice>, slice| match best {
                Some(current) if current.total >= slice.total => Some(current),
                _ => Some(slice),
            })
    }

    /// One line per feed entry, e.g. `Pizza | Food | ₹200 | 2024-01-01`.
    pub fn feed_lines(&self, format: &CurrencyFormat) -> Vec<String> {
        self.feed
            .iter()
            .map(|entry| {
                let txn = &entry.transaction;
                format!(
                    "{} | {} | {} | {}",
                    txn.title,
                    txn.category,
                    format_amount(txn.amount, format),
                    txn.date
                )
            })
            .collect()
    }
}

pub struct SummaryService;

impl SummaryService {
    pub fn dashboard(ledger: &Ledger) -> Dashboard {
        let total_expense = ledger.total_expense();
        let categories = ledger
            .category_totals()
            .into_iter()
            .map(|(category, total)| CategorySlice {
                category,
                total,
                share_percent: share_percent(total, total_expense),
            })
            .collect();
        let feed = ledger
            .sorted_feed_indexed()
            .into_iter()
            .map(|(index, txn)| FeedEntry {
                index,
                transaction: txn.clone(),
            })
            .collect();
        Dashboard {
            balance: ledger.balance(),
            total_expense,
            categories,
            feed,
        }
    }
}

fn share_percent(part: Amount, whole: Amount) -> f64 {
    if !whole.is_positive() {
        return 0.0;
    }
    part.value()
        .checked_div(whole.value())
        .and_then(|ratio| ratio.checked_mul(Decimal::from(100)))
        .map(|percent| percent.round_dp(2))
        .and_then(|percent| percent.to_f64())
        .unwrap_or(0.0)
}
