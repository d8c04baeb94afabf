//! Reader for the category-grouped layout written by earlier releases.
//!
//! That layout kept the balance beside an `expense` object keyed by category
//! name, with no ids:
//!
//! ```json
//! { "balance": "4800", "expense": { "Food": [{ "title": "Pizza", "amount": 200, "date": "2024-01-01" }] } }
//! ```

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use super::LoadReport;
use crate::{
    errors::{LedgerError, Result},
    ledger::{Amount, Category, LedgerSnapshot, Transaction, DEFAULT_BALANCE},
};

#[derive(Debug, Deserialize)]
struct LegacyDocument {
    #[serde(default)]
    balance: Option<Amount>,
    #[serde(default)]
    expense: BTreeMap<String, Vec<LegacyExpense>>,
}

#[derive(Debug, Deserialize)]
struct LegacyExpense {
    title: String,
    amount: Amount,
    date: String,
}

pub fn is_legacy_layout(value: &Value) -> bool {
    value
        .as_object()
        .map(|object| object.contains_key("expense") && !object.contains_key("transactions"))
        .unwrap_or(false)
}

/// Flattens the grouped expenses into one list, categories in display order.
pub fn convert(value: Value) -> Result<LoadReport> {
    let document: LegacyDocument = serde_json::from_value(value)?;
    let mut migrations = Vec::new();

    let mut groups = Vec::with_capacity(document.expense.len());
    for (label, items) in document.expense {
        let category = label.parse::<Category>().map_err(|_| {
            LedgerError::PersistenceUnavailable(format!(
                "legacy data uses unknown category `{label}`"
            ))
        })?;
        groups.push((category, items));
    }
    groups.sort_by_key(|(category, _)| *category);

    let transactions: Vec<Transaction> = groups
        .into_iter()
        .flat_map(|(category, items)| {
            items
                .into_iter()
                .map(move |item| Transaction::new(item.title, item.amount, item.date, category))
        })
        .collect();

    let balance = match document.balance {
        Some(balance) => balance,
        None => {
            migrations.push(format!(
                "legacy data had no balance; using default {DEFAULT_BALANCE}"
            ));
            Amount::from_units(DEFAULT_BALANCE)
        }
    };
    migrations.push(format!(
        "converted {} category-grouped expense(s) to the transaction list layout",
        transactions.len()
    ));

    Ok(LoadReport {
        snapshot: LedgerSnapshot {
            balance,
            transactions,
        },
        migrations,
    })
}
