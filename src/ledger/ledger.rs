use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    amount::Amount,
    category::Category,
    transaction::{Transaction, TransactionRef},
};
use crate::errors::{LedgerError, Result};

/// Wallet balance used when nothing has been persisted yet.
pub const DEFAULT_BALANCE: i64 = 5000;

/// Authoritative wallet state: the balance and the expenses drawn from it.
///
/// Every mutation validates first and applies second, so a failed call leaves
/// the ledger untouched. The balance never goes below zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ledger {
    balance: Amount,
    transactions: Vec<Transaction>,
}

/// Serialized form of a [`Ledger`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LedgerSnapshot {
    pub balance: Amount,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self {
            balance: Amount::from_units(DEFAULT_BALANCE),
            transactions: Vec::new(),
        }
    }
}

impl Ledger {
    /// Creates an empty ledger holding `balance`.
    pub fn with_balance(balance: Amount) -> Result<Self> {
        if balance.is_negative() {
            return Err(LedgerError::InvalidAmount(format!(
                "starting balance {balance} cannot be negative"
            )));
        }
        Ok(Self {
            balance,
            transactions: Vec::new(),
        })
    }

    /// Rebuilds a ledger from persisted data, rejecting snapshots that break
    /// the balance rules. Duplicate transaction ids are replaced.
    pub fn from_snapshot(snapshot: LedgerSnapshot) -> Result<Self> {
        if snapshot.balance.is_negative() {
            return Err(LedgerError::PersistenceUnavailable(format!(
                "stored balance {} is negative",
                snapshot.balance
            )));
        }
        let committed = Amount::checked_sum(snapshot.transactions.iter().map(|txn| txn.amount))
            .and_then(|spent| spent.checked_add(snapshot.balance));
        if committed.is_none() {
            return Err(LedgerError::PersistenceUnavailable(
                "stored balance and expenses exceed the representable range".into(),
            ));
        }
        let mut seen = HashSet::new();
        let mut transactions = snapshot.transactions;
        for (index, txn) in transactions.iter_mut().enumerate() {
            if !txn.amount.is_positive() {
                return Err(LedgerError::PersistenceUnavailable(format!(
                    "stored transaction #{index} has non-positive amount {}",
                    txn.amount
                )));
            }
            if !seen.insert(txn.id) {
                txn.id = fresh_id(&seen);
                seen.insert(txn.id);
            }
        }
        Ok(Self {
            balance: snapshot.balance,
            transactions,
        })
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            balance: self.balance,
            transactions: self.transactions.clone(),
        }
    }

    pub fn balance(&self) -> Amount {
        self.balance
    }

    /// Transactions in insertion order.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    pub fn transaction(&self, target: impl Into<TransactionRef>) -> Option<&Transaction> {
        self.position(target.into())
            .map(|index| &self.transactions[index])
    }

    /// Records an expense and draws its amount from the balance.
    ///
    /// Spending the entire balance is allowed; spending more is not.
    pub fn add_transaction(&mut self, mut candidate: Transaction) -> Result<Uuid> {
        let amount = candidate.amount.ensure_positive()?;
        if amount > self.balance {
            return Err(LedgerError::InsufficientBalance {
                requested: amount,
                available: self.balance,
            });
        }
        if self.position(TransactionRef::Id(candidate.id)).is_some() {
            let taken: HashSet<Uuid> = self.transactions.iter().map(|txn| txn.id).collect();
            candidate.id = fresh_id(&taken);
        }
        let id = candidate.id;
        self.balance = self
            .balance
            .checked_sub(amount)
            .ok_or_else(|| overflow(amount))?;
        self.transactions.push(candidate);
        Ok(id)
    }

    /// Removes an expense and returns its amount to the balance.
    pub fn delete_transaction(&mut self, target: impl Into<TransactionRef>) -> Result<Transaction> {
        let target = target.into();
        let index = self
            .position(target)
            .ok_or_else(|| LedgerError::NotFound(target.to_string()))?;
        let balance = self
            .balance
            .checked_add(self.transactions[index].amount)
            .ok_or_else(|| overflow(self.transactions[index].amount))?;
        let removed = self.transactions.remove(index);
        self.balance = balance;
        Ok(removed)
    }

    /// Replaces an expense in place, settling the amount difference against
    /// the balance. The stored id and position are kept; the category may
    /// change freely without affecting the balance.
    pub fn edit_transaction(
        &mut self,
        target: impl Into<TransactionRef>,
        mut updated: Transaction,
    ) -> Result<&Transaction> {
        let target = target.into();
        let index = self
            .position(target)
            .ok_or_else(|| LedgerError::NotFound(target.to_string()))?;
        let new_amount = updated.amount.ensure_positive()?;
        let current = &self.transactions[index];
        let available = self
            .balance
            .checked_add(current.amount)
            .ok_or_else(|| overflow(current.amount))?;
        if new_amount > available {
            return Err(LedgerError::InsufficientBalance {
                requested: new_amount,
                available,
            });
        }
        let balance = available
            .checked_sub(new_amount)
            .ok_or_else(|| overflow(new_amount))?;
        updated.id = current.id;
        self.balance = balance;
        self.transactions[index] = updated;
        Ok(&self.transactions[index])
    }

    /// Adds income to the balance and returns the new balance.
    ///
    /// Income is refused when the balance plus every live expense would no
    /// longer fit, so deleting or editing an expense can never overflow.
    pub fn add_balance(&mut self, amount: Amount) -> Result<Amount> {
        let amount = amount.ensure_positive()?;
        let balance = self
            .balance
            .checked_add(amount)
            .ok_or_else(|| overflow(amount))?;
        self.committed()
            .and_then(|committed| committed.checked_add(amount))
            .ok_or_else(|| overflow(amount))?;
        self.balance = balance;
        Ok(self.balance)
    }

    /// Sum of all expenses in `category`; zero when there are none.
    pub fn category_total(&self, category: Category) -> Amount {
        self.transactions
            .iter()
            .filter(|txn| txn.category == category)
            .fold(Amount::ZERO, |total, txn| total.saturating_add(txn.amount))
    }

    /// Totals for every category in display order.
    pub fn category_totals(&self) -> Vec<(Category, Amount)> {
        Category::ALL
            .into_iter()
            .map(|category| (category, self.category_total(category)))
            .collect()
    }

    pub fn total_expense(&self) -> Amount {
        self.transactions
            .iter()
            .fold(Amount::ZERO, |total, txn| total.saturating_add(txn.amount))
    }

    /// Balance plus every live expense, `None` past the representable range.
    fn committed(&self) -> Option<Amount> {
        Amount::checked_sum(self.transactions.iter().map(|txn| txn.amount))?
            .checked_add(self.balance)
    }

    /// Expenses newest first, each paired with its insertion index.
    ///
    /// Equal dates keep insertion order; unreadable dates come last.
    pub fn sorted_feed_indexed(&self) -> Vec<(usize, &Transaction)> {
        let mut feed: Vec<(usize, &Transaction)> = self.transactions.iter().enumerate().collect();
        feed.sort_by(|(_, a), (_, b)| a.cmp_recent_first(b));
        feed
    }

    /// Expenses newest first. Does not reorder the ledger itself.
    pub fn sorted_feed(&self) -> Vec<&Transaction> {
        self.sorted_feed_indexed()
            .into_iter()
            .map(|(_, txn)| txn)
            .collect()
    }

    fn position(&self, target: TransactionRef) -> Option<usize> {
        match target {
            TransactionRef::Index(index) => (index < self.transactions.len()).then_some(index),
            TransactionRef::Id(id) => self.transactions.iter().position(|txn| txn.id == id),
        }
    }
}

fn overflow(amount: Amount) -> LedgerError {
    LedgerError::InvalidAmount(format!("{amount} exceeds the representable range"))
}

fn fresh_id(taken: &HashSet<Uuid>) -> Uuid {
    loop {
        let id = Uuid::new_v4();
        if !taken.contains(&id) {
            return id;
        }
    }
}
