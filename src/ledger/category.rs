use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::LedgerError;

/// Fixed set of expense categories used for totals and charts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Food,
    Entertainment,
    Travel,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Category; 3] = [Category::Food, Category::Entertainment, Category::Travel];

    pub fn label(self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Entertainment => "Entertainment",
            Category::Travel => "Travel",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = LedgerError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Category::ALL
            .into_iter()
            .find(|category| category.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| LedgerError::InvalidCategory(format!("`{trimmed}` is not a known category")))
    }
}
