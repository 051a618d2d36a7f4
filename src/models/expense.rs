//! Expense models
//!
//! Fixed and variable expenses share one row shape and live in separate
//! tables; [`ExpenseKind`] selects the table.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{CategoryId, ExpenseId};
use super::money::Money;

/// Maximum length of the description text, in characters
pub const MAX_DESCRIPTION_LEN: usize = 200;

/// Which expense table a row belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseKind {
    /// Recurring bills (rent, internet, ...)
    Fixed,
    /// One-off spending
    Variable,
}

impl fmt::Display for ExpenseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed => write!(f, "Fixed expense"),
            Self::Variable => write!(f, "Variable expense"),
        }
    }
}

/// Validation errors for expenses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpenseValidationError {
    DescriptionTooLong(usize),
    MissingCategory,
}

impl fmt::Display for ExpenseValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DescriptionTooLong(len) => write!(
                f,
                "Description too long ({} characters, max {})",
                len, MAX_DESCRIPTION_LEN
            ),
            Self::MissingCategory => write!(f, "Expense must have a category"),
        }
    }
}

impl std::error::Error for ExpenseValidationError {}

/// A fixed or variable expense row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    #[serde(default)]
    pub description: String,
    pub amount: Money,
    pub date: NaiveDate,
    pub category_id: CategoryId,
}

impl Expense {
    /// Create an expense that has not been inserted yet
    pub fn new(
        description: impl Into<String>,
        amount: Money,
        date: NaiveDate,
        category_id: CategoryId,
    ) -> Self {
        Self {
            id: ExpenseId::default(),
            description: description.into(),
            amount,
            date,
            category_id,
        }
    }

    pub fn validate(&self) -> Result<(), ExpenseValidationError> {
        let len = self.description.chars().count();
        if len > MAX_DESCRIPTION_LEN {
            return Err(ExpenseValidationError::DescriptionTooLong(len));
        }
        if self.category_id.is_unassigned() {
            return Err(ExpenseValidationError::MissingCategory);
        }
        Ok(())
    }
}

/// An expense joined with its category name, for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseListing {
    pub expense: Expense,
    pub category_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    #[test]
    fn test_new_expense() {
        let exp = Expense::new("Rent", Money::from_cents(120000), date(), CategoryId::new(1));
        assert!(exp.id.is_unassigned());
        assert!(exp.validate().is_ok());
    }

    #[test]
    fn test_requires_category() {
        let exp = Expense::new("Rent", Money::zero(), date(), CategoryId::default());
        assert_eq!(exp.validate(), Err(ExpenseValidationError::MissingCategory));
    }

    #[test]
    fn test_description_too_long() {
        let exp = Expense::new("d".repeat(250), Money::zero(), date(), CategoryId::new(1));
        assert_eq!(
            exp.validate(),
            Err(ExpenseValidationError::DescriptionTooLong(250))
        );
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ExpenseKind::Fixed.to_string(), "Fixed expense");
        assert_eq!(
            serde_json::to_string(&ExpenseKind::Variable).unwrap(),
            "\"variable\""
        );
    }
}
