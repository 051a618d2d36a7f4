//! Income entry model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ids::IncomeId;
use super::money::Money;

/// Maximum length of the source text, in characters
pub const MAX_SOURCE_LEN: usize = 200;

/// Validation errors for income entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncomeValidationError {
    SourceTooLong(usize),
}

impl std::fmt::Display for IncomeValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SourceTooLong(len) => write!(
                f,
                "Income source too long ({} characters, max {})",
                len, MAX_SOURCE_LEN
            ),
        }
    }
}

impl std::error::Error for IncomeValidationError {}

/// A single income entry (salary, freelance payment, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeEntry {
    pub id: IncomeId,
    #[serde(default)]
    pub source: String,
    pub amount: Money,
    pub date: NaiveDate,
}

impl IncomeEntry {
    /// Create an entry that has not been inserted yet
    pub fn new(source: impl Into<String>, amount: Money, date: NaiveDate) -> Self {
        Self {
            id: IncomeId::default(),
            source: source.into(),
            amount,
            date,
        }
    }

    pub fn validate(&self) -> Result<(), IncomeValidationError> {
        let len = self.source.chars().count();
        if len > MAX_SOURCE_LEN {
            return Err(IncomeValidationError::SourceTooLong(len));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 5).unwrap()
    }

    #[test]
    fn test_new_income() {
        let entry = IncomeEntry::new("Salary", Money::from_cents(150000), date());
        assert!(entry.id.is_unassigned());
        assert_eq!(entry.amount.cents(), 150000);
        assert!(entry.validate().is_ok());
    }

    #[test]
    fn test_source_too_long() {
        let entry = IncomeEntry::new("s".repeat(201), Money::zero(), date());
        assert_eq!(
            entry.validate(),
            Err(IncomeValidationError::SourceTooLong(201))
        );
    }

    #[test]
    fn test_date_serializes_as_iso() {
        let entry = IncomeEntry::new("Salary", Money::from_cents(1), date());
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"2025-01-05\""));
    }
}
