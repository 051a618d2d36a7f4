//! CLI command handlers
//!
//! Bridges clap argument parsing with the session. Handlers take an already
//! opened [`Session`](crate::Session) and print their results.

pub mod category;
pub mod expense;
pub mod income;

use chrono::{Local, NaiveDate};

use crate::error::{VaultError, VaultResult};
use crate::models::Money;

pub use category::{handle_category_command, CategoryCommands};
pub use expense::{handle_expense_command, handle_fixed_command, ExpenseCommands, FixedCommands};
pub use income::{handle_income_command, IncomeCommands};

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];

/// Parse a user-entered amount such as "1.500,00" or "R$ 12,90"
pub fn parse_amount(text: &str) -> VaultResult<Money> {
    Money::parse(text).map_err(|e| VaultError::Validation(format!("Invalid amount '{}': {}", text, e)))
}

/// Parse `YYYY-MM-DD` or `DD/MM/YYYY`, defaulting to today
pub fn parse_date(text: Option<&str>) -> VaultResult<NaiveDate> {
    let Some(text) = text else {
        return Ok(Local::now().date_naive());
    };
    let text = text.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .ok_or_else(|| {
            VaultError::Validation(format!(
                "Invalid date '{}'. Use YYYY-MM-DD or DD/MM/YYYY",
                text
            ))
        })
}

pub(crate) fn parse_id<T: std::str::FromStr>(text: &str, what: &str) -> VaultResult<T> {
    text.parse()
        .map_err(|_| VaultError::Validation(format!("Invalid {} id: {}", what, text)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IncomeId;

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        assert_eq!(parse_date(Some("2025-03-07")).unwrap(), expected);
        assert_eq!(parse_date(Some("07/03/2025")).unwrap(), expected);
        assert!(parse_date(Some("March 7")).is_err());
        assert!(parse_date(None).is_ok());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("R$ 1.500,00").unwrap().cents(), 150000);
        assert!(parse_amount("12a").unwrap_err().is_validation());
    }

    #[test]
    fn test_parse_id() {
        let id: IncomeId = parse_id("inc-4", "income").unwrap();
        assert_eq!(id.get(), 4);
        assert!(parse_id::<IncomeId>("four", "income").is_err());
    }
}
