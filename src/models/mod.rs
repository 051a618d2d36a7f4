//! Core data models for vaultbook
//!
//! The four entities of the working store (categories, income entries,
//! fixed and variable expenses) plus the money and id types they use.

pub mod category;
pub mod expense;
pub mod ids;
pub mod income;
pub mod money;

pub use category::{Category, DEFAULT_CATEGORIES};
pub use expense::{Expense, ExpenseKind, ExpenseListing};
pub use ids::{CategoryId, ExpenseId, IncomeId};
pub use income::IncomeEntry;
pub use money::{Money, MoneyParseError};
