//! Display formatting for terminal output
//!
//! Listings are rendered as tables; summaries and confirmations as plain
//! aligned text.

pub mod category;
pub mod expense;
pub mod income;
pub mod summary;

pub use category::format_category_list;
pub use expense::{format_expense_details, format_expense_list};
pub use income::{format_income_details, format_income_list};
pub use summary::{format_password_strength, format_summary};
