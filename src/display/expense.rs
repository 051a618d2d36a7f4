//! Expense display formatting
//!
//! Fixed and variable expenses share one layout; the heading names the kind.

use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Style};
use tabled::{Table, Tabled};

use crate::models::{Expense, ExpenseKind, ExpenseListing, Money};

#[derive(Tabled)]
struct ExpenseRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Amount")]
    amount: String,
}

/// Format expenses of one kind as a table, with the total underneath
pub fn format_expense_list(
    kind: ExpenseKind,
    listings: &[ExpenseListing],
    total: Money,
    date_format: &str,
) -> String {
    if listings.is_empty() {
        return format!("No {}s recorded.", kind.to_string().to_lowercase());
    }

    let rows = listings.iter().map(|l| ExpenseRow {
        id: l.expense.id.to_string(),
        date: l.expense.date.format(date_format).to_string(),
        description: l.expense.description.clone(),
        category: l.category_name.clone(),
        amount: l.expense.amount.to_string(),
    });

    let table = Table::new(rows)
        .with(Style::sharp())
        .modify(Columns::single(4), Alignment::right())
        .to_string();

    format!("{}s\n{}\nTotal: {}", kind, table, total)
}

/// Format one expense
pub fn format_expense_details(
    kind: ExpenseKind,
    expense: &Expense,
    category_name: &str,
    date_format: &str,
) -> String {
    let mut output = String::new();
    output.push_str(&format!("{}: {}\n", kind, expense.id));
    output.push_str(&format!("  Description: {}\n", expense.description));
    output.push_str(&format!("  Category:    {}\n", category_name));
    output.push_str(&format!("  Amount:      {}\n", expense.amount));
    output.push_str(&format!(
        "  Date:        {}\n",
        expense.date.format(date_format)
    ));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CategoryId;
    use chrono::NaiveDate;

    fn listing() -> ExpenseListing {
        ExpenseListing {
            expense: Expense::new(
                "Rent",
                Money::from_cents(120000),
                NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
                CategoryId::new(1),
            ),
            category_name: "Aluguel/Moradia".to_string(),
        }
    }

    #[test]
    fn test_list() {
        let output = format_expense_list(
            ExpenseKind::Fixed,
            &[listing()],
            Money::from_cents(120000),
            "%d/%m/%Y",
        );
        assert!(output.starts_with("Fixed expenses"));
        assert!(output.contains("Aluguel/Moradia"));
        assert!(output.contains("R$ 1.200,00"));
    }

    #[test]
    fn test_empty_list_names_kind() {
        let output = format_expense_list(ExpenseKind::Variable, &[], Money::zero(), "%d/%m/%Y");
        assert_eq!(output, "No variable expenses recorded.");
    }
}
