//! Income display formatting

use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Style};
use tabled::{Table, Tabled};

use crate::models::{IncomeEntry, Money};

#[derive(Tabled)]
struct IncomeRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Amount")]
    amount: String,
}

/// Format income entries as a table, with the total underneath
pub fn format_income_list(entries: &[IncomeEntry], total: Money, date_format: &str) -> String {
    if entries.is_empty() {
        return "No income recorded.".to_string();
    }

    let rows = entries.iter().map(|e| IncomeRow {
        id: e.id.to_string(),
        date: e.date.format(date_format).to_string(),
        source: e.source.clone(),
        amount: e.amount.to_string(),
    });

    let table = Table::new(rows)
        .with(Style::sharp())
        .modify(Columns::single(3), Alignment::right())
        .to_string();

    format!("{}\nTotal: {}", table, total)
}

/// Format one income entry
pub fn format_income_details(entry: &IncomeEntry, date_format: &str) -> String {
    let mut output = String::new();
    output.push_str(&format!("Income: {}\n", entry.id));
    output.push_str(&format!("  Source: {}\n", entry.source));
    output.push_str(&format!("  Amount: {}\n", entry.amount));
    output.push_str(&format!("  Date:   {}\n", entry.date.format(date_format)));
    output
}
