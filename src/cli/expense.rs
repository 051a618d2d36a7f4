//! Fixed and variable expense CLI commands

use chrono::Datelike;
use clap::Subcommand;

use crate::config::Settings;
use crate::display::{format_expense_details, format_expense_list};
use crate::error::{VaultError, VaultResult};
use crate::models::{Category, Expense, ExpenseId, ExpenseKind};
use crate::session::Session;

use super::{parse_amount, parse_date, parse_id};

/// Subcommands shared by both expense kinds
#[derive(Subcommand)]
pub enum ExpenseCommands {
    /// List expenses, newest first
    List,

    /// Record an expense
    Add {
        /// What the money was spent on
        description: String,
        /// Amount (e.g., "89,90")
        amount: String,
        /// Category name or ID
        #[arg(short, long)]
        category: String,
        /// Date (YYYY-MM-DD or DD/MM/YYYY, defaults to today)
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Edit an expense
    Edit {
        /// Expense ID
        id: String,
        /// New description
        #[arg(long)]
        description: Option<String>,
        /// New amount
        #[arg(short, long)]
        amount: Option<String>,
        /// New category name or ID
        #[arg(short, long)]
        category: Option<String>,
        /// New date
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Delete an expense
    Remove {
        /// Expense ID
        id: String,
    },
}

/// Fixed expense subcommands
#[derive(Subcommand)]
pub enum FixedCommands {
    #[command(flatten)]
    Common(ExpenseCommands),

    /// Copy last month's fixed expenses into this month with amount zero
    Repeat {
        /// Target date (defaults to today)
        #[arg(short, long)]
        date: Option<String>,
    },
}

fn require_category(session: &Session, identifier: &str) -> VaultResult<Category> {
    session
        .find_category(identifier)?
        .ok_or_else(|| VaultError::category_not_found(identifier))
}

fn validated(expense: &Expense) -> VaultResult<()> {
    expense
        .validate()
        .map_err(|e| VaultError::Validation(e.to_string()))
}

/// Handle a fixed expense command
pub fn handle_fixed_command(
    session: &Session,
    settings: &Settings,
    cmd: FixedCommands,
) -> VaultResult<()> {
    match cmd {
        FixedCommands::Common(cmd) => {
            handle_expense_command(session, settings, ExpenseKind::Fixed, cmd)
        }
        FixedCommands::Repeat { date } => {
            let today = parse_date(date.as_deref())?;
            let created = session.repeat_previous_month_fixed(today)?;
            if created.is_empty() {
                println!("No fixed expenses found for the month before {:02}/{}.", today.month(), today.year());
            } else {
                println!(
                    "Copied {} fixed expense(s) into {:02}/{}. Fill in the amounts with 'vaultbook fixed edit'.",
                    created.len(),
                    today.month(),
                    today.year()
                );
            }
            Ok(())
        }
    }
}

/// Handle an expense command for one kind
pub fn handle_expense_command(
    session: &Session,
    settings: &Settings,
    kind: ExpenseKind,
    cmd: ExpenseCommands,
) -> VaultResult<()> {
    match cmd {
        ExpenseCommands::List => {
            let listings = session.list_expenses(kind)?;
            let total = session.read(|s| s.total_expenses(kind))??;
            println!(
                "{}",
                format_expense_list(kind, &listings, total, &settings.date_format)
            );
        }

        ExpenseCommands::Add {
            description,
            amount,
            category,
            date,
        } => {
            let category = require_category(session, &category)?;
            let mut expense = Expense::new(
                description,
                parse_amount(&amount)?,
                parse_date(date.as_deref())?,
                category.id,
            );
            validated(&expense)?;
            session.insert_expense(kind, &mut expense)?;
            print!(
                "Recorded {}\n{}",
                kind.to_string().to_lowercase(),
                format_expense_details(kind, &expense, &category.name, &settings.date_format)
            );
        }

        ExpenseCommands::Edit {
            id,
            description,
            amount,
            category,
            date,
        } => {
            let id: ExpenseId = parse_id(&id, "expense")?;
            let mut expense = session
                .get_expense(kind, id)?
                .ok_or_else(|| VaultError::expense_not_found(id.to_string()))?;

            if let Some(description) = description {
                expense.description = description.trim().to_string();
            }
            if let Some(amount) = amount {
                expense.amount = parse_amount(&amount)?;
            }
            if let Some(category) = category {
                expense.category_id = require_category(session, &category)?.id;
            }
            if date.is_some() {
                expense.date = parse_date(date.as_deref())?;
            }
            validated(&expense)?;

            session.update_expense(kind, &expense)?;
            let category_name = session
                .read(|s| s.get_category(expense.category_id).map(|c| c.name.clone()))?
                .unwrap_or_default();
            print!(
                "Updated {}\n{}",
                kind.to_string().to_lowercase(),
                format_expense_details(kind, &expense, &category_name, &settings.date_format)
            );
        }

        ExpenseCommands::Remove { id } => {
            let id: ExpenseId = parse_id(&id, "expense")?;
            session.remove_expense(kind, id)?;
            println!("Deleted {}: {}", kind.to_string().to_lowercase(), id);
        }
    }

    Ok(())
}
