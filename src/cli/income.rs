//! Income CLI commands

use clap::Subcommand;

use crate::config::Settings;
use crate::display::{format_income_details, format_income_list};
use crate::error::{VaultError, VaultResult};
use crate::models::{IncomeEntry, IncomeId};
use crate::session::Session;

use super::{parse_amount, parse_date, parse_id};

/// Income subcommands
#[derive(Subcommand)]
pub enum IncomeCommands {
    /// List income entries, newest first
    List,

    /// Record income
    Add {
        /// Where the money came from
        source: String,
        /// Amount (e.g., "1.500,00")
        amount: String,
        /// Date (YYYY-MM-DD or DD/MM/YYYY, defaults to today)
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Edit an income entry
    Edit {
        /// Income ID
        id: String,
        /// New source
        #[arg(short, long)]
        source: Option<String>,
        /// New amount
        #[arg(short, long)]
        amount: Option<String>,
        /// New date
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Delete an income entry
    Remove {
        /// Income ID
        id: String,
    },
}

fn validated(entry: &IncomeEntry) -> VaultResult<()> {
    entry
        .validate()
        .map_err(|e| VaultError::Validation(e.to_string()))
}

/// Handle an income command
pub fn handle_income_command(
    session: &Session,
    settings: &Settings,
    cmd: IncomeCommands,
) -> VaultResult<()> {
    match cmd {
        IncomeCommands::List => {
            let entries = session.list_income()?;
            let total = session.total_income()?;
            println!(
                "{}",
                format_income_list(&entries, total, &settings.date_format)
            );
        }

        IncomeCommands::Add {
            source,
            amount,
            date,
        } => {
            let mut entry = IncomeEntry::new(source, parse_amount(&amount)?, parse_date(date.as_deref())?);
            validated(&entry)?;
            session.insert_income(&mut entry)?;
            print!("Recorded income\n{}", format_income_details(&entry, &settings.date_format));
        }

        IncomeCommands::Edit {
            id,
            source,
            amount,
            date,
        } => {
            let id: IncomeId = parse_id(&id, "income")?;
            let mut entry = session
                .get_income(id)?
                .ok_or_else(|| VaultError::income_not_found(id.to_string()))?;

            if let Some(source) = source {
                entry.source = source.trim().to_string();
            }
            if let Some(amount) = amount {
                entry.amount = parse_amount(&amount)?;
            }
            if date.is_some() {
                entry.date = parse_date(date.as_deref())?;
            }
            validated(&entry)?;

            session.update_income(&entry)?;
            print!("Updated income\n{}", format_income_details(&entry, &settings.date_format));
        }

        IncomeCommands::Remove { id } => {
            let id: IncomeId = parse_id(&id, "income")?;
            session.remove_income(id)?;
            println!("Deleted income: {}", id);
        }
    }

    Ok(())
}
