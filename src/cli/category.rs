//! Category CLI commands

use clap::Subcommand;

use crate::display::format_category_list;
use crate::error::{VaultError, VaultResult};
use crate::models::Category;
use crate::session::Session;

/// Category subcommands
#[derive(Subcommand)]
pub enum CategoryCommands {
    /// List all categories
    List,

    /// Create a new category
    Add {
        /// Category name
        name: String,
    },

    /// Rename a category
    Rename {
        /// Category name or ID
        category: String,
        /// New name
        name: String,
    },

    /// Delete a category and every expense filed under it
    Remove {
        /// Category name or ID
        category: String,
        /// Skip the confirmation when expenses would be deleted
        #[arg(short, long)]
        force: bool,
    },
}

fn require_category(session: &Session, identifier: &str) -> VaultResult<Category> {
    session
        .find_category(identifier)?
        .ok_or_else(|| VaultError::category_not_found(identifier))
}

/// Handle a category command
pub fn handle_category_command(session: &Session, cmd: CategoryCommands) -> VaultResult<()> {
    match cmd {
        CategoryCommands::List => {
            let categories = session.list_categories()?;
            println!("{}", format_category_list(&categories));
        }

        CategoryCommands::Add { name } => {
            let mut category = Category::new(name);
            category
                .validate()
                .map_err(|e| VaultError::Validation(e.to_string()))?;
            let id = session.insert_category(&mut category)?;
            println!("Created category: {} ({})", category.name, id);
        }

        CategoryCommands::Rename { category, name } => {
            let mut existing = require_category(session, &category)?;
            let old_name = std::mem::replace(&mut existing.name, name.trim().to_string());
            existing
                .validate()
                .map_err(|e| VaultError::Validation(e.to_string()))?;
            session.update_category(&existing)?;
            println!("Renamed category: {} -> {}", old_name, existing.name);
        }

        CategoryCommands::Remove { category, force } => {
            let existing = require_category(session, &category)?;
            let affected = session.read(|s| {
                s.list_fixed()
                    .iter()
                    .chain(s.list_variable().iter())
                    .filter(|l| l.expense.category_id == existing.id)
                    .count()
            })?;

            if affected > 0 && !force {
                return Err(VaultError::Validation(format!(
                    "Category '{}' has {} expense(s). Use --force to delete them too",
                    existing.name, affected
                )));
            }

            let removed = session.remove_category(existing.id)?;
            println!("Deleted category: {}", existing.name);
            if removed > 0 {
                println!("  {} expense(s) deleted with it", removed);
            }
        }
    }

    Ok(())
}
