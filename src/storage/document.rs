//! On-disk shape of the working store
//!
//! The whole store is one JSON document: id sequences plus four tables.
//! This is what gets encrypted into the durable file.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{VaultError, VaultResult};
use crate::models::{Category, Expense, IncomeEntry};

/// Current document schema version
pub const SCHEMA_VERSION: u32 = 1;

/// Next id to hand out per table
///
/// Sequences only move forward, so ids of deleted rows are never reused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequences {
    pub category: i64,
    pub income: i64,
    pub fixed: i64,
    pub variable: i64,
}

impl Default for Sequences {
    fn default() -> Self {
        Self {
            category: 1,
            income: 1,
            fixed: 1,
            variable: 1,
        }
    }
}

/// The serialized working store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreDocument {
    pub schema_version: u32,
    #[serde(default)]
    pub sequences: Sequences,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub income: Vec<IncomeEntry>,
    #[serde(default)]
    pub fixed_expenses: Vec<Expense>,
    #[serde(default)]
    pub variable_expenses: Vec<Expense>,
}

impl Default for StoreDocument {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            sequences: Sequences::default(),
            categories: Vec::new(),
            income: Vec::new(),
            fixed_expenses: Vec::new(),
            variable_expenses: Vec::new(),
        }
    }
}

fn check_ids<I>(table: &str, ids: I, next: i64) -> VaultResult<()>
where
    I: IntoIterator<Item = i64>,
{
    let mut seen = HashSet::new();
    for id in ids {
        if id <= 0 {
            return Err(VaultError::Schema(format!("{}: invalid id {}", table, id)));
        }
        if id >= next {
            return Err(VaultError::Schema(format!(
                "{}: id {} not below sequence {}",
                table, id, next
            )));
        }
        if !seen.insert(id) {
            return Err(VaultError::Schema(format!("{}: duplicate id {}", table, id)));
        }
    }
    Ok(())
}

impl StoreDocument {
    /// Parse a document from decrypted bytes and check its invariants
    pub fn from_bytes(bytes: &[u8]) -> VaultResult<Self> {
        let doc: Self = serde_json::from_slice(bytes)
            .map_err(|e| VaultError::Schema(format!("Unreadable store document: {}", e)))?;
        doc.check()?;
        Ok(doc)
    }

    /// Serialize to bytes
    pub fn to_bytes(&self) -> VaultResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Verify structural invariants: version, unique ids, unique category
    /// names, and that every expense references an existing category
    pub fn check(&self) -> VaultResult<()> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(VaultError::Schema(format!(
                "Unsupported schema version {}",
                self.schema_version
            )));
        }

        check_ids(
            "categories",
            self.categories.iter().map(|c| c.id.get()),
            self.sequences.category,
        )?;
        check_ids(
            "income",
            self.income.iter().map(|e| e.id.get()),
            self.sequences.income,
        )?;
        check_ids(
            "fixed_expenses",
            self.fixed_expenses.iter().map(|e| e.id.get()),
            self.sequences.fixed,
        )?;
        check_ids(
            "variable_expenses",
            self.variable_expenses.iter().map(|e| e.id.get()),
            self.sequences.variable,
        )?;

        let mut names = HashSet::new();
        for cat in &self.categories {
            if !names.insert(cat.name.to_lowercase()) {
                return Err(VaultError::Schema(format!(
                    "Duplicate category name '{}'",
                    cat.name
                )));
            }
        }

        let category_ids: HashSet<_> = self.categories.iter().map(|c| c.id).collect();
        for exp in self.fixed_expenses.iter().chain(&self.variable_expenses) {
            if !category_ids.contains(&exp.category_id) {
                return Err(VaultError::Schema(format!(
                    "Expense {} references missing category {}",
                    exp.id, exp.category_id
                )));
            }
        }

        Ok(())
    }
}
