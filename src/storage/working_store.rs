//! Plaintext working store
//!
//! Holds the decrypted document in memory and mirrors it to a private
//! file (the mount path). All CRUD happens here; persistence to the
//! encrypted durable file is the session's job.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use tracing::debug;

use crate::error::{VaultError, VaultResult};
use crate::models::{
    Category, CategoryId, Expense, ExpenseId, ExpenseKind, ExpenseListing, IncomeEntry, IncomeId,
    Money, DEFAULT_CATEGORIES,
};

use super::document::StoreDocument;
use super::file_io::write_bytes_atomic;

/// The mounted working store
#[derive(Debug, Clone)]
pub struct WorkingStore {
    path: PathBuf,
    doc: StoreDocument,
    seeded_on_mount: bool,
}

fn next_id(seq: &mut i64, table: &str) -> VaultResult<i64> {
    let id = *seq;
    *seq = seq
        .checked_add(1)
        .ok_or_else(|| VaultError::Schema(format!("{} id sequence exhausted", table)))?;
    Ok(id)
}

fn sum(amounts: impl Iterator<Item = Money>, what: &str) -> VaultResult<Money> {
    Money::checked_sum(amounts)
        .ok_or_else(|| VaultError::Validation(format!("{} total overflows", what)))
}

impl WorkingStore {
    /// Open or create the store at `path`
    ///
    /// An existing file is parsed and checked; a missing one starts an empty
    /// document. Default categories are seeded whenever the category table
    /// is empty, and the result is written back to `path`.
    pub fn mount(path: impl Into<PathBuf>) -> VaultResult<Self> {
        let path = path.into();

        let doc = if path.exists() {
            let bytes = fs::read(&path)
                .map_err(|e| VaultError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
            StoreDocument::from_bytes(&bytes)?
        } else {
            StoreDocument::default()
        };

        let mut store = Self {
            path,
            doc,
            seeded_on_mount: false,
        };

        if store.doc.categories.is_empty() {
            store.seed_default_categories()?;
            store.seeded_on_mount = true;
        }
        store.flush()?;

        debug!(
            path = %store.path.display(),
            seeded = store.seeded_on_mount,
            "mounted working store"
        );
        Ok(store)
    }

    fn seed_default_categories(&mut self) -> VaultResult<()> {
        for name in DEFAULT_CATEGORIES {
            let mut cat = Category::new(name);
            self.insert_category(&mut cat)?;
        }
        Ok(())
    }

    /// Mount path of the plaintext file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether mounting had to seed the default categories
    pub fn seeded_on_mount(&self) -> bool {
        self.seeded_on_mount
    }

    pub fn document(&self) -> &StoreDocument {
        &self.doc
    }

    /// Serialized store content, as it would be encrypted
    pub fn snapshot(&self) -> VaultResult<Vec<u8>> {
        self.doc.to_bytes()
    }

    /// Write the current document to the mount path
    pub fn flush(&self) -> VaultResult<()> {
        self.write_snapshot(&self.snapshot()?)
    }

    /// Write an already-serialized snapshot to the mount path
    pub fn write_snapshot(&self, bytes: &[u8]) -> VaultResult<()> {
        let mut staging = self.path.as_os_str().to_owned();
        staging.push(".tmp");
        write_bytes_atomic(&self.path, Path::new(&staging), bytes)
    }

    // Categories

    /// All categories ordered by name
    pub fn list_categories(&self) -> Vec<Category> {
        let mut list = self.doc.categories.clone();
        list.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then(a.id.cmp(&b.id))
        });
        list
    }

    pub fn get_category(&self, id: CategoryId) -> Option<&Category> {
        self.doc.categories.iter().find(|c| c.id == id)
    }

    /// Find a category by id or name
    ///
    /// A prefixed id (`cat-3`) wins over everything else, then the
    /// case-insensitive name, then a bare number as an id. A category named
    /// "3" is therefore found by "3", while "cat-3" always means id 3.
    pub fn find_category(&self, identifier: &str) -> Option<&Category> {
        let trimmed = identifier.trim();
        if trimmed.starts_with("cat-") {
            if let Some(cat) = trimmed
                .parse::<CategoryId>()
                .ok()
                .and_then(|id| self.get_category(id))
            {
                return Some(cat);
            }
        }
        if let Some(cat) = self.doc.categories.iter().find(|c| c.same_name(trimmed)) {
            return Some(cat);
        }
        trimmed
            .parse::<CategoryId>()
            .ok()
            .and_then(|id| self.get_category(id))
    }

    fn ensure_unique_name(&self, name: &str, except: Option<CategoryId>) -> VaultResult<()> {
        let taken = self
            .doc
            .categories
            .iter()
            .any(|c| Some(c.id) != except && c.same_name(name));
        if taken {
            return Err(VaultError::Duplicate {
                entity_type: "Category",
                identifier: name.to_string(),
            });
        }
        Ok(())
    }

    /// Insert a category, writing the assigned id back into `category`
    pub fn insert_category(&mut self, category: &mut Category) -> VaultResult<CategoryId> {
        category.name = category.name.trim().to_string();
        category
            .validate()
            .map_err(|e| VaultError::Validation(e.to_string()))?;
        self.ensure_unique_name(&category.name, None)?;

        category.id = CategoryId::new(next_id(&mut self.doc.sequences.category, "category")?);
        self.doc.categories.push(category.clone());
        Ok(category.id)
    }

    /// Rename a category
    pub fn update_category(&mut self, category: &Category) -> VaultResult<()> {
        let mut updated = category.clone();
        updated.name = updated.name.trim().to_string();
        updated
            .validate()
            .map_err(|e| VaultError::Validation(e.to_string()))?;
        self.ensure_unique_name(&updated.name, Some(updated.id))?;

        let slot = self
            .doc
            .categories
            .iter_mut()
            .find(|c| c.id == updated.id)
            .ok_or_else(|| VaultError::category_not_found(updated.id.to_string()))?;
        *slot = updated;
        Ok(())
    }

    /// Remove a category and every expense that references it
    ///
    /// Returns the number of expenses removed by the cascade.
    pub fn remove_category(&mut self, id: CategoryId) -> VaultResult<usize> {
        let before = self.doc.categories.len();
        self.doc.categories.retain(|c| c.id != id);
        if self.doc.categories.len() == before {
            return Err(VaultError::category_not_found(id.to_string()));
        }

        let expenses_before = self.doc.fixed_expenses.len() + self.doc.variable_expenses.len();
        self.doc.fixed_expenses.retain(|e| e.category_id != id);
        self.doc.variable_expenses.retain(|e| e.category_id != id);
        let cascaded =
            expenses_before - self.doc.fixed_expenses.len() - self.doc.variable_expenses.len();

        debug!(category = %id, cascaded, "removed category");
        Ok(cascaded)
    }

    // Income

    /// All income entries, newest first
    pub fn list_income(&self) -> Vec<IncomeEntry> {
        let mut list = self.doc.income.clone();
        list.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        list
    }

    pub fn get_income(&self, id: IncomeId) -> Option<&IncomeEntry> {
        self.doc.income.iter().find(|e| e.id == id)
    }

    /// Insert an income entry, writing the assigned id back into `entry`
    pub fn insert_income(&mut self, entry: &mut IncomeEntry) -> VaultResult<IncomeId> {
        entry
            .validate()
            .map_err(|e| VaultError::Validation(e.to_string()))?;

        entry.id = IncomeId::new(next_id(&mut self.doc.sequences.income, "income")?);
        self.doc.income.push(entry.clone());
        Ok(entry.id)
    }

    pub fn update_income(&mut self, entry: &IncomeEntry) -> VaultResult<()> {
        entry
            .validate()
            .map_err(|e| VaultError::Validation(e.to_string()))?;

        let slot = self
            .doc
            .income
            .iter_mut()
            .find(|e| e.id == entry.id)
            .ok_or_else(|| VaultError::income_not_found(entry.id.to_string()))?;
        *slot = entry.clone();
        Ok(())
    }

    pub fn remove_income(&mut self, id: IncomeId) -> VaultResult<()> {
        let before = self.doc.income.len();
        self.doc.income.retain(|e| e.id != id);
        if self.doc.income.len() == before {
            return Err(VaultError::income_not_found(id.to_string()));
        }
        Ok(())
    }

    pub fn total_income(&self) -> VaultResult<Money> {
        sum(self.doc.income.iter().map(|e| e.amount), "Income")
    }

    // Expenses

    fn table(&self, kind: ExpenseKind) -> &Vec<Expense> {
        match kind {
            ExpenseKind::Fixed => &self.doc.fixed_expenses,
            ExpenseKind::Variable => &self.doc.variable_expenses,
        }
    }

    fn table_mut(&mut self, kind: ExpenseKind) -> &mut Vec<Expense> {
        match kind {
            ExpenseKind::Fixed => &mut self.doc.fixed_expenses,
            ExpenseKind::Variable => &mut self.doc.variable_expenses,
        }
    }

    fn validate_expense(&self, expense: &Expense) -> VaultResult<()> {
        expense
            .validate()
            .map_err(|e| VaultError::Validation(e.to_string()))?;
        if self.get_category(expense.category_id).is_none() {
            return Err(VaultError::category_not_found(expense.category_id.to_string()));
        }
        Ok(())
    }

    /// Expenses of one kind, newest first, with category names resolved
    pub fn list_expenses(&self, kind: ExpenseKind) -> Vec<ExpenseListing> {
        let mut list: Vec<ExpenseListing> = self
            .table(kind)
            .iter()
            .filter_map(|exp| {
                self.get_category(exp.category_id).map(|cat| ExpenseListing {
                    expense: exp.clone(),
                    category_name: cat.name.clone(),
                })
            })
            .collect();
        list.sort_by(|a, b| {
            b.expense
                .date
                .cmp(&a.expense.date)
                .then(b.expense.id.cmp(&a.expense.id))
        });
        list
    }

    pub fn list_fixed(&self) -> Vec<ExpenseListing> {
        self.list_expenses(ExpenseKind::Fixed)
    }

    pub fn list_variable(&self) -> Vec<ExpenseListing> {
        self.list_expenses(ExpenseKind::Variable)
    }

    pub fn get_expense(&self, kind: ExpenseKind, id: ExpenseId) -> Option<&Expense> {
        self.table(kind).iter().find(|e| e.id == id)
    }

    /// Insert an expense, writing the assigned id back into `expense`
    pub fn insert_expense(
        &mut self,
        kind: ExpenseKind,
        expense: &mut Expense,
    ) -> VaultResult<ExpenseId> {
        self.validate_expense(expense)?;

        let seq = match kind {
            ExpenseKind::Fixed => &mut self.doc.sequences.fixed,
            ExpenseKind::Variable => &mut self.doc.sequences.variable,
        };
        expense.id = ExpenseId::new(next_id(seq, "expense")?);
        self.table_mut(kind).push(expense.clone());
        Ok(expense.id)
    }

    pub fn update_expense(&mut self, kind: ExpenseKind, expense: &Expense) -> VaultResult<()> {
        self.validate_expense(expense)?;

        let slot = self
            .table_mut(kind)
            .iter_mut()
            .find(|e| e.id == expense.id)
            .ok_or_else(|| VaultError::expense_not_found(expense.id.to_string()))?;
        *slot = expense.clone();
        Ok(())
    }

    pub fn remove_expense(&mut self, kind: ExpenseKind, id: ExpenseId) -> VaultResult<()> {
        let table = self.table_mut(kind);
        let before = table.len();
        table.retain(|e| e.id != id);
        if table.len() == before {
            return Err(VaultError::expense_not_found(id.to_string()));
        }
        Ok(())
    }

    pub fn total_expenses(&self, kind: ExpenseKind) -> VaultResult<Money> {
        sum(self.table(kind).iter().map(|e| e.amount), "Expense")
    }

    pub fn total_fixed(&self) -> VaultResult<Money> {
        self.total_expenses(ExpenseKind::Fixed)
    }

    pub fn total_variable(&self) -> VaultResult<Money> {
        self.total_expenses(ExpenseKind::Variable)
    }

    /// Income minus both expense totals
    pub fn balance(&self) -> VaultResult<Money> {
        let income = self.total_income()?;
        let fixed = self.total_fixed()?;
        let variable = self.total_variable()?;
        income
            .checked_sub(fixed)
            .and_then(|m| m.checked_sub(variable))
            .ok_or_else(|| VaultError::Validation("Balance overflows".to_string()))
    }

    /// Copy last month's fixed expenses into `today` with an open amount
    ///
    /// Each copy keeps description and category, is dated `today` and has
    /// amount zero for the user to fill in. Returns the new ids.
    pub fn repeat_previous_month_fixed(&mut self, today: NaiveDate) -> VaultResult<Vec<ExpenseId>> {
        let previous = today
            .with_day(1)
            .and_then(|first| first.pred_opt())
            .ok_or_else(|| VaultError::Validation(format!("No month before {}", today)))?;

        let mut templates: Vec<Expense> = self
            .doc
            .fixed_expenses
            .iter()
            .filter(|e| e.date.year() == previous.year() && e.date.month() == previous.month())
            .cloned()
            .collect();
        templates.sort_by_key(|e| e.id);

        let mut created = Vec::with_capacity(templates.len());
        for template in templates {
            let mut copy = Expense::new(
                template.description,
                Money::zero(),
                today,
                template.category_id,
            );
            created.push(self.insert_expense(ExpenseKind::Fixed, &mut copy)?);
        }
        Ok(created)
    }
}
