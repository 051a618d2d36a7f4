//! Session lifecycle
//!
//! A [`Session`] owns at most one mounted store at a time:
//!
//! ```text
//! Closed -> Opening -> Mounted -> (Mutating -> Mounted)* -> Closing -> Closed
//! ```
//!
//! Opening decrypts the durable file into the private mount file and loads
//! it. Every mutation is applied to a staged copy of the store, committed
//! (mount file + durable file), and only then adopted, so a failed
//! re-encryption leaves the session exactly as it was. Closing commits one
//! last time and deletes the plaintext mount file whether or not that
//! commit succeeded.
//!
//! All state sits behind one mutex: concurrent callers are serialized
//! around "mutate + re-encrypt".

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::config::VaultPaths;
use crate::crypto::file_codec;
use crate::crypto::{KdfParams, PasswordCheck, SecureBytes, SecureString};
use crate::error::{VaultError, VaultResult};
use crate::models::{
    Category, CategoryId, Expense, ExpenseId, ExpenseKind, ExpenseListing, IncomeEntry, IncomeId,
    Money,
};
use crate::storage::file_io::{secure_remove, write_bytes_atomic};
use crate::storage::{IdentifierRegistry, WorkingStore};

/// Aggregates shown on the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub income: Money,
    pub fixed: Money,
    pub variable: Money,
    pub balance: Money,
}

struct MountedStore {
    identifier: String,
    password: SecureString,
    durable_path: PathBuf,
    kdf: KdfParams,
    store: WorkingStore,
}

impl MountedStore {
    /// Flush `store` to the mount file, then re-encrypt it into the
    /// durable file
    fn persist(&self, store: &WorkingStore) -> VaultResult<()> {
        let snapshot = SecureBytes::new(store.snapshot()?);
        store.write_snapshot(&snapshot)?;
        file_codec::save(&self.durable_path, &self.password, &snapshot, &self.kdf)
    }
}

enum SessionState {
    Closed,
    Mounted(MountedStore),
}

impl SessionState {
    fn mounted(&self) -> VaultResult<&MountedStore> {
        match self {
            Self::Mounted(m) => Ok(m),
            Self::Closed => Err(VaultError::SessionClosed),
        }
    }

    fn mounted_mut(&mut self) -> VaultResult<&mut MountedStore> {
        match self {
            Self::Mounted(m) => Ok(m),
            Self::Closed => Err(VaultError::SessionClosed),
        }
    }
}

/// Final commit then unconditional plaintext removal
fn shutdown(state: &mut SessionState) -> VaultResult<()> {
    let mounted = match std::mem::replace(state, SessionState::Closed) {
        SessionState::Closed => return Ok(()),
        SessionState::Mounted(m) => m,
    };

    let committed = mounted.persist(&mounted.store);
    if let Err(e) = &committed {
        warn!(identifier = %mounted.identifier, error = %e, "final commit failed");
    }

    let removed = secure_remove(mounted.store.path());
    if let Err(e) = &removed {
        warn!(path = %mounted.store.path().display(), error = %e, "failed to remove plaintext mount file");
    }

    info!(identifier = %mounted.identifier, "session closed");
    committed.and(removed)
}

/// An encrypted store session
///
/// Constructed explicitly and handed to whoever needs the store; there is no
/// global instance. Dropping a mounted session closes it.
pub struct Session {
    paths: VaultPaths,
    kdf: KdfParams,
    state: Mutex<SessionState>,
}

impl Session {
    /// Create a closed session using the production key derivation params
    pub fn new(paths: VaultPaths) -> Self {
        Self::with_kdf(paths, KdfParams::default())
    }

    /// Create a closed session with custom key derivation params
    pub fn with_kdf(paths: VaultPaths, kdf: KdfParams) -> Self {
        Self {
            paths,
            kdf,
            state: Mutex::new(SessionState::Closed),
        }
    }

    pub fn paths(&self) -> &VaultPaths {
        &self.paths
    }

    fn lock(&self) -> VaultResult<MutexGuard<'_, SessionState>> {
        self.state
            .lock()
            .map_err(|e| VaultError::Storage(format!("Failed to acquire session lock: {}", e)))
    }

    pub fn is_open(&self) -> bool {
        self.lock()
            .map(|state| matches!(*state, SessionState::Mounted(_)))
            .unwrap_or(false)
    }

    /// Display name of the mounted store
    pub fn identifier(&self) -> Option<String> {
        let state = self.lock().ok()?;
        let mounted = state.mounted().ok()?;
        Some(mounted.identifier.clone())
    }

    /// Open (or create) the store for `identifier`
    ///
    /// On any failure the session stays closed and this call leaves no
    /// plaintext behind. Plaintext from an earlier interrupted session is
    /// only removed once the durable file authenticates. Wrong password and damaged file are different
    /// variants here; use [`VaultError::user_message`] when showing them.
    pub fn open_session(&self, identifier: &str, password: &str) -> VaultResult<()> {
        let mut state = self.lock()?;
        if matches!(*state, SessionState::Mounted(_)) {
            return Err(VaultError::SessionAlreadyOpen);
        }
        if password.is_empty() {
            return Err(VaultError::Validation("Password must not be empty".to_string()));
        }

        self.paths.ensure_directories()?;
        let mut registry = IdentifierRegistry::load(self.paths.registry_file())?;
        let slug = registry.resolve(identifier)?;
        let durable_path = self.paths.durable_file(&slug);
        let mount_path = self.paths.mount_file(&slug);

        let (store, needs_commit) = if durable_path.exists() {
            (self.mount_existing(&durable_path, &mount_path, password)?, false)
        } else {
            (self.mount_new(&mount_path, password)?, true)
        };

        let mounted = MountedStore {
            identifier: identifier.trim().to_string(),
            password: SecureString::new(password),
            durable_path,
            kdf: self.kdf,
            store,
        };

        if needs_commit || mounted.store.seeded_on_mount() {
            if let Err(e) = mounted.persist(&mounted.store) {
                let _ = secure_remove(&mount_path);
                return Err(e);
            }
        }

        if let Err(e) = registry.register(identifier, &slug) {
            let _ = secure_remove(&mount_path);
            return Err(e);
        }

        info!(identifier = %mounted.identifier, slug = %slug, "session opened");
        *state = SessionState::Mounted(mounted);
        Ok(())
    }

    fn mount_existing(
        &self,
        durable_path: &Path,
        mount_path: &Path,
        password: &str,
    ) -> VaultResult<WorkingStore> {
        let plaintext = file_codec::open(durable_path, password, &self.kdf).map_err(|e| {
            if mount_path.exists() {
                warn!(
                    path = %mount_path.display(),
                    "plaintext from an interrupted session remains until the store is opened with the right password"
                );
            }
            e
        })?;

        // Authenticated; any mount file still around is from a session
        // that never reached Closing
        if mount_path.exists() {
            warn!(path = %mount_path.display(), "discarding stale plaintext from an interrupted session");
            secure_remove(mount_path)?;
        }

        let mut staging = mount_path.as_os_str().to_owned();
        staging.push(".tmp");
        write_bytes_atomic(mount_path, Path::new(&staging), &plaintext)?;

        WorkingStore::mount(mount_path).map_err(|e| {
            let _ = secure_remove(mount_path);
            e
        })
    }

    fn mount_new(&self, mount_path: &Path, password: &str) -> VaultResult<WorkingStore> {
        let check = PasswordCheck::evaluate(password);
        if !check.is_acceptable() {
            return Err(VaultError::WeakPassword(format!(
                "needs {}",
                check.missing().join(", ")
            )));
        }

        if mount_path.exists() {
            // Plaintext without a durable file: a crash before the first save
            match WorkingStore::mount(mount_path) {
                Ok(store) => {
                    info!(path = %mount_path.display(), "recovered unsaved store from an interrupted session");
                    return Ok(store);
                }
                Err(e) => {
                    warn!(path = %mount_path.display(), error = %e, "discarding unreadable orphaned plaintext");
                    secure_remove(mount_path)?;
                }
            }
        }

        debug!(path = %mount_path.display(), "creating new store");
        WorkingStore::mount(mount_path).map_err(|e| {
            let _ = secure_remove(mount_path);
            e
        })
    }

    /// Close the session
    ///
    /// Returns the error of the final commit, if any; the plaintext mount
    /// file is removed regardless.
    pub fn close_session(&self) -> VaultResult<()> {
        let mut state = self.lock()?;
        shutdown(&mut state)
    }

    /// Re-encrypt the current store into the durable file
    pub fn commit(&self) -> VaultResult<()> {
        let state = self.lock()?;
        let mounted = state.mounted()?;
        mounted.persist(&mounted.store)
    }

    /// Apply `f` and commit, as one transaction
    ///
    /// `f` runs against a staged copy. If `f` fails or the commit fails,
    /// the store and mount file keep their previous content. Several edits
    /// inside one closure cost a single re-encryption.
    pub fn edit<T, F>(&self, f: F) -> VaultResult<T>
    where
        F: FnOnce(&mut WorkingStore) -> VaultResult<T>,
    {
        let mut state = self.lock()?;
        let mounted = state.mounted_mut()?;

        let mut staged = mounted.store.clone();
        let value = f(&mut staged)?;

        if let Err(e) = mounted.persist(&staged) {
            if let Err(restore) = mounted.store.flush() {
                warn!(error = %restore, "failed to restore mount file after a failed commit");
            }
            return Err(e);
        }

        mounted.store = staged;
        Ok(value)
    }

    /// Run a read-only closure against the mounted store
    pub fn read<T, F>(&self, f: F) -> VaultResult<T>
    where
        F: FnOnce(&WorkingStore) -> T,
    {
        let state = self.lock()?;
        let mounted = state.mounted()?;
        Ok(f(&mounted.store))
    }

    // Categories

    pub fn list_categories(&self) -> VaultResult<Vec<Category>> {
        self.read(|s| s.list_categories())
    }

    pub fn find_category(&self, identifier: &str) -> VaultResult<Option<Category>> {
        self.read(|s| s.find_category(identifier).cloned())
    }

    pub fn insert_category(&self, category: &mut Category) -> VaultResult<CategoryId> {
        let mut staged = category.clone();
        let id = self.edit(|s| s.insert_category(&mut staged))?;
        *category = staged;
        Ok(id)
    }

    pub fn update_category(&self, category: &Category) -> VaultResult<()> {
        self.edit(|s| s.update_category(category))
    }

    /// Remove a category; returns how many expenses went with it
    pub fn remove_category(&self, id: CategoryId) -> VaultResult<usize> {
        self.edit(|s| s.remove_category(id))
    }

    // Income

    pub fn list_income(&self) -> VaultResult<Vec<IncomeEntry>> {
        self.read(|s| s.list_income())
    }

    pub fn get_income(&self, id: IncomeId) -> VaultResult<Option<IncomeEntry>> {
        self.read(|s| s.get_income(id).cloned())
    }

    pub fn insert_income(&self, entry: &mut IncomeEntry) -> VaultResult<IncomeId> {
        let mut staged = entry.clone();
        let id = self.edit(|s| s.insert_income(&mut staged))?;
        entry.id = id;
        Ok(id)
    }

    pub fn update_income(&self, entry: &IncomeEntry) -> VaultResult<()> {
        self.edit(|s| s.update_income(entry))
    }

    pub fn remove_income(&self, id: IncomeId) -> VaultResult<()> {
        self.edit(|s| s.remove_income(id))
    }

    pub fn total_income(&self) -> VaultResult<Money> {
        self.read(|s| s.total_income())?
    }

    // Expenses

    pub fn list_expenses(&self, kind: ExpenseKind) -> VaultResult<Vec<ExpenseListing>> {
        self.read(|s| s.list_expenses(kind))
    }

    pub fn get_expense(&self, kind: ExpenseKind, id: ExpenseId) -> VaultResult<Option<Expense>> {
        self.read(|s| s.get_expense(kind, id).cloned())
    }

    pub fn insert_expense(&self, kind: ExpenseKind, expense: &mut Expense) -> VaultResult<ExpenseId> {
        let mut staged = expense.clone();
        let id = self.edit(|s| s.insert_expense(kind, &mut staged))?;
        expense.id = id;
        Ok(id)
    }

    pub fn update_expense(&self, kind: ExpenseKind, expense: &Expense) -> VaultResult<()> {
        self.edit(|s| s.update_expense(kind, expense))
    }

    pub fn remove_expense(&self, kind: ExpenseKind, id: ExpenseId) -> VaultResult<()> {
        self.edit(|s| s.remove_expense(kind, id))
    }

    pub fn list_fixed(&self) -> VaultResult<Vec<ExpenseListing>> {
        self.list_expenses(ExpenseKind::Fixed)
    }

    pub fn insert_fixed(&self, expense: &mut Expense) -> VaultResult<ExpenseId> {
        self.insert_expense(ExpenseKind::Fixed, expense)
    }

    pub fn update_fixed(&self, expense: &Expense) -> VaultResult<()> {
        self.update_expense(ExpenseKind::Fixed, expense)
    }

    pub fn remove_fixed(&self, id: ExpenseId) -> VaultResult<()> {
        self.remove_expense(ExpenseKind::Fixed, id)
    }

    pub fn total_fixed(&self) -> VaultResult<Money> {
        self.read(|s| s.total_fixed())?
    }

    pub fn list_variable(&self) -> VaultResult<Vec<ExpenseListing>> {
        self.list_expenses(ExpenseKind::Variable)
    }

    pub fn insert_variable(&self, expense: &mut Expense) -> VaultResult<ExpenseId> {
        self.insert_expense(ExpenseKind::Variable, expense)
    }

    pub fn update_variable(&self, expense: &Expense) -> VaultResult<()> {
        self.update_expense(ExpenseKind::Variable, expense)
    }

    pub fn remove_variable(&self, id: ExpenseId) -> VaultResult<()> {
        self.remove_expense(ExpenseKind::Variable, id)
    }

    pub fn total_variable(&self) -> VaultResult<Money> {
        self.read(|s| s.total_variable())?
    }

    /// Copy last month's fixed expenses into `today` (one re-encryption)
    pub fn repeat_previous_month_fixed(&self, today: NaiveDate) -> VaultResult<Vec<ExpenseId>> {
        self.edit(|s| s.repeat_previous_month_fixed(today))
    }

    /// Totals and balance in one consistent read
    pub fn summary(&self) -> VaultResult<Summary> {
        self.read(|s| -> VaultResult<Summary> {
            Ok(Summary {
                income: s.total_income()?,
                fixed: s.total_fixed()?,
                variable: s.total_variable()?,
                balance: s.balance()?,
            })
        })?
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        let state = match self.state.get_mut() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = shutdown(state) {
            warn!(error = %e, "error while closing session on drop");
        }
    }
}
