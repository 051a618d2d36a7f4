//! Path management for vaultbook
//!
//! Maps user-chosen identifiers to files inside the data directory.
//!
//! ## Path Resolution Order
//!
//! 1. `VAULTBOOK_DATA_DIR` environment variable (if set)
//! 2. The platform data directory from `directories`
//!    (`~/.local/share/vaultbook` on Linux)

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::VaultError;

/// Environment variable overriding the base directory
pub const DATA_DIR_ENV: &str = "VAULTBOOK_DATA_DIR";

/// Name used when an identifier sanitizes to nothing
pub const FALLBACK_IDENTIFIER: &str = "orcamento";

/// Maximum length of a sanitized identifier
pub const MAX_SLUG_LEN: usize = 50;

/// Turn a user-chosen identifier into a file-name slug
///
/// Trims surrounding whitespace, lowercases, turns inner spaces into
/// underscores, drops everything outside
/// `[a-z0-9_]` and truncates to 50 characters. Different identifiers can
/// collapse to the same slug; see `storage::registry` for how that is caught.
pub fn sanitize_identifier(identifier: &str) -> String {
    let slug: String = identifier
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' { '_' } else { c })
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_')
        .take(MAX_SLUG_LEN)
        .collect();

    if slug.is_empty() {
        FALLBACK_IDENTIFIER.to_string()
    } else {
        slug
    }
}

/// Manages all paths used by vaultbook
#[derive(Debug, Clone)]
pub struct VaultPaths {
    base_dir: PathBuf,
}

impl VaultPaths {
    /// Resolve the base directory from the environment or platform defaults
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn new() -> Result<Self, VaultError> {
        let base_dir = if let Ok(custom) = std::env::var(DATA_DIR_ENV) {
            PathBuf::from(custom)
        } else {
            ProjectDirs::from("", "", "vaultbook")
                .map(|dirs| dirs.data_dir().to_path_buf())
                .ok_or_else(|| {
                    VaultError::Config("Could not determine a data directory".into())
                })?
        };

        Ok(Self { base_dir })
    }

    /// Create VaultPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Directory holding durable files and mount files
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Registry of identifiers already mapped to slugs
    pub fn registry_file(&self) -> PathBuf {
        self.data_dir().join("identifiers.json")
    }

    /// Encrypted durable file for a slug: `data/<slug>.enc`
    pub fn durable_file(&self, slug: &str) -> PathBuf {
        self.data_dir().join(format!("{}.enc", slug))
    }

    /// Plaintext mount file for a slug: `data/.<slug>.db`
    pub fn mount_file(&self, slug: &str) -> PathBuf {
        self.data_dir().join(format!(".{}.db", slug))
    }

    /// Ensure the base and data directories exist
    ///
    /// On Unix the data directory is restricted to the owner.
    pub fn ensure_directories(&self) -> Result<(), VaultError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| VaultError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| VaultError::Io(format!("Failed to create data directory: {}", e)))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(self.data_dir(), std::fs::Permissions::from_mode(0o700))
                .map_err(|e| {
                    VaultError::Io(format!("Failed to restrict data directory: {}", e))
                })?;
        }

        Ok(())
    }
}
