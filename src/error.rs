//! Custom error types for vaultbook
//!
//! This module defines the error hierarchy for the store using thiserror.
//! Open-time failures keep distinct variants for diagnostics, but callers
//! facing an end user should present [`VaultError::user_message`], which
//! does not reveal which of them occurred.

use thiserror::Error;

/// The main error type for vaultbook operations
#[derive(Error, Debug)]
pub enum VaultError {
    /// Decryption of the durable file failed (wrong password, tampering or corruption)
    #[error("Wrong password or corrupted data file")]
    WrongPasswordOrCorrupt,

    /// Durable file too short to even hold a salt
    #[error("Data file is corrupted: {0}")]
    CorruptFile(String),

    /// Refused to persist a zero-length snapshot
    #[error("Refusing to save an empty snapshot")]
    EmptySnapshot,

    /// The working store is structurally invalid
    #[error("Schema error: {0}")]
    Schema(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Key derivation or cipher setup errors
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// AEAD tag verification failed
    #[error("Authentication failed")]
    AuthFailure,

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation errors for data models
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// Two distinct identifiers sanitize to the same file name
    #[error("Identifier '{requested}' collides with existing '{existing}' (both map to '{slug}')")]
    IdentifierCollision {
        requested: String,
        existing: String,
        slug: String,
    },

    /// Password rejected by the policy when creating a new store
    #[error("Password too weak: {0}")]
    WeakPassword(String),

    /// Operation needs a mounted store
    #[error("No session is open")]
    SessionClosed,

    /// open_session called while another store is mounted
    #[error("A session is already open")]
    SessionAlreadyOpen,

    /// Lock poisoning and similar internal failures
    #[error("Storage error: {0}")]
    Storage(String),
}

impl VaultError {
    /// Create a "not found" error for categories
    pub fn category_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Category",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for income entries
    pub fn income_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Income entry",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for expenses
    pub fn expense_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Expense",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// True for the failures that can come out of decrypting a durable file
    pub fn is_open_failure(&self) -> bool {
        matches!(
            self,
            Self::WrongPasswordOrCorrupt | Self::CorruptFile(_) | Self::AuthFailure
        )
    }

    /// Message suitable for an end user
    ///
    /// Wrong password, tampering and truncated files all read the same so the
    /// message cannot be used as an oracle.
    pub fn user_message(&self) -> String {
        if self.is_open_failure() {
            "Could not open the budget: wrong password or damaged file.".to_string()
        } else {
            self.to_string()
        }
    }
}

impl From<std::io::Error> for VaultError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for VaultError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for vaultbook operations
pub type VaultResult<T> = Result<T, VaultError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = VaultError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_not_found_error() {
        let err = VaultError::category_not_found("Internet");
        assert_eq!(err.to_string(), "Category not found: Internet");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_open_failures_share_user_message() {
        let wrong = VaultError::WrongPasswordOrCorrupt.user_message();
        let corrupt = VaultError::CorruptFile("3 bytes".into()).user_message();
        assert_eq!(wrong, corrupt);
        assert!(!corrupt.contains("3 bytes"));
    }

    #[test]
    fn test_collision_display() {
        let err = VaultError::IdentifierCollision {
            requested: "Alice?".into(),
            existing: "Alice!".into(),
            slug: "alice".into(),
        };
        assert!(err.to_string().contains("alice"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: VaultError = io_err.into();
        assert!(matches!(err, VaultError::Io(_)));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<u32>("not a number").unwrap_err();
        let err: VaultError = json_err.into();
        assert!(matches!(err, VaultError::Json(_)));
    }
}
