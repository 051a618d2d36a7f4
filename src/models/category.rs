//! Expense category model
//!
//! Categories classify fixed and variable expenses. Names are unique within
//! a store; a fresh store is seeded with [`DEFAULT_CATEGORIES`].

use serde::{Deserialize, Serialize};

use super::ids::CategoryId;

/// Maximum category name length, in characters
pub const MAX_NAME_LEN: usize = 100;

/// Categories seeded into an empty store, in insertion order
pub const DEFAULT_CATEGORIES: [&str; 11] = [
    "Aluguel/Moradia",
    "Internet",
    "Luz/Água/Gás",
    "Transporte",
    "Alimentação",
    "Educação",
    "Saúde",
    "Streaming/TV/Telefone",
    "Academia",
    "Outros",
    "Crédito",
];

/// Validation errors for categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryValidationError {
    EmptyName,
    NameTooLong(usize),
}

impl std::fmt::Display for CategoryValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Category name cannot be empty"),
            Self::NameTooLong(len) => write!(
                f,
                "Category name too long ({} characters, max {})",
                len, MAX_NAME_LEN
            ),
        }
    }
}

impl std::error::Error for CategoryValidationError {}

/// An expense category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

impl Category {
    /// Create a category that has not been inserted yet
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: CategoryId::default(),
            name: name.into().trim().to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), CategoryValidationError> {
        let len = self.name.chars().count();
        if self.name.trim().is_empty() {
            return Err(CategoryValidationError::EmptyName);
        }
        if len > MAX_NAME_LEN {
            return Err(CategoryValidationError::NameTooLong(len));
        }
        Ok(())
    }

    /// Case-insensitive name comparison used for the uniqueness rule
    pub fn same_name(&self, other: &str) -> bool {
        self.name.to_lowercase() == other.trim().to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_category_trims() {
        let cat = Category::new("  Internet ");
        assert_eq!(cat.name, "Internet");
        assert!(cat.id.is_unassigned());
    }

    #[test]
    fn test_validation() {
        assert!(Category::new("Saúde").validate().is_ok());
        assert_eq!(
            Category::new("   ").validate(),
            Err(CategoryValidationError::EmptyName)
        );
        assert!(matches!(
            Category::new("x".repeat(101)).validate(),
            Err(CategoryValidationError::NameTooLong(101))
        ));
    }

    #[test]
    fn test_same_name_ignores_case() {
        let cat = Category::new("Internet");
        assert!(cat.same_name("internet"));
        assert!(!cat.same_name("Intranet"));
    }

    #[test]
    fn test_defaults() {
        assert_eq!(DEFAULT_CATEGORIES.len(), 11);
        assert!(DEFAULT_CATEGORIES.iter().all(|n| Category::new(*n).validate().is_ok()));
    }
}
