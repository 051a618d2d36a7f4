//! Password strength rules for new stores
//!
//! Five requirements, one point each. A new store needs all five; an
//! existing store accepts whatever password it was created with.

use std::fmt;

/// Symbols that count toward the "special character" requirement
const SYMBOLS: &str = "!@#$%^&*()_+-=[]";

/// Minimum password length
pub const MIN_LENGTH: usize = 8;

/// Which requirements a password meets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordCheck {
    pub long_enough: bool,
    pub has_uppercase: bool,
    pub has_lowercase: bool,
    pub has_digit: bool,
    pub has_symbol: bool,
}

/// Strength label derived from the score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Strength {
    VeryWeak,
    Weak,
    Fair,
    Good,
    Strong,
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::VeryWeak => "very weak",
            Self::Weak => "weak",
            Self::Fair => "fair",
            Self::Good => "good",
            Self::Strong => "strong",
        };
        f.write_str(label)
    }
}

impl PasswordCheck {
    /// Evaluate a password
    pub fn evaluate(password: &str) -> Self {
        Self {
            long_enough: password.chars().count() >= MIN_LENGTH,
            has_uppercase: password.chars().any(|c| c.is_ascii_uppercase()),
            has_lowercase: password.chars().any(|c| c.is_ascii_lowercase()),
            has_digit: password.chars().any(|c| c.is_ascii_digit()),
            has_symbol: password.chars().any(|c| SYMBOLS.contains(c)),
        }
    }

    /// Number of requirements met (0-5)
    pub fn score(&self) -> u8 {
        [
            self.long_enough,
            self.has_uppercase,
            self.has_lowercase,
            self.has_digit,
            self.has_symbol,
        ]
        .iter()
        .filter(|met| **met)
        .count() as u8
    }

    pub fn strength(&self) -> Strength {
        match self.score() {
            0 | 1 => Strength::VeryWeak,
            2 => Strength::Weak,
            3 => Strength::Fair,
            4 => Strength::Good,
            _ => Strength::Strong,
        }
    }

    /// All five requirements met
    pub fn is_acceptable(&self) -> bool {
        self.score() == 5
    }

    /// Human-readable list of unmet requirements
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !self.long_enough {
            missing.push("at least 8 characters");
        }
        if !self.has_uppercase {
            missing.push("an uppercase letter");
        }
        if !self.has_lowercase {
            missing.push("a lowercase letter");
        }
        if !self.has_digit {
            missing.push("a digit");
        }
        if !self.has_symbol {
            missing.push("a symbol (!@#$%^&*()_+-=[])");
        }
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strong_password() {
        let check = PasswordCheck::evaluate("Str0ng!Pass");
        assert_eq!(check.score(), 5);
        assert!(check.is_acceptable());
        assert_eq!(check.strength(), Strength::Strong);
        assert!(check.missing().is_empty());
    }

    #[test]
    fn test_weak_passwords() {
        assert_eq!(PasswordCheck::evaluate("").strength(), Strength::VeryWeak);
        assert_eq!(PasswordCheck::evaluate("abc").strength(), Strength::VeryWeak);
        assert_eq!(PasswordCheck::evaluate("abcdefgh").strength(), Strength::Weak);
        assert_eq!(PasswordCheck::evaluate("Abcdefgh").strength(), Strength::Fair);
        assert_eq!(PasswordCheck::evaluate("Abcdefg1").strength(), Strength::Good);
    }

    #[test]
    fn test_missing_lists_requirements() {
        let check = PasswordCheck::evaluate("password");
        assert!(!check.is_acceptable());
        assert_eq!(check.missing().len(), 3);
    }

    #[test]
    fn test_bracket_counts_as_symbol() {
        assert!(PasswordCheck::evaluate("x[").has_symbol);
        assert!(!PasswordCheck::evaluate("x~").has_symbol);
    }
}
