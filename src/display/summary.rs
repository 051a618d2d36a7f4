//! Summary and password strength formatting

use crate::crypto::PasswordCheck;
use crate::session::Summary;

/// Format the income / expenses / balance overview
pub fn format_summary(identifier: &str, summary: &Summary) -> String {
    let mut output = String::new();
    output.push_str(&format!("Summary for {}\n", identifier));
    output.push_str(&format!("{}\n", "=".repeat(40)));
    output.push_str(&format!("Income:            {:>18}\n", summary.income));
    output.push_str(&format!("Fixed expenses:    {:>18}\n", summary.fixed));
    output.push_str(&format!("Variable expenses: {:>18}\n", summary.variable));
    output.push_str(&format!("{}\n", "-".repeat(40)));
    output.push_str(&format!("Balance:           {:>18}\n", summary.balance));
    if summary.balance.is_negative() {
        output.push_str("\nSpending exceeds income.\n");
    }
    output
}

/// Describe how a candidate password scores and what it lacks
pub fn format_password_strength(check: &PasswordCheck) -> String {
    let mut output = format!("Password strength: {} ({}/5)", check.strength(), check.score());
    let missing = check.missing();
    if !missing.is_empty() {
        output.push_str(&format!("\nMissing: {}", missing.join(", ")));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Money;

    #[test]
    fn test_summary_negative_balance() {
        let summary = Summary {
            income: Money::from_cents(1000),
            fixed: Money::from_cents(1500),
            variable: Money::zero(),
            balance: Money::from_cents(-500),
        };
        let output = format_summary("alice", &summary);
        assert!(output.contains("Summary for alice"));
        assert!(output.contains("-R$ 5,00"));
        assert!(output.contains("Spending exceeds income."));
    }

    #[test]
    fn test_strength_lists_missing() {
        let output = format_password_strength(&PasswordCheck::evaluate("abc"));
        assert!(output.contains("Missing:"));
        assert!(!format_password_strength(&PasswordCheck::evaluate("Str0ng!Pass")).contains("Missing"));
    }
}
