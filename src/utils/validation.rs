//! Field-level validation utilities

use crate::types::*;

/// Validate that an account code is well formed: non-empty, digits only,
/// at most 10 characters
pub fn validate_account_code(code: &str) -> LedgerResult<()> {
    if code.trim().is_empty() {
        return Err(LedgerError::Validation(
            "Account code cannot be empty".to_string(),
        ));
    }

    if code.len() > 10 {
        return Err(LedgerError::Validation(
            "Account code cannot exceed 10 characters".to_string(),
        ));
    }

    if !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(LedgerError::Validation(
            "Account code can only contain digits".to_string(),
        ));
    }

    Ok(())
}

/// Validate that an account name is valid
pub fn validate_account_name(name: &str) -> LedgerResult<()> {
    if name.trim().is_empty() {
        return Err(LedgerError::Validation(
            "Account name cannot be empty".to_string(),
        ));
    }

    if name.len() > 100 {
        return Err(LedgerError::Validation(
            "Account name cannot exceed 100 characters".to_string(),
        ));
    }

    Ok(())
}

/// Validate that an entry description is valid
pub fn validate_entry_description(description: &str) -> LedgerResult<()> {
    if description.trim().is_empty() {
        return Err(LedgerError::Validation(
            "Entry description cannot be empty".to_string(),
        ));
    }

    if description.len() > 500 {
        return Err(LedgerError::Validation(
            "Entry description cannot exceed 500 characters".to_string(),
        ));
    }

    Ok(())
}

/// Validate that a template key is well formed
pub fn validate_template_key(key: &str) -> LedgerResult<()> {
    if key.trim().is_empty() {
        return Err(LedgerError::Validation(
            "Template key cannot be empty".to_string(),
        ));
    }

    if !key
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
    {
        return Err(LedgerError::Validation(
            "Template key can only contain lowercase letters, digits, dashes, and underscores"
                .to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_code_must_be_numeric() {
        assert!(validate_account_code("101").is_ok());
        assert!(validate_account_code("").is_err());
        assert!(validate_account_code("10a").is_err());
        assert!(validate_account_code("12345678901").is_err());
    }

    #[test]
    fn descriptions_are_bounded() {
        assert!(validate_entry_description("Penjualan tiram grade A").is_ok());
        assert!(validate_entry_description("   ").is_err());
        assert!(validate_entry_description(&"x".repeat(501)).is_err());
    }
}
