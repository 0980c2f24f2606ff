//! Identifier validation for the feature store naming constraint
//!
//! Feature store, feature group and feature names are restricted to
//! lowercase alphanumerics and underscores, starting with a letter. The SQL
//! synthesizer performs no quoting or escaping and relies entirely on this
//! check being applied when a metadata snapshot is built.

use crate::error::{Error, Result};

/// Maximum identifier length accepted by the metadata service
pub const MAX_IDENTIFIER_LEN: usize = 256;

/// Lowercases an identifier and validates it against the naming constraint.
///
/// Returns the normalized (lowercased) identifier or `Error::InvalidName`.
pub fn normalize_identifier(name: &str) -> Result<String> {
    let normalized = name.to_ascii_lowercase();
    validate_identifier(&normalized)?;
    Ok(normalized)
}

/// Validates an already-lowercased identifier.
pub fn validate_identifier(name: &str) -> Result<()> {
    let first = match name.chars().next() {
        Some(c) => c,
        None => return Err(Error::invalid_name(name, "identifier is empty")),
    };
    if name.len() > MAX_IDENTIFIER_LEN {
        return Err(Error::invalid_name(name, "identifier is too long"));
    }
    if !first.is_ascii_lowercase() {
        return Err(Error::invalid_name(
            name,
            "identifier must start with a lowercase letter",
        ));
    }
    if let Some(bad) = name
        .chars()
        .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_'))
    {
        return Err(Error::invalid_name(
            name,
            format!("illegal character '{}', only [a-z0-9_] are allowed", bad),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_identifiers() {
        for name in ["trx_summary_features", "cust_id", "f1", "a"] {
            assert!(validate_identifier(name).is_ok(), "{} should be valid", name);
        }
    }

    #[test]
    fn test_normalize_lowercases() {
        assert_eq!(
            normalize_identifier("Trx_Summary_Features").unwrap(),
            "trx_summary_features"
        );
    }

    #[test]
    fn test_rejects_empty() {
        assert!(matches!(
            validate_identifier(""),
            Err(Error::InvalidName { .. })
        ));
    }

    #[test]
    fn test_rejects_leading_digit_or_underscore() {
        assert!(validate_identifier("1features").is_err());
        assert!(validate_identifier("_features").is_err());
    }

    #[test]
    fn test_rejects_illegal_characters() {
        assert!(validate_identifier("features;drop").is_err());
        assert!(validate_identifier("features name").is_err());
        assert!(validate_identifier("features.name").is_err());
    }

    #[test]
    fn test_rejects_overlong() {
        let name = "a".repeat(MAX_IDENTIFIER_LEN + 1);
        assert!(validate_identifier(&name).is_err());
    }
}
