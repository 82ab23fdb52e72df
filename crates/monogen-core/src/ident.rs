//! Identifier alphabet shared by declarations and generated symbols.
//!
//! A valid identifier is a non-empty run of ASCII letters, digits and `_`
//! that does not start with a digit, does not start or end with `_`, and
//! never contains [`SEPARATOR`]. Generated symbols join identifiers with
//! [`SEPARATOR`], so every symbol splits back into its parts in exactly one
//! way and can never be spelled by hand.

use crate::MangleError;

/// Reserved separator between the segments of a generated symbol.
pub const SEPARATOR: &str = "__";

/// Validate a declaration name, type name or variant name.
pub fn validate_identifier(name: &str) -> Result<(), MangleError> {
    let Some(first) = name.chars().next() else {
        return Err(MangleError::invalid(name, "identifier is empty"));
    };

    if name
        .chars()
        .any(|c| !(c.is_ascii_alphanumeric() || c == '_'))
    {
        return Err(MangleError::invalid(
            name,
            "contains a character outside [A-Za-z0-9_]",
        ));
    }
    if first.is_ascii_digit() {
        return Err(MangleError::invalid(name, "starts with a digit"));
    }
    if name.starts_with('_') || name.ends_with('_') {
        return Err(MangleError::invalid(name, "starts or ends with '_'"));
    }
    if name.contains(SEPARATOR) {
        return Err(MangleError::invalid(
            name,
            "contains the reserved separator '__'",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_valid(name: &str) -> bool {
        validate_identifier(name).is_ok()
    }

    #[test]
    fn accepts_ordinary_identifiers() {
        for name in ["int", "Node", "size_t", "uint8_t", "LinkedList", "x", "a1"] {
            assert!(is_valid(name), "{name} should be valid");
        }
    }

    #[test]
    fn rejects_empty() {
        assert!(!is_valid(""));
    }

    #[test]
    fn rejects_foreign_characters() {
        for name in ["char*", "unsigned int", "a-b", "ünicode", "std::vector"] {
            assert!(!is_valid(name), "{name} should be invalid");
        }
    }

    #[test]
    fn rejects_leading_digit() {
        let err = validate_identifier("0ptr").unwrap_err();
        assert!(matches!(
            err,
            MangleError::InvalidIdentifier {
                reason: "starts with a digit",
                ..
            }
        ));
    }

    #[test]
    fn rejects_separator_and_edge_underscores() {
        assert!(!is_valid("Node__int"));
        assert!(!is_valid("_Bool"));
        assert!(!is_valid("tail_"));
        assert!(!is_valid("_"));
    }
}
