//! Name mangling for specializations and sum type members.
//!
//! `mangle(template, argument)` joins the template name and the argument's
//! symbol with [`SEPARATOR`]. Nested arguments are mangled first, so the
//! result is always a flat, linear identifier:
//!
//! ```text
//! Node(int)          -> Node__int
//! List(Node(int))    -> List__Node__int
//! Vector(char*)      -> Vector__0ptr__char
//! ```
//!
//! Identifiers can neither contain `__` nor start or end with `_`, so a
//! symbol splits into its segments in exactly one way. The indirection
//! marker [`INDIRECTION_MARKER`] starts with a digit, which no identifier
//! can. Together this makes the mapping injective and keeps generated
//! symbols disjoint from hand-written identifiers.

use std::fmt;

use crate::ident::{SEPARATOR, validate_identifier};
use crate::{MangleError, TypeExpr, TypeHash};

/// Segment standing for an indirection inside a mangled argument.
pub const INDIRECTION_MARKER: &str = "0ptr";

/// A generated (or caller-supplied concrete) type name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(String);

impl Symbol {
    /// Wrap a name that is already known to be a valid identifier or symbol.
    pub(crate) fn new_unchecked(name: String) -> Self {
        Symbol(name)
    }

    /// Build a symbol from a hand-written type name, validating it.
    pub fn concrete(name: &str) -> Result<Self, MangleError> {
        validate_identifier(name)?;
        Ok(Symbol(name.to_string()))
    }

    /// The symbol text.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this symbol was produced by the mangler.
    #[inline]
    pub fn is_generated(&self) -> bool {
        self.0.contains(SEPARATOR)
    }

    /// Hash identity of this symbol.
    #[inline]
    pub fn type_hash(&self) -> TypeHash {
        TypeHash::from_name(&self.0)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Symbol {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Symbol {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Mangle `template` specialized for `argument`.
///
/// # Errors
///
/// `InvalidIdentifier` if the template name or any name inside the argument
/// violates the identifier alphabet, or if the argument still mentions a
/// type parameter or `SelfRef`.
pub fn mangle(template: &str, argument: &TypeExpr) -> Result<Symbol, MangleError> {
    validate_identifier(template)?;
    let arg = mangle_argument(argument)?;
    Ok(Symbol(format!("{template}{SEPARATOR}{arg}")))
}

/// Mangle a closed type argument into its symbol text.
///
/// Concrete names map to themselves.
pub fn mangle_argument(argument: &TypeExpr) -> Result<String, MangleError> {
    match argument {
        TypeExpr::Named(name) => {
            validate_identifier(name)?;
            Ok(name.clone())
        }
        TypeExpr::Apply { template, arg } => Ok(mangle(template, arg)?.0),
        TypeExpr::Indirect(inner) => Ok(format!(
            "{INDIRECTION_MARKER}{SEPARATOR}{}",
            mangle_argument(inner)?
        )),
        TypeExpr::Param(name) => Err(MangleError::invalid(
            name.as_str(),
            "a type parameter cannot appear in a type argument",
        )),
        TypeExpr::SelfRef => Err(MangleError::invalid(
            "Self",
            "a self-reference cannot appear in a type argument",
        )),
    }
}

/// Symbol of a member generated for a sum type (`Expr__Kind`, `Expr__Data`,
/// or the payload struct `Expr__Identifier`).
pub fn mangle_member(owner: &str, member: &str) -> Result<Symbol, MangleError> {
    validate_identifier(owner)?;
    validate_identifier(member)?;
    Ok(Symbol(format!("{owner}{SEPARATOR}{member}")))
}

/// Enumerator naming `variant` inside the discriminant enumeration of `sum`
/// (`Expr__Kind__Identifier`).
pub fn mangle_enumerator(sum: &str, variant: &str) -> Result<Symbol, MangleError> {
    let kind = mangle_member(sum, crate::sum_type::KIND_MEMBER)?;
    validate_identifier(variant)?;
    Ok(Symbol(format!("{kind}{SEPARATOR}{variant}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mangle_concrete_argument() {
        let symbol = mangle("Node", &TypeExpr::named("int")).unwrap();
        assert_eq!(symbol, "Node__int");
        assert!(symbol.is_generated());
    }

    #[test]
    fn mangle_nested_argument_is_flat() {
        let arg = TypeExpr::apply("Node", TypeExpr::named("int"));
        let symbol = mangle("List", &arg).unwrap();
        assert_eq!(symbol, "List__Node__int");
    }

    #[test]
    fn mangle_indirect_argument() {
        let arg = TypeExpr::indirect(TypeExpr::named("char"));
        assert_eq!(mangle("Vector", &arg).unwrap(), "Vector__0ptr__char");
    }

    #[test]
    fn indirection_marker_cannot_be_spelled_by_hand() {
        // A template literally named like the marker is rejected.
        assert!(mangle(INDIRECTION_MARKER, &TypeExpr::named("int")).is_err());
        assert!(mangle("Vector", &TypeExpr::named(INDIRECTION_MARKER)).is_err());
    }

    #[test]
    fn mangle_is_deterministic() {
        let arg = TypeExpr::apply("Pair", TypeExpr::indirect(TypeExpr::named("int")));
        assert_eq!(mangle("Box", &arg).unwrap(), mangle("Box", &arg).unwrap());
    }

    #[test]
    fn mangle_rejects_invalid_names() {
        assert!(matches!(
            mangle("Node", &TypeExpr::named("unsigned int")),
            Err(MangleError::InvalidIdentifier { .. })
        ));
        assert!(mangle("my_Node_", &TypeExpr::named("int")).is_err());
        assert!(mangle("Node", &TypeExpr::named("int__x")).is_err());
    }

    #[test]
    fn mangle_rejects_open_arguments() {
        let err = mangle("Node", &TypeExpr::param("T")).unwrap_err();
        assert_eq!(
            err,
            MangleError::InvalidIdentifier {
                name: "T".into(),
                reason: "a type parameter cannot appear in a type argument",
            }
        );
        assert!(mangle("Node", &TypeExpr::indirect(TypeExpr::self_ref())).is_err());
    }

    #[test]
    fn member_and_enumerator_symbols() {
        assert_eq!(mangle_member("Expr", "Kind").unwrap(), "Expr__Kind");
        assert_eq!(mangle_member("Expr", "Group").unwrap(), "Expr__Group");
        assert_eq!(
            mangle_enumerator("Expr", "Group").unwrap(),
            "Expr__Kind__Group"
        );
    }

    #[test]
    fn concrete_symbol_is_not_generated() {
        let symbol = Symbol::concrete("size_t").unwrap();
        assert!(!symbol.is_generated());
        assert_eq!(symbol.type_hash(), TypeHash::from_name("size_t"));
        assert!(Symbol::concrete("char*").is_err());
    }
}
