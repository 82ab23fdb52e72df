//! Sum type declarations and their encoded form.
//!
//! A declared [`SumTypeDecl`] becomes a [`SumType`]: a discriminant
//! enumeration, one payload struct per variant, a union of those payloads
//! and a `discriminant -> payload` registry.
//!
//! ```text
//! Expr :: enum { Identifier(name: string), Group(expr: Expr*) }
//!
//! enum   Expr__Kind       { Expr__Kind__Identifier = 0, Expr__Kind__Group = 1 }
//! struct Expr__Identifier { string name; }
//! struct Expr__Group      { Expr* expr; }
//! union  Expr__Data       { Expr__Identifier _0; Expr__Group _1; }
//! struct Expr             { Expr__Kind kind; Expr__Data data; }
//! ```

use std::collections::BTreeMap;

use crate::{Field, ResolvedField, Symbol, TypeExpr};

/// Member name of the discriminant enumeration.
pub const KIND_MEMBER: &str = "Kind";

/// Member name of the payload union.
pub const DATA_MEMBER: &str = "Data";

/// Largest discriminant an enumerator can carry (C `int`).
pub const MAX_DISCRIMINANT: u32 = i32::MAX as u32;

/// Variant names that would collide with generated member symbols.
pub const RESERVED_VARIANT_NAMES: [&str; 2] = [KIND_MEMBER, DATA_MEMBER];

/// Declared payload of a variant.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Payload {
    /// No data; encoded as an empty payload struct, never as a missing case.
    #[default]
    Unit,
    /// Named fields.
    Fields(Vec<Field>),
}

impl Payload {
    /// The declared fields (empty for `Unit`).
    pub fn fields(&self) -> &[Field] {
        match self {
            Payload::Unit => &[],
            Payload::Fields(fields) => fields,
        }
    }
}

/// A variant as declared by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantDecl {
    /// Variant name.
    pub name: String,
    /// Payload declaration.
    pub payload: Payload,
    /// Explicit discriminant; defaults to the declaration index.
    pub discriminant: Option<u32>,
}

impl VariantDecl {
    /// A variant without payload.
    pub fn unit(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            payload: Payload::Unit,
            discriminant: None,
        }
    }

    /// Add a payload field.
    pub fn with_field(mut self, name: impl Into<String>, ty: TypeExpr) -> Self {
        let field = Field::new(name, ty);
        match &mut self.payload {
            Payload::Unit => self.payload = Payload::Fields(vec![field]),
            Payload::Fields(fields) => fields.push(field),
        }
        self
    }

    /// Override the discriminant.
    pub fn with_discriminant(mut self, discriminant: u32) -> Self {
        self.discriminant = Some(discriminant);
        self
    }
}

/// A sum type as declared by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SumTypeDecl {
    /// Sum type name.
    pub name: String,
    /// Variants in declaration order.
    pub variants: Vec<VariantDecl>,
}

impl SumTypeDecl {
    /// Create a sum type with no variants.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variants: Vec::new(),
        }
    }

    /// Add a variant.
    pub fn with_variant(mut self, variant: VariantDecl) -> Self {
        self.variants.push(variant);
        self
    }
}

/// An encoded variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    /// Variant name.
    pub name: String,
    /// Resolved discriminant.
    pub discriminant: u32,
    /// Enumerator symbol in the discriminant enumeration.
    pub enumerator: Symbol,
    /// Payload struct symbol.
    pub payload: Symbol,
    /// Resolved payload fields (empty for the unit payload).
    pub fields: Vec<ResolvedField>,
}

impl Variant {
    /// Whether this variant carries the unit payload.
    #[inline]
    pub fn is_unit(&self) -> bool {
        self.fields.is_empty()
    }
}

/// An encoded sum type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SumType {
    /// The sum type's own symbol.
    pub name: Symbol,
    /// Discriminant enumeration symbol.
    pub kind: Symbol,
    /// Payload union symbol.
    pub data: Symbol,
    /// Variants in declaration order.
    pub variants: Vec<Variant>,
    /// Discriminant -> index into `variants`.
    by_discriminant: BTreeMap<u32, usize>,
}

impl SumType {
    /// Assemble an encoded sum type. Discriminants must already be unique.
    pub fn new(name: Symbol, kind: Symbol, data: Symbol, variants: Vec<Variant>) -> Self {
        let by_discriminant = variants
            .iter()
            .enumerate()
            .map(|(index, v)| (v.discriminant, index))
            .collect();
        Self {
            name,
            kind,
            data,
            variants,
            by_discriminant,
        }
    }

    /// Look up a variant by name.
    pub fn variant(&self, name: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.name == name)
    }

    /// The variant active for `discriminant`.
    pub fn variant_for(&self, discriminant: u32) -> Option<&Variant> {
        self.by_discriminant
            .get(&discriminant)
            .map(|&index| &self.variants[index])
    }

    /// The payload type active for `discriminant`.
    pub fn payload_for(&self, discriminant: u32) -> Option<&Symbol> {
        self.variant_for(discriminant).map(|v| &v.payload)
    }

    /// All discriminants in ascending order.
    pub fn discriminants(&self) -> impl Iterator<Item = u32> + '_ {
        self.by_discriminant.keys().copied()
    }

    /// Variants not covered by `handled`, in discriminant order.
    ///
    /// An empty result means a match over `handled` is exhaustive.
    pub fn missing_cases(&self, handled: impl IntoIterator<Item = u32>) -> Vec<&Variant> {
        let mut remaining = self.by_discriminant.clone();
        for discriminant in handled {
            remaining.remove(&discriminant);
        }
        remaining
            .into_values()
            .map(|index| &self.variants[index])
            .collect()
    }

    /// Symbols embedded by value in any payload.
    pub fn value_dependencies(&self) -> impl Iterator<Item = &Symbol> {
        self.variants
            .iter()
            .flat_map(|v| v.fields.iter())
            .filter_map(|f| f.ty.by_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ResolvedType;

    fn symbol(name: &str) -> Symbol {
        Symbol::new_unchecked(name.to_string())
    }

    fn variant(name: &str, discriminant: u32, fields: Vec<ResolvedField>) -> Variant {
        Variant {
            name: name.to_string(),
            discriminant,
            enumerator: symbol(&format!("Expr__Kind__{name}")),
            payload: symbol(&format!("Expr__{name}")),
            fields,
        }
    }

    fn expr() -> SumType {
        let name = ResolvedField::new("name", ResolvedType::named(symbol("string")));
        let expr_ptr = ResolvedType::indirect(ResolvedType::named(symbol("Expr")));
        SumType::new(
            symbol("Expr"),
            symbol("Expr__Kind"),
            symbol("Expr__Data"),
            vec![
                variant("Null", 0, vec![]),
                variant("Identifier", 1, vec![name]),
                variant("Group", 7, vec![ResolvedField::new("expr", expr_ptr)]),
            ],
        )
    }

    #[test]
    fn variant_decl_builder() {
        let decl = VariantDecl::unit("Group")
            .with_field("expr", TypeExpr::indirect(TypeExpr::self_ref()))
            .with_discriminant(3);
        assert_eq!(decl.payload.fields().len(), 1);
        assert_eq!(decl.discriminant, Some(3));
        assert!(VariantDecl::unit("Null").payload.fields().is_empty());
    }

    #[test]
    fn payload_registry_lookup() {
        let sum = expr();
        assert_eq!(sum.payload_for(1).unwrap(), "Expr__Identifier");
        assert_eq!(sum.payload_for(7).unwrap(), "Expr__Group");
        assert!(sum.payload_for(2).is_none());
        assert!(sum.variant_for(0).unwrap().is_unit());
        assert_eq!(sum.discriminants().collect::<Vec<_>>(), vec![0, 1, 7]);
    }

    #[test]
    fn missing_cases_for_exhaustiveness() {
        let sum = expr();
        let missing: Vec<_> = sum
            .missing_cases([1])
            .iter()
            .map(|v| v.name.clone())
            .collect();
        assert_eq!(missing, vec!["Null", "Group"]);
        assert!(sum.missing_cases([0, 1, 7]).is_empty());
        // Unknown discriminants are ignored.
        assert_eq!(sum.missing_cases([0, 1, 7, 99]).len(), 0);
    }

    #[test]
    fn value_dependencies_skip_indirection() {
        let sum = expr();
        let deps: Vec<_> = sum.value_dependencies().map(|s| s.as_str()).collect();
        assert_eq!(deps, vec!["string"]);
    }
}
