//! Template declarations.
//!
//! A [`TemplateDefinition`] is a struct parameterized by exactly one type:
//!
//! ```
//! use monogen_core::{TemplateDefinition, TypeExpr};
//!
//! // Node(T) { T data; Node(T)* next; }
//! let node = TemplateDefinition::new("Node", "T")
//!     .with_field("data", TypeExpr::param("T"))
//!     .with_field("next", TypeExpr::indirect(TypeExpr::self_ref()));
//!
//! assert_eq!(node.fields.len(), 2);
//! ```

use crate::TypeExpr;

/// A named, typed field of a template or sum type payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    /// Field name.
    pub name: String,
    /// Declared type.
    pub ty: TypeExpr,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// A generic struct declaration with a single type parameter.
///
/// Immutable once registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateDefinition {
    /// Template name (e.g., "Node").
    pub name: String,
    /// Type parameter name (e.g., "T").
    pub parameter: String,
    /// Fields in declaration order.
    pub fields: Vec<Field>,
}

impl TemplateDefinition {
    /// Create a template with no fields.
    pub fn new(name: impl Into<String>, parameter: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameter: parameter.into(),
            fields: Vec::new(),
        }
    }

    /// Add a field.
    pub fn with_field(mut self, name: impl Into<String>, ty: TypeExpr) -> Self {
        self.fields.push(Field::new(name, ty));
        self
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Whether `ty` names this template applied to its own parameter,
    /// spelled either as `SelfRef` or as `Apply { self, Param(parameter) }`.
    pub fn is_self_application(&self, ty: &TypeExpr) -> bool {
        match ty {
            TypeExpr::SelfRef => true,
            TypeExpr::Apply { template, arg } => {
                let own_param = matches!(&**arg, TypeExpr::Param(p) if p == &self.parameter);
                template == &self.name && own_param
            }
            _ => false,
        }
    }
}
