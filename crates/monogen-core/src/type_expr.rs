//! TypeExpr - the declared type of a field or a type argument.
//!
//! ```text
//! int            -> TypeExpr::Named("int")
//! T              -> TypeExpr::Param("T")
//! Node(T)*       -> TypeExpr::Indirect(SelfRef)            (inside Node)
//! Node(T)*       -> TypeExpr::Indirect(Apply { "Node", Param("T") })
//! List(Node(int))-> TypeExpr::Apply { "List", Apply { "Node", Named("int") } }
//! ```
//!
//! A type argument must be *closed*: it may not mention a type parameter or
//! `SelfRef`, since neither has a meaning outside the declaring template.

use std::fmt::{self, Display, Formatter};

/// A type expression appearing in a template field, a sum type payload or
/// as the argument of an instantiation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeExpr {
    /// A concrete type owned by the caller (`int`, `size_t`, a sum type name).
    Named(String),
    /// The declaring template's type parameter.
    Param(String),
    /// The declaring template applied to its own parameter, or, inside a sum
    /// type payload, the sum type itself.
    SelfRef,
    /// A template applied to a type argument.
    Apply {
        /// The applied template's name.
        template: String,
        /// The argument expression.
        arg: Box<TypeExpr>,
    },
    /// A non-embedding reference (pointer or handle) to the inner type.
    Indirect(Box<TypeExpr>),
}

/// Whether a referenced type is laid out inline or behind indirection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Embedding {
    /// Embedded by value; the referenced type must be complete first.
    ByValue,
    /// Reached through a pointer/handle; only the name is needed.
    Indirect,
}

impl TypeExpr {
    /// A concrete type name.
    pub fn named(name: impl Into<String>) -> Self {
        TypeExpr::Named(name.into())
    }

    /// A reference to the type parameter `name`.
    pub fn param(name: impl Into<String>) -> Self {
        TypeExpr::Param(name.into())
    }

    /// The enclosing declaration applied to its own parameter.
    pub fn self_ref() -> Self {
        TypeExpr::SelfRef
    }

    /// `template(arg)`.
    pub fn apply(template: impl Into<String>, arg: TypeExpr) -> Self {
        TypeExpr::Apply {
            template: template.into(),
            arg: Box::new(arg),
        }
    }

    /// An indirection to `inner`.
    pub fn indirect(inner: TypeExpr) -> Self {
        TypeExpr::Indirect(Box::new(inner))
    }

    /// Whether the outermost layer is an indirection.
    #[inline]
    pub fn is_indirect(&self) -> bool {
        matches!(self, TypeExpr::Indirect(_))
    }

    /// Whether the expression mentions neither a type parameter nor `SelfRef`.
    pub fn is_closed(&self) -> bool {
        match self {
            TypeExpr::Named(_) => true,
            TypeExpr::Param(_) | TypeExpr::SelfRef => false,
            TypeExpr::Apply { arg, .. } => arg.is_closed(),
            TypeExpr::Indirect(inner) => inner.is_closed(),
        }
    }

    /// The first type parameter name mentioned, if any.
    pub fn first_param(&self) -> Option<&str> {
        match self {
            TypeExpr::Param(name) => Some(name),
            TypeExpr::Named(_) | TypeExpr::SelfRef => None,
            TypeExpr::Apply { arg, .. } => arg.first_param(),
            TypeExpr::Indirect(inner) => inner.first_param(),
        }
    }

    /// Whether `SelfRef` appears without any indirection above it.
    pub fn has_unboxed_self_ref(&self) -> bool {
        matches!(self, TypeExpr::SelfRef)
    }

    /// Visit every template this expression applies.
    ///
    /// Only the outermost application outside any indirection is reported as
    /// [`Embedding::ByValue`]. How an argument is used depends on the applied
    /// template's body, so templates nested in arguments are reported as
    /// [`Embedding::Indirect`].
    pub fn visit_templates(&self, visit: &mut impl FnMut(&str, Embedding)) {
        self.visit_templates_as(Embedding::ByValue, visit);
    }

    fn visit_templates_as(&self, embedding: Embedding, visit: &mut impl FnMut(&str, Embedding)) {
        match self {
            TypeExpr::Named(_) | TypeExpr::Param(_) | TypeExpr::SelfRef => {}
            TypeExpr::Apply { template, arg } => {
                visit(template, embedding);
                arg.visit_templates_as(Embedding::Indirect, visit);
            }
            TypeExpr::Indirect(inner) => inner.visit_templates_as(Embedding::Indirect, visit),
        }
    }

    /// Visit every name that must satisfy the identifier alphabet: concrete
    /// type names, parameter names and applied template names.
    pub fn visit_names(&self, visit: &mut impl FnMut(&str)) {
        match self {
            TypeExpr::Named(name) | TypeExpr::Param(name) => visit(name),
            TypeExpr::SelfRef => {}
            TypeExpr::Apply { template, arg } => {
                visit(template);
                arg.visit_names(visit);
            }
            TypeExpr::Indirect(inner) => inner.visit_names(visit),
        }
    }
}

impl Display for TypeExpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Named(name) | TypeExpr::Param(name) => write!(f, "{name}"),
            TypeExpr::SelfRef => write!(f, "Self"),
            TypeExpr::Apply { template, arg } => write!(f, "{template}({arg})"),
            TypeExpr::Indirect(inner) => write!(f, "{inner}*"),
        }
    }
}

impl From<&str> for TypeExpr {
    fn from(name: &str) -> Self {
        TypeExpr::named(name)
    }
}
