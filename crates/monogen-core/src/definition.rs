//! Generated definitions: the output of a generation session.

use std::fmt::{self, Display, Formatter};

use crate::{SumType, Symbol, TypeExpr, TypeHash};

/// A field type after substitution and mangling.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResolvedType {
    /// A concrete or generated type embedded by value.
    Named(Symbol),
    /// A non-embedding reference.
    Indirect(Box<ResolvedType>),
}

impl ResolvedType {
    /// A by-value reference to `symbol`.
    pub fn named(symbol: Symbol) -> Self {
        ResolvedType::Named(symbol)
    }

    /// An indirection to `inner`.
    pub fn indirect(inner: ResolvedType) -> Self {
        ResolvedType::Indirect(Box::new(inner))
    }

    /// The symbol this type embeds by value, if it is not behind indirection.
    pub fn by_value(&self) -> Option<&Symbol> {
        match self {
            ResolvedType::Named(symbol) => Some(symbol),
            ResolvedType::Indirect(_) => None,
        }
    }
}

impl Display for ResolvedType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedType::Named(symbol) => write!(f, "{symbol}"),
            ResolvedType::Indirect(inner) => write!(f, "{inner}*"),
        }
    }
}

/// A field with its resolved type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedField {
    /// Field name.
    pub name: String,
    /// Resolved type.
    pub ty: ResolvedType,
}

impl ResolvedField {
    /// Create a new resolved field.
    pub fn new(name: impl Into<String>, ty: ResolvedType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// One specialization of a template for one type argument.
///
/// Created exactly once per `(template, argument)` pair in a session and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instantiation {
    /// The template's name.
    pub template: String,
    /// The (closed) type argument.
    pub argument: TypeExpr,
    /// Mangled symbol of this specialization.
    pub symbol: Symbol,
    /// Identity of the `(template, argument)` pair.
    pub type_hash: TypeHash,
    /// Fields with the parameter substituted.
    pub fields: Vec<ResolvedField>,
}

impl Instantiation {
    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&ResolvedField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Symbols embedded by value in this specialization.
    pub fn value_dependencies(&self) -> impl Iterator<Item = &Symbol> {
        self.fields.iter().filter_map(|f| f.ty.by_value())
    }
}

/// One item of the ordered output of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Definition {
    /// A template specialization.
    Instantiation(Instantiation),
    /// An encoded sum type (enumeration, payloads, union, wrapper).
    SumType(SumType),
}

impl Definition {
    /// The symbol other definitions use to refer to this one.
    pub fn symbol(&self) -> &Symbol {
        match self {
            Definition::Instantiation(inst) => &inst.symbol,
            Definition::SumType(sum) => &sum.name,
        }
    }

    /// Symbols this definition embeds by value.
    pub fn value_dependencies(&self) -> Vec<&Symbol> {
        match self {
            Definition::Instantiation(inst) => inst.value_dependencies().collect(),
            Definition::SumType(sum) => sum.value_dependencies().collect(),
        }
    }

    /// The instantiation, if this is one.
    pub fn as_instantiation(&self) -> Option<&Instantiation> {
        match self {
            Definition::Instantiation(inst) => Some(inst),
            Definition::SumType(_) => None,
        }
    }

    /// The sum type, if this is one.
    pub fn as_sum_type(&self) -> Option<&SumType> {
        match self {
            Definition::SumType(sum) => Some(sum),
            Definition::Instantiation(_) => None,
        }
    }
}

impl From<Instantiation> for Definition {
    fn from(inst: Instantiation) -> Self {
        Definition::Instantiation(inst)
    }
}

impl From<SumType> for Definition {
    fn from(sum: SumType) -> Self {
        Definition::SumType(sum)
    }
}
