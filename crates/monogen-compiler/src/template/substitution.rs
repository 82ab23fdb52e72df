//! Type substitution for template instantiation.
//!
//! Replaces a template's parameter with the concrete argument inside field
//! types. `SelfRef` becomes the template applied to the argument, which the
//! engine later resolves to the specialization's own symbol.

use monogen_core::{TemplateDefinition, TypeExpr};

/// Binding of one template parameter to a concrete argument.
#[derive(Debug, Clone, Copy)]
pub struct Substitution<'a> {
    /// The template being instantiated.
    pub template: &'a str,
    /// Its parameter name.
    pub parameter: &'a str,
    /// The closed argument bound to the parameter.
    pub argument: &'a TypeExpr,
}

impl<'a> Substitution<'a> {
    /// Bind `definition`'s parameter to `argument`.
    pub fn new(definition: &'a TemplateDefinition, argument: &'a TypeExpr) -> Self {
        Self {
            template: &definition.name,
            parameter: &definition.parameter,
            argument,
        }
    }

    /// Substitute the parameter in `ty`.
    ///
    /// Parameters other than the bound one are left in place so the caller
    /// can report them as unresolved.
    pub fn apply(&self, ty: &TypeExpr) -> TypeExpr {
        match ty {
            TypeExpr::Param(name) if name == self.parameter => self.argument.clone(),
            TypeExpr::Named(_) | TypeExpr::Param(_) => ty.clone(),
            TypeExpr::SelfRef => TypeExpr::apply(self.template, self.argument.clone()),
            TypeExpr::Apply { template, arg } => {
                TypeExpr::apply(template.as_str(), self.apply(arg))
            }
            TypeExpr::Indirect(inner) => TypeExpr::indirect(self.apply(inner)),
        }
    }
}

/// Replace `SelfRef` with a named reference to `owner`.
///
/// Sum type payloads use `SelfRef` for the sum type itself, which is a
/// concrete name rather than a template application.
pub fn substitute_self(owner: &str, ty: &TypeExpr) -> TypeExpr {
    match ty {
        TypeExpr::SelfRef => TypeExpr::named(owner),
        TypeExpr::Named(_) | TypeExpr::Param(_) => ty.clone(),
        TypeExpr::Apply { template, arg } => {
            TypeExpr::apply(template.as_str(), substitute_self(owner, arg))
        }
        TypeExpr::Indirect(inner) => TypeExpr::indirect(substitute_self(owner, inner)),
    }
}
