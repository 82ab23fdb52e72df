//! Template declaration validation.
//!
//! Checks a [`TemplateDefinition`] before it enters the registry:
//!
//! - every name satisfies the identifier alphabet
//! - field names are unique
//! - field types only mention the declared parameter
//! - the template never embeds its own specialization by value

use rustc_hash::FxHashSet;

use monogen_core::{
    CompilationError, GenerationResult, RegistrationError, TemplateDefinition, TypeExpr,
    validate_identifier,
};

/// Validate a template declaration.
pub fn validate_template(definition: &TemplateDefinition) -> GenerationResult<()> {
    validate_identifier(&definition.name)?;
    validate_identifier(&definition.parameter)?;

    let mut seen = FxHashSet::default();
    for field in &definition.fields {
        validate_identifier(&field.name)?;
        if !seen.insert(field.name.as_str()) {
            return Err(RegistrationError::DuplicateField {
                owner: definition.name.clone(),
                field: field.name.clone(),
            }
            .into());
        }

        let mut invalid = None;
        field.ty.visit_names(&mut |name| {
            if invalid.is_none() {
                invalid = validate_identifier(name).err();
            }
        });
        if let Some(err) = invalid {
            return Err(err.into());
        }

        let mut unresolved = None;
        visit_params(&field.ty, &mut |param| {
            if unresolved.is_none() && param != definition.parameter {
                unresolved = Some(param.to_string());
            }
        });
        if let Some(param) = unresolved {
            return Err(CompilationError::UnresolvedTypeParameter {
                owner: definition.name.clone(),
                field: field.name.clone(),
                param,
            }
            .into());
        }

        if definition.is_self_application(&field.ty) {
            return Err(CompilationError::RecursiveUnboxedType {
                owner: definition.name.clone(),
                field: field.name.clone(),
                ty: field.ty.to_string(),
            }
            .into());
        }
    }

    Ok(())
}

fn visit_params(ty: &TypeExpr, visit: &mut impl FnMut(&str)) {
    match ty {
        TypeExpr::Param(name) => visit(name),
        TypeExpr::Named(_) | TypeExpr::SelfRef => {}
        TypeExpr::Apply { arg, .. } => visit_params(arg, visit),
        TypeExpr::Indirect(inner) => visit_params(inner, visit),
    }
}
