//! Sum type encoding.
//!
//! Lowers a [`SumTypeDecl`] into a discriminant enumeration plus a union of
//! payload structs. Payload fields that apply templates are instantiated
//! through the [`InstantiationEngine`] first, so every specialization a
//! payload embeds exists before the sum type itself.

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use monogen_core::sum_type::{DATA_MEMBER, KIND_MEMBER, MAX_DISCRIMINANT, RESERVED_VARIANT_NAMES};
use monogen_core::{
    CompilationError, Field, GenerationResult, MangleError, RegistrationError, ResolvedField,
    SumType, SumTypeDecl, Symbol, TypeExpr, Variant, mangle_enumerator, mangle_member,
    validate_identifier,
};
use monogen_registry::TemplateRegistry;

use crate::template::{FieldContext, InstantiationEngine, substitute_self};

/// Encode a sum type declaration.
///
/// On failure every specialization instantiated for its payloads is rolled
/// back.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn encode_sum_type(
    decl: &SumTypeDecl,
    engine: &mut InstantiationEngine,
    registry: &TemplateRegistry,
) -> GenerationResult<SumType> {
    let checkpoint = engine.checkpoint();
    let result = SumTypeEncoder::new(decl, engine, registry).encode();
    if result.is_err() {
        engine.rollback(checkpoint);
    }
    result
}

/// Encodes one sum type declaration.
struct SumTypeEncoder<'a> {
    decl: &'a SumTypeDecl,
    engine: &'a mut InstantiationEngine,
    registry: &'a TemplateRegistry,
}

impl<'a> SumTypeEncoder<'a> {
    fn new(
        decl: &'a SumTypeDecl,
        engine: &'a mut InstantiationEngine,
        registry: &'a TemplateRegistry,
    ) -> Self {
        Self {
            decl,
            engine,
            registry,
        }
    }

    fn encode(mut self) -> GenerationResult<SumType> {
        let decl = self.decl;
        let name = Symbol::concrete(&decl.name)?;
        if decl.variants.is_empty() {
            return Err(CompilationError::EmptySumType(decl.name.clone()).into());
        }

        let kind = mangle_member(&decl.name, KIND_MEMBER)?;
        let data = mangle_member(&decl.name, DATA_MEMBER)?;

        let mut names = FxHashSet::default();
        let mut claimed: FxHashMap<u32, &str> = FxHashMap::default();
        let mut variants = Vec::with_capacity(decl.variants.len());

        for (index, variant) in decl.variants.iter().enumerate() {
            validate_identifier(&variant.name)?;
            if RESERVED_VARIANT_NAMES.contains(&variant.name.as_str()) {
                return Err(MangleError::invalid(
                    variant.name.as_str(),
                    "reserved for a generated sum type member",
                )
                .into());
            }
            if !names.insert(variant.name.as_str()) {
                return Err(CompilationError::DuplicateVariantName {
                    sum_type: decl.name.clone(),
                    variant: variant.name.clone(),
                }
                .into());
            }

            let discriminant = self.discriminant(index, variant.discriminant, &variant.name)?;
            if let Some(first) = claimed.insert(discriminant, &variant.name) {
                return Err(CompilationError::DiscriminantCollision {
                    sum_type: decl.name.clone(),
                    first: first.to_string(),
                    second: variant.name.clone(),
                    discriminant,
                }
                .into());
            }

            let payload = mangle_member(&decl.name, &variant.name)?;
            let fields = self.encode_payload(&payload, variant.payload.fields())?;
            variants.push(Variant {
                name: variant.name.clone(),
                discriminant,
                enumerator: mangle_enumerator(&decl.name, &variant.name)?,
                payload,
                fields,
            });
        }

        debug!(
            sum_type = %name,
            variants = variants.len(),
            "encoded sum type"
        );
        Ok(SumType::new(name, kind, data, variants))
    }

    /// Declared discriminant, or the declaration index. Either must fit an
    /// enumerator.
    fn discriminant(
        &self,
        index: usize,
        declared: Option<u32>,
        variant: &str,
    ) -> GenerationResult<u32> {
        let value = match declared {
            Some(value) => u64::from(value),
            None => u64::try_from(index).unwrap_or(u64::MAX),
        };
        if let Ok(value) = u32::try_from(value)
            && value <= MAX_DISCRIMINANT
        {
            return Ok(value);
        }
        Err(CompilationError::DiscriminantOutOfRange {
            sum_type: self.decl.name.clone(),
            variant: variant.to_string(),
            value,
        }
        .into())
    }

    /// Resolve the fields of one payload struct.
    fn encode_payload(
        &mut self,
        payload: &Symbol,
        fields: &[Field],
    ) -> GenerationResult<Vec<ResolvedField>> {
        let sum_name = self.decl.name.as_str();
        let mut seen = FxHashSet::default();
        let mut resolved = Vec::with_capacity(fields.len());

        for field in fields {
            validate_identifier(&field.name)?;
            if !seen.insert(field.name.as_str()) {
                return Err(RegistrationError::DuplicateField {
                    owner: payload.to_string(),
                    field: field.name.clone(),
                }
                .into());
            }

            if let Some(param) = field.ty.first_param() {
                return Err(CompilationError::UnresolvedTypeParameter {
                    owner: sum_name.to_string(),
                    field: field.name.clone(),
                    param: param.to_string(),
                }
                .into());
            }

            let recursive = || CompilationError::RecursiveUnboxedType {
                owner: sum_name.to_string(),
                field: field.name.clone(),
                ty: field.ty.to_string(),
            };

            match &field.ty {
                TypeExpr::SelfRef => return Err(recursive().into()),
                TypeExpr::Named(name) if name == sum_name => return Err(recursive().into()),
                _ => {}
            }

            let ty = substitute_self(sum_name, &field.ty);
            let context = FieldContext {
                owner: sum_name,
                field: &field.name,
            };
            let field_type = self.engine.resolve_field(self.registry, context, &ty)?;

            if let Some(symbol) = field_type.by_value()
                && self.engine.embeds_by_value(symbol.as_str(), sum_name)
            {
                return Err(recursive().into());
            }

            resolved.push(ResolvedField::new(field.name.as_str(), field_type));
        }

        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use monogen_core::{GenerationError, TemplateDefinition, VariantDecl};

    fn encode(decl: &SumTypeDecl) -> GenerationResult<SumType> {
        let registry = TemplateRegistry::new();
        let mut engine = InstantiationEngine::new();
        encode_sum_type(decl, &mut engine, &registry)
    }

    fn expr() -> SumTypeDecl {
        SumTypeDecl::new("Expr")
            .with_variant(
                VariantDecl::unit("Identifier")
                    .with_field("name", TypeExpr::indirect(TypeExpr::named("char"))),
            )
            .with_variant(
                VariantDecl::unit("Group")
                    .with_field("expr", TypeExpr::indirect(TypeExpr::self_ref())),
            )
    }

    #[test]
    fn default_discriminants_follow_declaration_order() {
        let sum = encode(&expr()).unwrap();

        assert_eq!(sum.name, "Expr");
        assert_eq!(sum.kind, "Expr__Kind");
        assert_eq!(sum.data, "Expr__Data");
        assert_eq!(sum.discriminants().collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(sum.payload_for(0).unwrap(), "Expr__Identifier");
        assert_eq!(sum.payload_for(1).unwrap(), "Expr__Group");
        let group = sum.variant("Group").unwrap();
        assert_eq!(group.enumerator, "Expr__Kind__Group");
        assert_eq!(group.fields[0].ty.to_string(), "Expr*");
    }

    #[test]
    fn explicit_discriminant_override() {
        let decl = SumTypeDecl::new("Token")
            .with_variant(VariantDecl::unit("Eof").with_discriminant(255))
            .with_variant(VariantDecl::unit("Ident"));
        let sum = encode(&decl).unwrap();
        assert_eq!(sum.variant("Eof").unwrap().discriminant, 255);
        assert_eq!(sum.variant("Ident").unwrap().discriminant, 1);
    }

    #[test]
    fn discriminant_must_fit_an_enumerator() {
        let decl = SumTypeDecl::new("Token")
            .with_variant(VariantDecl::unit("Eof").with_discriminant(1 << 31));
        assert_eq!(
            encode(&decl).unwrap_err(),
            GenerationError::Compilation(CompilationError::DiscriminantOutOfRange {
                sum_type: "Token".into(),
                variant: "Eof".into(),
                value: 2_147_483_648,
            })
        );

        let largest = SumTypeDecl::new("Token")
            .with_variant(VariantDecl::unit("Eof").with_discriminant(MAX_DISCRIMINANT));
        let sum = encode(&largest).unwrap();
        assert_eq!(sum.variant("Eof").unwrap().discriminant, 2_147_483_647);
    }

    #[test]
    fn discriminant_collision() {
        let decl = SumTypeDecl::new("Token")
            .with_variant(VariantDecl::unit("Eof"))
            .with_variant(VariantDecl::unit("Ident").with_discriminant(0));
        assert_eq!(
            encode(&decl).unwrap_err(),
            GenerationError::Compilation(CompilationError::DiscriminantCollision {
                sum_type: "Token".into(),
                first: "Eof".into(),
                second: "Ident".into(),
                discriminant: 0,
            })
        );
    }

    #[test]
    fn duplicate_variant_name() {
        let decl = SumTypeDecl::new("Token")
            .with_variant(VariantDecl::unit("Eof"))
            .with_variant(VariantDecl::unit("Eof"));
        assert_eq!(
            encode(&decl).unwrap_err(),
            GenerationError::Compilation(CompilationError::DuplicateVariantName {
                sum_type: "Token".into(),
                variant: "Eof".into(),
            })
        );
    }

    #[test]
    fn empty_sum_type() {
        assert_eq!(
            encode(&SumTypeDecl::new("Never")).unwrap_err(),
            GenerationError::Compilation(CompilationError::EmptySumType("Never".into()))
        );
    }

    #[test]
    fn unit_payload_is_a_real_variant() {
        let decl = SumTypeDecl::new("Expr")
            .with_variant(VariantDecl::unit("Null"))
            .with_variant(
                VariantDecl::unit("Identifier").with_field("name", TypeExpr::named("int")),
            );
        let sum = encode(&decl).unwrap();

        let null = sum.variant_for(0).unwrap();
        assert!(null.is_unit());
        assert_eq!(null.payload, "Expr__Null");
        assert!(sum.missing_cases([1]).iter().any(|v| v.name == "Null"));
    }

    #[test]
    fn unboxed_self_reference_is_rejected() {
        let by_self_ref = SumTypeDecl::new("Expr")
            .with_variant(VariantDecl::unit("Group").with_field("expr", TypeExpr::self_ref()));
        assert!(matches!(
            encode(&by_self_ref),
            Err(GenerationError::Compilation(CompilationError::RecursiveUnboxedType { .. }))
        ));

        let by_name = SumTypeDecl::new("Expr")
            .with_variant(VariantDecl::unit("Group").with_field("expr", TypeExpr::named("Expr")));
        assert_eq!(
            encode(&by_name).unwrap_err(),
            GenerationError::Compilation(CompilationError::RecursiveUnboxedType {
                owner: "Expr".into(),
                field: "expr".into(),
                ty: "Expr".into(),
            })
        );
    }

    #[test]
    fn type_parameter_in_payload_is_rejected() {
        let decl = SumTypeDecl::new("Option")
            .with_variant(VariantDecl::unit("Some").with_field("value", TypeExpr::param("T")));
        assert_eq!(
            encode(&decl).unwrap_err(),
            GenerationError::Compilation(CompilationError::UnresolvedTypeParameter {
                owner: "Option".into(),
                field: "value".into(),
                param: "T".into(),
            })
        );
    }

    #[test]
    fn reserved_variant_names() {
        for reserved in ["Kind", "Data"] {
            let decl = SumTypeDecl::new("Expr").with_variant(VariantDecl::unit(reserved));
            assert!(encode(&decl).unwrap_err().is_mangle());
        }
    }

    #[test]
    fn payload_instantiates_templates() {
        let mut registry = TemplateRegistry::new();
        registry
            .register(
                TemplateDefinition::new("Vector", "T")
                    .with_field("data", TypeExpr::indirect(TypeExpr::param("T")))
                    .with_field("len", TypeExpr::named("size_t")),
            )
            .unwrap();
        let mut engine = InstantiationEngine::new();

        let decl = SumTypeDecl::new("Expr").with_variant(
            VariantDecl::unit("Call")
                .with_field("args", TypeExpr::apply("Vector", TypeExpr::self_ref())),
        );
        let sum = encode_sum_type(&decl, &mut engine, &registry).unwrap();

        let args = &sum.variant("Call").unwrap().fields[0];
        assert_eq!(args.ty.to_string(), "Vector__Expr");
        assert_eq!(engine.instances()[0].symbol, "Vector__Expr");
        assert_eq!(
            engine.instances()[0].field("data").unwrap().ty.to_string(),
            "Expr*"
        );
    }

    #[test]
    fn payload_embedding_self_through_template_is_rejected() {
        let mut registry = TemplateRegistry::new();
        let boxed = TemplateDefinition::new("Box", "T").with_field("value", TypeExpr::param("T"));
        registry.register(boxed).unwrap();
        let mut engine = InstantiationEngine::new();

        let inner = TypeExpr::apply("Box", TypeExpr::self_ref());
        let decl = SumTypeDecl::new("Expr")
            .with_variant(VariantDecl::unit("Group").with_field("inner", inner));
        let err = encode_sum_type(&decl, &mut engine, &registry).unwrap_err();

        assert!(matches!(
            err,
            GenerationError::Compilation(CompilationError::RecursiveUnboxedType { .. })
        ));
        // The specialization made for the rejected payload is rolled back.
        assert!(engine.is_empty());
    }
}
