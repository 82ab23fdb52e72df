//! Monogen: monomorphizing generics and tagged unions for C-like targets.
//!
//! Declare single-parameter struct templates and sum types, instantiate the
//! templates with concrete type arguments, and collect the resulting
//! definitions in an order where every type follows the types it embeds.
//!
//! ## Crates
//!
//! - `monogen-core`: data model, identifiers, name mangling, errors
//! - `monogen-registry`: the template registry
//! - `monogen-compiler`: instantiation engine, sum type encoder, ordering, C emitter
//!
//! This crate ties them together behind [`Session`].

mod properties;
mod session;

pub use properties::SessionProperty;
pub use session::Session;

pub use monogen_compiler::{EmitOptions, emit_c};
pub use monogen_core::{
    CompilationError, Definition, Field, GenerationError, GenerationResult, Instantiation,
    MangleError, Payload, RegistrationError, ResolvedField, ResolvedType, SumType, SumTypeDecl,
    Symbol, TemplateDefinition, TypeExpr, Variant, VariantDecl, mangle,
};

pub mod prelude {
    pub use crate::properties::SessionProperty;
    pub use crate::session::Session;
    pub use monogen_core::{
        Definition, GenerationError, GenerationResult, SumTypeDecl, TemplateDefinition, TypeExpr,
        VariantDecl,
    };
}
