//! Core types for monogen.
//!
//! This crate holds the data model shared by the registry and the compiler:
//!
//! - [`TypeExpr`]: declared field / argument types
//! - [`TemplateDefinition`] and [`SumTypeDecl`]: caller declarations
//! - [`Instantiation`], [`SumType`], [`Definition`]: generated output
//! - [`mangle`]: deterministic, collision-free symbol naming
//! - [`TypeHash`]: hash identity used to key the instantiation cache
//! - the error hierarchy rooted at [`GenerationError`]

pub mod definition;
pub mod error;
pub mod ident;
pub mod mangle;
pub mod sum_type;
pub mod template;
pub mod type_expr;
pub mod type_hash;

pub use definition::{Definition, Instantiation, ResolvedField, ResolvedType};
pub use error::{
    CompilationError, GenerationError, GenerationResult, MangleError, RegistrationError,
};
pub use ident::{SEPARATOR, validate_identifier};
pub use mangle::{
    INDIRECTION_MARKER, Symbol, mangle, mangle_argument, mangle_enumerator, mangle_member,
};
pub use sum_type::{Payload, SumType, SumTypeDecl, Variant, VariantDecl};
pub use template::{Field, TemplateDefinition};
pub use type_expr::{Embedding, TypeExpr};
pub use type_hash::TypeHash;
