//! Monogen template registry.
//!
//! Holds the templates declared in a generation session and answers
//! dependency questions about them. Instantiation itself lives in
//! `monogen-compiler`.

mod registry;

pub use registry::TemplateRegistry;

// Re-export the declaration types the registry stores.
pub use monogen_core::{Field, RegistrationError, TemplateDefinition, TypeExpr};
