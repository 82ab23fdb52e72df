//! Monogen Compiler
//!
//! Materializes generated definitions from registered declarations.
//!
//! ## Modules
//!
//! - [`template`]: Template instantiation (cache, substitution, validation, engine)
//! - [`sum_type`]: Sum type encoding into discriminant enumeration + payload union
//! - [`ordering`]: Final emission order over every generated definition
//! - [`emit`]: C source rendering

pub mod emit;
pub mod ordering;
pub mod sum_type;
pub mod template;

pub use emit::{CEmitter, EmitOptions, emit_c};
pub use ordering::order_definitions;
pub use sum_type::encode_sum_type;
pub use template::{
    Checkpoint, FieldContext, InstantiationEngine, TemplateInstanceCache, validate_template,
};

// Re-export the error types for convenience
pub use monogen_core::{CompilationError, GenerationError, GenerationResult};
