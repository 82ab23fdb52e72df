//! Template instantiation system.
//!
//! Turns registered templates plus closed type arguments into concrete,
//! uniquely named specializations, with caching so each pair is produced
//! once per session.
//!
//! ## Components
//!
//! - [`TemplateInstanceCache`]: Cache for template instances
//! - [`Substitution`]: Binds a template parameter to a concrete argument
//! - [`InstantiationEngine`]: Depth-first, transactional instantiation
//! - [`validate_template`]: Declaration checks run before registration

mod cache;
mod instantiation;
mod substitution;
mod validation;

pub use cache::TemplateInstanceCache;
pub use instantiation::{Checkpoint, DEFAULT_MAX_DEPTH, FieldContext, InstantiationEngine};
pub use substitution::{Substitution, substitute_self};
pub use validation::validate_template;
