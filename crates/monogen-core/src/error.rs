//! Unified error types for monogen.
//!
//! Every phase of a generation session reports failures through one of the
//! phase-specific enums below. They can be handled individually or converted
//! into [`GenerationError`] for unified handling.
//!
//! ## Error Hierarchy
//!
//! ```text
//! GenerationError (top-level wrapper)
//! ├── MangleError       - identifier / symbol construction errors
//! ├── RegistrationError - template and sum type declaration errors
//! ├── CompilationError  - instantiation and sum type encoding errors
//! └── Aborted           - an operation on a session that already failed
//! ```
//!
//! There is no recoverable error: the first failure aborts the session.

use thiserror::Error;

// ============================================================================
// Mangle Errors
// ============================================================================

/// Errors that occur while validating identifiers or building symbols.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MangleError {
    /// A name falls outside the allowed identifier alphabet.
    #[error("invalid identifier '{name}': {reason}")]
    InvalidIdentifier {
        /// The offending name.
        name: String,
        /// Which rule the name violates.
        reason: &'static str,
    },
}

impl MangleError {
    /// Build an `InvalidIdentifier` error.
    pub fn invalid(name: impl Into<String>, reason: &'static str) -> Self {
        MangleError::InvalidIdentifier {
            name: name.into(),
            reason,
        }
    }
}

// ============================================================================
// Registration Errors
// ============================================================================

/// Errors that occur while declaring templates and sum types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// A template with this name is already registered.
    #[error("duplicate template: {0}")]
    DuplicateTemplate(String),

    /// A referenced template has not been registered.
    #[error("unknown template: {0}")]
    UnknownTemplate(String),

    /// A declaration name is already taken by a different kind of declaration.
    #[error("duplicate definition: {name} already registered as {kind}")]
    DuplicateDefinition {
        /// The name that was duplicated.
        name: String,
        /// What already owns the name (e.g., "template", "sum type").
        kind: &'static str,
    },

    /// Two fields of one declaration share a name.
    #[error("duplicate field '{field}' in '{owner}'")]
    DuplicateField {
        /// The template or payload that declares the fields.
        owner: String,
        /// The repeated field name.
        field: String,
    },
}

// ============================================================================
// Compilation Errors
// ============================================================================

/// Errors that occur while instantiating templates or encoding sum types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompilationError {
    /// A field embeds its own specialization without indirection.
    #[error(
        "'{owner}' field '{field}' embeds '{ty}' by value; self-reference requires indirection"
    )]
    RecursiveUnboxedType {
        /// The template, specialization or sum type being produced.
        owner: String,
        /// The offending field.
        field: String,
        /// The field type as declared.
        ty: String,
    },

    /// Templates embed each other by value, so no emission order exists.
    #[error("cyclic template dependency: {}", cycle.join(" -> "))]
    CyclicTemplateDependency {
        /// The templates on the cycle, with the first repeated at the end.
        cycle: Vec<String>,
    },

    /// A field refers to a type parameter its owner does not declare.
    #[error("'{owner}' field '{field}' references undeclared type parameter '{param}'")]
    UnresolvedTypeParameter {
        /// The declaring template or sum type.
        owner: String,
        /// The offending field.
        field: String,
        /// The parameter name that could not be resolved.
        param: String,
    },

    /// Nested instantiation did not terminate within the configured depth.
    #[error("instantiating '{template}' with '{argument}' exceeds the depth limit of {limit}")]
    InstantiationDepthExceeded {
        /// The template being instantiated when the limit was hit.
        template: String,
        /// The type argument at that point.
        argument: String,
        /// The configured limit.
        limit: usize,
    },

    /// Two variants resolve to the same discriminant.
    #[error(
        "sum type '{sum_type}': variants '{first}' and '{second}' share discriminant {discriminant}"
    )]
    DiscriminantCollision {
        /// The sum type being encoded.
        sum_type: String,
        /// The variant that claimed the value first.
        first: String,
        /// The variant that collided with it.
        second: String,
        /// The shared value.
        discriminant: u32,
    },

    /// A discriminant does not fit the C `int` range of an enumerator.
    #[error("sum type '{sum_type}': discriminant {value} of '{variant}' exceeds the C int range")]
    DiscriminantOutOfRange {
        /// The sum type being encoded.
        sum_type: String,
        /// The variant the value belongs to.
        variant: String,
        /// The rejected value.
        value: u64,
    },

    /// Two variants share a name.
    #[error("sum type '{sum_type}': duplicate variant '{variant}'")]
    DuplicateVariantName {
        /// The sum type being encoded.
        sum_type: String,
        /// The repeated variant name.
        variant: String,
    },

    /// A sum type declares no variants.
    #[error("sum type '{0}' has no variants")]
    EmptySumType(String),
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Top-level error type for a generation session.
///
/// ```ignore
/// fn generate(session: &mut Session) -> Result<(), GenerationError> {
///     session.register_template(node)?;  // RegistrationError -> GenerationError
///     session.instantiate("Node", TypeExpr::named("int"))?;
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// An identifier or symbol error.
    #[error(transparent)]
    Mangle(#[from] MangleError),

    /// A declaration error.
    #[error(transparent)]
    Registration(#[from] RegistrationError),

    /// An instantiation or encoding error.
    #[error(transparent)]
    Compilation(#[from] CompilationError),

    /// The session already failed; carries the original cause.
    #[error("generation session aborted: {0}")]
    Aborted(Box<GenerationError>),
}

impl GenerationError {
    /// Check if this is an identifier error.
    pub fn is_mangle(&self) -> bool {
        matches!(self, GenerationError::Mangle(_))
    }

    /// Check if this is a declaration error.
    pub fn is_registration(&self) -> bool {
        matches!(self, GenerationError::Registration(_))
    }

    /// Check if this is an instantiation or encoding error.
    pub fn is_compilation(&self) -> bool {
        matches!(self, GenerationError::Compilation(_))
    }

    /// Check if this error was reported by an already-aborted session.
    pub fn is_aborted(&self) -> bool {
        matches!(self, GenerationError::Aborted(_))
    }

    /// The failure that aborted the session, unwrapping any `Aborted` layers.
    pub fn root_cause(&self) -> &GenerationError {
        match self {
            GenerationError::Aborted(cause) => cause.root_cause(),
            other => other,
        }
    }
}

/// Result alias used throughout the workspace.
pub type GenerationResult<T> = Result<T, GenerationError>;

// ============================================================================
// Tests
// ============================================================================
