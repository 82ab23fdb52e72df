//! Generation session API.
//!
//! A [`Session`] owns everything one generation run needs: the template
//! registry, the instantiation cache and the encoded sum types. Nothing is
//! shared between sessions.
//!
//! # Example
//!
//! ```
//! use monogen::{Session, TemplateDefinition, TypeExpr};
//!
//! let mut session = Session::begin();
//! session
//!     .register_template(
//!         TemplateDefinition::new("Node", "T")
//!             .with_field("data", TypeExpr::param("T"))
//!             .with_field("next", TypeExpr::indirect(TypeExpr::self_ref())),
//!     )
//!     .unwrap();
//!
//! let node = session.instantiate("Node", "int").unwrap();
//! assert_eq!(node.symbol, "Node__int");
//!
//! let definitions = session.finalize().unwrap();
//! assert_eq!(definitions.len(), 1);
//! ```
//!
//! # Failure
//!
//! The first error aborts the session. Every later operation, `finalize`
//! included, returns [`GenerationError::Aborted`] carrying the original
//! cause, so no partial output is ever produced.

use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use monogen_compiler::{
    InstantiationEngine, emit_c, encode_sum_type, order_definitions, validate_template,
};
use monogen_core::{
    Definition, GenerationError, GenerationResult, Instantiation, RegistrationError, SumType,
    SumTypeDecl, TemplateDefinition, TypeExpr,
};
use monogen_registry::TemplateRegistry;

use crate::properties::{SessionProperty, emit_options};

/// One generation run.
#[derive(Debug)]
pub struct Session {
    registry: TemplateRegistry,
    engine: InstantiationEngine,
    /// Encoded sum types in registration order.
    sum_types: Vec<SumType>,
    sum_type_names: FxHashMap<String, usize>,
    properties: FxHashMap<SessionProperty, usize>,
    /// The error that aborted the session.
    aborted: Option<GenerationError>,
}

impl Default for Session {
    fn default() -> Self {
        Self::begin()
    }
}

impl Session {
    /// Start a session with default properties.
    pub fn begin() -> Self {
        Self {
            registry: TemplateRegistry::new(),
            engine: InstantiationEngine::with_max_depth(
                SessionProperty::MaxInstantiationDepth.default_value(),
            ),
            sum_types: Vec::new(),
            sum_type_names: FxHashMap::default(),
            properties: FxHashMap::default(),
            aborted: None,
        }
    }

    /// Start a session with the given property overrides.
    pub fn with_properties(
        properties: impl IntoIterator<Item = (SessionProperty, usize)>,
    ) -> Self {
        let mut session = Self::begin();
        for (property, value) in properties {
            session.set_property(property, value);
        }
        session
    }

    // ==========================================================================
    // Properties
    // ==========================================================================

    /// Set a property.
    pub fn set_property(&mut self, property: SessionProperty, value: usize) {
        if property == SessionProperty::MaxInstantiationDepth {
            self.engine.set_max_depth(value);
        }
        self.properties.insert(property, value);
    }

    /// Get a property, falling back to its default.
    pub fn get_property(&self, property: SessionProperty) -> usize {
        self.properties
            .get(&property)
            .copied()
            .unwrap_or_else(|| property.default_value())
    }

    // ==========================================================================
    // State
    // ==========================================================================

    /// Whether an earlier failure aborted the session.
    pub fn is_aborted(&self) -> bool {
        self.aborted.is_some()
    }

    /// The error that aborted the session, if any.
    pub fn abort_cause(&self) -> Option<&GenerationError> {
        self.aborted.as_ref()
    }

    /// The template registry.
    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    /// Instantiations produced so far, producers before consumers.
    pub fn instances(&self) -> &[Instantiation] {
        self.engine.instances()
    }

    /// Look up an encoded sum type by name.
    pub fn sum_type(&self, name: &str) -> Option<&SumType> {
        self.sum_type_names
            .get(name)
            .map(|&index| &self.sum_types[index])
    }

    // ==========================================================================
    // Operations
    // ==========================================================================

    /// Register a template after validating its declaration.
    pub fn register_template(&mut self, definition: TemplateDefinition) -> GenerationResult<()> {
        self.run(|session| {
            validate_template(&definition)?;
            if session.sum_type_names.contains_key(&definition.name) {
                return Err(RegistrationError::DuplicateDefinition {
                    name: definition.name,
                    kind: "sum type",
                }
                .into());
            }
            let name = definition.name.clone();
            session.registry.register(definition)?;
            debug!(template = %name, "registered template");
            Ok(())
        })
    }

    /// Encode and register a sum type.
    pub fn register_sum_type(&mut self, decl: SumTypeDecl) -> GenerationResult<SumType> {
        self.run(|session| {
            if session.registry.contains(&decl.name) {
                return Err(RegistrationError::DuplicateDefinition {
                    name: decl.name,
                    kind: "template",
                }
                .into());
            }
            if session.sum_type_names.contains_key(&decl.name) {
                return Err(RegistrationError::DuplicateDefinition {
                    name: decl.name,
                    kind: "sum type",
                }
                .into());
            }

            let sum = encode_sum_type(&decl, &mut session.engine, &session.registry)?;
            session
                .sum_type_names
                .insert(decl.name, session.sum_types.len());
            session.sum_types.push(sum.clone());
            Ok(sum)
        })
    }

    /// Instantiate `template` with `argument`, or return the existing
    /// specialization of that pair.
    pub fn instantiate(
        &mut self,
        template: &str,
        argument: impl Into<TypeExpr>,
    ) -> GenerationResult<Instantiation> {
        let argument = argument.into();
        self.run(|session| {
            session
                .engine
                .instantiate(&session.registry, template, &argument)
                .cloned()
        })
    }

    /// Every generated definition, each after the definitions it embeds by
    /// value.
    pub fn finalize(&mut self) -> GenerationResult<Vec<Definition>> {
        self.run(|session| {
            let definitions: Vec<Definition> = session
                .engine
                .instances()
                .iter()
                .cloned()
                .map(Definition::from)
                .chain(session.sum_types.iter().cloned().map(Definition::from))
                .collect();
            let ordered = order_definitions(definitions)?;
            debug!(definitions = ordered.len(), "finalized session");
            Ok(ordered)
        })
    }

    /// [`finalize`](Self::finalize) and render the result as C.
    pub fn finalize_c(&mut self) -> GenerationResult<String> {
        let definitions = self.finalize()?;
        let options = emit_options(|property| self.get_property(property));
        Ok(emit_c(&definitions, &options))
    }

    /// Run `op` unless the session is aborted; abort it if `op` fails.
    fn run<T>(
        &mut self,
        op: impl FnOnce(&mut Self) -> GenerationResult<T>,
    ) -> GenerationResult<T> {
        if let Some(cause) = &self.aborted {
            return Err(GenerationError::Aborted(Box::new(cause.clone())));
        }
        let result = op(self);
        if let Err(err) = &result {
            warn!(error = %err, "generation session aborted");
            self.aborted = Some(err.clone());
        }
        result
    }
}
