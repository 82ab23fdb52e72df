//! Template instantiation logic.
//!
//! [`InstantiationEngine`] materializes `(template, argument)` pairs into
//! [`Instantiation`]s. Every specialization a field or the argument refers to
//! is produced first, so the engine's instance list is always in completion
//! order: producers before consumers.
//!
//! While a specialization is being produced it sits on the in-progress
//! stack. A reference to an in-progress specialization through indirection
//! only needs its name; a by-value reference to one can never be laid out
//! and is reported as an error.

use rustc_hash::FxHashSet;
use tracing::{debug, trace};

use monogen_core::{
    CompilationError, Embedding, GenerationError, GenerationResult, Instantiation, MangleError,
    ResolvedField, ResolvedType, Symbol, TemplateDefinition, TypeExpr, TypeHash, mangle,
    mangle_argument,
};
use monogen_registry::TemplateRegistry;

use super::cache::TemplateInstanceCache;
use super::substitution::Substitution;

/// Default bound on nested instantiation.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Position in the instance list that a failed operation rolls back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(usize);

/// A specialization currently being produced.
#[derive(Debug, Clone)]
struct InProgress {
    template: String,
    symbol: Symbol,
}

/// The context a field type is resolved in, for error reporting.
#[derive(Debug, Clone, Copy)]
pub struct FieldContext<'a> {
    /// The template specialization or sum type that declares the field.
    pub owner: &'a str,
    /// The field name.
    pub field: &'a str,
}

/// Produces and caches template specializations for one session.
#[derive(Debug, Clone)]
pub struct InstantiationEngine {
    cache: TemplateInstanceCache,
    /// Produced instances in completion order.
    instances: Vec<Instantiation>,
    in_progress: Vec<InProgress>,
    max_depth: usize,
}

impl Default for InstantiationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl InstantiationEngine {
    /// Create an engine with the default depth limit.
    pub fn new() -> Self {
        Self::with_max_depth(DEFAULT_MAX_DEPTH)
    }

    /// Create an engine with a custom depth limit.
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            cache: TemplateInstanceCache::new(),
            instances: Vec::new(),
            in_progress: Vec::new(),
            max_depth,
        }
    }

    /// The configured depth limit.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Change the depth limit for subsequent instantiations.
    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.max_depth = max_depth;
    }

    // ==========================================================================
    // Queries
    // ==========================================================================

    /// All produced instances, producers before consumers.
    pub fn instances(&self) -> &[Instantiation] {
        &self.instances
    }

    /// Number of produced instances.
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Whether nothing has been produced yet.
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Look up a produced instance by symbol.
    pub fn get(&self, symbol: &str) -> Option<&Instantiation> {
        self.cache
            .get_by_symbol(TypeHash::from_name(symbol))
            .map(|index| &self.instances[index])
            .filter(|inst| inst.symbol == symbol)
    }

    /// Look up a produced instance by its `(template, argument)` pair.
    pub fn lookup(&self, template: &str, argument: &TypeExpr) -> Option<&Instantiation> {
        let symbol = mangle(template, argument).ok()?;
        let argument = mangle_argument(argument).ok()?;
        let template_hash = TypeHash::from_name(template);
        let argument_hash = TypeHash::from_name(&argument);
        self.cached(template_hash, argument_hash, &symbol)
            .map(|index| &self.instances[index])
    }

    /// Cache entry for a pair, if it really holds `symbol`.
    fn cached(&self, template: TypeHash, argument: TypeHash, symbol: &Symbol) -> Option<usize> {
        self.cache
            .get_instance(template, argument)
            .filter(|&index| self.instances[index].symbol == *symbol)
    }

    /// Whether the instance `symbol` embeds `target` by value, directly or
    /// through other instances it embeds by value.
    pub fn embeds_by_value(&self, symbol: &str, target: &str) -> bool {
        let mut stack = vec![symbol.to_string()];
        let mut visited = FxHashSet::default();
        while let Some(current) = stack.pop() {
            let Some(inst) = self.get(&current) else {
                continue;
            };
            for dep in inst.value_dependencies() {
                if dep == target {
                    return true;
                }
                if visited.insert(dep.as_str().to_string()) {
                    stack.push(dep.as_str().to_string());
                }
            }
        }
        false
    }

    // ==========================================================================
    // Transactions
    // ==========================================================================

    /// Mark the current state so a failed operation can be undone.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.instances.len())
    }

    /// Drop every instance produced since `checkpoint`.
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        for inst in self.instances.drain(checkpoint.0..) {
            let argument = mangle_argument(&inst.argument).unwrap_or_default();
            self.cache.remove_instance(
                TypeHash::from_name(&inst.template),
                TypeHash::from_name(&argument),
                inst.symbol.type_hash(),
            );
            trace!(symbol = %inst.symbol, "rolled back instantiation");
        }
        self.in_progress.clear();
    }

    // ==========================================================================
    // Instantiation
    // ==========================================================================

    /// Instantiate `template` with `argument`.
    ///
    /// Returns the cached specialization if the pair was produced before.
    /// On failure nothing produced during this call survives.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn instantiate(
        &mut self,
        registry: &TemplateRegistry,
        template: &str,
        argument: &TypeExpr,
    ) -> GenerationResult<&Instantiation> {
        let checkpoint = self.checkpoint();
        match self.resolve_instance(registry, template, argument, 0) {
            Ok(index) => Ok(&self.instances[index]),
            Err(err) => {
                self.rollback(checkpoint);
                Err(err)
            }
        }
    }

    /// Resolve a closed field type declared outside any template, such as a
    /// sum type payload field, instantiating every application it mentions.
    ///
    /// The caller owns the transaction: use [`checkpoint`](Self::checkpoint)
    /// and [`rollback`](Self::rollback) around a group of calls.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn resolve_field(
        &mut self,
        registry: &TemplateRegistry,
        context: FieldContext<'_>,
        ty: &TypeExpr,
    ) -> GenerationResult<ResolvedType> {
        self.resolve_type(registry, context, ty, Embedding::ByValue, 0)
    }

    /// Produce (or fetch) one specialization, returning its index.
    fn resolve_instance(
        &mut self,
        registry: &TemplateRegistry,
        template: &str,
        argument: &TypeExpr,
        depth: usize,
    ) -> GenerationResult<usize> {
        let symbol = mangle(template, argument)?;
        let argument_symbol = mangle_argument(argument)?;
        let template_hash = TypeHash::from_name(template);
        let argument_hash = TypeHash::from_name(&argument_symbol);

        if let Some(index) = self.cached(template_hash, argument_hash, &symbol) {
            trace!(%symbol, "instantiation cache hit");
            return Ok(index);
        }

        if depth >= self.max_depth {
            return Err(CompilationError::InstantiationDepthExceeded {
                template: template.to_string(),
                argument: argument.to_string(),
                limit: self.max_depth,
            }
            .into());
        }

        let definition = registry.lookup(template)?;
        self.check_value_cycle(registry, template)?;

        self.in_progress.push(InProgress {
            template: template.to_string(),
            symbol: symbol.clone(),
        });
        let result = self.expand(registry, definition, argument, &symbol, depth);
        self.in_progress.pop();
        let fields = result?;

        let index = self.instances.len();
        self.instances.push(Instantiation {
            template: template.to_string(),
            argument: argument.clone(),
            symbol: symbol.clone(),
            type_hash: TypeHash::from_instance(template_hash, argument_hash),
            fields,
        });
        self.cache
            .cache_instance(template_hash, argument_hash, symbol.type_hash(), index);

        debug!(%symbol, template, argument = %argument, depth, "instantiated template");
        Ok(index)
    }

    /// Produce the argument's own specializations, then the substituted fields.
    fn expand(
        &mut self,
        registry: &TemplateRegistry,
        definition: &TemplateDefinition,
        argument: &TypeExpr,
        symbol: &Symbol,
        depth: usize,
    ) -> GenerationResult<Vec<ResolvedField>> {
        let owner = symbol.as_str();

        // The argument is not embedded by the application itself; the
        // substituted fields decide how it is used.
        self.resolve_type(
            registry,
            FieldContext {
                owner,
                field: &definition.parameter,
            },
            argument,
            Embedding::Indirect,
            depth + 1,
        )?;

        let substitution = Substitution::new(definition, argument);
        let mut fields = Vec::with_capacity(definition.fields.len());
        for field in &definition.fields {
            let ty = substitution.apply(&field.ty);
            let context = FieldContext {
                owner,
                field: &field.name,
            };
            let resolved =
                self.resolve_type(registry, context, &ty, Embedding::ByValue, depth + 1)?;
            fields.push(ResolvedField::new(field.name.as_str(), resolved));
        }
        Ok(fields)
    }

    /// Resolve a substituted (closed) type expression.
    fn resolve_type(
        &mut self,
        registry: &TemplateRegistry,
        context: FieldContext<'_>,
        ty: &TypeExpr,
        embedding: Embedding,
        depth: usize,
    ) -> GenerationResult<ResolvedType> {
        match ty {
            TypeExpr::Named(name) => Ok(ResolvedType::named(Symbol::concrete(name)?)),
            TypeExpr::Indirect(inner) => {
                let inner =
                    self.resolve_type(registry, context, inner, Embedding::Indirect, depth)?;
                Ok(ResolvedType::indirect(inner))
            }
            TypeExpr::Apply { template, arg } => {
                let symbol = mangle(template, arg)?;
                if let Some(position) = self.in_progress.iter().position(|p| p.symbol == symbol) {
                    if embedding == Embedding::Indirect {
                        return Ok(ResolvedType::named(symbol));
                    }
                    return Err(self.in_progress_error(position, context, ty));
                }
                let index = self.resolve_instance(registry, template, arg, depth)?;
                Ok(ResolvedType::named(self.instances[index].symbol.clone()))
            }
            TypeExpr::Param(param) => Err(CompilationError::UnresolvedTypeParameter {
                owner: context.owner.to_string(),
                field: context.field.to_string(),
                param: param.clone(),
            }
            .into()),
            TypeExpr::SelfRef => Err(MangleError::invalid(
                "Self",
                "a self-reference cannot appear in a type argument",
            )
            .into()),
        }
    }

    /// Error for a by-value reference to the in-progress entry at `position`.
    fn in_progress_error(
        &self,
        position: usize,
        context: FieldContext<'_>,
        ty: &TypeExpr,
    ) -> GenerationError {
        if position + 1 == self.in_progress.len() {
            return CompilationError::RecursiveUnboxedType {
                owner: context.owner.to_string(),
                field: context.field.to_string(),
                ty: ty.to_string(),
            }
            .into();
        }
        let mut cycle: Vec<String> = self.in_progress[position..]
            .iter()
            .map(|p| p.symbol.to_string())
            .collect();
        cycle.push(self.in_progress[position].symbol.to_string());
        CompilationError::CyclicTemplateDependency { cycle }.into()
    }

    /// Reject templates that embed each other (or themselves) by value.
    fn check_value_cycle(
        &self,
        registry: &TemplateRegistry,
        template: &str,
    ) -> GenerationResult<()> {
        let Some(cycle) = registry.find_value_cycle(template) else {
            return Ok(());
        };

        if let [only, again] = cycle.as_slice()
            && only == again
        {
            let definition = registry.lookup(only)?;
            let field = definition.fields.iter().find(|field| {
                let mut embeds = false;
                field.ty.visit_templates(&mut |name, embedding| {
                    embeds |= name == only && embedding == Embedding::ByValue;
                });
                embeds
            });
            return Err(CompilationError::RecursiveUnboxedType {
                owner: only.clone(),
                field: field.map(|f| f.name.clone()).unwrap_or_default(),
                ty: field.map(|f| f.ty.to_string()).unwrap_or_default(),
            }
            .into());
        }

        debug!(template, cycle = ?cycle, "by-value template cycle");
        Err(CompilationError::CyclicTemplateDependency { cycle }.into())
    }

    /// Templates currently being produced, outermost first.
    pub fn in_progress(&self) -> impl Iterator<Item = &str> {
        self.in_progress.iter().map(|p| p.template.as_str())
    }
}
