//! Template instance cache.
//!
//! Maps each `(template, argument)` pair to the position of its
//! specialization in the engine's ordered instance list, so a pair is
//! materialized at most once per session.

use monogen_core::TypeHash;
use rustc_hash::FxHashMap;

/// Cache for template instances.
///
/// Maps (template_hash, argument_hash) → instance index, and the instance
/// symbol's hash → instance index.
#[derive(Debug, Default, Clone)]
pub struct TemplateInstanceCache {
    /// (template, argument) → index
    instances: FxHashMap<(TypeHash, TypeHash), usize>,
    /// instance symbol → index
    symbols: FxHashMap<TypeHash, usize>,
}

impl TemplateInstanceCache {
    /// Create a new empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a produced instance.
    pub fn cache_instance(
        &mut self,
        template: TypeHash,
        argument: TypeHash,
        symbol: TypeHash,
        index: usize,
    ) {
        self.instances.insert((template, argument), index);
        self.symbols.insert(symbol, index);
    }

    /// Look up a cached instance by its `(template, argument)` pair.
    pub fn get_instance(&self, template: TypeHash, argument: TypeHash) -> Option<usize> {
        self.instances.get(&(template, argument)).copied()
    }

    /// Look up a cached instance by its symbol hash.
    pub fn get_by_symbol(&self, symbol: TypeHash) -> Option<usize> {
        self.symbols.get(&symbol).copied()
    }

    /// Forget an instance. Used when rolling back a failed instantiation.
    pub fn remove_instance(&mut self, template: TypeHash, argument: TypeHash, symbol: TypeHash) {
        self.instances.remove(&(template, argument));
        self.symbols.remove(&symbol);
    }
}
