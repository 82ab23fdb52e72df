//! TemplateRegistry - catalog of template declarations.
//!
//! The registry stores [`TemplateDefinition`]s by name for the lifetime of a
//! generation session. It performs no substitution; the instantiation engine
//! queries it for definitions and for the dependency structure between
//! templates.
//!
//! # Dependency Graph
//!
//! Dependencies are derived from field types:
//!
//! - `dependencies_of` reports every template a template's fields mention,
//!   whether embedded by value, behind indirection, or nested in arguments.
//! - `value_dependencies_of` reports only templates embedded by value.
//! - `find_value_cycle` builds a `petgraph::DiGraph` over by-value edges and
//!   reports a cycle reachable from a root. Templates on such a cycle can
//!   never be laid out, whatever their arguments.
//!
//! # Example
//!
//! ```
//! use monogen_core::{TemplateDefinition, TypeExpr};
//! use monogen_registry::TemplateRegistry;
//!
//! let mut registry = TemplateRegistry::new();
//! let node = TypeExpr::apply("Node", TypeExpr::param("T"));
//! let list = TemplateDefinition::new("List", "T").with_field("head", TypeExpr::indirect(node));
//! registry.register(list).unwrap();
//!
//! let deps = registry.dependencies_of("List").unwrap();
//! assert!(deps.contains("Node"));
//! ```

use std::collections::{BTreeSet, VecDeque};

use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::FxHashMap;

use monogen_core::{Embedding, RegistrationError, TemplateDefinition};

/// Catalog of registered templates, in registration order.
#[derive(Debug, Default, Clone)]
pub struct TemplateRegistry {
    /// Definitions in registration order.
    templates: Vec<TemplateDefinition>,
    /// Name -> index into `templates`.
    by_name: FxHashMap<String, usize>,
}

impl TemplateRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    // ==========================================================================
    // Registration
    // ==========================================================================

    /// Register a template.
    ///
    /// Returns `DuplicateTemplate` if a template with the same name exists.
    pub fn register(&mut self, definition: TemplateDefinition) -> Result<(), RegistrationError> {
        if self.by_name.contains_key(&definition.name) {
            return Err(RegistrationError::DuplicateTemplate(definition.name));
        }
        self.by_name
            .insert(definition.name.clone(), self.templates.len());
        self.templates.push(definition);
        Ok(())
    }

    // ==========================================================================
    // Lookup
    // ==========================================================================

    /// Look up a template by name.
    ///
    /// Returns `UnknownTemplate` if it has not been registered.
    pub fn lookup(&self, name: &str) -> Result<&TemplateDefinition, RegistrationError> {
        self.get(name)
            .ok_or_else(|| RegistrationError::UnknownTemplate(name.to_string()))
    }

    /// Look up a template by name, returning `None` if absent.
    pub fn get(&self, name: &str) -> Option<&TemplateDefinition> {
        self.by_name.get(name).map(|&index| &self.templates[index])
    }

    /// Check if a template is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// All templates in registration order.
    pub fn templates(&self) -> impl Iterator<Item = &TemplateDefinition> {
        self.templates.iter()
    }

    /// Number of registered templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether no template is registered.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    // ==========================================================================
    // Dependencies
    // ==========================================================================

    /// Names of the templates referenced by `name`'s fields, excluding itself.
    pub fn dependencies_of(&self, name: &str) -> Result<BTreeSet<String>, RegistrationError> {
        let definition = self.lookup(name)?;
        let mut deps = BTreeSet::new();
        for field in &definition.fields {
            field.ty.visit_templates(&mut |template, _| {
                if template != name {
                    deps.insert(template.to_string());
                }
            });
        }
        Ok(deps)
    }

    /// Names of the templates `name` embeds by value, itself included when it
    /// embeds itself.
    pub fn value_dependencies_of(
        &self,
        name: &str,
    ) -> Result<BTreeSet<String>, RegistrationError> {
        let definition = self.lookup(name)?;
        let mut deps = BTreeSet::new();
        for field in &definition.fields {
            field.ty.visit_templates(&mut |template, embedding| {
                if embedding == Embedding::ByValue {
                    deps.insert(template.to_string());
                }
            });
        }
        Ok(deps)
    }

    /// Find a cycle of by-value embeddings reachable from `root`.
    ///
    /// Returns the templates on the cycle with the first one repeated at the
    /// end (`["A", "B", "A"]`, or `["A", "A"]` for a self-loop). Templates
    /// that are referenced but not registered are skipped; looking them up
    /// is the caller's concern.
    pub fn find_value_cycle(&self, root: &str) -> Option<Vec<String>> {
        let (graph, nodes) = self.value_graph_from(root)?;

        let sccs = petgraph::algo::tarjan_scc(&graph);
        // Prefer the component closest to the root (lowest discovery index).
        let component = sccs
            .into_iter()
            .filter(|scc| {
                scc.len() > 1 || graph.contains_edge(scc[0], scc[0])
            })
            .min_by_key(|scc| scc.iter().map(|n| n.index()).min())?;

        let start = *component.iter().min_by_key(|n| n.index())?;
        let path = shortest_cycle(&graph, start, &component)?;
        Some(path.into_iter().map(|n| nodes[n.index()].clone()).collect())
    }

    /// Build the by-value dependency graph reachable from `root`.
    ///
    /// Node indices follow breadth-first discovery order from `root`.
    fn value_graph_from(&self, root: &str) -> Option<(DiGraph<(), ()>, Vec<String>)> {
        self.get(root)?;

        let mut graph = DiGraph::new();
        let mut names = Vec::new();
        let mut index: FxHashMap<String, NodeIndex> = FxHashMap::default();
        let mut queue = VecDeque::new();

        let root_node = graph.add_node(());
        names.push(root.to_string());
        index.insert(root.to_string(), root_node);
        queue.push_back(root.to_string());

        while let Some(current) = queue.pop_front() {
            let Ok(deps) = self.value_dependencies_of(&current) else {
                continue;
            };
            let from = index[&current];
            for dep in deps {
                if !self.contains(&dep) {
                    continue;
                }
                let to = match index.get(&dep) {
                    Some(&node) => node,
                    None => {
                        let node = graph.add_node(());
                        names.push(dep.clone());
                        index.insert(dep.clone(), node);
                        queue.push_back(dep.clone());
                        node
                    }
                };
                graph.update_edge(from, to, ());
            }
        }

        Some((graph, names))
    }
}

/// Shortest path `start -> ... -> start` staying inside `component`.
fn shortest_cycle(
    graph: &DiGraph<(), ()>,
    start: NodeIndex,
    component: &[NodeIndex],
) -> Option<Vec<NodeIndex>> {
    if graph.contains_edge(start, start) {
        return Some(vec![start, start]);
    }

    let mut previous: FxHashMap<NodeIndex, NodeIndex> = FxHashMap::default();
    let mut queue = VecDeque::from([start]);
    while let Some(node) = queue.pop_front() {
        let mut successors: Vec<_> = graph.neighbors(node).collect();
        successors.sort_by_key(|n| n.index());
        for next in successors {
            if !component.contains(&next) {
                continue;
            }
            if next == start {
                let mut chain = Vec::new();
                let mut cursor = node;
                while cursor != start {
                    chain.push(cursor);
                    cursor = previous[&cursor];
                }
                chain.reverse();

                let mut path = vec![start];
                path.extend(chain);
                path.push(start);
                return Some(path);
            }
            if !previous.contains_key(&next) {
                previous.insert(next, node);
                queue.push_back(next);
            }
        }
    }
    None
}

impl std::fmt::Display for TemplateRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<_> = self.templates.iter().map(|t| t.name.as_str()).collect();
        write!(f, "TemplateRegistry[{}]", names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use monogen_core::TypeExpr;

    fn node() -> TemplateDefinition {
        TemplateDefinition::new("Node", "T")
            .with_field("data", TypeExpr::param("T"))
            .with_field("next", TypeExpr::indirect(TypeExpr::self_ref()))
    }

    fn list() -> TemplateDefinition {
        let node_ptr = TypeExpr::indirect(TypeExpr::apply("Node", TypeExpr::param("T")));
        TemplateDefinition::new("List", "T")
            .with_field("head", node_ptr.clone())
            .with_field("tail", node_ptr)
    }

    #[test]
    fn new_registry_is_empty() {
        let registry = TemplateRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn register_and_lookup() {
        let mut registry = TemplateRegistry::new();
        registry.register(node()).unwrap();

        assert!(registry.contains("Node"));
        assert_eq!(registry.lookup("Node").unwrap().parameter, "T");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn duplicate_template_error() {
        let mut registry = TemplateRegistry::new();
        registry.register(node()).unwrap();

        let result = registry.register(node());
        assert_eq!(
            result,
            Err(RegistrationError::DuplicateTemplate("Node".to_string()))
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unknown_template_error() {
        let registry = TemplateRegistry::new();
        assert_eq!(
            registry.lookup("Missing").unwrap_err(),
            RegistrationError::UnknownTemplate("Missing".to_string())
        );
        assert!(registry.dependencies_of("Missing").is_err());
    }

    #[test]
    fn templates_iterate_in_registration_order() {
        let mut registry = TemplateRegistry::new();
        registry.register(list()).unwrap();
        registry.register(node()).unwrap();

        let names: Vec<_> = registry.templates().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["List", "Node"]);
        assert_eq!(registry.to_string(), "TemplateRegistry[List, Node]");
    }

    #[test]
    fn dependencies_exclude_self() {
        let mut registry = TemplateRegistry::new();
        registry.register(node()).unwrap();
        registry.register(list()).unwrap();

        assert!(registry.dependencies_of("Node").unwrap().is_empty());
        let deps = registry.dependencies_of("List").unwrap();
        assert_eq!(deps.into_iter().collect::<Vec<_>>(), vec!["Node"]);
    }

    #[test]
    fn dependencies_include_nested_arguments() {
        let mut registry = TemplateRegistry::new();
        registry
            .register(TemplateDefinition::new("Table", "T").with_field(
                "rows",
                TypeExpr::apply("Vector", TypeExpr::apply("Pair", TypeExpr::param("T"))),
            ))
            .unwrap();

        let deps = registry.dependencies_of("Table").unwrap();
        assert_eq!(deps.into_iter().collect::<Vec<_>>(), vec!["Pair", "Vector"]);
        let value_deps = registry.value_dependencies_of("Table").unwrap();
        assert_eq!(value_deps.into_iter().collect::<Vec<_>>(), vec!["Vector"]);
    }

    #[test]
    fn no_cycle_through_indirection() {
        let mut registry = TemplateRegistry::new();
        registry.register(node()).unwrap();
        registry.register(list()).unwrap();

        assert!(registry.find_value_cycle("List").is_none());
        assert!(registry.find_value_cycle("Node").is_none());
    }

    #[test]
    fn detects_mutual_value_cycle() {
        let mut registry = TemplateRegistry::new();
        registry
            .register(
                TemplateDefinition::new("A", "T")
                    .with_field("b", TypeExpr::apply("B", TypeExpr::param("T"))),
            )
            .unwrap();
        registry
            .register(
                TemplateDefinition::new("B", "T")
                    .with_field("a", TypeExpr::apply("A", TypeExpr::param("T"))),
            )
            .unwrap();

        assert_eq!(
            registry.find_value_cycle("A").unwrap(),
            vec!["A".to_string(), "B".to_string(), "A".to_string()]
        );
        assert_eq!(
            registry.find_value_cycle("B").unwrap(),
            vec!["B".to_string(), "A".to_string(), "B".to_string()]
        );
    }

    #[test]
    fn detects_self_loop_with_other_argument() {
        let mut registry = TemplateRegistry::new();
        registry
            .register(
                TemplateDefinition::new("Wrap", "T")
                    .with_field("inner", TypeExpr::apply("Wrap", TypeExpr::named("int"))),
            )
            .unwrap();

        assert_eq!(
            registry.find_value_cycle("Wrap").unwrap(),
            vec!["Wrap".to_string(), "Wrap".to_string()]
        );
    }

    #[test]
    fn detects_cycle_downstream_of_root() {
        let mut registry = TemplateRegistry::new();
        registry
            .register(
                TemplateDefinition::new("Root", "T")
                    .with_field("a", TypeExpr::apply("A", TypeExpr::param("T"))),
            )
            .unwrap();
        registry
            .register(
                TemplateDefinition::new("A", "T")
                    .with_field("b", TypeExpr::apply("B", TypeExpr::param("T"))),
            )
            .unwrap();
        registry
            .register(
                TemplateDefinition::new("B", "T")
                    .with_field("a", TypeExpr::apply("A", TypeExpr::param("T"))),
            )
            .unwrap();

        assert_eq!(
            registry.find_value_cycle("Root").unwrap(),
            vec!["A".to_string(), "B".to_string(), "A".to_string()]
        );
    }

    #[test]
    fn unregistered_dependencies_are_skipped() {
        let mut registry = TemplateRegistry::new();
        registry
            .register(
                TemplateDefinition::new("Holder", "T")
                    .with_field("v", TypeExpr::apply("Missing", TypeExpr::param("T"))),
            )
            .unwrap();
        assert!(registry.find_value_cycle("Holder").is_none());
        assert!(registry.find_value_cycle("Missing").is_none());
    }
}
