//! Session configuration.

use monogen_compiler::EmitOptions;
use monogen_compiler::template::DEFAULT_MAX_DEPTH;

/// Tunable settings of a [`Session`](crate::Session).
///
/// Every property holds a `usize`; boolean properties use `0` and `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionProperty {
    /// Bound on nested instantiation before `InstantiationDepthExceeded`.
    MaxInstantiationDepth,
    /// Spaces per indentation level in emitted C.
    IndentWidth,
    /// Emit a forward `typedef` block.
    ForwardDeclarations,
    /// Give unit payload structs a placeholder member.
    UnitPayloadPlaceholder,
    /// Emit a discriminant table per sum type.
    DiscriminantTable,
}

impl SessionProperty {
    /// All properties.
    pub const ALL: [SessionProperty; 5] = [
        SessionProperty::MaxInstantiationDepth,
        SessionProperty::IndentWidth,
        SessionProperty::ForwardDeclarations,
        SessionProperty::UnitPayloadPlaceholder,
        SessionProperty::DiscriminantTable,
    ];

    pub fn default_value(&self) -> usize {
        match self {
            SessionProperty::MaxInstantiationDepth => DEFAULT_MAX_DEPTH,
            SessionProperty::IndentWidth => 4,
            SessionProperty::ForwardDeclarations => 1,
            SessionProperty::UnitPayloadPlaceholder => 1,
            SessionProperty::DiscriminantTable => 0,
        }
    }
}

/// Build emitter options from a property lookup.
pub(crate) fn emit_options(get: impl Fn(SessionProperty) -> usize) -> EmitOptions {
    EmitOptions::default()
        .with_indent_width(get(SessionProperty::IndentWidth))
        .with_forward_declarations(get(SessionProperty::ForwardDeclarations) != 0)
        .with_unit_placeholder(get(SessionProperty::UnitPayloadPlaceholder) != 0)
        .with_discriminant_table(get(SessionProperty::DiscriminantTable) != 0)
}
