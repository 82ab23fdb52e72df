//! C source emitter for generated definitions.
//!
//! The [`CEmitter`] renders an ordered definition list as C declarations:
//! a forward `typedef` block, then one `struct` per instantiation and, per
//! sum type, its payload structs, discriminant enumeration, payload union
//! and wrapper struct.
//!
//! # Example
//!
//! ```ignore
//! use monogen_compiler::emit::{EmitOptions, emit_c};
//!
//! let source = emit_c(&definitions, &EmitOptions::default().with_indent_width(2));
//! ```

mod c_emitter;

pub use c_emitter::{CEmitter, VALUES_TABLE_SEGMENT, emit_c};

/// Rendering options for [`CEmitter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitOptions {
    /// Spaces per indentation level.
    pub indent_width: usize,
    /// Emit a `typedef struct X X;` block before any definition.
    pub forward_declarations: bool,
    /// Give unit payload structs a `char _;` member.
    pub unit_placeholder: bool,
    /// Emit a table listing every discriminant of each sum type.
    pub discriminant_table: bool,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            indent_width: 4,
            forward_declarations: true,
            unit_placeholder: true,
            discriminant_table: false,
        }
    }
}

impl EmitOptions {
    /// Set the indentation width.
    pub fn with_indent_width(mut self, width: usize) -> Self {
        self.indent_width = width;
        self
    }

    /// Enable or disable the forward declaration block.
    pub fn with_forward_declarations(mut self, enabled: bool) -> Self {
        self.forward_declarations = enabled;
        self
    }

    /// Enable or disable the unit payload placeholder member.
    pub fn with_unit_placeholder(mut self, enabled: bool) -> Self {
        self.unit_placeholder = enabled;
        self
    }

    /// Enable or disable discriminant tables.
    pub fn with_discriminant_table(mut self, enabled: bool) -> Self {
        self.discriminant_table = enabled;
        self
    }
}
