//! C text rendering.

use std::fmt::{self, Write};

use rustc_hash::FxHashMap;

use monogen_core::{Definition, Instantiation, ResolvedField, ResolvedType, SEPARATOR, SumType};

use super::EmitOptions;

/// Trailing segment of a sum type's discriminant table symbol
/// (`Expr__Kind__0values`). Starts with a digit so no variant can claim it.
pub const VALUES_TABLE_SEGMENT: &str = "0values";

/// Render `definitions` (already in emission order) as C source.
pub fn emit_c(definitions: &[Definition], options: &EmitOptions) -> String {
    CEmitter::new(definitions, options).to_string()
}

/// Renders one ordered definition list through [`fmt::Display`].
pub struct CEmitter<'a> {
    definitions: &'a [Definition],
    options: &'a EmitOptions,
    /// Generated symbol -> C tag keyword.
    tags: FxHashMap<&'a str, &'static str>,
    indent: String,
}

/// Block sink that puts one blank line between consecutive blocks.
struct Blocks<'w, W: Write> {
    out: &'w mut W,
    started: bool,
}

impl<W: Write> Blocks<'_, W> {
    /// Begin the next block.
    fn next(&mut self) -> Result<&mut W, fmt::Error> {
        if self.started {
            self.out.write_char('\n')?;
        }
        self.started = true;
        Ok(&mut *self.out)
    }
}

impl fmt::Display for CEmitter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut blocks = Blocks {
            out: f,
            started: false,
        };

        if self.options.forward_declarations && !self.definitions.is_empty() {
            self.forward_declarations(blocks.next()?)?;
        }

        for definition in self.definitions {
            match definition {
                Definition::Instantiation(inst) => self.instantiation(blocks.next()?, inst)?,
                Definition::SumType(sum) => self.sum_type(&mut blocks, sum)?,
            }
        }
        Ok(())
    }
}

impl<'a> CEmitter<'a> {
    /// Create an emitter over `definitions`.
    pub fn new(definitions: &'a [Definition], options: &'a EmitOptions) -> Self {
        let mut tags = FxHashMap::default();
        for definition in definitions {
            match definition {
                Definition::Instantiation(inst) => {
                    tags.insert(inst.symbol.as_str(), "struct");
                }
                Definition::SumType(sum) => {
                    tags.insert(sum.name.as_str(), "struct");
                    tags.insert(sum.data.as_str(), "union");
                    tags.insert(sum.kind.as_str(), "enum");
                    for variant in &sum.variants {
                        tags.insert(variant.payload.as_str(), "struct");
                    }
                }
            }
        }

        Self {
            definitions,
            options,
            tags,
            indent: " ".repeat(options.indent_width),
        }
    }

    // ==========================================================================
    // Blocks
    // ==========================================================================

    fn forward_declarations(&self, out: &mut impl Write) -> fmt::Result {
        for definition in self.definitions {
            match definition {
                Definition::Instantiation(inst) => typedef(out, "struct", inst.symbol.as_str())?,
                Definition::SumType(sum) => {
                    for variant in &sum.variants {
                        typedef(out, "struct", variant.payload.as_str())?;
                    }
                    typedef(out, "union", sum.data.as_str())?;
                    typedef(out, "struct", sum.name.as_str())?;
                }
            }
        }
        Ok(())
    }

    fn instantiation(&self, out: &mut impl Write, inst: &Instantiation) -> fmt::Result {
        let members = inst.fields.iter().map(|f| self.field(f)).collect();
        self.aggregate(out, "struct", inst.symbol.as_str(), members)
    }

    fn sum_type<W: Write>(&self, blocks: &mut Blocks<'_, W>, sum: &SumType) -> fmt::Result {
        for variant in &sum.variants {
            let mut members: Vec<String> = variant.fields.iter().map(|f| self.field(f)).collect();
            if members.is_empty() && self.options.unit_placeholder {
                members.push("char _;".to_string());
            }
            let payload = variant.payload.as_str();
            self.aggregate(blocks.next()?, "struct", payload, members)?;
        }

        let out = blocks.next()?;
        writeln!(out, "typedef enum {} {{", sum.kind)?;
        for variant in &sum.variants {
            let value = variant.discriminant;
            writeln!(out, "{}{} = {value},", self.indent, variant.enumerator)?;
        }
        writeln!(out, "}} {};", sum.kind)?;

        if self.options.discriminant_table {
            let out = blocks.next()?;
            let table = format!("{}{SEPARATOR}{VALUES_TABLE_SEGMENT}", sum.kind);
            writeln!(out, "static unsigned const {table}[] = {{")?;
            for variant in &sum.variants {
                writeln!(out, "{}{},", self.indent, variant.enumerator)?;
            }
            out.write_str("};\n")?;
        }

        let members = sum
            .variants
            .iter()
            .map(|v| {
                let payload = self.type_name(&ResolvedType::named(v.payload.clone()));
                format!("{payload} _{};", v.discriminant)
            })
            .collect();
        self.aggregate(blocks.next()?, "union", sum.data.as_str(), members)?;

        let data = self.type_name(&ResolvedType::named(sum.data.clone()));
        let members = vec![format!("{} kind;", sum.kind), format!("{data} data;")];
        self.aggregate(blocks.next()?, "struct", sum.name.as_str(), members)
    }

    // ==========================================================================
    // Pieces
    // ==========================================================================

    /// A `struct` or `union` definition.
    fn aggregate(
        &self,
        out: &mut impl Write,
        keyword: &str,
        name: &str,
        members: Vec<String>,
    ) -> fmt::Result {
        if self.options.forward_declarations {
            writeln!(out, "{keyword} {name} {{")?;
        } else {
            writeln!(out, "typedef {keyword} {name} {{")?;
        }
        for member in members {
            writeln!(out, "{}{member}", self.indent)?;
        }
        if self.options.forward_declarations {
            out.write_str("};\n")
        } else {
            writeln!(out, "}} {name};")
        }
    }

    fn field(&self, field: &ResolvedField) -> String {
        format!("{} {};", self.type_name(&field.ty), field.name)
    }

    /// Spelling of a field type. Without the forward block, generated
    /// aggregates are referenced through their tag.
    fn type_name(&self, ty: &ResolvedType) -> String {
        match ty {
            ResolvedType::Indirect(inner) => format!("{}*", self.type_name(inner)),
            ResolvedType::Named(symbol) => match self.tags.get(symbol.as_str()) {
                Some(&tag) if !self.options.forward_declarations && tag != "enum" => {
                    format!("{tag} {symbol}")
                }
                _ => symbol.to_string(),
            },
        }
    }
}

fn typedef(out: &mut impl Write, keyword: &str, name: &str) -> fmt::Result {
    writeln!(out, "typedef {keyword} {name} {name};")
}

#[cfg(test)]
mod tests {
    use super::*;
    use monogen_core::{
        Symbol, TypeExpr, TypeHash, Variant, mangle, mangle_enumerator, mangle_member,
    };

    fn node_int() -> Definition {
        let symbol = mangle("Node", &TypeExpr::named("int")).unwrap();
        let int = Symbol::concrete("int").unwrap();
        Instantiation {
            template: "Node".into(),
            argument: TypeExpr::named("int"),
            type_hash: TypeHash::from_name(symbol.as_str()),
            fields: vec![
                ResolvedField::new("data", ResolvedType::named(int)),
                ResolvedField::new(
                    "next",
                    ResolvedType::indirect(ResolvedType::named(symbol.clone())),
                ),
            ],
            symbol,
        }
        .into()
    }

    fn expr() -> Definition {
        let variant = |name: &str, discriminant: u32, fields: Vec<ResolvedField>| Variant {
            name: name.into(),
            discriminant,
            enumerator: mangle_enumerator("Expr", name).unwrap(),
            payload: mangle_member("Expr", name).unwrap(),
            fields,
        };
        let expr = Symbol::concrete("Expr").unwrap();
        let expr_ptr = ResolvedType::indirect(ResolvedType::named(expr.clone()));
        let group = ResolvedField::new("expr", expr_ptr);
        SumType::new(
            expr,
            mangle_member("Expr", "Kind").unwrap(),
            mangle_member("Expr", "Data").unwrap(),
            vec![
                variant("Null", 0, vec![]),
                variant("Group", 1, vec![group]),
            ],
        )
        .into()
    }

    #[test]
    fn emit_instantiation() {
        let source = emit_c(&[node_int()], &EmitOptions::default());
        assert_eq!(
            source,
            "typedef struct Node__int Node__int;\n\
             \n\
             struct Node__int {\n    int data;\n    Node__int* next;\n};\n"
        );
    }

    #[test]
    fn emit_sum_type() {
        let source = emit_c(&[expr()], &EmitOptions::default());
        let expected = "\
typedef struct Expr__Null Expr__Null;
typedef struct Expr__Group Expr__Group;
typedef union Expr__Data Expr__Data;
typedef struct Expr Expr;

struct Expr__Null {
    char _;
};

struct Expr__Group {
    Expr* expr;
};

typedef enum Expr__Kind {
    Expr__Kind__Null = 0,
    Expr__Kind__Group = 1,
} Expr__Kind;

union Expr__Data {
    Expr__Null _0;
    Expr__Group _1;
};

struct Expr {
    Expr__Kind kind;
    Expr__Data data;
};
";
        assert_eq!(source, expected);
    }

    #[test]
    fn emit_discriminant_table() {
        let options = EmitOptions::default().with_discriminant_table(true);
        let source = emit_c(&[expr()], &options);
        let table = "static unsigned const Expr__Kind__0values[] = {\n\
                     \x20   Expr__Kind__Null,\n\
                     \x20   Expr__Kind__Group,\n\
                     };\n";
        assert!(source.contains(table));
    }

    #[test]
    fn emit_without_forward_declarations() {
        let options = EmitOptions::default()
            .with_forward_declarations(false)
            .with_unit_placeholder(false)
            .with_indent_width(2);
        let source = emit_c(&[node_int(), expr()], &options);

        assert!(!source.contains("typedef struct Node__int Node__int;"));
        let node = "typedef struct Node__int {\n  int data;\n  struct Node__int* next;\n\
                    } Node__int;\n";
        assert!(source.starts_with(node));
        assert!(source.contains("typedef struct Expr__Null {\n} Expr__Null;\n"));
        assert!(source.contains("  union Expr__Data data;\n"));
        assert!(source.contains("  Expr__Kind kind;\n"));
    }

    #[test]
    fn write_errors_propagate() {
        struct Full;
        impl Write for Full {
            fn write_str(&mut self, _: &str) -> fmt::Result {
                Err(fmt::Error)
            }
        }

        let definitions = [node_int(), expr()];
        let options = EmitOptions::default();
        let emitter = CEmitter::new(&definitions, &options);
        let mut out = Full;
        assert!(write!(out, "{emitter}").is_err());
    }

    #[test]
    fn emit_nothing() {
        assert_eq!(emit_c(&[], &EmitOptions::default()), "");
    }
}
