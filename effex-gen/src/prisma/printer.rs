//! Canonical text form of a schema syntax tree
//!
//! Field names, types and attributes are aligned in columns per model, and
//! assignment keys per datasource/generator. Declarations are separated by a
//! blank line; a comment line stays attached to the declaration after it.

use std::fmt::Write as _;

use super::ast::{
    Argument, Attribute, Block, ConfigBlock, ConfigItem, Enum, EnumItem, Field, FieldModifier,
    FieldType, Model, ModelItem, SchemaAst, Value,
};

/// Render a syntax tree as schema source
///
/// # Examples
///
/// ```
/// use effex_gen::prisma::{parse_schema, print_schema};
///
/// let ast = parse_schema("model User {\n id Int @id\n  emailAddress String?\n}").unwrap();
/// assert_eq!(
///     print_schema(&ast),
///     "model User {\n  id           Int     @id\n  emailAddress String?\n}\n"
/// );
/// ```
#[must_use]
pub fn print_schema(ast: &SchemaAst) -> String {
    let mut out = String::new();
    let mut previous: Option<&Block> = None;

    for block in &ast.list {
        if previous.is_some_and(|p| !matches!(p, Block::Comment(_))) {
            out.push('\n');
        }
        match block {
            Block::Model(model) => print_model(&mut out, "model", model),
            Block::CompositeType(model) => print_model(&mut out, "type", model),
            Block::View(model) => print_model(&mut out, "view", model),
            Block::Enum(e) => print_enum(&mut out, e),
            Block::Datasource(config) => print_config(&mut out, "datasource", config),
            Block::Generator(config) => print_config(&mut out, "generator", config),
            Block::Comment(text) => {
                out.push_str(text);
                out.push('\n');
            }
        }
        previous = Some(block);
    }

    out
}

fn print_model(out: &mut String, keyword: &str, model: &Model) {
    let name_width = model.fields().map(|f| f.name.len()).max().unwrap_or(0);
    let type_width = model.fields().map(|f| type_text(f).len()).max().unwrap_or(0);

    let _ = writeln!(out, "{keyword} {} {{", model.name);
    let mut after_field = false;
    for item in &model.properties {
        match item {
            ModelItem::Field(field) => {
                let mut line = format!(
                    "  {:name_width$} {:type_width$}",
                    field.name,
                    type_text(field)
                );
                for attr in &field.attributes {
                    line.push(' ');
                    line.push('@');
                    line.push_str(&attribute_text(attr));
                }
                push_line(out, line, field.comment.as_deref());
                after_field = true;
            }
            ModelItem::Attribute(attr) => {
                if after_field {
                    out.push('\n');
                }
                let _ = writeln!(out, "  @@{}", attribute_text(attr));
                after_field = false;
            }
            ModelItem::Comment(text) => {
                let _ = writeln!(out, "  {text}");
            }
        }
    }
    out.push_str("}\n");
}

fn print_enum(out: &mut String, e: &Enum) {
    let _ = writeln!(out, "enum {} {{", e.name);
    for item in &e.items {
        match item {
            EnumItem::Value(value) => {
                let mut line = format!("  {}", value.name);
                for attr in &value.attributes {
                    line.push_str(" @");
                    line.push_str(&attribute_text(attr));
                }
                push_line(out, line, value.comment.as_deref());
            }
            EnumItem::Attribute(attr) => {
                let _ = writeln!(out, "\n  @@{}", attribute_text(attr));
            }
            EnumItem::Comment(text) => {
                let _ = writeln!(out, "  {text}");
            }
        }
    }
    out.push_str("}\n");
}

fn print_config(out: &mut String, keyword: &str, config: &ConfigBlock) {
    let key_width = config
        .items
        .iter()
        .filter_map(|item| match item {
            ConfigItem::Assignment(a) => Some(a.key.len()),
            ConfigItem::Comment(_) => None,
        })
        .max()
        .unwrap_or(0);

    let _ = writeln!(out, "{keyword} {} {{", config.name);
    for item in &config.items {
        match item {
            ConfigItem::Assignment(a) => {
                let line = format!("  {:key_width$} = {}", a.key, value_text(&a.value));
                push_line(out, line, a.comment.as_deref());
            }
            ConfigItem::Comment(text) => {
                let _ = writeln!(out, "  {text}");
            }
        }
    }
    out.push_str("}\n");
}

fn push_line(out: &mut String, line: String, comment: Option<&str>) {
    let mut line = line.trim_end().to_string();
    if let Some(comment) = comment {
        line.push(' ');
        line.push_str(comment);
    }
    out.push_str(&line);
    out.push('\n');
}

fn type_text(field: &Field) -> String {
    let base = match &field.field_type {
        FieldType::Named(name) => name.clone(),
        FieldType::Unsupported(native) => format!("Unsupported({})", quote(native)),
    };
    match field.modifier {
        Some(FieldModifier::Optional) => format!("{base}?"),
        Some(FieldModifier::List) => format!("{base}[]"),
        None => base,
    }
}

fn attribute_text(attr: &Attribute) -> String {
    if attr.args.is_empty() {
        attr.name.clone()
    } else {
        format!("{}({})", attr.name, arguments_text(&attr.args))
    }
}

fn arguments_text(args: &[Argument]) -> String {
    args.iter()
        .map(|arg| match &arg.name {
            Some(name) => format!("{name}: {}", value_text(&arg.value)),
            None => value_text(&arg.value),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => quote(s),
        Value::Number(n) | Value::Ident(n) => n.clone(),
        Value::Boolean(b) => b.to_string(),
        Value::Array(items) => format!(
            "[{}]",
            items.iter().map(value_text).collect::<Vec<_>>().join(", ")
        ),
        Value::Function { name, args } => format!("{name}({})", arguments_text(args)),
    }
}

fn quote(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    for c in s.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            '\r' => quoted.push_str("\\r"),
            other => quoted.push(other),
        }
    }
    quoted.push('"');
    quoted
}
