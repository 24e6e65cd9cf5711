//! Drizzle `pgTable` declaration parser
//!
//! Reads declarations of the form
//!
//! ```text
//! export const user = pgTable("user", (t) => ({
//!   id: t.text().primaryKey(),
//!   email: t.text().notNull().unique(),
//! }))
//! ```
//!
//! The table header is located with a pattern and the column object is
//! delimited by brace matching, so modifier arguments containing braces or
//! commas (`.references(() => user.id, { onDelete: "cascade" })`) stay inside
//! their column. Column entries are split on top-level commas, which also
//! joins modifier chains continued on following lines.
//!
//! Entries that do not look like `<field>: <param>.<builder>(...)<modifiers>`
//! are skipped in [`ParseMode::BestEffort`] and reported in
//! [`DslSchema::skipped`]; [`ParseMode::Strict`] rejects them.

mod scan;

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{AstError, ParseError};
use crate::model::{Column, ForeignKey, Table};
use crate::types::SourceDialect;

use scan::{find_closing, line_col, split_entries};

static TABLE_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"export\s+const\s+(\w+)\s*(?::[^=]+)?=\s*pgTable\s*\(\s*["'`]([^"'`]+)["'`]\s*,\s*(?:\(\s*(\w+)\s*\)|(\w+))\s*=>\s*\(\s*\{"#,
    )
    .expect("Invalid regex")
});

static COLUMN_HEAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^["']?(\w+)["']?\s*:\s*(\w+)\s*\.\s*(\w+)\s*\("#).expect("Invalid regex")
});

static REFERENCES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\.references\(\s*\(\s*\)\s*(?::\s*[\w.]+\s*)?=>\s*(\w+)\s*\.\s*(\w+)")
        .expect("Invalid regex")
});

const DEFAULT_MARKERS: [&str; 7] = [
    ".default(",
    ".defaultNow(",
    ".defaultRandom(",
    ".$default(",
    ".$defaultFn(",
    ".generatedAlwaysAsIdentity(",
    ".generatedByDefaultAsIdentity(",
];

/// How to treat column entries the parser does not recognise
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParseMode {
    /// Skip them and report each in [`DslSchema::skipped`]
    #[default]
    BestEffort,
    /// Fail on the first one
    Strict,
}

/// A column entry that was not turned into a column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// Binding of the table the entry belongs to
    pub table: String,
    /// 1-based line the entry starts on
    pub line: usize,
    /// Entry text, whitespace-collapsed
    pub text: String,
}

/// Result of parsing a DSL schema
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DslSchema {
    /// Tables in declaration order
    pub tables: Vec<Table>,
    /// Entries skipped in best-effort mode
    pub skipped: Vec<SkippedLine>,
}

/// Parse Drizzle table declarations
///
/// # Errors
///
/// In [`ParseMode::Strict`], returns a [`ParseError`] for the first
/// unrecognised column entry or unterminated column object. Best-effort mode
/// never fails.
///
/// # Examples
///
/// ```
/// use effex_gen::drizzle::{parse_dsl, ParseMode};
///
/// let source = r#"
/// export const post = pgTable("post", (t) => ({
///   id: t.serial().primaryKey(),
///   title: t.varchar({ length: 255 }).notNull(),
/// }))
/// "#;
///
/// let schema = parse_dsl(source, ParseMode::Strict).unwrap();
/// assert_eq!(schema.tables.len(), 1);
/// assert_eq!(schema.tables[0].columns[1].column_type, "varchar");
/// ```
pub fn parse_dsl(source: &str, mode: ParseMode) -> Result<DslSchema, ParseError> {
    let mut schema = DslSchema::default();
    let mut resume_at = 0;

    for caps in TABLE_HEADER.captures_iter(source) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() < resume_at {
            continue;
        }

        let binding = &caps[1];
        let table_name = &caps[2];
        let param = caps
            .get(3)
            .or_else(|| caps.get(4))
            .map_or("t", |m| m.as_str());

        // the header pattern ends on the opening brace
        let open = whole.end() - 1;
        let Some(close) = find_closing(source, open) else {
            let (line, column) = line_col(source, whole.start());
            if mode == ParseMode::Strict {
                return Err(ParseError::at(
                    format!("Unterminated column object for table '{binding}'"),
                    line,
                    column,
                ));
            }
            tracing::warn!(table = binding, line, "unterminated column object, table skipped");
            schema.skipped.push(SkippedLine {
                table: binding.to_string(),
                line,
                text: collapse(whole.as_str()),
            });
            continue;
        };
        resume_at = close;

        let mut table = Table::new(binding, table_name, SourceDialect::Drizzle);

        for entry in split_entries(source, open + 1, close) {
            if let Some(column) = parse_column(&entry.text, param) {
                table.columns.push(column);
                continue;
            }

            let text = collapse(&entry.text);
            if mode == ParseMode::Strict {
                return Err(ParseError::at(
                    format!("Unrecognised column definition in table '{binding}': {text}"),
                    entry.line,
                    entry.column,
                ));
            }
            tracing::warn!(table = binding, line = entry.line, text = %text, "skipping column line");
            schema.skipped.push(SkippedLine {
                table: binding.to_string(),
                line: entry.line,
                text,
            });
        }

        table.apply_implicit_defaults();
        tracing::debug!(
            table = %table.name,
            columns = table.columns.len(),
            "parsed table"
        );
        schema.tables.push(table);
    }

    Ok(schema)
}

fn parse_column(entry: &str, param: &str) -> Option<Column> {
    let caps = COLUMN_HEAD.captures(entry)?;
    if &caps[2] != param {
        return None;
    }

    let head = caps.get(0)?;
    let args_close = find_closing(entry, head.end() - 1)?;
    let modifiers = &entry[args_close + 1..];

    let mut column = Column::new(&caps[1], &caps[3]);
    column.is_primary_key = modifiers.contains(".primaryKey(");
    column.is_not_null = modifiers.contains(".notNull(");
    column.is_unique = modifiers.contains(".unique(");
    column.is_array = modifiers.contains(".array(");
    column.has_default = DEFAULT_MARKERS.iter().any(|m| modifiers.contains(m));
    column.references = REFERENCES.captures(modifiers).map(|r| ForeignKey {
        table: r[1].to_string(),
        column: r[2].to_string(),
    });

    Some(column)
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Check that every foreign key names a declared table binding
///
/// # Errors
///
/// Returns [`AstError::RelationValidation`] listing every dangling
/// reference, in declaration order.
pub fn validate_references(tables: &[Table]) -> Result<(), AstError> {
    let declared: HashSet<&str> = tables.iter().map(|t| t.name.as_str()).collect();

    let violations: Vec<String> = tables
        .iter()
        .flat_map(|table| {
            table.columns.iter().filter_map(|column| {
                let fk = column.references.as_ref()?;
                (!declared.contains(fk.table.as_str())).then(|| {
                    format!(
                        "{}: field {} references unknown model {}",
                        table.name, column.name, fk.table
                    )
                })
            })
        })
        .collect();

    if violations.is_empty() {
        Ok(())
    } else {
        Err(AstError::RelationValidation(violations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const TWO_TABLES: &str = r#"
import { pgTable } from "drizzle-orm/pg-core"

export const user = pgTable("user", (t) => ({
  id: t.text().primaryKey(),
  email: t.text().notNull().unique(),
}))

export const post = pgTable("post", (t) => ({
  id: t.text().primaryKey(),
  authorId: t.text().notNull(),
}))
"#;

    #[test]
    fn test_two_tables_in_order() {
        let schema = parse_dsl(TWO_TABLES, ParseMode::Strict).unwrap();
        assert_eq!(schema.tables.len(), 2);
        assert!(schema.skipped.is_empty());

        let user = &schema.tables[0];
        assert_eq!(user.name, "user");
        assert_eq!(user.table_name, "user");
        assert_eq!(user.columns.len(), 2);
        assert!(user.columns[0].is_primary_key);
        assert!(!user.columns[0].has_default);
        assert!(user.columns[1].is_not_null);
        assert!(user.columns[1].is_unique);

        let post = &schema.tables[1];
        assert_eq!(post.name, "post");
        assert_eq!(post.columns[1].name, "authorId");
    }

    #[test]
    fn test_modifier_flags() {
        let source = r#"
export const account = pgTable("account", (t) => ({
  id: t.uuid().defaultRandom().primaryKey(),
  tags: t.text().array().notNull().default([]),
  createdAt: t.timestamp({ mode: "date" }).defaultNow().notNull(),
  slug: t.varchar({ length: 64 }).$defaultFn(() => crypto.randomUUID()),
  seq: t.integer().generatedAlwaysAsIdentity(),
  bio: t.text(),
}))
"#;
        let schema = parse_dsl(source, ParseMode::Strict).unwrap();
        let cols = &schema.tables[0].columns;
        assert_eq!(cols.len(), 6);

        assert!(cols[0].is_primary_key && cols[0].has_default);
        assert!(cols[1].is_array && cols[1].has_default && cols[1].is_not_null);
        assert_eq!(cols[2].column_type, "timestamp");
        assert!(cols[2].has_default);
        assert!(cols[3].has_default);
        assert!(cols[4].has_default);
        assert!(!cols[5].has_default && !cols[5].is_not_null);
    }

    #[test]
    fn test_serial_has_implicit_default() {
        let source = r#"export const counter = pgTable("counter", (t) => ({
  id: t.serial().primaryKey(),
}))"#;
        let schema = parse_dsl(source, ParseMode::Strict).unwrap();
        assert!(schema.tables[0].columns[0].has_default);
    }

    #[test]
    fn test_braces_inside_modifiers_do_not_truncate_block() {
        let source = r#"
export const post = pgTable("post", (t) => ({
  id: t.text().primaryKey(),
  authorId: t
    .text()
    .notNull()
    .references(() => user.id, { onDelete: "cascade" }),
  title: t.text().notNull(),
}), (table) => [index("post_author_idx").on(table.authorId)])
"#;
        let schema = parse_dsl(source, ParseMode::BestEffort).unwrap();
        let cols = &schema.tables[0].columns;
        assert_eq!(
            cols.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
            vec!["id", "authorId", "title"]
        );
        assert_eq!(
            cols[1].references,
            Some(ForeignKey {
                table: "user".to_string(),
                column: "id".to_string()
            })
        );
        assert!(cols[1].is_not_null);
    }

    #[test]
    fn test_comments_are_ignored() {
        let source = r#"
export const note = pgTable("note", (t) => ({
  // primary key
  id: t.text().primaryKey(),
  /* free text, may be empty */
  body: t.text(), // trailing comment
}))
"#;
        let schema = parse_dsl(source, ParseMode::Strict).unwrap();
        assert_eq!(schema.tables[0].columns.len(), 2);
    }

    #[test]
    fn test_malformed_line_is_skipped_in_best_effort() {
        let source = r#"
export const user = pgTable("user", (t) => ({
  id: t.text().primaryKey(),
  ...timestamps,
  email: t.text().notNull(),
}))
"#;
        let schema = parse_dsl(source, ParseMode::BestEffort).unwrap();
        // the model is silently incomplete: only two of three entries survive
        assert_eq!(schema.tables[0].columns.len(), 2);
        assert_eq!(
            schema.skipped,
            vec![SkippedLine {
                table: "user".to_string(),
                line: 4,
                text: "...timestamps".to_string(),
            }]
        );
    }

    #[test]
    fn test_malformed_line_fails_in_strict_mode() {
        let source = r#"
export const user = pgTable("user", (t) => ({
  id: t.text().primaryKey(),
  ...timestamps,
}))
"#;
        let err = parse_dsl(source, ParseMode::Strict).unwrap_err();
        assert_eq!(err.position.map(|p| p.line), Some(4));
        assert!(err.message.contains("...timestamps"));
    }

    #[test]
    fn test_unterminated_table() {
        let source = "export const user = pgTable(\"user\", (t) => ({\n  id: t.text(),\n";

        let best = parse_dsl(source, ParseMode::BestEffort).unwrap();
        assert!(best.tables.is_empty());
        assert_eq!(best.skipped.len(), 1);

        assert!(parse_dsl(source, ParseMode::Strict).is_err());
    }

    #[test]
    fn test_other_receivers_are_not_columns() {
        let source = r#"
export const item = pgTable("item", (c) => ({
  id: c.text().primaryKey(),
  other: t.text(),
}))
"#;
        let schema = parse_dsl(source, ParseMode::BestEffort).unwrap();
        assert_eq!(schema.tables[0].columns.len(), 1);
        assert_eq!(schema.skipped.len(), 1);
    }

    #[test]
    fn test_empty_source() {
        let schema = parse_dsl("", ParseMode::Strict).unwrap();
        assert!(schema.tables.is_empty());
    }

    #[test]
    fn test_validate_references() {
        let source = r#"
export const user = pgTable("user", (t) => ({
  id: t.text().primaryKey(),
}))
export const post = pgTable("post", (t) => ({
  id: t.text().primaryKey(),
  authorId: t.text().references(() => user.id),
  editorId: t.text().references(() => usr.id),
}))
"#;
        let schema = parse_dsl(source, ParseMode::Strict).unwrap();
        let err = validate_references(&schema.tables).unwrap_err();
        assert_eq!(
            err,
            AstError::RelationValidation(vec![
                "post: field editorId references unknown model usr".to_string()
            ])
        );

        assert!(validate_references(&schema.tables[..1]).is_ok());
    }

    fn render_table(index: usize, columns: &[String]) -> String {
        let body: String = columns
            .iter()
            .map(|c| format!("  {c}: t.text().notNull(),\n"))
            .collect();
        format!("export const table{index} = pgTable(\"table_{index}\", (t) => ({{\n{body}}}))\n\n")
    }

    proptest! {
        #[test]
        fn prop_n_declarations_yield_n_tables(
            tables in prop::collection::vec(
                prop::collection::vec("[a-z][a-zA-Z0-9]{0,10}", 0..6),
                0..6,
            )
        ) {
            let source: String = tables
                .iter()
                .enumerate()
                .map(|(i, cols)| render_table(i, cols))
                .collect();

            let schema = parse_dsl(&source, ParseMode::Strict).unwrap();
            prop_assert_eq!(schema.tables.len(), tables.len());
            for (parsed, expected) in schema.tables.iter().zip(&tables) {
                let names: Vec<_> = parsed.columns.iter().map(|c| c.name.clone()).collect();
                prop_assert_eq!(&names, expected);
            }
        }
    }
}
