//! Structured table/model representation shared by both parsers
//!
//! Built once per run from a single schema snapshot and never mutated after
//! parsing; the emitter only reads it.

use crate::helpers::NameHelpers;
use crate::types::{has_implicit_default, map_type, SourceDialect, TypeExpr};

/// Foreign key captured from a column definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    /// Referenced table binding
    pub table: String,
    /// Referenced column
    pub column: String,
}

/// One attribute of a model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Field name as written in the schema
    pub name: String,
    /// Source type name (`text`, `integer`, `String`, ...)
    pub column_type: String,
    /// Array column
    pub is_array: bool,
    /// Declared not-null (primary keys count as not-null)
    pub is_not_null: bool,
    /// Value supplied by the database when omitted
    pub has_default: bool,
    /// Part of the primary key
    pub is_primary_key: bool,
    /// Unique constraint
    pub is_unique: bool,
    /// Literal values when the column type is an enum
    pub variants: Option<Vec<String>>,
    /// Referenced table, when the column is a foreign key
    pub references: Option<ForeignKey>,
}

impl Column {
    /// Column with the given name and type and no flags set
    #[must_use]
    pub fn new(name: impl Into<String>, column_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_type: column_type.into(),
            is_array: false,
            is_not_null: false,
            has_default: false,
            is_primary_key: false,
            is_unique: false,
            variants: None,
            references: None,
        }
    }

    /// Whether stored rows may hold null in this column
    #[must_use]
    pub const fn is_nullable(&self) -> bool {
        !(self.is_not_null || self.is_primary_key)
    }

    /// Whether callers may omit the column on insert
    #[must_use]
    pub const fn is_insert_optional(&self) -> bool {
        self.is_nullable() || self.has_default
    }

    /// Whether the column is left out of the insert shape entirely
    #[must_use]
    pub const fn is_generated_key(&self) -> bool {
        self.is_primary_key && self.has_default
    }

    /// Validation type of the column, without optional wrapping
    #[must_use]
    pub fn base_type(&self, dialect: SourceDialect) -> TypeExpr {
        match &self.variants {
            Some(values) => {
                let literals = TypeExpr::Literals(values.clone());
                if self.is_array {
                    literals.array()
                } else {
                    literals
                }
            }
            None => map_type(dialect, &self.column_type, self.is_array),
        }
    }

    /// Element type, ignoring the array flag
    #[must_use]
    pub fn element_type(&self, dialect: SourceDialect) -> TypeExpr {
        match &self.variants {
            Some(values) => TypeExpr::Literals(values.clone()),
            None => map_type(dialect, &self.column_type, false),
        }
    }

    /// Field type in the select shape
    #[must_use]
    pub fn select_type(&self, dialect: SourceDialect) -> TypeExpr {
        wrap_select(self, self.base_type(dialect))
    }

    /// Field type in the insert shape
    #[must_use]
    pub fn insert_type(&self, dialect: SourceDialect) -> TypeExpr {
        wrap_insert(self, self.base_type(dialect))
    }

    /// Apply the select-shape wrapping rule to an arbitrary type
    #[must_use]
    pub fn wrap_select(&self, expr: TypeExpr) -> TypeExpr {
        wrap_select(self, expr)
    }

    /// Apply the insert-shape wrapping rule to an arbitrary type
    #[must_use]
    pub fn wrap_insert(&self, expr: TypeExpr) -> TypeExpr {
        wrap_insert(self, expr)
    }
}

fn wrap_select(column: &Column, expr: TypeExpr) -> TypeExpr {
    if column.is_nullable() {
        expr.optional(true)
    } else {
        expr
    }
}

fn wrap_insert(column: &Column, expr: TypeExpr) -> TypeExpr {
    if column.is_insert_optional() {
        expr.optional(column.is_nullable())
    } else {
        expr
    }
}

/// A named collection of columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    /// Source identity: the exported binding (DSL) or the model name (AST)
    pub name: String,
    /// Storage table name
    pub table_name: String,
    /// Which parser produced the table
    pub dialect: SourceDialect,
    /// Columns in source order
    pub columns: Vec<Column>,
}

impl Table {
    /// Create an empty table
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        table_name: impl Into<String>,
        dialect: SourceDialect,
    ) -> Self {
        Self {
            name: name.into(),
            table_name: table_name.into(),
            dialect,
            columns: Vec::new(),
        }
    }

    /// Generated identifier stem (`user` → `User`)
    #[must_use]
    pub fn model_name(&self) -> String {
        NameHelpers::to_pascal_case(&self.name)
    }

    /// Column the generated service is keyed by
    ///
    /// The first primary key column, else a column literally named `id`.
    #[must_use]
    pub fn primary_key(&self) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.is_primary_key)
            .or_else(|| self.columns.iter().find(|c| c.name == "id"))
    }

    /// Name used for the primary key in generated lookups
    #[must_use]
    pub fn primary_key_name(&self) -> &str {
        self.primary_key().map_or("id", |c| c.name.as_str())
    }

    /// Columns present in the insert shape
    pub fn insert_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| !c.is_generated_key())
    }

    /// Whether any column is an array
    #[must_use]
    pub fn has_array_columns(&self) -> bool {
        self.columns.iter().any(|c| c.is_array)
    }

    /// Whether any column carries a unique constraint
    #[must_use]
    pub fn has_unique_columns(&self) -> bool {
        self.columns.iter().any(|c| c.is_unique)
    }

    /// Mark serial-family columns as defaulted
    pub(crate) fn apply_implicit_defaults(&mut self) {
        let dialect = self.dialect;
        for column in &mut self.columns {
            if has_implicit_default(dialect, &column.column_type) {
                column.has_default = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str, ty: &str) -> Column {
        Column::new(name, ty)
    }

    #[test]
    fn test_nullable_rules() {
        let mut col = column("bio", "text");
        assert!(col.is_nullable());
        assert!(col.is_insert_optional());

        col.is_not_null = true;
        assert!(!col.is_nullable());
        assert!(!col.is_insert_optional());

        col.has_default = true;
        assert!(col.is_insert_optional());
    }

    #[test]
    fn test_primary_key_is_not_nullable() {
        let mut col = column("id", "text");
        col.is_primary_key = true;
        assert!(!col.is_nullable());
        assert!(!col.is_generated_key());

        col.has_default = true;
        assert!(col.is_generated_key());
    }

    #[test]
    fn test_select_and_insert_types() {
        let mut col = column("tags", "text");
        col.is_array = true;
        col.has_default = true;
        col.is_not_null = true;

        assert_eq!(
            col.select_type(SourceDialect::Drizzle),
            TypeExpr::String.array()
        );
        assert_eq!(
            col.insert_type(SourceDialect::Drizzle),
            TypeExpr::String.array().optional(false)
        );
    }

    #[test]
    fn test_enum_variants_become_literals() {
        let mut col = column("role", "Role");
        col.variants = Some(vec!["ADMIN".to_string(), "USER".to_string()]);
        col.is_not_null = true;
        assert_eq!(
            col.select_type(SourceDialect::Prisma),
            TypeExpr::Literals(vec!["ADMIN".to_string(), "USER".to_string()])
        );
    }

    #[test]
    fn test_primary_key_fallback() {
        let mut table = Table::new("session", "session", SourceDialect::Drizzle);
        table.columns.push(column("token", "text"));
        table.columns.push(column("id", "text"));
        assert_eq!(table.primary_key_name(), "id");

        table.columns[0].is_primary_key = true;
        assert_eq!(table.primary_key_name(), "token");
    }

    #[test]
    fn test_primary_key_missing_defaults_to_id() {
        let mut table = Table::new("log", "log", SourceDialect::Drizzle);
        table.columns.push(column("message", "text"));
        assert!(table.primary_key().is_none());
        assert_eq!(table.primary_key_name(), "id");
    }

    #[test]
    fn test_insert_columns_skip_generated_keys() {
        let mut table = Table::new("user", "user", SourceDialect::Drizzle);
        let mut id = column("id", "serial");
        id.is_primary_key = true;
        table.columns.push(id);
        table.columns.push(column("email", "text"));
        table.apply_implicit_defaults();

        let names: Vec<_> = table.insert_columns().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["email"]);
    }

    #[test]
    fn test_model_name() {
        assert_eq!(Table::new("user", "user", SourceDialect::Drizzle).model_name(), "User");
        assert_eq!(
            Table::new("userProfile", "user_profile", SourceDialect::Drizzle).model_name(),
            "UserProfile"
        );
    }
}
