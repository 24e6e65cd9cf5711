//! Effect-TS rendering of tables
//!
//! [`ArtifactRenderer`] is the seam between table semantics and target text;
//! [`EffectRenderer`] fills the bundled handlebars templates.

use handlebars::Handlebars;
use serde_json::{json, Value as Json};

use super::templates::{
    drizzle_service_template, prisma_service_template, FORM_TEMPLATE, SCHEMA_TEMPLATE,
    TYPES_TEMPLATE,
};
use crate::config::GeneratorConfig;
use crate::error::EmitError;
use crate::helpers::NameHelpers;
use crate::model::{Column, Table};
use crate::types::{SourceDialect, TypeExpr};

const SCHEMA: &str = "schema";
const DRIZZLE_SERVICE: &str = "drizzle_service";
const PRISMA_SERVICE: &str = "prisma_service";
const TYPES: &str = "types";
const FORM: &str = "form";

/// Module paths the generated code imports from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Prefix for generated schema modules (`<base>/schemas/<model>-schemas`)
    pub import_base: String,
    /// Module exporting the table bindings
    pub table_import: String,
    /// Module exporting the `PrismaDatabase` client tag
    pub prisma_client_import: String,
}

impl RenderOptions {
    /// Take import paths from a loaded configuration
    #[must_use]
    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self {
            import_base: config.import_base.trim_end_matches('/').to_string(),
            table_import: config.table_import.clone(),
            prisma_client_import: config.prisma_client_import.clone(),
        }
    }

    fn schema_module(&self, table: &Table) -> String {
        format!(
            "{}/schemas/{}-schemas",
            self.import_base,
            NameHelpers::to_kebab_case(&table.model_name())
        )
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from_config(&GeneratorConfig::default())
    }
}

/// Turns one table into the text of each artifact kind
pub trait ArtifactRenderer {
    /// Select and insert validation schemas
    ///
    /// # Errors
    ///
    /// Returns [`EmitError::Render`] if rendering fails.
    fn render_schema(&self, table: &Table, options: &RenderOptions) -> Result<String, EmitError>;

    /// CRUD service module
    ///
    /// # Errors
    ///
    /// Returns [`EmitError::Render`] if rendering fails.
    fn render_service(&self, table: &Table, options: &RenderOptions) -> Result<String, EmitError>;

    /// Domain type aliases
    ///
    /// # Errors
    ///
    /// Returns [`EmitError::Render`] if rendering fails.
    fn render_types(&self, table: &Table, options: &RenderOptions) -> Result<String, EmitError>;

    /// Form validation schema
    ///
    /// # Errors
    ///
    /// Returns [`EmitError::Render`] if rendering fails.
    fn render_form(&self, table: &Table, options: &RenderOptions) -> Result<String, EmitError>;
}

/// Renders Effect `Schema` modules and `Context.Tag` services
pub struct EffectRenderer {
    handlebars: Handlebars<'static>,
}

impl std::fmt::Debug for EffectRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectRenderer").finish_non_exhaustive()
    }
}

impl EffectRenderer {
    /// Compile the bundled templates
    ///
    /// # Errors
    ///
    /// Returns [`EmitError::Template`] if a template fails to compile.
    pub fn new() -> Result<Self, EmitError> {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(handlebars::no_escape);

        let templates = [
            (SCHEMA, SCHEMA_TEMPLATE.to_string()),
            (DRIZZLE_SERVICE, drizzle_service_template()),
            (PRISMA_SERVICE, prisma_service_template()),
            (TYPES, TYPES_TEMPLATE.to_string()),
            (FORM, FORM_TEMPLATE.to_string()),
        ];
        for (name, source) in templates {
            handlebars
                .register_template_string(name, source)
                .map_err(|e| EmitError::Template {
                    name,
                    source: Box::new(e),
                })?;
        }

        Ok(Self { handlebars })
    }

    fn render(
        &self,
        template: &'static str,
        artifact: &'static str,
        table: &Table,
        data: &Json,
    ) -> Result<String, EmitError> {
        self.handlebars
            .render(template, data)
            .map_err(|e| EmitError::Render {
                artifact,
                model: table.model_name(),
                source: Box::new(e),
            })
    }
}

impl ArtifactRenderer for EffectRenderer {
    fn render_schema(&self, table: &Table, options: &RenderOptions) -> Result<String, EmitError> {
        let dialect = table.dialect;
        // The DSL shape generator cannot express arrays, so array columns are
        // typed by element first and overridden afterwards.
        let array_override = dialect == SourceDialect::Drizzle && table.has_array_columns();

        let (select_fields, insert_fields) = if array_override {
            (
                fields(table.columns.iter(), |c| c.wrap_select(c.element_type(dialect))),
                fields(table.insert_columns(), |c| {
                    c.wrap_insert(c.element_type(dialect))
                }),
            )
        } else {
            (
                fields(table.columns.iter(), |c| c.select_type(dialect)),
                fields(table.insert_columns(), |c| c.insert_type(dialect)),
            )
        };

        let arrays = || table.columns.iter().filter(|c| c.is_array);
        let data = json!({
            "model": table.model_name(),
            "array_override": array_override,
            "select_fields": select_fields,
            "insert_fields": insert_fields,
            "select_array_fields": fields(arrays(), |c| c.select_type(dialect)),
            "insert_array_fields": fields(
                arrays().filter(|c| !c.is_generated_key()),
                |c| c.insert_type(dialect),
            ),
            "schema_module": options.schema_module(table),
        });

        self.render(SCHEMA, "schema", table, &data)
    }

    fn render_service(&self, table: &Table, options: &RenderOptions) -> Result<String, EmitError> {
        let template = match table.dialect {
            SourceDialect::Drizzle => DRIZZLE_SERVICE,
            SourceDialect::Prisma => PRISMA_SERVICE,
        };
        self.render(template, "service", table, &service_context(table, options))
    }

    fn render_types(&self, table: &Table, options: &RenderOptions) -> Result<String, EmitError> {
        let (id_type, _) = id_types(table);
        let data = json!({
            "model": table.model_name(),
            "schema_module": options.schema_module(table),
            "id_type": id_type,
        });
        self.render(TYPES, "types", table, &data)
    }

    fn render_form(&self, table: &Table, _options: &RenderOptions) -> Result<String, EmitError> {
        let dialect = table.dialect;
        let model = table.model_name();
        let form_fields = fields_with(table.insert_columns(), |c| form_type(c, dialect), form_code);

        let data = json!({
            "model": model,
            "camel": NameHelpers::to_camel_case(&model),
            "form_fields": form_fields,
        });
        self.render(FORM, "form", table, &data)
    }
}

fn service_context(table: &Table, options: &RenderOptions) -> Json {
    let model = table.model_name();
    let (id_type, id_schema) = id_types(table);
    let unique_violation_code = match table.dialect {
        SourceDialect::Drizzle => "23505",
        SourceDialect::Prisma => "P2002",
    };

    json!({
        "model": model,
        "collection": NameHelpers::to_collection_name(&model),
        "binding": table.name,
        "table_name": table.table_name,
        "delegate": NameHelpers::to_delegate_name(&table.name),
        "pk": table.primary_key_name(),
        "id_type": id_type,
        "id_schema": id_schema,
        "has_unique": table.has_unique_columns(),
        "unique_violation_code": unique_violation_code,
        "schema_module": options.schema_module(table),
        "table_import": options.table_import,
        "prisma_client_import": options.prisma_client_import,
    })
}

/// TypeScript type and schema of the key column
fn id_types(table: &Table) -> (&'static str, &'static str) {
    let key = table
        .primary_key()
        .map(|c| c.element_type(table.dialect));
    match key {
        Some(TypeExpr::Number) => ("number", "Schema.Number"),
        Some(TypeExpr::BigInt) => ("bigint", "Schema.BigIntFromSelf"),
        _ => ("string", "Schema.String"),
    }
}

fn fields<'a>(
    columns: impl Iterator<Item = &'a Column>,
    ty: impl Fn(&Column) -> TypeExpr,
) -> Vec<Json> {
    fields_with(columns, ty, row_code)
}

fn fields_with<'a>(
    columns: impl Iterator<Item = &'a Column>,
    ty: impl Fn(&Column) -> TypeExpr,
    code: fn(&TypeExpr) -> String,
) -> Vec<Json> {
    columns
        .map(|column| {
            let expr = ty(column);
            if expr.required().is_unknown() {
                tracing::warn!(
                    column = %column.name,
                    source_type = %column.column_type,
                    "unrecognised column type, emitting Schema.Unknown"
                );
            }
            json!({ "name": column.name, "expr": code(&expr) })
        })
        .collect()
}

fn form_type(column: &Column, dialect: SourceDialect) -> TypeExpr {
    let expr = column.base_type(dialect);
    if column.is_insert_optional() {
        expr.optional(false)
    } else {
        expr
    }
}

/// Schema expression for decoded rows: values arrive already typed
fn row_code(expr: &TypeExpr) -> String {
    schema_code(expr, &scalar_code)
}

/// Schema expression for form input: values arrive as strings
fn form_code(expr: &TypeExpr) -> String {
    schema_code(expr, &|leaf| match leaf {
        TypeExpr::Number => "Schema.NumberFromString",
        TypeExpr::BigInt => "Schema.BigInt",
        TypeExpr::Boolean => "Schema.BooleanFromString",
        TypeExpr::Date => "Schema.Date",
        TypeExpr::Bytes => "Schema.Uint8ArrayFromBase64",
        other => scalar_code(other),
    })
}

const fn scalar_code(expr: &TypeExpr) -> &'static str {
    match expr {
        TypeExpr::String => "Schema.String",
        TypeExpr::Number => "Schema.Number",
        TypeExpr::BigInt => "Schema.BigIntFromSelf",
        TypeExpr::Boolean => "Schema.Boolean",
        TypeExpr::Date => "Schema.DateFromSelf",
        TypeExpr::Bytes => "Schema.Uint8ArrayFromSelf",
        _ => "Schema.Unknown",
    }
}

fn schema_code(expr: &TypeExpr, leaf: &dyn Fn(&TypeExpr) -> &'static str) -> String {
    match expr {
        TypeExpr::Literals(values) => {
            let quoted: Vec<String> = values.iter().map(|v| format!("'{v}'")).collect();
            format!("Schema.Literal({})", quoted.join(", "))
        }
        TypeExpr::Array(inner) => format!("Schema.Array({})", schema_code(inner, leaf)),
        TypeExpr::Optional {
            inner,
            nullable: true,
        } => format!("Schema.optional(Schema.NullOr({}))", schema_code(inner, leaf)),
        TypeExpr::Optional {
            inner,
            nullable: false,
        } => format!("Schema.optional({})", schema_code(inner, leaf)),
        scalar => leaf(scalar).to_string(),
    }
}
