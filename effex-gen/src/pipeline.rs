//! Generation runs: locate → read → parse → validate → emit
//!
//! Each run is one sequential pass over a single schema snapshot. All
//! artifacts are rendered before the first write, so a parse, validation or
//! render failure leaves the output directories untouched.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{GeneratorConfig, SourceSettings};
use crate::drizzle::{parse_dsl, validate_references, ParseMode, SkippedLine};
use crate::emit::{Emitter, GeneratedFile, OutputLayout, RenderOptions};
use crate::error::{EmitError, GenError};
use crate::prisma::{parse_schema, print_schema};
use crate::reader::read_schema;

/// Caller overrides for a generation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateRequest {
    /// Schema file; searched for when absent
    pub schema_path: Option<PathBuf>,
    /// Directory for schema, type and form modules
    pub output_dir: Option<PathBuf>,
    /// Directory for service modules
    pub services_dir: Option<PathBuf>,
}

/// Outcome of a generation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    /// Schema file that was read
    pub schema_path: PathBuf,
    /// Number of tables or models found
    pub table_count: usize,
    /// Files written, in emission order
    pub files: Vec<GeneratedFile>,
    /// Column entries the DSL parser skipped
    pub skipped: Vec<SkippedLine>,
}

/// Result of formatting a schema description file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOutcome {
    /// Schema file that was read
    pub schema_path: PathBuf,
    /// Canonical text
    pub formatted: String,
    /// Whether the canonical text differs from the file
    pub changed: bool,
}

/// Find the schema file for a run
///
/// An explicit path must exist. Otherwise the candidates are probed in order
/// and the first existing one wins. Relative paths resolve against `root`.
///
/// # Errors
///
/// Returns [`GenError::SchemaMissing`] for a missing explicit path and
/// [`GenError::SchemaNotFound`] when no candidate exists.
pub fn locate_schema(
    root: &Path,
    explicit: Option<&Path>,
    candidates: &[PathBuf],
) -> Result<PathBuf, GenError> {
    if let Some(path) = explicit {
        let path = resolve(root, path);
        if path.is_file() {
            return Ok(path);
        }
        return Err(GenError::SchemaMissing { path });
    }

    let searched: Vec<PathBuf> = candidates.iter().map(|c| resolve(root, c)).collect();
    if let Some(found) = searched.iter().find(|p| p.is_file()) {
        return Ok(found.clone());
    }
    Err(GenError::SchemaNotFound { searched })
}

/// Generate Effect schemas and services from a Drizzle table schema
///
/// An empty schema is not an error: the report carries zero tables and no
/// files.
///
/// # Errors
///
/// Returns an error if:
/// - The schema cannot be located or read
/// - Strict mode is on and a column entry cannot be parsed, or a foreign key
///   names an unknown table
/// - Rendering or writing an artifact fails
pub fn generate_drizzle(
    root: &Path,
    config: &GeneratorConfig,
    request: &GenerateRequest,
) -> Result<GenerationReport, GenError> {
    let span = tracing::info_span!("generate", source = "drizzle");
    let _guard = span.enter();

    let settings = &config.drizzle.source;
    let schema_path = locate_schema(root, request.schema_path.as_deref(), &settings.candidates)?;
    let source = read_schema(&schema_path)?;

    let mode = if config.strict {
        ParseMode::Strict
    } else {
        ParseMode::BestEffort
    };
    let parsed = parse_dsl(&source, mode)?;

    let mut report = GenerationReport {
        schema_path,
        table_count: parsed.tables.len(),
        files: Vec::new(),
        skipped: parsed.skipped,
    };
    if parsed.tables.is_empty() {
        tracing::warn!(path = %report.schema_path.display(), "no tables found in schema");
        return Ok(report);
    }

    if let Err(err) = validate_references(&parsed.tables) {
        if config.strict {
            return Err(err.into());
        }
        tracing::warn!(error = %err, "foreign key check failed");
    }

    let layout = resolve_layout(root, config, settings, &report.schema_path, request, false);
    report.files = emitter(config, layout)?.emit(&parsed.tables)?;
    Ok(report)
}

/// Generate Effect schemas and services from a schema description file
///
/// # Errors
///
/// Returns an error if:
/// - The schema cannot be located, read or parsed
/// - More than one datasource is declared
/// - Relation checking is enabled and a relation names an unknown model
/// - Rendering or writing an artifact fails
pub fn generate_prisma(
    root: &Path,
    config: &GeneratorConfig,
    request: &GenerateRequest,
) -> Result<GenerationReport, GenError> {
    let span = tracing::info_span!("generate", source = "prisma");
    let _guard = span.enter();

    let settings = &config.prisma.source;
    let schema_path = locate_schema(root, request.schema_path.as_deref(), &settings.candidates)?;
    let source = read_schema(&schema_path)?;
    let ast = parse_schema(&source)?;

    if let Some(datasource) = ast.datasource()? {
        tracing::debug!(name = %datasource.name, "found datasource");
    }
    if config.prisma.validate_relations {
        ast.validate_relations()?;
    }

    let tables = ast.to_tables();
    let mut report = GenerationReport {
        schema_path,
        table_count: tables.len(),
        files: Vec::new(),
        skipped: Vec::new(),
    };
    if tables.is_empty() {
        tracing::warn!(path = %report.schema_path.display(), "no models found in schema");
        return Ok(report);
    }

    let layout = resolve_layout(root, config, settings, &report.schema_path, request, true);
    report.files = emitter(config, layout)?.emit(&tables)?;
    Ok(report)
}

/// Canonical form of a schema description file, optionally written back
///
/// # Errors
///
/// Returns an error if the schema cannot be located, read or parsed, or if
/// writing it back fails.
pub fn format_schema(
    root: &Path,
    config: &GeneratorConfig,
    explicit: Option<&Path>,
    write: bool,
) -> Result<FormatOutcome, GenError> {
    let schema_path = locate_schema(root, explicit, &config.prisma.source.candidates)?;
    let source = read_schema(&schema_path)?;
    let formatted = print_schema(&parse_schema(&source)?);
    let changed = formatted != source;

    if write && changed {
        fs::write(&schema_path, &formatted).map_err(|source| EmitError::Write {
            path: schema_path.clone(),
            source,
        })?;
        tracing::info!(path = %schema_path.display(), "formatted schema");
    }

    Ok(FormatOutcome {
        schema_path,
        formatted,
        changed,
    })
}

fn emitter(config: &GeneratorConfig, layout: OutputLayout) -> Result<Emitter, EmitError> {
    Ok(Emitter::new(RenderOptions::from_config(config), layout)?
        .with_form_schemas(config.emit_form_schemas))
}

/// Output directories: explicit overrides, else the workspace or standalone
/// defaults depending on where the schema lives
///
/// With `services_follow_output`, an explicit output directory also moves
/// the services into its `services/` subdirectory.
fn resolve_layout(
    root: &Path,
    config: &GeneratorConfig,
    settings: &SourceSettings,
    schema_path: &Path,
    request: &GenerateRequest,
    services_follow_output: bool,
) -> OutputLayout {
    let workspace = config.is_workspace_schema(schema_path);
    let (default_output, default_services) = if workspace {
        (&settings.workspace_output_dir, &settings.workspace_services_dir)
    } else {
        (&settings.output_dir, &settings.services_dir)
    };

    let schemas_dir = resolve(root, request.output_dir.as_deref().unwrap_or(default_output));
    let services_dir = match (&request.services_dir, &request.output_dir) {
        (Some(dir), _) => resolve(root, dir),
        (None, Some(_)) if services_follow_output => schemas_dir.join("services"),
        _ => resolve(root, default_services),
    };

    tracing::debug!(
        workspace,
        schemas = %schemas_dir.display(),
        services = %services_dir.display(),
        "resolved output layout"
    );
    OutputLayout::new(schemas_dir, services_dir)
}

fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path.strip_prefix(".").unwrap_or(path))
    }
}
