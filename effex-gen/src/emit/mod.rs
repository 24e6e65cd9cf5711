//! Artifact emission
//!
//! The [`Emitter`] renders every artifact for every table in memory first,
//! rejects output path collisions, and only then touches the filesystem.
//! Per table it produces:
//! - Row validation schemas
//! - A CRUD service
//! - Domain type aliases (table DSL only)
//! - A form schema (table DSL only, when enabled)

mod render;
mod templates;

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

pub use render::{ArtifactRenderer, EffectRenderer, RenderOptions};

use crate::error::EmitError;
use crate::helpers::NameHelpers;
use crate::model::Table;
use crate::types::SourceDialect;

/// Kind of generated module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// `select`/`insert` row schemas
    Schema,
    /// `Context.Tag` CRUD service
    Service,
    /// Domain type aliases
    Types,
    /// Form input schema
    Form,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Schema => "schema",
            Self::Service => "service",
            Self::Types => "types",
            Self::Form => "form schema",
        })
    }
}

/// A rendered artifact waiting to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Destination path
    pub path: PathBuf,
    /// File content
    pub content: String,
    /// What the file holds
    pub kind: ArtifactKind,
    /// Model the file was generated for
    pub model: String,
}

impl GeneratedFile {
    /// One-line description for user feedback
    #[must_use]
    pub fn description(&self) -> String {
        let what = match self.kind {
            ArtifactKind::Schema => "Effect schemas",
            ArtifactKind::Service => "Effect service",
            ArtifactKind::Types => "Domain types",
            ArtifactKind::Form => "Form schema",
        };
        format!("{what} for {}", self.model)
    }
}

/// Where artifacts land
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    /// Root for schema, type and form modules
    pub schemas_dir: PathBuf,
    /// Directory for service modules
    pub services_dir: PathBuf,
}

impl OutputLayout {
    /// Layout with explicit directories
    #[must_use]
    pub fn new(schemas_dir: impl Into<PathBuf>, services_dir: impl Into<PathBuf>) -> Self {
        Self {
            schemas_dir: schemas_dir.into(),
            services_dir: services_dir.into(),
        }
    }

    /// Destination of one artifact for a model
    #[must_use]
    pub fn path_for(&self, kind: ArtifactKind, model: &str) -> PathBuf {
        let kebab = NameHelpers::to_kebab_case(model);
        match kind {
            ArtifactKind::Schema => self
                .schemas_dir
                .join("schemas")
                .join(format!("{kebab}-schemas.ts")),
            ArtifactKind::Types => self
                .schemas_dir
                .join("types")
                .join(format!("{kebab}-types.ts")),
            ArtifactKind::Form => self
                .schemas_dir
                .join("forms")
                .join(format!("{kebab}-form-schema.ts")),
            ArtifactKind::Service => self.services_dir.join(format!(
                "{}-service.ts",
                NameHelpers::to_service_stem(model)
            )),
        }
    }
}

/// Renders tables into artifacts and writes them out
pub struct Emitter<R = EffectRenderer> {
    renderer: R,
    options: RenderOptions,
    layout: OutputLayout,
    form_schemas: bool,
}

impl Emitter<EffectRenderer> {
    /// Emitter backed by the bundled Effect templates
    ///
    /// # Errors
    ///
    /// Returns [`EmitError::Template`] if a bundled template fails to compile.
    pub fn new(options: RenderOptions, layout: OutputLayout) -> Result<Self, EmitError> {
        Ok(Self::with_renderer(EffectRenderer::new()?, options, layout))
    }
}

impl<R: ArtifactRenderer> Emitter<R> {
    /// Emitter backed by a custom renderer
    #[must_use]
    pub const fn with_renderer(renderer: R, options: RenderOptions, layout: OutputLayout) -> Self {
        Self {
            renderer,
            options,
            layout,
            form_schemas: true,
        }
    }

    /// Enable or disable form schema output
    #[must_use]
    pub const fn with_form_schemas(mut self, enabled: bool) -> Self {
        self.form_schemas = enabled;
        self
    }

    /// Render every artifact for `tables` without writing anything
    ///
    /// Output order follows table order, then artifact kind.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A template fails to render
    /// - Two models map to the same output path
    pub fn generate(&self, tables: &[Table]) -> Result<Vec<GeneratedFile>, EmitError> {
        let mut files = Vec::new();
        for table in tables {
            files.push(self.generate_schema(table)?);
            files.push(self.generate_service(table)?);
            if table.dialect == SourceDialect::Drizzle {
                files.push(self.generate_types(table)?);
                if self.form_schemas && table.insert_columns().next().is_some() {
                    files.push(self.generate_form(table)?);
                }
            }
        }

        check_collisions(&files)?;
        Ok(files)
    }

    /// Render and write every artifact for `tables`
    ///
    /// Nothing is written if any artifact fails to render.
    ///
    /// # Errors
    ///
    /// Returns the first rendering, collision or I/O error.
    pub fn emit(&self, tables: &[Table]) -> Result<Vec<GeneratedFile>, EmitError> {
        let files = self.generate(tables)?;
        write_files(&files)?;
        tracing::info!(files = files.len(), tables = tables.len(), "emitted artifacts");
        Ok(files)
    }

    fn generate_schema(&self, table: &Table) -> Result<GeneratedFile, EmitError> {
        let content = self.renderer.render_schema(table, &self.options)?;
        Ok(self.file(ArtifactKind::Schema, table, content))
    }

    fn generate_service(&self, table: &Table) -> Result<GeneratedFile, EmitError> {
        let content = self.renderer.render_service(table, &self.options)?;
        Ok(self.file(ArtifactKind::Service, table, content))
    }

    fn generate_types(&self, table: &Table) -> Result<GeneratedFile, EmitError> {
        let content = self.renderer.render_types(table, &self.options)?;
        Ok(self.file(ArtifactKind::Types, table, content))
    }

    fn generate_form(&self, table: &Table) -> Result<GeneratedFile, EmitError> {
        let content = self.renderer.render_form(table, &self.options)?;
        Ok(self.file(ArtifactKind::Form, table, content))
    }

    fn file(&self, kind: ArtifactKind, table: &Table, content: String) -> GeneratedFile {
        let model = table.model_name();
        GeneratedFile {
            path: self.layout.path_for(kind, &model),
            content,
            kind,
            model,
        }
    }
}

/// Write rendered artifacts, creating parent directories
///
/// # Errors
///
/// Returns an error if a directory cannot be created or a file cannot be
/// written.
pub fn write_files(files: &[GeneratedFile]) -> Result<(), EmitError> {
    for file in files {
        if let Some(parent) = file.path.parent() {
            create_dir(parent)?;
        }
        fs::write(&file.path, &file.content).map_err(|source| EmitError::Write {
            path: file.path.clone(),
            source,
        })?;
        tracing::debug!(path = %file.path.display(), kind = %file.kind, "wrote artifact");
    }
    Ok(())
}

fn check_collisions(files: &[GeneratedFile]) -> Result<(), EmitError> {
    let mut claimed: HashMap<&Path, &str> = HashMap::new();
    for file in files {
        if let Some(first) = claimed.insert(file.path.as_path(), file.model.as_str()) {
            return Err(EmitError::NameCollision {
                path: file.path.clone(),
                first: first.to_string(),
                second: file.model.clone(),
            });
        }
    }
    Ok(())
}

fn create_dir(path: &Path) -> Result<(), EmitError> {
    fs::create_dir_all(path).map_err(|source| EmitError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Column;
    use tempfile::TempDir;

    fn table(name: &str, dialect: SourceDialect) -> Table {
        let mut table = Table::new(name, name, dialect);
        let mut id = Column::new("id", "serial");
        id.is_primary_key = true;
        id.has_default = true;
        let mut title = Column::new("title", "text");
        title.is_not_null = true;
        table.columns = vec![id, title];
        table
    }

    fn emitter(root: &Path) -> Emitter {
        Emitter::new(
            RenderOptions::default(),
            OutputLayout::new(root.join("generated"), root.join("services")),
        )
        .unwrap()
    }

    #[test]
    fn test_paths() {
        let layout = OutputLayout::new("out", "svc");
        assert_eq!(
            layout.path_for(ArtifactKind::Schema, "UserProfile"),
            PathBuf::from("out/schemas/user-profile-schemas.ts")
        );
        assert_eq!(
            layout.path_for(ArtifactKind::Form, "UserProfile"),
            PathBuf::from("out/forms/user-profile-form-schema.ts")
        );
        assert_eq!(
            layout.path_for(ArtifactKind::Service, "UserProfile"),
            PathBuf::from("svc/userprofile-service.ts")
        );
    }

    #[test]
    fn test_drizzle_artifact_set() {
        let temp = TempDir::new().unwrap();
        let files = emitter(temp.path())
            .generate(&[table("post", SourceDialect::Drizzle)])
            .unwrap();
        let kinds: Vec<_> = files.iter().map(|f| f.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ArtifactKind::Schema,
                ArtifactKind::Service,
                ArtifactKind::Types,
                ArtifactKind::Form
            ]
        );
    }

    #[test]
    fn test_prisma_artifact_set_and_disabled_forms() {
        let temp = TempDir::new().unwrap();
        let files = emitter(temp.path())
            .generate(&[table("Post", SourceDialect::Prisma)])
            .unwrap();
        assert_eq!(files.len(), 2);

        let files = emitter(temp.path())
            .with_form_schemas(false)
            .generate(&[table("post", SourceDialect::Drizzle)])
            .unwrap();
        assert!(files.iter().all(|f| f.kind != ArtifactKind::Form));
    }

    #[test]
    fn test_collision_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let tables = [
            table("user_profile", SourceDialect::Drizzle),
            table("userProfile", SourceDialect::Drizzle),
        ];
        let err = emitter(temp.path()).emit(&tables).unwrap_err();
        assert!(matches!(err, EmitError::NameCollision { .. }));
        assert!(!temp.path().join("generated").exists());
    }

    #[test]
    fn test_emit_writes_files() {
        let temp = TempDir::new().unwrap();
        let files = emitter(temp.path())
            .emit(&[table("post", SourceDialect::Drizzle)])
            .unwrap();
        for file in &files {
            assert_eq!(fs::read_to_string(&file.path).unwrap(), file.content);
        }
        assert!(temp.path().join("services/post-service.ts").exists());
        assert_eq!(files[1].description(), "Effect service for Post");
    }
}
