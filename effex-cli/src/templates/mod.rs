//! Project template generation

use anyhow::{Context, Result};
use convert_case::{Case, Casing};
use handlebars::Handlebars;
use serde_json::json;
use std::fs;
use std::path::Path;

use crate::PackageManager;

pub mod files;
pub use files::PROJECT_FILES;

/// Monorepo skeleton renderer
pub struct ProjectTemplate {
    name: String,
    package_manager: PackageManager,
    handlebars: Handlebars<'static>,
}

impl ProjectTemplate {
    /// Create a new project template
    #[must_use]
    pub fn new(name: &str, package_manager: PackageManager) -> Self {
        let mut handlebars = Handlebars::new();

        // Generated sources are not HTML
        handlebars.register_escape_fn(handlebars::no_escape);

        Self {
            name: name.to_string(),
            package_manager,
            handlebars,
        }
    }

    /// Values substituted into every skeleton file
    #[must_use]
    pub fn context(&self) -> serde_json::Value {
        let pm = self.package_manager;
        json!({
            "project_name": self.name,
            "project_name_snake": self.name.to_case(Case::Snake),
            "package_manager": pm.to_string(),
            "package_manager_pinned": pm.pinned(),
            "executable": pm.executable(),
            "install": pm.install_command(),
            "run": pm.run_command(),
        })
    }

    /// Generate all project files under `output_dir`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Template rendering fails
    /// - File writing fails
    /// - Directory creation fails
    pub fn generate(&self, output_dir: &Path) -> Result<()> {
        let context = self.context();
        for (relative_path, template) in PROJECT_FILES {
            self.write_file(output_dir, relative_path, template, &context)?;
        }
        Ok(())
    }

    /// Write a single file from template
    fn write_file(
        &self,
        output_dir: &Path,
        relative_path: &str,
        template: &str,
        context: &serde_json::Value,
    ) -> Result<()> {
        let path = output_dir.join(relative_path);

        let rendered = self
            .handlebars
            .render_template(template, context)
            .with_context(|| format!("Failed to render template: {relative_path}"))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        fs::write(&path, rendered)
            .with_context(|| format!("Failed to write file: {}", path.display()))?;

        tracing::debug!(path = %path.display(), "wrote project file");
        Ok(())
    }
}
