//! Generator configuration
//!
//! Settings are layered with clear precedence:
//!
//! 1. Environment variables (highest priority, `EFFEX_` prefix, `__` for nesting)
//! 2. `<project root>/effex.toml`
//! 3. Hardcoded defaults (fallback)
//!
//! Command-line flags are applied on top by the caller.
//!
//! Environment variable format: `EFFEX_SECTION__FIELD_NAME`
//! - Use `__` (double underscore) to separate nested sections
//! - Use `_` (single underscore) within field names
//! - Example: `EFFEX_DRIZZLE__SERVICES_DIR=./apps/api/src/services`
//!
//! # Example Configuration
//!
//! ```toml
//! # effex.toml
//! import_base = "@acme/db/effect"
//! emit_form_schemas = false
//!
//! [drizzle]
//! candidates = ["./db/schema.ts"]
//! output_dir = "./db/generated"
//!
//! [prisma]
//! validate_relations = true
//! ```

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File name looked up in the project root
pub const CONFIG_FILE: &str = "effex.toml";

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "EFFEX_";

/// Locations and output directories for one schema source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSettings {
    /// Conventional schema locations, probed in order
    pub candidates: Vec<PathBuf>,

    /// Schema output directory when the schema lives in the workspace package
    pub workspace_output_dir: PathBuf,

    /// Schema output directory otherwise
    pub output_dir: PathBuf,

    /// Service output directory when the schema lives in the workspace package
    pub workspace_services_dir: PathBuf,

    /// Service output directory otherwise
    pub services_dir: PathBuf,
}

/// Drizzle table DSL settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrizzleSettings {
    /// Paths and output directories
    #[serde(flatten)]
    pub source: SourceSettings,
}

impl Default for DrizzleSettings {
    fn default() -> Self {
        Self {
            source: SourceSettings {
                candidates: vec![
                    PathBuf::from("./src/schema.ts"),
                    PathBuf::from("./packages/database/src/schema.ts"),
                    PathBuf::from("../database/src/schema.ts"),
                ],
                workspace_output_dir: PathBuf::from("./packages/database/src/generated/effect"),
                output_dir: PathBuf::from("./src/generated/effect"),
                workspace_services_dir: PathBuf::from("./packages/api/src/services"),
                services_dir: PathBuf::from("./src/services"),
            },
        }
    }
}

/// Schema description language settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrismaSettings {
    /// Paths and output directories
    #[serde(flatten)]
    pub source: SourceSettings,

    /// Fail the run when a relation points at an undeclared model
    pub validate_relations: bool,
}

impl Default for PrismaSettings {
    fn default() -> Self {
        Self {
            source: SourceSettings {
                candidates: vec![
                    PathBuf::from("./prisma/schema.prisma"),
                    PathBuf::from("./packages/database/prisma/schema.prisma"),
                    PathBuf::from("../prisma/schema.prisma"),
                ],
                workspace_output_dir: PathBuf::from("./packages/database/src/generated/effect"),
                output_dir: PathBuf::from("./src/generated/effect"),
                workspace_services_dir: PathBuf::from("./packages/database/src/generated/effect/services"),
                services_dir: PathBuf::from("./src/generated/effect/services"),
            },
            validate_relations: true,
        }
    }
}

/// Complete generator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Path segment that marks a schema inside the workspace database package
    pub workspace_marker: String,

    /// Module prefix services use to import generated schemas
    pub import_base: String,

    /// Module the generated services import table bindings from
    pub table_import: String,

    /// Module exporting the database client tag for generated services
    pub prisma_client_import: String,

    /// Emit form schemas next to the row schemas
    pub emit_form_schemas: bool,

    /// Fail on column lines the table DSL parser cannot read
    pub strict: bool,

    /// Table DSL settings
    pub drizzle: DrizzleSettings,

    /// Schema description language settings
    pub prisma: PrismaSettings,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            workspace_marker: "packages/database".to_string(),
            import_base: "@workspace/database/effect".to_string(),
            table_import: "@workspace/database/schema".to_string(),
            prisma_client_import: "@workspace/database/prisma-client".to_string(),
            emit_form_schemas: true,
            strict: false,
            drizzle: DrizzleSettings::default(),
            prisma: PrismaSettings::default(),
        }
    }
}

impl GeneratorConfig {
    /// Load configuration for a project rooted at `root`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Default configuration cannot be serialized to TOML
    /// - `effex.toml` contains invalid TOML syntax
    /// - Configuration values fail type conversion
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        Self::load_with_env(root, ENV_PREFIX)
    }

    fn load_with_env(root: &Path, prefix: &str) -> Result<Self, ConfigError> {
        let mut figment = Figment::new().merge(Toml::string(&toml::to_string(&Self::default())?));

        let local_config = root.join(CONFIG_FILE);
        if local_config.exists() {
            tracing::debug!(path = %local_config.display(), "loading configuration file");
            figment = figment.merge(Toml::file(&local_config));
        }

        figment = figment.merge(Env::prefixed(prefix).split("__").lowercase(true));

        figment.extract().map_err(|e| ConfigError::Extract(Box::new(e)))
    }

    /// Whether a schema path sits inside the workspace database package
    #[must_use]
    pub fn is_workspace_schema(&self, schema_path: &Path) -> bool {
        let marker = self.workspace_marker.trim_matches('/');
        !marker.is_empty()
            && schema_path
                .to_string_lossy()
                .replace('\\', "/")
                .contains(marker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = GeneratorConfig::default();
        assert_eq!(config.workspace_marker, "packages/database");
        assert_eq!(config.import_base, "@workspace/database/effect");
        assert!(config.emit_form_schemas);
        assert!(!config.strict);
        assert!(config.prisma.validate_relations);
        assert_eq!(config.drizzle.source.candidates.len(), 3);
    }

    #[test]
    fn test_load_without_file_returns_defaults() {
        let temp = TempDir::new().unwrap();
        let config = GeneratorConfig::load_with_env(temp.path(), "EFFEX_TEST_UNSET_").unwrap();
        assert_eq!(config, GeneratorConfig::default());
    }

    #[test]
    fn test_load_from_toml_file() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(CONFIG_FILE),
            r#"
import_base = "@acme/db/effect"
strict = true

[drizzle]
output_dir = "./db/generated"

[prisma]
validate_relations = false
"#,
        )
        .unwrap();

        let config = GeneratorConfig::load_with_env(temp.path(), "EFFEX_TEST_UNSET_").unwrap();
        assert_eq!(config.import_base, "@acme/db/effect");
        assert!(config.strict);
        assert_eq!(config.drizzle.source.output_dir, PathBuf::from("./db/generated"));
        // untouched keys keep their defaults
        assert_eq!(
            config.drizzle.source.services_dir,
            PathBuf::from("./src/services")
        );
        assert!(!config.prisma.validate_relations);
    }

    #[test]
    fn test_env_overrides_file() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILE), "emit_form_schemas = true\n").unwrap();

        std::env::set_var("EFFEX_TEST_ENV_OVERRIDE_EMIT_FORM_SCHEMAS", "false");
        let config =
            GeneratorConfig::load_with_env(temp.path(), "EFFEX_TEST_ENV_OVERRIDE_").unwrap();
        std::env::remove_var("EFFEX_TEST_ENV_OVERRIDE_EMIT_FORM_SCHEMAS");

        assert!(!config.emit_form_schemas);
    }

    #[test]
    fn test_invalid_value_is_an_error() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILE), "strict = \"sometimes\"\n").unwrap();

        let result = GeneratorConfig::load_with_env(temp.path(), "EFFEX_TEST_UNSET_");
        assert!(matches!(result, Err(ConfigError::Extract(_))));
    }

    #[test]
    fn test_workspace_marker_detection() {
        let config = GeneratorConfig::default();
        assert!(config.is_workspace_schema(Path::new("./packages/database/src/schema.ts")));
        assert!(!config.is_workspace_schema(Path::new("./src/schema.ts")));
    }
}
