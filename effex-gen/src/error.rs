//! Error types for the generator pipeline
//!
//! Each stage owns its error kind so callers can decide which failures are
//! fatal. [`GenError`] is the umbrella type returned by the pipeline.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Line/column location inside schema source text (both 1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// Line number
    pub line: usize,
    /// Column number
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Schema file could not be read
#[derive(Debug, Error)]
#[error("Failed to read schema file {}: {source}", path.display())]
pub struct FileReadError {
    /// Path that was read
    pub path: PathBuf,
    /// Underlying I/O failure
    #[source]
    pub source: io::Error,
}

/// Schema text does not match the expected grammar or shape
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ParseError {
    /// Human-readable description
    pub message: String,
    /// Where the problem was found, when known
    pub position: Option<Position>,
}

impl ParseError {
    /// Error without a source location
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            position: None,
        }
    }

    /// Error pointing at a source location
    pub fn at(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            message: message.into(),
            position: Some(Position { line, column }),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            Some(position) => write!(f, "Parse error at {position}: {}", self.message),
            None => write!(f, "Parse error: {}", self.message),
        }
    }
}

/// AST query failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AstError {
    /// One or more relation fields point at models that do not exist
    #[error("Relation validation failed:\n{}", .0.join("\n"))]
    RelationValidation(Vec<String>),

    /// No model with the requested name
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// A schema may declare at most one datasource
    #[error("Expected at most one datasource block, found {0}")]
    MultipleDatasources(usize),
}

/// Failures while rendering or writing generated artifacts
#[derive(Debug, Error)]
pub enum EmitError {
    /// Output directory could not be created
    #[error("Failed to create directory {}: {source}", path.display())]
    CreateDir {
        /// Directory path
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: io::Error,
    },

    /// Artifact could not be written
    #[error("Failed to write file {}: {source}", path.display())]
    Write {
        /// File path
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: io::Error,
    },

    /// A bundled template failed to compile
    #[error("Failed to register template '{name}': {source}")]
    Template {
        /// Template name
        name: &'static str,
        /// Compilation error
        #[source]
        source: Box<handlebars::TemplateError>,
    },

    /// A template failed to render for a model
    #[error("Failed to render {artifact} for model {model}: {source}")]
    Render {
        /// Artifact kind label
        artifact: &'static str,
        /// Model being rendered
        model: String,
        /// Render error
        #[source]
        source: Box<handlebars::RenderError>,
    },

    /// Two models map to the same output file
    #[error("Models {first} and {second} both map to {}", path.display())]
    NameCollision {
        /// Colliding output path
        path: PathBuf,
        /// Model that claimed the path first
        first: String,
        /// Model that collided
        second: String,
    },
}

/// Configuration could not be loaded
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Defaults could not be serialized
    #[error("Failed to serialize default configuration: {0}")]
    Defaults(#[from] toml::ser::Error),

    /// Merged configuration could not be extracted
    #[error("Invalid configuration: {0}")]
    Extract(#[from] Box<figment::Error>),
}

/// Umbrella error for a generation run
#[derive(Debug, Error)]
pub enum GenError {
    /// No schema path given and none of the conventional locations exist
    #[error("Could not find a schema file. Searched: {}", display_paths(.searched))]
    SchemaNotFound {
        /// Locations that were probed
        searched: Vec<PathBuf>,
    },

    /// An explicit schema path does not exist
    #[error("Schema file does not exist: {}", path.display())]
    SchemaMissing {
        /// Requested path
        path: PathBuf,
    },

    /// Reading the schema failed
    #[error(transparent)]
    FileRead(#[from] FileReadError),

    /// Parsing the schema failed
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// AST query or validation failed
    #[error(transparent)]
    Ast(#[from] AstError),

    /// Emission failed
    #[error(transparent)]
    Emit(#[from] EmitError),

    /// Configuration failed to load
    #[error(transparent)]
    Config(#[from] ConfigError),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
