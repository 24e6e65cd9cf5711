//! Effex generator - Effect-TS schemas and services from database schemas
//!
//! This crate provides:
//! - **drizzle**: parser for Drizzle `pgTable` declarations
//! - **prisma**: lexer, parser, printer and queries for schema description files
//! - **emit**: handlebars rendering of Effect `Schema` modules and CRUD services
//! - **pipeline**: the locate → read → parse → validate → emit runs used by the CLI
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use effex_gen::{generate_drizzle, GenerateRequest, GeneratorConfig};
//!
//! # fn main() -> Result<(), effex_gen::GenError> {
//! let root = Path::new(".");
//! let config = GeneratorConfig::load(root)?;
//! let report = generate_drizzle(root, &config, &GenerateRequest::default())?;
//! for file in &report.files {
//!     println!("{}", file.path.display());
//! }
//! # Ok(())
//! # }
//! ```

// Lint configuration is handled at the workspace level in Cargo.toml

mod config;
mod error;
mod helpers;
mod model;
mod pipeline;
mod reader;
mod types;

pub mod drizzle;
pub mod emit;
pub mod prisma;

pub use config::{DrizzleSettings, GeneratorConfig, PrismaSettings, SourceSettings};
pub use emit::{ArtifactKind, Emitter, GeneratedFile, OutputLayout, RenderOptions};
pub use error::{
    AstError, ConfigError, EmitError, FileReadError, GenError, ParseError, Position,
};
pub use helpers::NameHelpers;
pub use model::{Column, ForeignKey, Table};
pub use pipeline::{
    format_schema, generate_drizzle, generate_prisma, locate_schema, FormatOutcome,
    GenerateRequest, GenerationReport,
};
pub use reader::read_schema;
pub use types::{has_implicit_default, map_type, SourceDialect, TypeExpr};
