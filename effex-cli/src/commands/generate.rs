//! Effect schema and service generation

use anyhow::{Context, Result};
use clap::Subcommand;
use console::{style, Emoji};
use effex_gen::{
    generate_drizzle, generate_prisma, GenerateRequest, GenerationReport, GeneratorConfig,
};
use std::path::{Path, PathBuf};

static SUCCESS: Emoji = Emoji("✓ ", "√ ");
static WARN: Emoji = Emoji("⚠ ", "! ");

/// Code generation commands
#[derive(Debug, Subcommand)]
pub enum GenerateCommand {
    /// Generate from a Drizzle `pgTable` schema
    ///
    /// Examples:
    ///   effex generate drizzle
    ///   effex generate drizzle --schema-path packages/database/src/schema.ts --strict
    Drizzle {
        /// Schema file (default: first existing conventional location)
        #[arg(long)]
        schema_path: Option<PathBuf>,

        /// Directory for schema, type and form modules
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Directory for service modules
        #[arg(long)]
        services_dir: Option<PathBuf>,

        /// Fail on column entries that cannot be parsed instead of skipping them
        #[arg(long)]
        strict: bool,
    },
    /// Generate from a Prisma schema file
    Prisma {
        /// Schema file (default: first existing conventional location)
        #[arg(long)]
        schema_path: Option<PathBuf>,

        /// Output directory; services go to its `services/` subdirectory
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Generate even when relations point at unknown models
        #[arg(long)]
        skip_relation_check: bool,
    },
}

impl GenerateCommand {
    /// Execute the generate command
    ///
    /// Flags override the loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The schema file cannot be found or read
    /// - Parsing or validation fails
    /// - An artifact cannot be rendered or written
    pub fn execute(&self, root: &Path, mut config: GeneratorConfig) -> Result<()> {
        let report = match self {
            Self::Drizzle {
                schema_path,
                output_dir,
                services_dir,
                strict,
            } => {
                config.strict |= *strict;
                let request = GenerateRequest {
                    schema_path: schema_path.clone(),
                    output_dir: output_dir.clone(),
                    services_dir: services_dir.clone(),
                };
                generate_drizzle(root, &config, &request)
                    .context("Failed to generate from Drizzle schema")?
            }
            Self::Prisma {
                schema_path,
                output_dir,
                skip_relation_check,
            } => {
                if *skip_relation_check {
                    config.prisma.validate_relations = false;
                }
                let request = GenerateRequest {
                    schema_path: schema_path.clone(),
                    output_dir: output_dir.clone(),
                    services_dir: None,
                };
                generate_prisma(root, &config, &request)
                    .context("Failed to generate from Prisma schema")?
            }
        };

        print_report(root, &report);
        Ok(())
    }
}

fn print_report(root: &Path, report: &GenerationReport) {
    for line in warning_lines(root, report) {
        eprintln!("{}", style(format!("{WARN}{line}")).yellow());
    }
    for line in completion_lines(root, report) {
        println!("{}{line}", style(SUCCESS).green());
    }
    if !report.files.is_empty() {
        println!();
        println!(
            "{} {} from {}",
            style("Generated").green().bold(),
            style(format!("{} files", report.files.len())).bold(),
            style(relative(root, &report.schema_path).display()).cyan()
        );
    }
}

/// `<path> (<artifact>)` for every written file
fn completion_lines(root: &Path, report: &GenerationReport) -> Vec<String> {
    report
        .files
        .iter()
        .map(|file| {
            format!(
                "{} ({})",
                relative(root, &file.path).display(),
                file.description()
            )
        })
        .collect()
}

fn warning_lines(root: &Path, report: &GenerationReport) -> Vec<String> {
    let mut lines: Vec<String> = report
        .skipped
        .iter()
        .map(|s| format!("Skipped column in {} (line {}): {}", s.table, s.line, s.text))
        .collect();
    if report.table_count == 0 {
        lines.push(format!(
            "No tables found in {}; nothing generated",
            relative(root, &report.schema_path).display()
        ));
    }
    lines
}

fn relative<'a>(root: &Path, path: &'a Path) -> &'a Path {
    path.strip_prefix(root).unwrap_or(path)
}
