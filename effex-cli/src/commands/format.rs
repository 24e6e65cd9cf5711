//! Canonical formatting of Prisma schema files

use anyhow::{Context, Result};
use clap::Args;
use console::{style, Emoji};
use effex_gen::{format_schema, GeneratorConfig};
use std::path::{Path, PathBuf};

static SUCCESS: Emoji = Emoji("✓ ", "√ ");

/// Print or rewrite the canonical form of a schema file
#[derive(Debug, Args)]
pub struct FormatCommand {
    /// Schema file (default: first existing conventional location)
    #[arg(long)]
    pub schema_path: Option<PathBuf>,

    /// Rewrite the file in place instead of printing it
    #[arg(long)]
    pub write: bool,
}

impl FormatCommand {
    /// Execute the format command
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be located, read or parsed, or
    /// if writing it back fails.
    pub fn execute(&self, root: &Path, config: &GeneratorConfig) -> Result<()> {
        let outcome = format_schema(root, config, self.schema_path.as_deref(), self.write)
            .context("Failed to format schema")?;
        let shown = outcome
            .schema_path
            .strip_prefix(root)
            .unwrap_or(&outcome.schema_path)
            .display();

        if !self.write {
            print!("{}", outcome.formatted);
        } else if outcome.changed {
            println!("{}Formatted {}", style(SUCCESS).green(), style(shown).cyan());
        } else {
            println!(
                "{}{} {}",
                style(SUCCESS).green(),
                style(shown).cyan(),
                style("already formatted").dim()
            );
        }
        Ok(())
    }
}
