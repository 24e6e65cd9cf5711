//! Project scaffolding command

use anyhow::{bail, Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};

use crate::templates::ProjectTemplate;
use crate::PackageManager;

const INVALID_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];
const RESERVED_NAMES: &[&str] = &["node_modules", "dist", "build", ".git", ".next"];

/// Create a new effex monorepo
pub struct CreateCommand {
    name: String,
    package_manager: PackageManager,
    output_dir: PathBuf,
}

impl CreateCommand {
    /// Create a new command instance
    ///
    /// The project lands in `<directory>/<name>`, with `directory`
    /// defaulting to the current directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or the target directory
    /// already exists.
    pub fn new(
        name: &str,
        package_manager: PackageManager,
        directory: Option<&Path>,
    ) -> Result<Self> {
        let name = validate_project_name(name)?;
        let output_dir = directory.map_or_else(|| PathBuf::from(&name), |dir| dir.join(&name));

        if output_dir.exists() {
            bail!(
                "Directory '{}' already exists. Please choose a different name or remove the existing directory.",
                output_dir.display()
            );
        }

        Ok(Self {
            name,
            package_manager,
            output_dir,
        })
    }

    /// Target directory of the new project
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Execute the command
    ///
    /// # Errors
    ///
    /// Returns an error if a directory or file cannot be written.
    pub fn execute(&self) -> Result<()> {
        println!(
            "{} {} {}",
            style("Creating").green().bold(),
            style("effex project:").bold(),
            style(&self.name).cyan().bold()
        );
        println!();

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .context("Failed to set progress style")?,
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(100));

        spinner.set_message("Creating project directory...");
        fs::create_dir_all(&self.output_dir).with_context(|| {
            format!("Failed to create directory: {}", self.output_dir.display())
        })?;

        spinner.set_message("Generating project files...");
        ProjectTemplate::new(&self.name, self.package_manager).generate(&self.output_dir)?;

        spinner.finish_and_clear();
        tracing::info!(path = %self.output_dir.display(), "project created");

        self.print_success();
        Ok(())
    }

    /// Print success message with next steps
    fn print_success(&self) {
        let pm = self.package_manager;
        println!("{}", style("✓ Project created successfully!").green().bold());
        println!();
        println!("{}", style("Next steps:").bold());
        println!();
        println!("  {} Navigate to project:", style("1.").cyan());
        println!(
            "     {} {}",
            style("$").dim(),
            style(format!("cd {}", self.output_dir.display())).cyan()
        );
        println!();
        println!("  {} Install dependencies:", style("2.").cyan());
        println!("     {} {}", style("$").dim(), style(pm.install_command()).cyan());
        println!();
        println!("  {} Generate Effect schemas and services:", style("3.").cyan());
        println!(
            "     {} {}",
            style("$").dim(),
            style(format!("{} db:generate", pm.run_command())).cyan()
        );
        println!();
        println!("  {} Start development server:", style("4.").cyan());
        println!(
            "     {} {}",
            style("$").dim(),
            style(format!("{} dev", pm.run_command())).cyan()
        );
        println!();
    }
}

/// Check a project name and return it trimmed
///
/// # Errors
///
/// Returns an error if the name is empty, contains path-hostile characters,
/// is a reserved directory name, or uses anything besides letters, digits,
/// hyphens and underscores.
pub fn validate_project_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        bail!("Project name cannot be empty");
    }
    if name.contains(INVALID_CHARS) {
        bail!(r#"Project name contains invalid characters. Avoid special characters like <>:"/\|?*"#);
    }
    if RESERVED_NAMES.iter().any(|r| r.eq_ignore_ascii_case(name)) {
        bail!("Project name cannot be a reserved directory name");
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        bail!("Project name can only contain letters, numbers, hyphens, and underscores");
    }
    Ok(name.to_string())
}
