//! effex CLI tool

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use effex_cli::commands::{CreateCommand, FormatCommand, GenerateCommand};
use effex_cli::{logging, PackageManager};
use effex_gen::GeneratorConfig;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "effex")]
#[command(version)]
#[command(about = "Create Effect-TS apps and generate Effect schemas and services", long_about = None)]
struct Cli {
    /// Show debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate Effect schemas and services from a database schema
    Generate {
        #[command(subcommand)]
        command: GenerateCommand,
    },
    /// Print or rewrite a Prisma schema in canonical form
    Format(FormatCommand),
    /// Create a new effex project
    Create {
        /// Project name
        name: String,

        /// Package manager the project is set up for
        #[arg(long, value_enum, default_value_t = PackageManager::Bun)]
        package_manager: PackageManager,

        /// Parent directory (default: current directory)
        #[arg(long)]
        directory: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err:#}", style("✗").red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    logging::init(cli.verbose)?;

    let root = std::env::current_dir().context("Failed to read current directory")?;

    match cli.command {
        Commands::Generate { command } => {
            let config = GeneratorConfig::load(&root).context("Failed to load configuration")?;
            command.execute(&root, config)
        }
        Commands::Format(command) => {
            let config = GeneratorConfig::load(&root).context("Failed to load configuration")?;
            command.execute(&root, &config)
        }
        Commands::Create {
            name,
            package_manager,
            directory,
        } => CreateCommand::new(&name, package_manager, directory.as_deref())?.execute(),
    }
}
