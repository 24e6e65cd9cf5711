//! effex CLI library
//!
//! Command implementations, logging setup and the embedded project skeleton
//! behind the `effex` binary.

// Lint configuration is handled at the workspace level in Cargo.toml

pub mod commands;
pub mod logging;
pub mod templates;

use std::fmt;

pub use templates::ProjectTemplate;

/// Package manager a new project is set up for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum PackageManager {
    /// Bun (default)
    #[default]
    Bun,
    /// pnpm
    Pnpm,
    /// npm
    Npm,
}

impl PackageManager {
    /// Pinned version written to the `packageManager` field
    #[must_use]
    pub const fn version(self) -> &'static str {
        match self {
            Self::Bun => "1.3.0",
            Self::Pnpm => "10.18.3",
            Self::Npm => "11.6.2",
        }
    }

    /// Command that runs a package binary without installing it
    #[must_use]
    pub const fn executable(self) -> &'static str {
        match self {
            Self::Bun => "bun x",
            Self::Pnpm => "pnpx",
            Self::Npm => "npx",
        }
    }

    /// Dependency install command
    #[must_use]
    pub const fn install_command(self) -> &'static str {
        match self {
            Self::Bun => "bun install",
            Self::Pnpm => "pnpm install",
            Self::Npm => "npm install",
        }
    }

    /// Script runner prefix, e.g. `bun run`
    #[must_use]
    pub const fn run_command(self) -> &'static str {
        match self {
            Self::Bun => "bun run",
            Self::Pnpm => "pnpm run",
            Self::Npm => "npm run",
        }
    }

    /// `name@version` for the `packageManager` field
    #[must_use]
    pub fn pinned(self) -> String {
        format!("{self}@{}", self.version())
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Bun => "bun",
            Self::Pnpm => "pnpm",
            Self::Npm => "npm",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_manager_commands() {
        assert_eq!(PackageManager::default(), PackageManager::Bun);
        assert_eq!(PackageManager::Bun.pinned(), "bun@1.3.0");
        assert_eq!(PackageManager::Pnpm.pinned(), "pnpm@10.18.3");
        assert_eq!(PackageManager::Npm.executable(), "npx");
        assert_eq!(PackageManager::Pnpm.install_command(), "pnpm install");
    }
}
