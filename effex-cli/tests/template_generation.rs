//! Integration tests for project creation

use std::fs;

use effex_cli::commands::CreateCommand;
use effex_cli::{PackageManager, ProjectTemplate};
use effex_gen::{generate_drizzle, ArtifactKind, GenerateRequest, GeneratorConfig};
use tempfile::TempDir;

/// Every skeleton file is written under the target directory
#[test]
fn test_create_writes_skeleton() {
    let temp = TempDir::new().unwrap();
    let command = CreateCommand::new("shop", PackageManager::Pnpm, Some(temp.path())).unwrap();
    command.execute().unwrap();

    let project = temp.path().join("shop");
    for (relative_path, _) in effex_cli::templates::PROJECT_FILES {
        let path = project.join(relative_path);
        assert!(path.is_file(), "File should exist: {}", path.display());
    }

    let readme = fs::read_to_string(project.join("README.md")).unwrap();
    assert!(readme.starts_with("# shop\n"));
    assert!(readme.contains("pnpm install\npnpm run db:generate\npnpm run dev\n"));
}

/// A second create into the same place is refused
#[test]
fn test_create_refuses_existing_project() {
    let temp = TempDir::new().unwrap();
    CreateCommand::new("shop", PackageManager::Bun, Some(temp.path()))
        .unwrap()
        .execute()
        .unwrap();

    assert!(CreateCommand::new("shop", PackageManager::Bun, Some(temp.path())).is_err());
}

/// The starter schema generates cleanly with the project's own configuration
#[test]
fn test_created_project_generates() {
    let temp = TempDir::new().unwrap();
    ProjectTemplate::new("shop", PackageManager::Bun)
        .generate(temp.path())
        .unwrap();

    let root = temp.path();
    let config = GeneratorConfig::load(root).unwrap();
    let report = generate_drizzle(root, &config, &GenerateRequest::default()).unwrap();

    assert_eq!(report.table_count, 2);
    assert!(report.skipped.is_empty());
    assert_eq!(
        report
            .files
            .iter()
            .filter(|f| f.kind == ArtifactKind::Service)
            .count(),
        2
    );

    let service = fs::read_to_string(root.join("packages/api/src/services/user-service.ts")).unwrap();
    assert!(service.contains("import { user } from '@workspace/database/schema'"));
    assert!(service.contains("class ConflictError"));

    let schemas = fs::read_to_string(
        root.join("packages/database/src/generated/effect/schemas/post-schemas.ts"),
    )
    .unwrap();
    let insert = &schemas[schemas.find("insertPostSchema").unwrap()..];
    assert!(!insert.contains("  id:"));
    assert!(insert.contains("  title: Schema.String,"));
}
