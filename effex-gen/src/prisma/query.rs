//! Read-only queries over a parsed schema and conversion to emitter tables

use std::collections::{HashMap, HashSet};

use super::ast::{Block, ConfigBlock, Enum, Field, Model, SchemaAst};
use crate::error::AstError;
use crate::model::{Column, ForeignKey, Table};
use crate::types::SourceDialect;

const SCALAR_TYPES: [&str; 9] = [
    "String", "Int", "Float", "BigInt", "Boolean", "DateTime", "Bytes", "Json", "Decimal",
];

impl SchemaAst {
    /// Every `model` declaration, in order
    #[must_use]
    pub fn models(&self) -> Vec<&Model> {
        self.list
            .iter()
            .filter_map(|block| match block {
                Block::Model(model) => Some(model),
                _ => None,
            })
            .collect()
    }

    /// Every `enum` declaration, in order
    #[must_use]
    pub fn enums(&self) -> Vec<&Enum> {
        self.list
            .iter()
            .filter_map(|block| match block {
                Block::Enum(e) => Some(e),
                _ => None,
            })
            .collect()
    }

    /// The datasource block, if declared
    ///
    /// # Errors
    ///
    /// Returns [`AstError::MultipleDatasources`] when more than one is declared.
    pub fn datasource(&self) -> Result<Option<&ConfigBlock>, AstError> {
        let datasources: Vec<&ConfigBlock> = self
            .list
            .iter()
            .filter_map(|block| match block {
                Block::Datasource(config) => Some(config),
                _ => None,
            })
            .collect();

        match datasources.as_slice() {
            [] => Ok(None),
            [one] => Ok(Some(one)),
            many => Err(AstError::MultipleDatasources(many.len())),
        }
    }

    /// Every `generator` declaration, in order
    #[must_use]
    pub fn generators(&self) -> Vec<&ConfigBlock> {
        self.list
            .iter()
            .filter_map(|block| match block {
                Block::Generator(config) => Some(config),
                _ => None,
            })
            .collect()
    }

    /// Model with an exact, case-sensitive name
    ///
    /// # Errors
    ///
    /// Returns [`AstError::ModelNotFound`] if no model has that name.
    pub fn model_by_name(&self, name: &str) -> Result<&Model, AstError> {
        self.models()
            .into_iter()
            .find(|m| m.name == name)
            .ok_or_else(|| AstError::ModelNotFound(name.to_string()))
    }

    /// Apply `visitor` to every top-level declaration in order
    ///
    /// Stops at the first error the visitor returns.
    ///
    /// # Errors
    ///
    /// Propagates the visitor's error.
    pub fn traverse<E>(&self, visitor: impl FnMut(&Block) -> Result<(), E>) -> Result<(), E> {
        self.list.iter().try_for_each(visitor)
    }

    /// Check that every `@relation` field names a declared model
    ///
    /// Every model is collected before any field is judged, and all
    /// violations are reported together in declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`AstError::RelationValidation`] with one line per violation.
    pub fn validate_relations(&self) -> Result<Vec<String>, AstError> {
        let models = self.models();
        let names: HashSet<&str> = models.iter().map(|m| m.name.as_str()).collect();

        let mut violations = Vec::new();
        for model in &models {
            for field in model.fields() {
                if !field.has_attribute("relation") {
                    continue;
                }
                let Some(related) = field.field_type.name() else {
                    continue;
                };
                if !names.contains(related) {
                    violations.push(format!(
                        "{}: field {} references unknown model {related}",
                        model.name, field.name
                    ));
                }
            }
        }

        if violations.is_empty() {
            Ok(violations)
        } else {
            Err(AstError::RelationValidation(violations))
        }
    }

    /// Convert models to emitter tables
    ///
    /// Relation fields and `Unsupported` fields are left out; enum-typed
    /// fields carry the enum's values. A field counts as a relation when it
    /// carries `@relation` or its type is neither a scalar nor an enum, so
    /// dangling relations stay out of the output even when relation
    /// checking is off.
    #[must_use]
    pub fn to_tables(&self) -> Vec<Table> {
        let models = self.models();
        let model_names: HashSet<&str> = models.iter().map(|m| m.name.as_str()).collect();
        let enums: HashMap<&str, Vec<String>> = self
            .enums()
            .into_iter()
            .map(|e| (e.name.as_str(), e.values()))
            .collect();

        models
            .into_iter()
            .map(|model| model_to_table(model, &model_names, &enums))
            .collect()
    }
}

fn model_to_table(
    model: &Model,
    model_names: &HashSet<&str>,
    enums: &HashMap<&str, Vec<String>>,
) -> Table {
    let table_name = model
        .block_attribute("map")
        .and_then(|a| a.arg("name"))
        .and_then(|v| v.as_str())
        .unwrap_or(&model.name);

    let compound_id: Vec<&str> = model
        .block_attribute("id")
        .and_then(|a| a.arg("fields"))
        .map(|v| v.idents())
        .unwrap_or_default();

    let unique_singles: Vec<&str> = model
        .block_attributes()
        .filter(|a| a.name == "unique")
        .filter_map(|a| a.arg("fields"))
        .map(|v| v.idents())
        .filter(|fields| fields.len() == 1)
        .flatten()
        .collect();

    let foreign_keys = collect_foreign_keys(model, model_names);

    let mut table = Table::new(&model.name, table_name, SourceDialect::Prisma);
    for field in model.fields() {
        let Some(type_name) = field.field_type.name() else {
            continue;
        };
        if is_relation(field, type_name, model_names, enums) {
            if !model_names.contains(type_name) {
                tracing::warn!(
                    model = %model.name,
                    field = %field.name,
                    related = type_name,
                    "skipping field typed as an undeclared model"
                );
            }
            continue;
        }

        let mut column = Column::new(&field.name, type_name);
        column.is_array = field.is_list();
        column.is_not_null = !field.is_optional();
        column.has_default = field.has_attribute("default") || field.has_attribute("updatedAt");
        column.is_primary_key =
            field.has_attribute("id") || compound_id.contains(&field.name.as_str());
        column.is_unique =
            field.has_attribute("unique") || unique_singles.contains(&field.name.as_str());
        column.variants = enums.get(type_name).cloned();
        column.references = foreign_keys.get(field.name.as_str()).cloned();
        table.columns.push(column);
    }

    tracing::debug!(model = %model.name, columns = table.columns.len(), "converted model");
    table
}

fn is_relation(
    field: &Field,
    type_name: &str,
    model_names: &HashSet<&str>,
    enums: &HashMap<&str, Vec<String>>,
) -> bool {
    field.has_attribute("relation")
        || model_names.contains(type_name)
        || !(SCALAR_TYPES.contains(&type_name) || enums.contains_key(type_name))
}

/// Scalar fields named in `@relation(fields: [...], references: [...])`
fn collect_foreign_keys<'a>(
    model: &'a Model,
    model_names: &HashSet<&str>,
) -> HashMap<&'a str, ForeignKey> {
    let mut keys = HashMap::new();
    for field in model.fields() {
        let Some(related) = relation_target(field, model_names) else {
            continue;
        };
        let Some(relation) = field.attribute("relation") else {
            continue;
        };
        let (Some(fields), Some(references)) = (relation.arg("fields"), relation.arg("references"))
        else {
            continue;
        };
        for (local, remote) in fields.idents().into_iter().zip(references.idents()) {
            keys.insert(
                local,
                ForeignKey {
                    table: related.to_string(),
                    column: remote.to_string(),
                },
            );
        }
    }
    keys
}

fn relation_target<'a>(field: &'a Field, model_names: &HashSet<&str>) -> Option<&'a str> {
    field
        .field_type
        .name()
        .filter(|name| model_names.contains(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prisma::parse_schema;

    const SCHEMA: &str = r#"
datasource db {
  provider = "postgresql"
  url      = env("DATABASE_URL")
}

generator client {
  provider = "prisma-client-js"
}

model User {
  id        String   @id @default(cuid())
  email     String   @unique
  name      String?
  role      Role     @default(USER)
  posts     Post[]
  updatedAt DateTime @updatedAt

  @@map("users")
}

model Post {
  id       Int      @id @default(autoincrement())
  title    String
  tags     String[]
  author   User     @relation(fields: [authorId], references: [id])
  authorId String
}

enum Role {
  USER
  ADMIN
}
"#;

    #[test]
    fn test_accessors() {
        let ast = parse_schema(SCHEMA).unwrap();
        let models: Vec<_> = ast.models().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(models, vec!["User", "Post"]);
        assert_eq!(ast.enums().len(), 1);
        assert_eq!(ast.generators().len(), 1);
        assert_eq!(ast.datasource().unwrap().map(|d| d.name.as_str()), Some("db"));
    }

    #[test]
    fn test_datasource_absent_or_multiple() {
        let none = parse_schema("model A {\n  id Int @id\n}\n").unwrap();
        assert!(none.datasource().unwrap().is_none());

        let two = parse_schema("datasource a {\n  provider = \"x\"\n}\ndatasource b {\n  provider = \"y\"\n}\n").unwrap();
        assert_eq!(two.datasource(), Err(AstError::MultipleDatasources(2)));
    }

    #[test]
    fn test_model_by_name_is_case_sensitive() {
        let ast = parse_schema(SCHEMA).unwrap();
        assert_eq!(ast.model_by_name("Post").unwrap().name, "Post");
        assert_eq!(
            ast.model_by_name("post"),
            Err(AstError::ModelNotFound("post".to_string()))
        );
    }

    #[test]
    fn test_traverse_visits_in_order() {
        let ast = parse_schema(SCHEMA).unwrap();
        let mut names = Vec::new();
        ast.traverse(|block| {
            names.push(block.name().unwrap_or_default().to_string());
            Ok::<_, ()>(())
        })
        .unwrap();
        assert_eq!(names, vec!["db", "client", "User", "Post", "Role"]);
    }

    #[test]
    fn test_traverse_stops_on_error() {
        let ast = parse_schema(SCHEMA).unwrap();
        let mut visited = 0;
        let result = ast.traverse(|block| {
            visited += 1;
            if matches!(block, Block::Model(_)) {
                Err("stop")
            } else {
                Ok(())
            }
        });
        assert_eq!(result, Err("stop"));
        assert_eq!(visited, 3);
    }

    #[test]
    fn test_valid_relations() {
        let ast = parse_schema(SCHEMA).unwrap();
        assert_eq!(ast.validate_relations(), Ok(Vec::new()));
    }

    #[test]
    fn test_dangling_relations_are_all_reported() {
        let source = r"
model Post {
  id     Int     @id
  author Usr     @relation(fields: [authorId], references: [id])
  authorId Int
}

model Comment {
  id   Int  @id
  post Pots @relation(fields: [postId], references: [id])
  postId Int
}
";
        let ast = parse_schema(source).unwrap();
        let err = ast.validate_relations().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Relation validation failed:\nPost: field author references unknown model Usr\nComment: field post references unknown model Pots"
        );
    }

    #[test]
    fn test_dangling_relation_is_not_a_column() {
        let source = r"
model Post {
  id     Int     @id
  userId Int
  user   Usr     @relation(fields: [userId], references: [id])
  owner  Account
}
";
        let tables = parse_schema(source).unwrap().to_tables();
        let names: Vec<_> = tables[0].columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "userId"]);
        assert_eq!(tables[0].columns[1].references, None);
    }

    #[test]
    fn test_to_tables() {
        let ast = parse_schema(SCHEMA).unwrap();
        let tables = ast.to_tables();
        assert_eq!(tables.len(), 2);

        let user = &tables[0];
        assert_eq!(user.name, "User");
        assert_eq!(user.table_name, "users");
        let names: Vec<_> = user.columns.iter().map(|c| c.name.as_str()).collect();
        // relation field `posts` is excluded
        assert_eq!(names, vec!["id", "email", "name", "role", "updatedAt"]);

        assert!(user.columns[0].is_primary_key && user.columns[0].has_default);
        assert!(user.columns[1].is_unique);
        assert!(!user.columns[2].is_not_null);
        assert_eq!(
            user.columns[3].variants,
            Some(vec!["USER".to_string(), "ADMIN".to_string()])
        );
        assert!(user.columns[4].has_default);

        let post = &tables[1];
        assert_eq!(post.table_name, "Post");
        assert!(post.columns[2].is_array);
        let author_id = post.columns.iter().find(|c| c.name == "authorId").unwrap();
        assert_eq!(
            author_id.references,
            Some(ForeignKey {
                table: "User".to_string(),
                column: "id".to_string()
            })
        );
    }

    #[test]
    fn test_compound_keys() {
        let source = r"
model Membership {
  userId String
  teamId String
  slug   String

  @@id([userId, teamId])
  @@unique([slug])
}
";
        let tables = parse_schema(source).unwrap().to_tables();
        let cols = &tables[0].columns;
        assert!(cols[0].is_primary_key && cols[1].is_primary_key);
        assert!(!cols[2].is_primary_key && cols[2].is_unique);
        assert_eq!(tables[0].primary_key_name(), "userId");
    }
}
