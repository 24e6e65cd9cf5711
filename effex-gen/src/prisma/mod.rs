//! Schema description language support
//!
//! A hand-written lexer and recursive-descent parser produce a typed
//! [`SchemaAst`]; [`print_schema`] renders it back in canonical form, and the
//! query methods on [`SchemaAst`] extract models, enums, datasources and
//! generators, validate relations and convert models to emitter tables.

mod ast;
mod lexer;
mod parser;
mod printer;
mod query;
mod token;

pub use ast::{
    Argument, Assignment, Attribute, Block, ConfigBlock, ConfigItem, Enum, EnumItem, EnumValue,
    Field, FieldModifier, FieldType, Model, ModelItem, SchemaAst, Value,
};
pub use lexer::tokenize;
pub use parser::{parse_schema, parse_unchecked};
pub use printer::print_schema;
pub use token::{Token, TokenKind};
