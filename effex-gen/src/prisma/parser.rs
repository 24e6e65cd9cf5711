//! Recursive-descent parser over the token stream

use std::collections::HashSet;

use super::ast::{
    Argument, Assignment, Attribute, Block, ConfigBlock, ConfigItem, Enum, EnumItem, EnumValue,
    Field, FieldModifier, FieldType, Model, ModelItem, SchemaAst, Value,
};
use super::lexer::tokenize;
use super::token::{Token, TokenKind};
use crate::error::ParseError;

/// Parse schema source text into a syntax tree and check its shape
///
/// # Errors
///
/// Returns a [`ParseError`] with a position for grammar violations, or
/// without one for shape violations (duplicate declarations or fields).
///
/// # Examples
///
/// ```
/// use effex_gen::prisma::{parse_schema, Block};
///
/// let ast = parse_schema("model User {\n  id Int @id\n}\n").unwrap();
/// assert!(matches!(&ast.list[0], Block::Model(m) if m.name == "User"));
/// ```
pub fn parse_schema(source: &str) -> Result<SchemaAst, ParseError> {
    let ast = parse_unchecked(source)?;
    validate_shape(&ast)?;
    Ok(ast)
}

/// Parse without shape validation
///
/// # Errors
///
/// Returns a [`ParseError`] for grammar violations.
pub fn parse_unchecked(source: &str) -> Result<SchemaAst, ParseError> {
    let tokens = tokenize(source)?;
    Parser { tokens, pos: 0 }.schema()
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn current(&self) -> &Token {
        // the lexer always ends the stream with Eof
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek_kind() == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<(), ParseError> {
        if self.eat(kind) {
            Ok(())
        } else {
            Err(self.unexpected(&kind.to_string()))
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        let token = self.current();
        ParseError::at(
            format!("Expected {expected}, found {}", token.kind),
            token.line,
            token.column,
        )
    }

    fn ident(&mut self) -> Result<String, ParseError> {
        if let TokenKind::Ident(name) = self.peek_kind() {
            let name = name.clone();
            self.advance();
            Ok(name)
        } else {
            Err(self.unexpected("identifier"))
        }
    }

    fn trailing_comment(&mut self) -> Option<String> {
        if let TokenKind::Comment(text) = self.peek_kind() {
            let text = text.clone();
            self.advance();
            Some(text)
        } else {
            None
        }
    }

    fn end_of_line(&mut self) -> Result<(), ParseError> {
        match self.peek_kind() {
            TokenKind::Newline => {
                self.advance();
                Ok(())
            }
            // the closing brace may share the last line
            TokenKind::RBrace | TokenKind::Eof => Ok(()),
            _ => Err(self.unexpected("end of line")),
        }
    }

    fn schema(&mut self) -> Result<SchemaAst, ParseError> {
        let mut list = Vec::new();
        loop {
            let token = self.current().clone();
            match &token.kind {
                TokenKind::Eof => break,
                TokenKind::Newline => {
                    self.advance();
                }
                TokenKind::Comment(text) => {
                    list.push(Block::Comment(text.clone()));
                    self.advance();
                }
                TokenKind::Ident(keyword) => {
                    self.advance();
                    let block = match keyword.as_str() {
                        "model" => Block::Model(self.model()?),
                        "enum" => Block::Enum(self.enumeration()?),
                        "datasource" => Block::Datasource(self.config_block()?),
                        "generator" => Block::Generator(self.config_block()?),
                        "type" => Block::CompositeType(self.model()?),
                        "view" => Block::View(self.model()?),
                        other => {
                            return Err(ParseError::at(
                                format!("Unknown block type '{other}'"),
                                token.line,
                                token.column,
                            ))
                        }
                    };
                    list.push(block);
                }
                _ => return Err(self.unexpected("a model, enum, datasource or generator block")),
            }
        }
        Ok(SchemaAst { list })
    }

    fn model(&mut self) -> Result<Model, ParseError> {
        let name = self.ident()?;
        self.expect(&TokenKind::LBrace)?;

        let mut properties = Vec::new();
        loop {
            match self.peek_kind().clone() {
                TokenKind::RBrace => {
                    self.advance();
                    break;
                }
                TokenKind::Newline => {
                    self.advance();
                }
                TokenKind::Comment(text) => {
                    self.advance();
                    properties.push(ModelItem::Comment(text));
                }
                TokenKind::AtAt => {
                    self.advance();
                    properties.push(ModelItem::Attribute(self.attribute()?));
                    if let Some(comment) = self.trailing_comment() {
                        properties.push(ModelItem::Comment(comment));
                    }
                    self.end_of_line()?;
                }
                TokenKind::Ident(_) => properties.push(ModelItem::Field(self.field()?)),
                _ => return Err(self.unexpected("field, block attribute or '}'")),
            }
        }

        Ok(Model { name, properties })
    }

    fn field(&mut self) -> Result<Field, ParseError> {
        let name = self.ident()?;
        let type_name = self.ident()?;

        let field_type = if type_name == "Unsupported" && self.eat(&TokenKind::LParen) {
            let TokenKind::Str(native) = self.peek_kind().clone() else {
                return Err(self.unexpected("string"));
            };
            self.advance();
            self.expect(&TokenKind::RParen)?;
            FieldType::Unsupported(native)
        } else {
            FieldType::Named(type_name)
        };

        let modifier = if self.eat(&TokenKind::Question) {
            Some(FieldModifier::Optional)
        } else if self.eat(&TokenKind::LBracket) {
            self.expect(&TokenKind::RBracket)?;
            Some(FieldModifier::List)
        } else {
            None
        };

        let mut attributes = Vec::new();
        while self.eat(&TokenKind::At) {
            attributes.push(self.attribute()?);
        }

        let comment = self.trailing_comment();
        self.end_of_line()?;

        Ok(Field {
            name,
            field_type,
            modifier,
            attributes,
            comment,
        })
    }

    /// Attribute after its `@` / `@@` prefix
    fn attribute(&mut self) -> Result<Attribute, ParseError> {
        let mut name = self.ident()?;
        while self.eat(&TokenKind::Dot) {
            name.push('.');
            name.push_str(&self.ident()?);
        }

        let args = if self.eat(&TokenKind::LParen) {
            self.arguments()?
        } else {
            Vec::new()
        };

        Ok(Attribute { name, args })
    }

    /// Comma-separated arguments after an opening parenthesis, through `)`
    fn arguments(&mut self) -> Result<Vec<Argument>, ParseError> {
        let mut args = Vec::new();
        loop {
            self.skip_newlines();
            if self.eat(&TokenKind::RParen) {
                break;
            }

            let named = matches!(self.peek_kind(), TokenKind::Ident(_))
                && self
                    .tokens
                    .get(self.pos + 1)
                    .is_some_and(|t| t.kind == TokenKind::Colon);
            let name = if named {
                let name = self.ident()?;
                self.advance();
                Some(name)
            } else {
                None
            };

            let value = self.value()?;
            args.push(Argument { name, value });

            self.skip_newlines();
            if !self.eat(&TokenKind::Comma) {
                self.expect(&TokenKind::RParen)?;
                break;
            }
        }
        Ok(args)
    }

    fn value(&mut self) -> Result<Value, ParseError> {
        match self.peek_kind().clone() {
            TokenKind::Str(s) => {
                self.advance();
                Ok(Value::String(s))
            }
            TokenKind::Number(n) => {
                self.advance();
                Ok(Value::Number(n))
            }
            TokenKind::LBracket => {
                self.advance();
                let mut items = Vec::new();
                loop {
                    self.skip_newlines();
                    if self.eat(&TokenKind::RBracket) {
                        break;
                    }
                    items.push(self.value()?);
                    self.skip_newlines();
                    if !self.eat(&TokenKind::Comma) {
                        self.expect(&TokenKind::RBracket)?;
                        break;
                    }
                }
                Ok(Value::Array(items))
            }
            TokenKind::Ident(name) => {
                self.advance();
                if self.eat(&TokenKind::LParen) {
                    let args = self.arguments()?;
                    Ok(Value::Function { name, args })
                } else {
                    Ok(match name.as_str() {
                        "true" => Value::Boolean(true),
                        "false" => Value::Boolean(false),
                        _ => Value::Ident(name),
                    })
                }
            }
            _ => Err(self.unexpected("value")),
        }
    }

    fn skip_newlines(&mut self) {
        while self.eat(&TokenKind::Newline) {}
    }

    fn enumeration(&mut self) -> Result<Enum, ParseError> {
        let name = self.ident()?;
        self.expect(&TokenKind::LBrace)?;

        let mut items = Vec::new();
        loop {
            match self.peek_kind().clone() {
                TokenKind::RBrace => {
                    self.advance();
                    break;
                }
                TokenKind::Newline => {
                    self.advance();
                }
                TokenKind::Comment(text) => {
                    self.advance();
                    items.push(EnumItem::Comment(text));
                }
                TokenKind::AtAt => {
                    self.advance();
                    items.push(EnumItem::Attribute(self.attribute()?));
                    if let Some(comment) = self.trailing_comment() {
                        items.push(EnumItem::Comment(comment));
                    }
                    self.end_of_line()?;
                }
                TokenKind::Ident(value) => {
                    self.advance();
                    let mut attributes = Vec::new();
                    while self.eat(&TokenKind::At) {
                        attributes.push(self.attribute()?);
                    }
                    let comment = self.trailing_comment();
                    self.end_of_line()?;
                    items.push(EnumItem::Value(EnumValue {
                        name: value,
                        attributes,
                        comment,
                    }));
                }
                _ => return Err(self.unexpected("enum value or '}'")),
            }
        }

        Ok(Enum { name, items })
    }

    fn config_block(&mut self) -> Result<ConfigBlock, ParseError> {
        let name = self.ident()?;
        self.expect(&TokenKind::LBrace)?;

        let mut items = Vec::new();
        loop {
            match self.peek_kind().clone() {
                TokenKind::RBrace => {
                    self.advance();
                    break;
                }
                TokenKind::Newline => {
                    self.advance();
                }
                TokenKind::Comment(text) => {
                    self.advance();
                    items.push(ConfigItem::Comment(text));
                }
                TokenKind::Ident(key) => {
                    self.advance();
                    self.expect(&TokenKind::Equals)?;
                    let value = self.value()?;
                    let comment = self.trailing_comment();
                    self.end_of_line()?;
                    items.push(ConfigItem::Assignment(Assignment { key, value, comment }));
                }
                _ => return Err(self.unexpected("assignment or '}'")),
            }
        }

        Ok(ConfigBlock { name, items })
    }
}

/// Reject duplicate declarations and duplicate members
fn validate_shape(ast: &SchemaAst) -> Result<(), ParseError> {
    let mut types = HashSet::new();
    let mut datasources = HashSet::new();
    let mut generators = HashSet::new();

    for block in &ast.list {
        let (seen, kind) = match block {
            Block::Model(_) | Block::Enum(_) | Block::CompositeType(_) | Block::View(_) => {
                (&mut types, "model or enum")
            }
            Block::Datasource(_) => (&mut datasources, "datasource"),
            Block::Generator(_) => (&mut generators, "generator"),
            Block::Comment(_) => continue,
        };
        if let Some(name) = block.name() {
            if !seen.insert(name) {
                return Err(ParseError::new(format!("Duplicate {kind} name '{name}'")));
            }
        }

        match block {
            Block::Model(model) | Block::CompositeType(model) | Block::View(model) => {
                let mut fields = HashSet::new();
                for field in model.fields() {
                    if !fields.insert(field.name.as_str()) {
                        return Err(ParseError::new(format!(
                            "Duplicate field '{}' in model '{}'",
                            field.name, model.name
                        )));
                    }
                }
            }
            Block::Enum(e) => {
                let mut values = HashSet::new();
                for value in e.values() {
                    if !values.insert(value.clone()) {
                        return Err(ParseError::new(format!(
                            "Duplicate value '{value}' in enum '{}'",
                            e.name
                        )));
                    }
                }
            }
            _ => {}
        }
    }

    Ok(())
}
