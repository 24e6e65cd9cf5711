//! Typed syntax tree for the schema description language

/// Root of a parsed schema: top-level declarations in source order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaAst {
    /// Declarations and free-standing comments
    pub list: Vec<Block>,
}

/// A top-level declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// `model Name { ... }`
    Model(Model),
    /// `enum Name { ... }`
    Enum(Enum),
    /// `datasource name { ... }`
    Datasource(ConfigBlock),
    /// `generator name { ... }`
    Generator(ConfigBlock),
    /// `type Name { ... }` composite type; parsed, never generated
    CompositeType(Model),
    /// `view Name { ... }`; parsed, never generated
    View(Model),
    /// Comment line between declarations
    Comment(String),
}

impl Block {
    /// Declared name, `None` for comments
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Model(model) | Self::CompositeType(model) | Self::View(model) => {
                Some(&model.name)
            }
            Self::Enum(e) => Some(&e.name),
            Self::Datasource(block) | Self::Generator(block) => Some(&block.name),
            Self::Comment(_) => None,
        }
    }
}

/// `model` declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    /// Model name
    pub name: String,
    /// Fields, block attributes and comments in source order
    pub properties: Vec<ModelItem>,
}

impl Model {
    /// Fields in declaration order
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.properties.iter().filter_map(|item| match item {
            ModelItem::Field(field) => Some(field),
            _ => None,
        })
    }

    /// `@@` attributes in declaration order
    pub fn block_attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.properties.iter().filter_map(|item| match item {
            ModelItem::Attribute(attr) => Some(attr),
            _ => None,
        })
    }

    /// First block attribute with the given name
    #[must_use]
    pub fn block_attribute(&self, name: &str) -> Option<&Attribute> {
        self.block_attributes().find(|a| a.name == name)
    }
}

/// Entry of a model body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelItem {
    /// Field declaration
    Field(Field),
    /// `@@` attribute
    Attribute(Attribute),
    /// Comment line
    Comment(String),
}

/// Model field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field name
    pub name: String,
    /// Declared type
    pub field_type: FieldType,
    /// `?` or `[]`
    pub modifier: Option<FieldModifier>,
    /// `@` attributes
    pub attributes: Vec<Attribute>,
    /// Trailing comment on the field line
    pub comment: Option<String>,
}

impl Field {
    /// First attribute with the given name
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Whether the field carries the given attribute
    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// `?` modifier present
    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.modifier == Some(FieldModifier::Optional)
    }

    /// `[]` modifier present
    #[must_use]
    pub fn is_list(&self) -> bool {
        self.modifier == Some(FieldModifier::List)
    }
}

/// Field type reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    /// Scalar, enum or model name
    Named(String),
    /// `Unsupported("native type")`
    Unsupported(String),
}

impl FieldType {
    /// Type name for lookups; unsupported types have none
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Named(name) => Some(name),
            Self::Unsupported(_) => None,
        }
    }
}

/// Type modifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldModifier {
    /// `?`
    Optional,
    /// `[]`
    List,
}

/// `@name(args)` or `@@name(args)`; `name` may be dotted (`db.VarChar`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name without the `@` prefix
    pub name: String,
    /// Arguments, empty when written without parentheses
    pub args: Vec<Argument>,
}

impl Attribute {
    /// Named argument, or the first positional one when `name` is absent
    #[must_use]
    pub fn arg(&self, name: &str) -> Option<&Value> {
        self.args
            .iter()
            .find(|a| a.name.as_deref() == Some(name))
            .or_else(|| self.args.iter().find(|a| a.name.is_none()))
            .map(|a| &a.value)
    }
}

/// Attribute or function argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    /// `name:` prefix
    pub name: Option<String>,
    /// Argument value
    pub value: Value,
}

/// Argument or assignment value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// String literal
    String(String),
    /// Numeric literal as written
    Number(String),
    /// `true` / `false`
    Boolean(bool),
    /// Bare identifier (`Cascade`, a field reference)
    Ident(String),
    /// `[a, b]`
    Array(Vec<Value>),
    /// `now()`, `env("URL")`
    Function {
        /// Function name
        name: String,
        /// Arguments
        args: Vec<Argument>,
    },
}

impl Value {
    /// Identifiers listed in an array value (`[id, email]`)
    #[must_use]
    pub fn idents(&self) -> Vec<&str> {
        match self {
            Self::Array(items) => items
                .iter()
                .filter_map(|v| match v {
                    Self::Ident(name) => Some(name.as_str()),
                    _ => None,
                })
                .collect(),
            Self::Ident(name) => vec![name.as_str()],
            _ => Vec::new(),
        }
    }

    /// String literal content
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

/// `enum` declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enum {
    /// Enum name
    pub name: String,
    /// Values, block attributes and comments in source order
    pub items: Vec<EnumItem>,
}

impl Enum {
    /// Value names in declaration order
    #[must_use]
    pub fn values(&self) -> Vec<String> {
        self.items
            .iter()
            .filter_map(|item| match item {
                EnumItem::Value(value) => Some(value.name.clone()),
                _ => None,
            })
            .collect()
    }
}

/// Entry of an enum body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumItem {
    /// Enum value
    Value(EnumValue),
    /// `@@` attribute
    Attribute(Attribute),
    /// Comment line
    Comment(String),
}

/// Enum value line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    /// Value name
    pub name: String,
    /// `@` attributes
    pub attributes: Vec<Attribute>,
    /// Trailing comment
    pub comment: Option<String>,
}

/// `datasource` or `generator` declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigBlock {
    /// Block name
    pub name: String,
    /// Assignments and comments in source order
    pub items: Vec<ConfigItem>,
}

impl ConfigBlock {
    /// Value assigned to `key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.items.iter().find_map(|item| match item {
            ConfigItem::Assignment(a) if a.key == key => Some(&a.value),
            _ => None,
        })
    }
}

/// Entry of a datasource or generator body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigItem {
    /// `key = value`
    Assignment(Assignment),
    /// Comment line
    Comment(String),
}

/// `key = value` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// Key
    pub key: String,
    /// Value
    pub value: Value,
    /// Trailing comment
    pub comment: Option<String>,
}
