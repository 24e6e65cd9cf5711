//! Source type → validation schema type mapping
//!
//! The mapper is a pure, total function: every source type string produces a
//! [`TypeExpr`], and names it does not recognise become
//! [`TypeExpr::Unknown`] instead of an error.
//!
//! # Drizzle column builders
//!
//! - `text`, `varchar`, `char`, `citext`, `uuid` → string
//! - `numeric`, `decimal`, `time`, `interval` → string (drivers return text)
//! - `integer`, `smallint`, `serial`, `smallserial`, `real`, `doublePrecision` → number
//! - `bigint`, `bigserial` → big integer
//! - `boolean` → boolean
//! - `timestamp`, `date` → date
//! - `json`, `jsonb` → unknown
//!
//! # Schema description language primitives
//!
//! - `String` → string
//! - `Int`, `Float` → number
//! - `BigInt` → big integer
//! - `Boolean` → boolean
//! - `DateTime` → date
//! - `Bytes` → byte array
//! - `Json`, `Decimal` → unknown

use std::fmt;

/// Which schema language a type name comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceDialect {
    /// Drizzle `pgTable` column builders
    Drizzle,
    /// Prisma schema language
    Prisma,
}

impl fmt::Display for SourceDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Drizzle => f.write_str("drizzle"),
            Self::Prisma => f.write_str("prisma"),
        }
    }
}

/// Target-agnostic validation schema type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// UTF-8 string
    String,
    /// Floating point or 32-bit integer
    Number,
    /// Arbitrary precision integer
    BigInt,
    /// Boolean
    Boolean,
    /// Date/time value
    Date,
    /// Raw bytes
    Bytes,
    /// Type the mapper does not recognise
    Unknown,
    /// One of a fixed set of string literals
    Literals(Vec<String>),
    /// Array of the inner type
    Array(Box<TypeExpr>),
    /// Field may be omitted; `nullable` also admits an explicit null
    Optional {
        /// Wrapped type
        inner: Box<TypeExpr>,
        /// Whether null is accepted alongside a missing value
        nullable: bool,
    },
}

impl TypeExpr {
    /// Wrap in an array
    #[must_use]
    pub fn array(self) -> Self {
        Self::Array(Box::new(self))
    }

    /// Wrap as an optional field
    #[must_use]
    pub fn optional(self, nullable: bool) -> Self {
        Self::Optional {
            inner: Box::new(self),
            nullable,
        }
    }

    /// The type with any optional wrapper removed
    #[must_use]
    pub fn required(&self) -> &Self {
        match self {
            Self::Optional { inner, .. } => inner.required(),
            other => other,
        }
    }

    /// Whether this is the placeholder for unrecognised types
    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }
}

/// Map a source type name to its validation schema type
///
/// # Examples
///
/// ```
/// # use effex_gen::{map_type, SourceDialect, TypeExpr};
/// assert_eq!(map_type(SourceDialect::Drizzle, "varchar", false), TypeExpr::String);
/// assert_eq!(
///     map_type(SourceDialect::Prisma, "Int", true),
///     TypeExpr::Array(Box::new(TypeExpr::Number))
/// );
/// assert_eq!(map_type(SourceDialect::Drizzle, "geometry", false), TypeExpr::Unknown);
/// ```
#[must_use]
pub fn map_type(dialect: SourceDialect, source_type: &str, is_array: bool) -> TypeExpr {
    let base = match dialect {
        SourceDialect::Drizzle => map_drizzle(source_type),
        SourceDialect::Prisma => map_prisma(source_type),
    };

    if is_array {
        base.array()
    } else {
        base
    }
}

fn map_drizzle(source_type: &str) -> TypeExpr {
    match source_type {
        "text" | "varchar" | "char" | "citext" | "uuid" | "numeric" | "decimal" | "time"
        | "interval" => TypeExpr::String,
        "integer" | "smallint" | "serial" | "smallserial" | "real" | "doublePrecision" => {
            TypeExpr::Number
        }
        "bigint" | "bigserial" => TypeExpr::BigInt,
        "boolean" => TypeExpr::Boolean,
        "timestamp" | "date" => TypeExpr::Date,
        _ => TypeExpr::Unknown,
    }
}

fn map_prisma(source_type: &str) -> TypeExpr {
    match source_type {
        "String" => TypeExpr::String,
        "Int" | "Float" => TypeExpr::Number,
        "BigInt" => TypeExpr::BigInt,
        "Boolean" => TypeExpr::Boolean,
        "DateTime" => TypeExpr::Date,
        "Bytes" => TypeExpr::Bytes,
        _ => TypeExpr::Unknown,
    }
}

/// Drizzle column builders whose values are generated by the database
#[must_use]
pub fn has_implicit_default(dialect: SourceDialect, source_type: &str) -> bool {
    dialect == SourceDialect::Drizzle
        && matches!(source_type, "serial" | "smallserial" | "bigserial")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_drizzle_table() {
        let cases = [
            ("text", TypeExpr::String),
            ("varchar", TypeExpr::String),
            ("uuid", TypeExpr::String),
            ("integer", TypeExpr::Number),
            ("serial", TypeExpr::Number),
            ("bigint", TypeExpr::BigInt),
            ("boolean", TypeExpr::Boolean),
            ("timestamp", TypeExpr::Date),
            ("date", TypeExpr::Date),
            ("json", TypeExpr::Unknown),
            ("jsonb", TypeExpr::Unknown),
            ("real", TypeExpr::Number),
            ("doublePrecision", TypeExpr::Number),
        ];

        for (source, expected) in cases {
            assert_eq!(map_type(SourceDialect::Drizzle, source, false), expected, "{source}");
        }
    }

    #[test]
    fn test_prisma_table() {
        assert_eq!(map_type(SourceDialect::Prisma, "String", false), TypeExpr::String);
        assert_eq!(map_type(SourceDialect::Prisma, "Float", false), TypeExpr::Number);
        assert_eq!(map_type(SourceDialect::Prisma, "DateTime", false), TypeExpr::Date);
        assert_eq!(map_type(SourceDialect::Prisma, "Json", false), TypeExpr::Unknown);
        assert_eq!(map_type(SourceDialect::Prisma, "Bytes", false), TypeExpr::Bytes);
    }

    #[test]
    fn test_prisma_decimal_and_bytes() {
        // Decimal arrives as a decimal.js object and Bytes as a Uint8Array
        assert_eq!(map_type(SourceDialect::Prisma, "Decimal", false), TypeExpr::Unknown);
        assert_eq!(map_type(SourceDialect::Prisma, "Bytes", false), TypeExpr::Bytes);
        assert_ne!(map_type(SourceDialect::Prisma, "Decimal", false), TypeExpr::Number);
        assert_ne!(map_type(SourceDialect::Prisma, "Bytes", false), TypeExpr::String);
    }

    #[test]
    fn test_array_wrapping() {
        assert_eq!(
            map_type(SourceDialect::Drizzle, "text", true),
            TypeExpr::String.array()
        );
        assert_eq!(
            map_type(SourceDialect::Drizzle, "unheard_of", true),
            TypeExpr::Unknown.array()
        );
    }

    #[test]
    fn test_dialects_do_not_share_names() {
        assert_eq!(map_type(SourceDialect::Prisma, "text", false), TypeExpr::Unknown);
        assert_eq!(map_type(SourceDialect::Drizzle, "String", false), TypeExpr::Unknown);
    }

    #[test]
    fn test_required_strips_optional() {
        let expr = TypeExpr::Number.optional(true);
        assert_eq!(expr.required(), &TypeExpr::Number);
        assert_eq!(TypeExpr::Boolean.required(), &TypeExpr::Boolean);
    }

    #[test]
    fn test_implicit_defaults() {
        assert!(has_implicit_default(SourceDialect::Drizzle, "serial"));
        assert!(has_implicit_default(SourceDialect::Drizzle, "bigserial"));
        assert!(!has_implicit_default(SourceDialect::Drizzle, "integer"));
        assert!(!has_implicit_default(SourceDialect::Prisma, "serial"));
    }

    proptest! {
        #[test]
        fn prop_mapping_is_total_and_deterministic(
            name in "\\PC{0,24}",
            is_array in any::<bool>(),
            prisma in any::<bool>(),
        ) {
            let dialect = if prisma { SourceDialect::Prisma } else { SourceDialect::Drizzle };
            let first = map_type(dialect, &name, is_array);
            let second = map_type(dialect, &name, is_array);
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(matches!(first, TypeExpr::Array(_)), is_array);
        }

        #[test]
        fn prop_unrecognised_names_map_to_unknown(name in "zz[a-z]{1,12}") {
            prop_assert_eq!(map_type(SourceDialect::Drizzle, &name, false), TypeExpr::Unknown);
            prop_assert_eq!(map_type(SourceDialect::Prisma, &name, false), TypeExpr::Unknown);
        }
    }
}
