//! Query error types

use thiserror::Error;

use crate::{lexer::LexError, schema::TypeClass};

/// A query string that cannot be compiled.
///
/// Every variant is the user's mistake and is meant to be shown to them
/// verbatim (for example as the body of a 400 response).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    /// Malformed quote, escape or number
    #[error("{0}")]
    Lex(#[from] LexError),

    /// Field name not declared queryable for the entity
    #[error("property \"{field}\" not in type {entity}")]
    UnknownField { field: String, entity: String },

    /// `orderby` / `orderbydescending` without a field after it
    #[error("incomplete: include property to sort by")]
    MissingSortField,

    /// Field name without an operator or right-hand side
    #[error("incomplete query: {clause} ...")]
    Incomplete { clause: String },

    /// Literal following a complete comparison
    #[error("literal must be separated by `,` or `&`: {0}")]
    UnseparatedLiteral(String),

    /// Token in separator position that is not `,`, `&` or a sort keyword
    #[error("invalid operator: {0}")]
    InvalidOperator(String),

    /// Unknown operator, or one the field's type class does not accept
    #[error("unsupported or type-mismatched operator \"{operator}\" for property \"{field}\"")]
    UnsupportedOperator { operator: String, field: String },

    /// Literal that does not parse as the field's type
    #[error("unable to parse literal \"{literal}\" as {type_class} for property \"{field}\"")]
    InvalidLiteral {
        literal: String,
        field: String,
        type_class: TypeClass,
    },

    /// Bare literal against a schema without a default field
    #[error("type {entity} has no default property; name a property to compare {literal:?} against")]
    NoDefaultField { entity: String, literal: String },

    /// Field-to-field comparison across type classes
    #[error(
        "cannot compare property \"{left}\" ({left_type}) with property \"{right}\" ({right_type})"
    )]
    FieldTypeMismatch {
        left: String,
        left_type: TypeClass,
        right: String,
        right_type: TypeClass,
    },
}
