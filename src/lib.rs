pub mod ast;
#[cfg(feature = "cli")]
pub mod cli;
pub mod compiler;
pub mod error;
pub mod evaluator;
pub mod json;
pub mod lexer;
pub mod parser;
pub mod schema;
#[cfg(feature = "sql")]
pub mod sql;
pub mod value;

pub use ast::{Comparison, Conjunction, Operand, Operator, Query, SortClause, Token};
pub use compiler::{CompiledQuery, compile, compile_comparison};
pub use error::QueryError;
pub use evaluator::evaluate;
pub use json::{ConfigError, SchemaConfig};
pub use lexer::{LexError, Lexer, Position, tokenize};
pub use parser::{Parser, parse};
pub use schema::{
    EntitySchema, FieldDeclaration, FieldDescriptor, Queryable, SchemaDeclaration, SchemaError,
    TypeClass, build_schema,
};
#[cfg(feature = "sql")]
pub use sql::SqlTranslator;
pub use value::Value;
