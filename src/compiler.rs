//! Comparison compiler and the `compile` entry point.

use tracing::debug;

use crate::{
    ast::{Comparison, Operand, Operator, Query, SortClause, Token},
    error::QueryError,
    lexer::Lexer,
    parser::Parser,
    schema::{EntitySchema, FieldDescriptor},
};

/// A query string compiled against a schema.
///
/// Borrows the schema it was compiled against; apply it with
/// [`CompiledQuery::apply`] or translate [`CompiledQuery::query`] for another
/// backend.
pub struct CompiledQuery<'s, R> {
    pub(crate) query: Query<'s, R>,
    pub(crate) sort: Option<SortClause<'s, R>>,
}

impl<'s, R> CompiledQuery<'s, R> {
    pub fn new(query: Query<'s, R>, sort: Option<SortClause<'s, R>>) -> Self {
        CompiledQuery { query, sort }
    }

    pub fn query(&self) -> &Query<'s, R> {
        &self.query
    }

    pub fn sort(&self) -> Option<&SortClause<'s, R>> {
        self.sort.as_ref()
    }

    pub fn into_parts(self) -> (Query<'s, R>, Option<SortClause<'s, R>>) {
        (self.query, self.sort)
    }
}

impl<R> std::fmt::Display for CompiledQuery<'_, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.query)?;
        if let Some(sort) = &self.sort {
            if !self.query.is_empty() {
                f.write_str(" ")?;
            }
            write!(f, "{}", sort)?;
        }
        Ok(())
    }
}

impl<R> std::fmt::Debug for CompiledQuery<'_, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledQuery")
            .field("query", &self.query)
            .field("sort", &self.sort)
            .finish()
    }
}

/// Compile a query string against a schema.
///
/// # Examples
///
/// ```
/// use userquery::{compile, FieldDeclaration, SchemaDeclaration, TypeClass, build_schema};
///
/// struct Item {
///     title: &'static str,
///     rating: i64,
/// }
///
/// let schema = build_schema(
///     SchemaDeclaration::new("item")
///         .field(FieldDeclaration::new("title", TypeClass::String).read(|i: &Item| i.title.into()))
///         .field(FieldDeclaration::new("rating", TypeClass::Int).read(|i: &Item| i.rating.into()))
///         .default_field("title"),
/// )
/// .unwrap();
///
/// let items = [
///     Item { title: "Item1", rating: 1 },
///     Item { title: "Item2", rating: 5 },
///     Item { title: "Item3", rating: 10 },
/// ];
///
/// let query = compile("rating > 1 orderbydescending rating", &schema).unwrap();
/// let titles: Vec<_> = query.apply(&items).iter().map(|i| i.title).collect();
/// assert_eq!(titles, ["Item3", "Item2"]);
/// ```
pub fn compile<'s, R>(
    query_text: &str,
    schema: &'s EntitySchema<R>,
) -> Result<CompiledQuery<'s, R>, QueryError> {
    let parser = Parser::new(Lexer::new(query_text), schema)?;
    let compiled = parser.parse()?;
    debug!(
        entity = schema.entity(),
        query = query_text,
        groups = compiled.query.groups.len(),
        sort = ?compiled.sort.as_ref().map(ToString::to_string),
        "compiled user query"
    );
    Ok(compiled)
}

/// Resolve a field-name token against the schema.
pub fn resolve_field<'s, R>(
    schema: &'s EntitySchema<R>,
    token: &Token,
) -> Result<&'s FieldDescriptor<R>, QueryError> {
    if token.sort_keyword().is_some() {
        return Err(QueryError::MissingSortField);
    }
    schema.field(&token.value).ok_or_else(|| QueryError::UnknownField {
        field: token.value.clone(),
        entity: schema.entity().to_string(),
    })
}

/// Compile one comparison.
///
/// `target` names the field, `rhs` is a literal or another field name, and
/// `operator` defaults to `*` (contains) when absent.
pub fn compile_comparison<'s, R>(
    schema: &'s EntitySchema<R>,
    target: &Token,
    rhs: &Token,
    operator: Option<&Token>,
) -> Result<Comparison<'s, R>, QueryError> {
    let field = resolve_field(schema, target)?;

    let operator = match operator {
        None => Operator::DEFAULT,
        Some(token) => {
            let op = (!token.is_literal)
                .then(|| Operator::from_symbol(&token.value))
                .flatten();
            match op {
                Some(op) => op,
                None => return Err(unsupported(&token.value, field)),
            }
        }
    };
    if !field.supports(operator) {
        return Err(unsupported(operator.symbol(), field));
    }

    let operand = if rhs.is_literal {
        Operand::Literal(field.parse_literal(&rhs.value)?)
    } else {
        let other = resolve_field(schema, rhs)?;
        if other.type_class() != field.type_class() {
            return Err(QueryError::FieldTypeMismatch {
                left: field.query_name().to_string(),
                left_type: field.type_class(),
                right: other.query_name().to_string(),
                right_type: other.type_class(),
            });
        }
        Operand::Field(other)
    };

    Ok(Comparison {
        target: field,
        operator,
        operand,
    })
}

fn unsupported<R>(operator: &str, field: &FieldDescriptor<R>) -> QueryError {
    QueryError::UnsupportedOperator {
        operator: operator.to_string(),
        field: field.query_name().to_string(),
    }
}
