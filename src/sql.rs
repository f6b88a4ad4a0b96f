//! Translate compiled queries into SQL with sea-query.
//!
//! Each field maps to the column of its declared name. The translation keeps
//! the in-memory semantics: string comparisons ignore case, negated operators
//! also match NULL, and `orderby` puts NULL first.

use sea_query::{
    Alias, Asterisk, Cond, Expr, Func, LikeExpr, NullOrdering, Order, PostgresQueryBuilder,
    SelectStatement, SimpleExpr, Value as SqlValue,
};
use tracing::debug;

use crate::{
    ast::{Comparison, Operand, Operator, Query, SortClause},
    compiler::CompiledQuery,
    schema::{FieldDescriptor, TypeClass},
    value::Value,
};

/// Builds `SELECT * FROM <table> ...` statements from compiled queries.
#[derive(Debug, Clone)]
pub struct SqlTranslator {
    table: String,
}

impl SqlTranslator {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
        }
    }

    pub fn select<R>(&self, compiled: &CompiledQuery<'_, R>) -> SelectStatement {
        let mut select = SelectStatement::new();
        select.column(Asterisk).from(Alias::new(self.table.as_str()));

        if let Some(cond) = self.condition(compiled.query()) {
            select.cond_where(cond);
        }
        if let Some(sort) = compiled.sort() {
            self.order_by(&mut select, sort);
        }
        select
    }

    /// Render the statement for PostgreSQL with values inlined.
    pub fn to_postgres<R>(&self, compiled: &CompiledQuery<'_, R>) -> String {
        let sql = self.select(compiled).to_string(PostgresQueryBuilder);
        debug!(table = %self.table, sql = %sql, "translated user query");
        sql
    }

    /// WHERE condition for a query, or `None` for the empty query.
    pub fn condition<R>(&self, query: &Query<'_, R>) -> Option<Cond> {
        if query.is_empty() {
            return None;
        }
        let mut any = Cond::any();
        for group in &query.groups {
            let mut all = Cond::all();
            for comparison in &group.comparisons {
                all = all.add(comparison_expr(comparison));
            }
            any = any.add(all);
        }
        Some(any)
    }

    fn order_by<R>(&self, select: &mut SelectStatement, sort: &SortClause<'_, R>) {
        let field = sort.field;
        let keys = match field.type_class() {
            TypeClass::String => vec![lower(field), column(field).into()],
            TypeClass::Enum => vec![variant_index(field)],
            _ => vec![column(field).into()],
        };

        for key in keys {
            if sort.descending {
                select.order_by_expr_with_nulls(key, Order::Desc, NullOrdering::Last);
            } else {
                select.order_by_expr_with_nulls(key, Order::Asc, NullOrdering::First);
            }
        }
    }
}

fn column<R>(field: &FieldDescriptor<R>) -> Expr {
    Expr::col(Alias::new(field.name()))
}

fn lower<R>(field: &FieldDescriptor<R>) -> SimpleExpr {
    Func::lower(column(field)).into()
}

/// Declaration index of the enum value held in the column.
fn variant_index<R>(field: &FieldDescriptor<R>) -> SimpleExpr {
    let mut variants = field.variants().iter().enumerate();
    let Some((_, first)) = variants.next() else {
        return column(field).into();
    };
    let mut case = Expr::case(column(field).eq(Expr::val(first.as_str())), Expr::val(0i64));
    for (index, name) in variants {
        case = case.case(column(field).eq(Expr::val(name.as_str())), Expr::val(index as i64));
    }
    case.finally(Expr::val(field.variants().len() as i64)).into()
}

fn sql_value(v: &Value) -> SqlValue {
    match v {
        Value::Null => SqlValue::String(None),
        Value::Integer(n) => SqlValue::BigInt(Some(*n)),
        Value::Float(n) => SqlValue::Double(Some(*n)),
        Value::Duration(d) => SqlValue::Double(Some(d.as_secs_f64())),
        Value::String(s) => SqlValue::String(Some(Box::new(s.to_lowercase()))),
        Value::Enum(s) => SqlValue::String(Some(Box::new(s.clone()))),
    }
}

/// LIKE pattern with `\` as the escape character.
fn like_pattern(prefix: &str, text: &str, suffix: &str) -> LikeExpr {
    let mut pattern = String::from(prefix);
    for ch in text.to_lowercase().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push_str(suffix);
    LikeExpr::new(pattern).escape('\\')
}

fn comparison_expr<R>(comparison: &Comparison<'_, R>) -> SimpleExpr {
    let field = comparison.target;
    match &comparison.operand {
        Operand::Literal(value) => literal_expr(field, comparison.operator, value),
        Operand::Field(other) => field_expr(field, comparison.operator, other),
    }
}

fn literal_expr<R>(field: &FieldDescriptor<R>, op: Operator, value: &Value) -> SimpleExpr {
    if value.is_null() {
        return match op {
            Operator::Equal => column(field).is_null(),
            _ => column(field).is_not_null(),
        };
    }

    let text = match value {
        Value::String(s) => s.as_str(),
        _ => "",
    };
    let is_string = field.type_class() == TypeClass::String;
    let lhs = || -> Expr {
        if is_string {
            Expr::expr(lower(field))
        } else {
            column(field)
        }
    };
    let rhs = || SimpleExpr::Value(sql_value(value));

    let positive = match op {
        Operator::Equal | Operator::NotEqual => lhs().eq(rhs()),
        Operator::LessThan => return lhs().lt(rhs()),
        Operator::LessEqual => return lhs().lte(rhs()),
        Operator::GreaterThan => return lhs().gt(rhs()),
        Operator::GreaterEqual => return lhs().gte(rhs()),
        Operator::StartsWith | Operator::NotStartsWith => lhs().like(like_pattern("", text, "%")),
        Operator::EndsWith | Operator::NotEndsWith => lhs().like(like_pattern("%", text, "")),
        Operator::Contains | Operator::NotContains => lhs().like(like_pattern("%", text, "%")),
    };

    if op.is_negated() {
        positive.not().or(column(field).is_null())
    } else {
        positive
    }
}

fn field_expr<R>(field: &FieldDescriptor<R>, op: Operator, other: &FieldDescriptor<R>) -> SimpleExpr {
    let is_string = field.type_class() == TypeClass::String;
    let side = |f: &FieldDescriptor<R>| -> Expr {
        if is_string {
            Expr::expr(lower(f))
        } else {
            column(f)
        }
    };
    match op {
        Operator::Equal => {
            Expr::cust_with_exprs("$1 IS NOT DISTINCT FROM $2", [SimpleExpr::from(side(field)), SimpleExpr::from(side(other))])
        }
        Operator::NotEqual => {
            Expr::cust_with_exprs("$1 IS DISTINCT FROM $2", [SimpleExpr::from(side(field)), SimpleExpr::from(side(other))])
        }
        Operator::LessThan => side(field).lt(side(other)),
        Operator::LessEqual => side(field).lte(side(other)),
        Operator::GreaterThan => side(field).gt(side(other)),
        Operator::GreaterEqual => side(field).gte(side(other)),
        _ => {
            let template = match op {
                Operator::StartsWith | Operator::NotStartsWith => "STRPOS(LOWER($1), LOWER($2)) = 1",
                Operator::EndsWith | Operator::NotEndsWith => "RIGHT(LOWER($1), LENGTH($2)) = LOWER($2)",
                _ => "STRPOS(LOWER($1), LOWER($2)) > 0",
            };
            let positive = Expr::cust_with_exprs(template, [SimpleExpr::from(column(field)), SimpleExpr::from(column(other))]);
            if op.is_negated() {
                positive.not().or(column(field).is_null()).or(column(other).is_null())
            } else {
                positive
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        compiler::compile,
        schema::{EntitySchema, FieldDeclaration, SchemaDeclaration, build_schema},
    };

    struct Row;

    fn schema() -> EntitySchema<Row> {
        build_schema(
            SchemaDeclaration::new("track")
                .field(FieldDeclaration::new("title", TypeClass::String).read(|_: &Row| Value::Null))
                .field(FieldDeclaration::new("rating", TypeClass::Int).read(|_: &Row| Value::Null))
                .field(FieldDeclaration::new("plays", TypeClass::Int).read(|_: &Row| Value::Null))
                .field(
                    FieldDeclaration::new("genre", TypeClass::Enum)
                        .variants(["Jazz", "Rock"])
                        .read(|_: &Row| Value::Null),
                )
                .default_field("title"),
        )
        .unwrap()
    }

    fn sql(query: &str) -> String {
        let schema = schema();
        let compiled = compile(query, &schema).unwrap();
        SqlTranslator::new("tracks").to_postgres(&compiled)
    }

    #[test]
    fn test_empty_query_has_no_where() {
        let sql = sql("");
        assert_eq!(sql, r#"SELECT * FROM "tracks""#);
    }

    #[test]
    fn test_groups_and_conjunctions() {
        let sql = sql("rating > 1 & rating < 5, title = 'Waffles'");
        assert!(sql.contains(r#""rating" > 1"#), "{sql}");
        assert!(sql.contains(r#""rating" < 5"#), "{sql}");
        assert!(sql.contains(" OR "), "{sql}");
        assert!(sql.contains(r#"LOWER("title") = 'waffles'"#), "{sql}");
    }

    #[test]
    fn test_like_patterns_are_escaped() {
        let sql = sql("title ^ '50%_x'");
        assert!(sql.contains(r#"LOWER("title") LIKE E'50\\%\\_x%' ESCAPE E'\\'"#), "{sql}");
    }

    #[test]
    fn test_negated_match_includes_null() {
        let sql = sql("title !* 'live'");
        assert!(sql.contains("NOT"), "{sql}");
        assert!(sql.contains(r#""title" IS NULL"#), "{sql}");
    }

    #[test]
    fn test_field_to_field() {
        let sql = sql("rating >= plays");
        assert!(sql.contains(r#""rating" >= "plays""#), "{sql}");
    }

    #[test]
    fn test_order_by_enum_declaration() {
        let sql = sql("orderbydescending genre");
        assert!(sql.contains("CASE"), "{sql}");
        assert!(sql.contains("DESC NULLS LAST"), "{sql}");
    }
}
