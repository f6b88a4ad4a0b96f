use std::{borrow::Cow, cmp::Reverse};

use crate::{
    ast::{Comparison, Conjunction, Operand, Operator, Query, SortClause},
    compiler::CompiledQuery,
    value::{SortKey, Value},
};

/// Apply an operator to two values read from (or parsed for) the same field.
///
/// String matching lowercases both sides. Null never matches a positive
/// string or ordering operator; the negated forms are its complement.
pub fn apply_operator(op: Operator, left: &Value, right: &Value) -> bool {
    use std::cmp::Ordering::*;

    match op {
        Operator::Equal => left.loose_eq(right),
        Operator::NotEqual => !left.loose_eq(right),

        Operator::LessThan => left.partial_order(right) == Some(Less),
        Operator::LessEqual => matches!(left.partial_order(right), Some(Less | Equal)),
        Operator::GreaterThan => left.partial_order(right) == Some(Greater),
        Operator::GreaterEqual => matches!(left.partial_order(right), Some(Greater | Equal)),

        Operator::StartsWith => string_match(left, right, |l, r| l.starts_with(r)),
        Operator::NotStartsWith => !string_match(left, right, |l, r| l.starts_with(r)),
        Operator::EndsWith => string_match(left, right, |l, r| l.ends_with(r)),
        Operator::NotEndsWith => !string_match(left, right, |l, r| l.ends_with(r)),
        Operator::Contains => string_match(left, right, |l, r| l.contains(r)),
        Operator::NotContains => !string_match(left, right, |l, r| l.contains(r)),
    }
}

fn string_match(left: &Value, right: &Value, matcher: impl Fn(&str, &str) -> bool) -> bool {
    match (left, right) {
        (Value::String(l), Value::String(r)) => matcher(&l.to_lowercase(), &r.to_lowercase()),
        _ => false,
    }
}

impl<R> Comparison<'_, R> {
    pub fn matches(&self, record: &R) -> bool {
        let left = self.target.read(record);
        let right = match &self.operand {
            Operand::Literal(value) => Cow::Borrowed(value),
            Operand::Field(field) => Cow::Owned(field.read(record)),
        };
        apply_operator(self.operator, &left, &right)
    }
}

impl<R> Conjunction<'_, R> {
    /// Every comparison holds.
    pub fn matches(&self, record: &R) -> bool {
        self.comparisons.iter().all(|c| c.matches(record))
    }
}

impl<R> Query<'_, R> {
    /// Some group holds. The empty query matches everything.
    pub fn matches(&self, record: &R) -> bool {
        self.groups.is_empty() || self.groups.iter().any(|g| g.matches(record))
    }
}

impl<R> SortClause<'_, R> {
    pub fn key(&self, record: &R) -> SortKey {
        SortKey::new(self.field.read(record), self.field.variants())
    }

    /// Stable sort by the clause's field.
    pub fn sort<'r>(&self, records: &mut [&'r R]) {
        if self.descending {
            records.sort_by_cached_key(|record| Reverse(self.key(record)));
        } else {
            records.sort_by_cached_key(|record| self.key(record));
        }
    }
}

/// Filter and sort records.
///
/// Filtering is lazy over `records`; the result is materialized so that it
/// can be counted, paged and iterated any number of times.
pub fn evaluate<'r, R>(
    query: &Query<'_, R>,
    sort: Option<&SortClause<'_, R>>,
    records: impl IntoIterator<Item = &'r R>,
) -> Vec<&'r R>
where
    R: 'r,
{
    let mut matched: Vec<&'r R> = records.into_iter().filter(|r| query.matches(r)).collect();
    if let Some(sort) = sort {
        sort.sort(&mut matched);
    }
    matched
}

impl<R> CompiledQuery<'_, R> {
    pub fn matches(&self, record: &R) -> bool {
        self.query.matches(record)
    }

    /// Lazily filter records, ignoring the sort clause.
    pub fn filter<'r, I>(&self, records: I) -> impl Iterator<Item = &'r R>
    where
        I: IntoIterator<Item = &'r R>,
        R: 'r,
    {
        records.into_iter().filter(|r| self.query.matches(r))
    }

    /// Filter and sort records.
    pub fn apply<'r, I>(&self, records: I) -> Vec<&'r R>
    where
        I: IntoIterator<Item = &'r R>,
        R: 'r,
    {
        evaluate(&self.query, self.sort.as_ref(), records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_semantics() {
        let title = Value::from("Item1");
        assert!(!apply_operator(Operator::Contains, &Value::Null, &title));
        assert!(apply_operator(Operator::NotContains, &Value::Null, &title));
        assert!(!apply_operator(Operator::Equal, &Value::Null, &title));
        assert!(apply_operator(Operator::NotEqual, &Value::Null, &title));
        assert!(!apply_operator(Operator::LessThan, &Value::Null, &Value::Integer(1)));
        assert!(!apply_operator(Operator::GreaterEqual, &Value::Null, &Value::Integer(1)));
    }

    #[test]
    fn test_string_match_ignores_case() {
        let title = Value::from("Item1");
        assert!(apply_operator(Operator::Contains, &title, &Value::from("ITEM")));
        assert!(apply_operator(Operator::StartsWith, &title, &Value::from("it")));
        assert!(apply_operator(Operator::EndsWith, &title, &Value::from("M1")));
        assert!(apply_operator(Operator::NotEndsWith, &title, &Value::from("2")));
    }
}
