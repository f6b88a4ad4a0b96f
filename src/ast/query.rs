use crate::{ast::Operator, schema::FieldDescriptor, value::Value};

/// Right-hand side of a comparison.
pub enum Operand<'s, R> {
    /// Literal already parsed into the target field's type
    ///
    /// # Example
    /// ```text
    /// rating > 5
    /// ```
    Literal(Value),

    /// Another field of the same record
    ///
    /// # Example
    /// ```text
    /// rating >= order
    /// ```
    Field(&'s FieldDescriptor<R>),
}

/// Leaf of a compiled query: one type-checked comparison.
pub struct Comparison<'s, R> {
    pub target: &'s FieldDescriptor<R>,
    pub operator: Operator,
    pub operand: Operand<'s, R>,
}

/// Comparisons joined with `&` (logical AND).
pub struct Conjunction<'s, R> {
    pub comparisons: Vec<Comparison<'s, R>>,
}

impl<'s, R> Conjunction<'s, R> {
    pub fn new() -> Self {
        Conjunction {
            comparisons: Vec::new(),
        }
    }

    pub fn push(&mut self, comparison: Comparison<'s, R>) {
        self.comparisons.push(comparison);
    }

    pub fn is_empty(&self) -> bool {
        self.comparisons.is_empty()
    }
}

impl<R> Default for Conjunction<'_, R> {
    fn default() -> Self {
        Conjunction::new()
    }
}

/// Groups separated by `,` (logical OR).
///
/// A query without groups matches every record.
pub struct Query<'s, R> {
    pub groups: Vec<Conjunction<'s, R>>,
}

impl<R> Query<'_, R> {
    /// Matches everything.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// `orderby <field>` or `orderbydescending <field>`.
pub struct SortClause<'s, R> {
    pub field: &'s FieldDescriptor<R>,
    pub descending: bool,
}

// Hand-written so that no bound is placed on the record type.
impl<R> Clone for Operand<'_, R> {
    fn clone(&self) -> Self {
        match self {
            Operand::Literal(v) => Operand::Literal(v.clone()),
            Operand::Field(f) => Operand::Field(*f),
        }
    }
}

impl<R> Clone for Comparison<'_, R> {
    fn clone(&self) -> Self {
        Comparison {
            target: self.target,
            operator: self.operator,
            operand: self.operand.clone(),
        }
    }
}

impl<R> Clone for Conjunction<'_, R> {
    fn clone(&self) -> Self {
        Conjunction {
            comparisons: self.comparisons.clone(),
        }
    }
}

impl<R> Clone for Query<'_, R> {
    fn clone(&self) -> Self {
        Query {
            groups: self.groups.clone(),
        }
    }
}

impl<R> Clone for SortClause<'_, R> {
    fn clone(&self) -> Self {
        SortClause {
            field: self.field,
            descending: self.descending,
        }
    }
}

// Display renders the canonical query text, which reads back to the same tree.

impl<R> std::fmt::Display for Operand<'_, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operand::Literal(v) => write!(f, "{}", v),
            Operand::Field(field) => write!(f, "{}", field.query_name()),
        }
    }
}

impl<R> std::fmt::Display for Comparison<'_, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.target.query_name(), self.operator, self.operand)
    }
}

impl<R> std::fmt::Display for Conjunction<'_, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, comparison) in self.comparisons.iter().enumerate() {
            if i > 0 {
                f.write_str(" & ")?;
            }
            write!(f, "{}", comparison)?;
        }
        Ok(())
    }
}

impl<R> std::fmt::Display for Query<'_, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, group) in self.groups.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", group)?;
        }
        Ok(())
    }
}

impl<R> std::fmt::Display for SortClause<'_, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let keyword = if self.descending {
            crate::ast::tokens::ORDER_BY_DESCENDING
        } else {
            crate::ast::tokens::ORDER_BY
        };
        write!(f, "{} {}", keyword, self.field.query_name())
    }
}

impl<R> std::fmt::Debug for Comparison<'_, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Comparison({})", self)
    }
}

impl<R> std::fmt::Debug for Query<'_, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Query({})", self)
    }
}

impl<R> std::fmt::Debug for SortClause<'_, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SortClause({})", self)
    }
}
