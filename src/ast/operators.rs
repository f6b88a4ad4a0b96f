/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    // Equality (every type class)
    /// Equal (`=`)
    Equal,
    /// Not equal (`!=`)
    NotEqual,

    // String match (string fields only, case-insensitive)
    /// Starts with (`^`)
    StartsWith,
    /// Does not start with (`!^`)
    NotStartsWith,
    /// Ends with (`$`)
    EndsWith,
    /// Does not end with (`!$`)
    NotEndsWith,
    /// Contains (`*`)
    Contains,
    /// Does not contain (`!*`)
    NotContains,

    // Ordering (orderable fields only)
    /// Less than (`<`)
    LessThan,
    /// Less than or equal (`<=`)
    LessEqual,
    /// Greater than (`>`)
    GreaterThan,
    /// Greater than or equal (`>=`)
    GreaterEqual,
}

impl Operator {
    /// Operator applied to bare literals.
    pub const DEFAULT: Operator = Operator::Contains;

    pub const ALL: [Operator; 12] = [
        Operator::Equal,
        Operator::NotEqual,
        Operator::StartsWith,
        Operator::NotStartsWith,
        Operator::EndsWith,
        Operator::NotEndsWith,
        Operator::Contains,
        Operator::NotContains,
        Operator::LessThan,
        Operator::LessEqual,
        Operator::GreaterThan,
        Operator::GreaterEqual,
    ];

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.symbol() == symbol)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Equal => "=",
            Operator::NotEqual => "!=",
            Operator::StartsWith => "^",
            Operator::NotStartsWith => "!^",
            Operator::EndsWith => "$",
            Operator::NotEndsWith => "!$",
            Operator::Contains => "*",
            Operator::NotContains => "!*",
            Operator::LessThan => "<",
            Operator::LessEqual => "<=",
            Operator::GreaterThan => ">",
            Operator::GreaterEqual => ">=",
        }
    }

    pub fn is_ordering(self) -> bool {
        matches!(
            self,
            Operator::LessThan | Operator::LessEqual | Operator::GreaterThan | Operator::GreaterEqual
        )
    }

    pub fn is_string_match(self) -> bool {
        matches!(
            self,
            Operator::StartsWith
                | Operator::NotStartsWith
                | Operator::EndsWith
                | Operator::NotEndsWith
                | Operator::Contains
                | Operator::NotContains
        )
    }

    /// `!=`, `!^`, `!$` and `!*`.
    pub fn is_negated(self) -> bool {
        matches!(
            self,
            Operator::NotEqual | Operator::NotStartsWith | Operator::NotEndsWith | Operator::NotContains
        )
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}
