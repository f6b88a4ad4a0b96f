/// A lexical token.
///
/// The lexer only distinguishes literals from everything else. Whether a
/// non-literal token is a field name, an operator, a separator or a sort
/// keyword is decided by the parser.
///
/// # Examples
/// ```text
/// rating >= 5 & title * 'beans'
/// ```
///
/// yields `rating`, `>=`, `5` (literal), `&`, `title`, `*`, `beans` (literal).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Token text. For literals this is already unquoted and unescaped.
    pub value: String,

    /// `true` for quoted strings and numbers.
    pub is_literal: bool,
}

impl Token {
    /// Quoted string or number.
    pub fn literal(value: impl Into<String>) -> Self {
        Token {
            value: value.into(),
            is_literal: true,
        }
    }

    /// Identifier, operator or separator.
    pub fn word(value: impl Into<String>) -> Self {
        Token {
            value: value.into(),
            is_literal: false,
        }
    }

    /// Group separator (`,`): logical OR between groups.
    pub fn is_or(&self) -> bool {
        !self.is_literal && self.value == ","
    }

    /// Term separator (`&`): logical AND inside a group.
    pub fn is_and(&self) -> bool {
        !self.is_literal && self.value == "&"
    }

    /// `orderby` / `orderbydescending` keyword. Returns the descending flag.
    pub fn sort_keyword(&self) -> Option<bool> {
        if self.is_literal {
            return None;
        }
        if self.value.eq_ignore_ascii_case(ORDER_BY) {
            Some(false)
        } else if self.value.eq_ignore_ascii_case(ORDER_BY_DESCENDING) {
            Some(true)
        } else {
            None
        }
    }
}

pub const ORDER_BY: &str = "orderby";
pub const ORDER_BY_DESCENDING: &str = "orderbydescending";

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_literal {
            write!(f, "'{}'", self.value)
        } else {
            write!(f, "{}", self.value)
        }
    }
}
