use tracing::{debug, trace};

use crate::{
    ast::{Comparison, Conjunction, Query, SortClause, Token},
    compiler::{CompiledQuery, compile_comparison, resolve_field},
    error::QueryError,
    lexer::LexError,
    schema::EntitySchema,
};

/// Where the parser is in the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Start of the query: leading sort clauses and the free-text check
    Initial,
    /// Expecting a comparison or a bare literal
    Ready,
    /// Expecting `,`, `&` or a sort clause
    Finish,
}

/// Grammar parser over a materialized token stream.
///
/// ```text
/// query       := sort* ( freetext | group ( "," group )* ) sort*
/// group       := term ( ( "&" term ) | sort )*
/// term        := literal | field operator ( literal | field )
/// sort        := ( "orderby" | "orderbydescending" ) field
/// ```
pub struct Parser<'s, R> {
    schema: &'s EntitySchema<R>,
    tokens: Vec<Token>,
    position: usize,
}

impl<'s, R> Parser<'s, R> {
    /// Drain the lexer. Lexing errors surface here.
    pub fn new<I>(tokens: I, schema: &'s EntitySchema<R>) -> Result<Self, QueryError>
    where
        I: IntoIterator<Item = Result<Token, LexError>>,
    {
        let tokens = tokens.into_iter().collect::<Result<Vec<_>, _>>()?;
        Ok(Parser {
            schema,
            tokens,
            position: 0,
        })
    }

    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    /// Consume and return the current token.
    fn next_token(&mut self) -> Option<Token> {
        let token = self.current().cloned();
        if token.is_some() {
            self.advance();
        }
        token
    }

    /// Tokens consumed so far, for error messages.
    fn consumed_text(&self, from: usize) -> String {
        self.tokens[from..self.position.min(self.tokens.len())]
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn parse(mut self) -> Result<CompiledQuery<'s, R>, QueryError> {
        let mut state = State::Initial;
        let mut groups = Vec::new();
        let mut current = Conjunction::new();
        let mut sort = None;

        while let Some(token) = self.current().cloned() {
            trace!(?state, token = %token, "parse step");

            match state {
                State::Initial => {
                    if let Some(descending) = token.sort_keyword() {
                        self.advance();
                        sort = Some(self.parse_sort_field(descending)?);
                    } else if !token.is_literal && !self.schema.contains(&token.value) {
                        return self.parse_free_text(sort);
                    } else {
                        state = State::Ready;
                    }
                }
                State::Ready => {
                    current.push(self.parse_term()?);
                    state = State::Finish;
                }
                State::Finish => {
                    if token.is_literal {
                        return Err(QueryError::UnseparatedLiteral(token.value));
                    }
                    self.advance();
                    if token.is_or() {
                        groups.push(std::mem::take(&mut current));
                        state = State::Ready;
                    } else if token.is_and() {
                        state = State::Ready;
                    } else if let Some(descending) = token.sort_keyword() {
                        sort = Some(self.parse_sort_field(descending)?);
                    } else {
                        return Err(QueryError::InvalidOperator(token.value));
                    }
                }
            }
        }

        if !current.is_empty() {
            groups.push(current);
        }

        Ok(CompiledQuery::new(Query { groups }, sort))
    }

    /// One comparison, or a bare literal against the default field.
    fn parse_term(&mut self) -> Result<Comparison<'s, R>, QueryError> {
        let start = self.position;
        let Some(target) = self.next_token() else {
            return Err(QueryError::Incomplete {
                clause: String::new(),
            });
        };

        if target.sort_keyword().is_some() {
            return Err(QueryError::MissingSortField);
        }
        if target.is_literal {
            let default = self.default_target(&target.value)?;
            return compile_comparison(self.schema, &default, &target, None);
        }

        let Some(operator) = self.next_token() else {
            return Err(QueryError::Incomplete {
                clause: self.consumed_text(start),
            });
        };
        let Some(rhs) = self.next_token() else {
            return Err(QueryError::Incomplete {
                clause: self.consumed_text(start),
            });
        };

        compile_comparison(self.schema, &target, &rhs, Some(&operator))
    }

    /// Field name after `orderby` / `orderbydescending`.
    fn parse_sort_field(&mut self, descending: bool) -> Result<SortClause<'s, R>, QueryError> {
        let token = self.next_token().ok_or(QueryError::MissingSortField)?;
        let field = resolve_field(self.schema, &token)?;
        Ok(SortClause { field, descending })
    }

    /// The query does not start with a field name: everything up to the
    /// first sort keyword is one literal matched against the default field.
    fn parse_free_text(
        mut self,
        mut sort: Option<SortClause<'s, R>>,
    ) -> Result<CompiledQuery<'s, R>, QueryError> {
        let mut text = String::new();
        while let Some(token) = self.current() {
            if token.sort_keyword().is_some() {
                break;
            }
            text.push_str(&token.value);
            self.advance();
        }

        while let Some(token) = self.next_token() {
            match token.sort_keyword() {
                Some(descending) => sort = Some(self.parse_sort_field(descending)?),
                None => return Err(QueryError::InvalidOperator(token.value)),
            }
        }

        debug!(entity = self.schema.entity(), text = %text, "free text query");

        let default = self.default_target(&text)?;
        let comparison = compile_comparison(self.schema, &default, &Token::literal(text), None)?;
        let mut group = Conjunction::new();
        group.push(comparison);

        Ok(CompiledQuery::new(Query { groups: vec![group] }, sort))
    }

    /// Field-name token for the schema's default field.
    fn default_target(&self, literal: &str) -> Result<Token, QueryError> {
        self.schema
            .default_field()
            .map(|field| Token::word(field.query_name()))
            .ok_or_else(|| QueryError::NoDefaultField {
                entity: self.schema.entity().to_string(),
                literal: literal.to_string(),
            })
    }
}

/// Parse a token stream against a schema.
pub fn parse<'s, R, I>(tokens: I, schema: &'s EntitySchema<R>) -> Result<CompiledQuery<'s, R>, QueryError>
where
    I: IntoIterator<Item = Result<Token, LexError>>,
{
    Parser::new(tokens, schema)?.parse()
}
