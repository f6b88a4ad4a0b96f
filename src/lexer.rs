use thiserror::Error;

use crate::ast::Token;

/// Character offset into the query string (0-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position(pub usize);

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "position {}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("unterminated quote: missing closing {quote} for the string opened at {position}")]
    UnterminatedQuote { quote: char, position: Position },

    #[error("invalid escape character '{character}' at {position}")]
    InvalidEscape { character: char, position: Position },

    #[error("numbers cannot contain more than one decimal point ({position})")]
    MultipleDecimalPoints { position: Position },

    #[error("numbers cannot contain letters: '{character}' at {position}")]
    LetterInNumber { character: char, position: Position },
}

/// Splits a query string into [`Token`]s.
///
/// The lexer is an iterator: tokens are produced one at a time, and the
/// first error ends the stream.
///
/// ```
/// use userquery::{Lexer, Token};
///
/// let tokens: Result<Vec<Token>, _> = Lexer::new("rating>=5").collect();
/// assert_eq!(
///     tokens.unwrap(),
///     vec![Token::word("rating"), Token::word(">="), Token::literal("5")]
/// );
/// ```
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    failed: bool,
}

fn is_quote(ch: char) -> bool {
    ch == '"' || ch == '\''
}

/// Anything that is not whitespace, a letter, a digit or a quote.
fn is_symbol(ch: char) -> bool {
    !ch.is_whitespace() && !ch.is_alphabetic() && !ch.is_ascii_digit() && !is_quote(ch)
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
            failed: false,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Quoted literal. Closes on the matching quote, whatever follows it.
    fn read_quoted(&mut self, quote: char) -> Result<Token, LexError> {
        let start = self.position;
        let mut result = String::new();
        self.advance(); // Consume opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                c if c == quote => {
                    self.advance();
                    return Ok(Token::literal(result));
                }
                '\\' => {
                    self.advance(); // Consume backslash
                    match self.current_char() {
                        Some('n') => result.push('\n'),
                        Some('t') => result.push('\t'),
                        Some('\'') => result.push('\''),
                        Some('"') => result.push('"'),
                        Some('\\') => result.push('\\'),
                        Some(character) => {
                            return Err(LexError::InvalidEscape {
                                character,
                                position: Position(self.position),
                            });
                        }
                        None => break,
                    }
                    self.advance();
                }
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        Err(LexError::UnterminatedQuote {
            quote,
            position: Position(start),
        })
    }

    /// Unquoted number: digits with at most one decimal point.
    fn read_number(&mut self) -> Result<Token, LexError> {
        let mut number = String::new();
        let mut seen_point = false;

        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                number.push(ch);
            } else if ch == '.' {
                if seen_point {
                    return Err(LexError::MultipleDecimalPoints {
                        position: Position(self.position),
                    });
                }
                seen_point = true;
                number.push(ch);
            } else if ch.is_alphabetic() {
                return Err(LexError::LetterInNumber {
                    character: ch,
                    position: Position(self.position),
                });
            } else {
                // Whitespace, quote or symbol ends the number.
                break;
            }
            self.advance();
        }

        Ok(Token::literal(number))
    }

    /// Field name or keyword: letters and digits.
    fn read_identifier(&mut self) -> Token {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_alphabetic() || ch.is_ascii_digit() {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        Token::word(result)
    }

    /// Operator or separator: a run of symbol characters.
    fn read_symbol(&mut self) -> Token {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if is_symbol(ch) {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        Token::word(result)
    }

    /// Next token, `Ok(None)` at end of input.
    pub fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        self.skip_whitespace();

        match self.current_char() {
            None => Ok(None),
            Some(ch) if is_quote(ch) => self.read_quoted(ch).map(Some),
            Some(ch) if ch.is_ascii_digit() => self.read_number().map(Some),
            Some(ch) if ch.is_alphabetic() => Ok(Some(self.read_identifier())),
            Some(_) => Ok(Some(self.read_symbol())),
        }
    }
}

impl Iterator for Lexer {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let result = self.next_token();
        if result.is_err() {
            self.failed = true;
        }
        result.transpose()
    }
}

impl std::iter::FusedIterator for Lexer {}

/// Tokenize a query string lazily.
pub fn tokenize(input: &str) -> Lexer {
    Lexer::new(input)
}

#[test]
fn test_quote_closes_immediately() {
    let mut lexer = Lexer::new("'a b'c");
    assert_eq!(lexer.next_token(), Ok(Some(Token::literal("a b"))));
    assert_eq!(lexer.next_token(), Ok(Some(Token::word("c"))));
    assert_eq!(lexer.next_token(), Ok(None));
}

#[test]
fn test_symbol_runs() {
    let mut lexer = Lexer::new("a!=b");
    assert_eq!(lexer.next_token(), Ok(Some(Token::word("a"))));
    assert_eq!(lexer.next_token(), Ok(Some(Token::word("!="))));
    assert_eq!(lexer.next_token(), Ok(Some(Token::word("b"))));
    assert_eq!(lexer.next_token(), Ok(None));
}

#[test]
fn test_stops_after_error() {
    let mut lexer = Lexer::new("1.2.3 title");
    assert!(matches!(lexer.next(), Some(Err(LexError::MultipleDecimalPoints { .. }))));
    assert!(lexer.next().is_none());
}
