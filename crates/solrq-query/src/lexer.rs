//! Query lexer (tokenizer).
//!
//! Converts a query string into a stream of tokens for the parser. Every token keeps its raw
//! text and its byte span so the parser can check adjacency (`field:value`, `term^2`) and
//! report positions.

use std::ops::Range;

use serde::Serialize;

use crate::error::{ErrorKind, LexError};

/// Characters that end a bare word unless escaped.
const WORD_TERMINATORS: &[char] = &['(', ')', '[', ']', '{', '}', '"', '~', '^', ':', '!'];

/// Characters that may follow a backslash inside a word.
const ESCAPABLE: &[char] = &[
    '!', '(', ')', '{', '}', '[', ']', '^', '"', '~', '*', '?', ':', '\\', '+', '-', '&', '|',
];

/// The lexical class of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TokenKind {
    /// A bare word (search term, field name or range bound).
    Word,
    /// A quoted string, quotes included.
    QuotedString,
    /// `AND` or `&&`.
    And,
    /// `OR` or `||`.
    Or,
    /// The `NOT` keyword.
    Not,
    /// Required prefix (`+`).
    Plus,
    /// Prohibited prefix (`-`).
    Minus,
    /// Negation prefix (`!`).
    Bang,
    /// Field separator (`:`).
    Colon,
    /// Left parenthesis.
    LParen,
    /// Right parenthesis.
    RParen,
    /// Inclusive range open (`[`).
    LBracket,
    /// Inclusive range close (`]`).
    RBracket,
    /// Exclusive range open (`{`).
    LBrace,
    /// Exclusive range close (`}`).
    RBrace,
    /// Proximity operator (`~`).
    Tilde,
    /// Boost operator (`^`).
    Caret,
    /// The range-join keyword `TO`.
    To,
}

impl TokenKind {
    /// Returns a short name for the kind, used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Self::Word => "word",
            Self::QuotedString => "phrase",
            Self::And => "and",
            Self::Or => "or",
            Self::Not => "not",
            Self::Plus => "plus",
            Self::Minus => "minus",
            Self::Bang => "bang",
            Self::Colon => "colon",
            Self::LParen => "lparen",
            Self::RParen => "rparen",
            Self::LBracket => "lbracket",
            Self::RBracket => "rbracket",
            Self::LBrace => "lbrace",
            Self::RBrace => "rbrace",
            Self::Tilde => "tilde",
            Self::Caret => "caret",
            Self::To => "to",
        }
    }
}

/// A token in the query language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    /// The lexical class.
    pub kind: TokenKind,
    /// The raw text, escapes and quotes preserved.
    pub text: String,
    /// Byte range of the token in the input.
    pub span: Range<usize>,
}

impl Token {
    /// Creates a token.
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Range<usize>) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }

    /// Returns true if this token starts exactly where `previous` ends.
    pub fn follows(&self, previous: &Self) -> bool {
        self.span.start == previous.span.end
    }
}

/// Tokenizes a query string.
struct Lexer<'a> {
    /// The original input string.
    input: &'a str,
    /// Current byte position in input.
    position: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input.
    fn new(input: &'a str) -> Self {
        Self { input, position: 0 }
    }

    /// Creates an error at a specific position.
    fn error_at(&self, kind: ErrorKind, message: impl Into<String>, position: usize) -> LexError {
        LexError::new(kind, message, position, self.input)
    }

    /// Tokenizes the entire input, returning all tokens or an error.
    fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }

        Ok(tokens)
    }

    /// Returns the next token, or None if at end of input.
    fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        self.skip_whitespace();

        let Some(ch) = self.peek() else {
            return Ok(None);
        };

        let punct = match ch {
            '"' => return self.read_quoted().map(Some),
            '(' => Some((TokenKind::LParen, 1)),
            ')' => Some((TokenKind::RParen, 1)),
            '[' => Some((TokenKind::LBracket, 1)),
            ']' => Some((TokenKind::RBracket, 1)),
            '{' => Some((TokenKind::LBrace, 1)),
            '}' => Some((TokenKind::RBrace, 1)),
            '~' => Some((TokenKind::Tilde, 1)),
            '^' => Some((TokenKind::Caret, 1)),
            ':' => Some((TokenKind::Colon, 1)),
            '+' => Some((TokenKind::Plus, 1)),
            '-' => Some((TokenKind::Minus, 1)),
            '!' => Some((TokenKind::Bang, 1)),
            '&' if self.peek_second() == Some('&') => Some((TokenKind::And, 2)),
            '|' if self.peek_second() == Some('|') => Some((TokenKind::Or, 2)),
            _ => None,
        };

        match punct {
            Some((kind, len)) => {
                let start = self.position;
                self.position += len;
                Ok(Some(self.token_from(kind, start)))
            }
            None => self.read_word().map(Some),
        }
    }

    /// Reads a quoted string, keeping the quotes and any escapes.
    fn read_quoted(&mut self) -> Result<Token, LexError> {
        let start = self.position;
        self.advance(); // consume opening quote

        loop {
            match self.advance() {
                Some('"') => return Ok(self.token_from(TokenKind::QuotedString, start)),
                Some('\\') => {
                    if self.advance().is_none() {
                        break;
                    }
                }
                Some(_) => {}
                None => break,
            }
        }

        Err(self.error_at(
            ErrorKind::UnterminatedPhrase,
            "unterminated phrase: missing closing quote",
            start,
        ))
    }

    /// Reads a bare word or keyword (AND, OR, NOT, TO).
    fn read_word(&mut self) -> Result<Token, LexError> {
        let start = self.position;

        while let Some(ch) = self.peek() {
            if ch.is_whitespace() || WORD_TERMINATORS.contains(&ch) {
                break;
            }

            if ch == '\\' {
                let escape_pos = self.position;
                self.advance();
                match self.advance() {
                    Some(next) if ESCAPABLE.contains(&next) => {}
                    Some(next) => {
                        return Err(self.error_at(
                            ErrorKind::InvalidEscape,
                            format!("'\\{next}' is not a valid escape"),
                            escape_pos,
                        ));
                    }
                    None => {
                        return Err(self.error_at(
                            ErrorKind::InvalidEscape,
                            "backslash at end of query",
                            escape_pos,
                        ));
                    }
                }
                continue;
            }

            self.advance();
        }

        let kind = match &self.input[start..self.position] {
            "AND" => TokenKind::And,
            "OR" => TokenKind::Or,
            "NOT" => TokenKind::Not,
            "TO" => TokenKind::To,
            _ => TokenKind::Word,
        };

        Ok(self.token_from(kind, start))
    }

    /// Builds a token spanning from `start` to the current position.
    fn token_from(&self, kind: TokenKind, start: usize) -> Token {
        Token::new(
            kind,
            &self.input[start..self.position],
            start..self.position,
        )
    }

    /// Skips whitespace characters.
    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    /// Returns the current character without consuming it.
    fn peek(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    /// Returns the character after the current one.
    fn peek_second(&self) -> Option<char> {
        self.input[self.position..].chars().nth(1)
    }

    /// Advances to the next character, returning the one consumed.
    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += ch.len_utf8();
        Some(ch)
    }
}

/// Convenience function to tokenize a query string.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(input).tokenize()
}
