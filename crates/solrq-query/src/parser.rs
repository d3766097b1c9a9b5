//! Query parser.
//!
//! Parses a token stream into a query AST using recursive descent.
//!
//! # Grammar
//!
//! ```text
//! list       → (clause (BINOP list)?)*
//! clause     → prefix clause | field | group | operand postfix?
//! prefix     → "+" | "-" | "!" | "NOT"
//! field      → WORD ":" (range | clause)
//! range      → ("[" | "{") bound WS "TO" WS bound ("]" | "}")
//! bound      → WORD | PHRASE | "*" | "-" WORD
//! group      → "(" list ")"
//! operand    → WORD | PHRASE
//! postfix    → "~" NUMBER? | "^" NUMBER
//! ```
//!
//! Binary operators are right-associative: the right-hand side of an operator is everything
//! up to the end of the enclosing list. Chains are collected in a loop and folded from the
//! right, so chain length never grows the call stack. Recursion happens only for groups,
//! field values and prefixes, and is bounded by [`Limits::max_depth`].

use std::mem;

use crate::{
    ast::{BinaryOp, Bound, Clause, ClauseList, Number, Operand, PrefixKind},
    error::{ErrorKind, ParseError},
    lexer::{Token, TokenKind},
    limits::Limits,
};

/// Recursive descent parser over a borrowed token slice.
struct Parser<'t> {
    /// Token stream to parse.
    tokens: &'t [Token],
    /// Current position in token stream.
    position: usize,
    /// Maximum nesting depth.
    max_depth: usize,
}

impl<'t> Parser<'t> {
    /// Creates a new parser over a token stream.
    fn new(tokens: &'t [Token], limits: &Limits) -> Self {
        Self {
            tokens,
            position: 0,
            max_depth: limits.max_depth,
        }
    }

    /// Parses the whole token stream into a clause list.
    fn parse(mut self) -> Result<ClauseList, ParseError> {
        if self.tokens.is_empty() {
            return Err(ParseError::new(ErrorKind::EmptyQuery, "empty query", 0));
        }

        let list = self.parse_list(0)?;

        // parse_list only stops early at a ')'
        if let Some(token) = self.peek() {
            return Err(ParseError::new(
                ErrorKind::MismatchedBrackets,
                "unmatched ')'",
                token.span.start,
            ));
        }

        Ok(list)
    }

    /// Parses clauses up to the end of input or a closing parenthesis.
    fn parse_list(&mut self, depth: usize) -> Result<ClauseList, ParseError> {
        let mut segments = Vec::new();
        let mut leading = Vec::new();

        while !self.at_list_end() {
            let clause = self.parse_clause(depth)?;

            match self.peek_binary_op() {
                Some(op) => {
                    let op_token = self.advance_token();
                    if self.at_list_end() {
                        return Err(ParseError::new(
                            ErrorKind::DanglingOperator,
                            format!("expected a clause after '{}'", op_token.text),
                            op_token.span.start,
                        ));
                    }
                    segments.push((mem::take(&mut leading), clause, op));
                }
                None => leading.push(clause),
            }
        }

        let mut list = ClauseList::flat(leading);
        for (lead, left, op) in segments.into_iter().rev() {
            list = ClauseList::with_chain(lead, left, op, list);
        }

        Ok(list)
    }

    /// Parses a single clause.
    fn parse_clause(&mut self, depth: usize) -> Result<Clause, ParseError> {
        let Some(token) = self.peek() else {
            return Err(ParseError::new(
                ErrorKind::UnexpectedToken,
                "unexpected end of query",
                self.end_position(),
            ));
        };

        if depth > self.max_depth {
            return Err(ParseError::new(
                ErrorKind::DepthExceeded,
                format!("query nests deeper than {} levels", self.max_depth),
                token.span.start,
            ));
        }

        match token.kind {
            TokenKind::Plus | TokenKind::Minus | TokenKind::Bang | TokenKind::Not => {
                self.parse_prefixed(depth)
            }
            TokenKind::LParen => self.parse_group(depth),
            TokenKind::Word if self.next_is_adjacent_colon() => self.parse_field(depth),
            TokenKind::Word | TokenKind::To | TokenKind::QuotedString => self.parse_operand(),
            TokenKind::And | TokenKind::Or => Err(ParseError::new(
                ErrorKind::ReservedWordAsTerm,
                format!("'{}' cannot be used as a term", token.text),
                token.span.start,
            )),
            TokenKind::Colon => Err(ParseError::new(
                ErrorKind::ReservedWordAsTerm,
                "':' must directly follow a field name",
                token.span.start,
            )),
            TokenKind::RParen => Err(ParseError::new(
                ErrorKind::MismatchedBrackets,
                "unmatched ')'",
                token.span.start,
            )),
            TokenKind::Tilde | TokenKind::Caret => Err(ParseError::new(
                ErrorKind::UnexpectedToken,
                format!("'{}' must directly follow a term or phrase", token.text),
                token.span.start,
            )),
            TokenKind::LBracket | TokenKind::RBracket | TokenKind::LBrace | TokenKind::RBrace => {
                Err(ParseError::new(
                    ErrorKind::UnexpectedToken,
                    format!("'{}' is only valid in a field range", token.text),
                    token.span.start,
                ))
            }
        }
    }

    /// Parses: prefix clause
    fn parse_prefixed(&mut self, depth: usize) -> Result<Clause, ParseError> {
        let token = self.advance_token();
        let kind = match token.kind {
            TokenKind::Plus => PrefixKind::Plus,
            TokenKind::Minus => PrefixKind::Minus,
            _ => PrefixKind::Not,
        };

        if self.at_list_end() || self.peek_binary_op().is_some() {
            return Err(ParseError::new(
                ErrorKind::DanglingOperator,
                format!("expected a clause after '{}'", token.text),
                token.span.start,
            ));
        }

        let inner = self.parse_clause(depth + 1)?;
        Ok(Clause::Prefixed {
            kind,
            inner: Box::new(inner),
        })
    }

    /// Parses: "(" list ")"
    fn parse_group(&mut self, depth: usize) -> Result<Clause, ParseError> {
        let open = self.advance_token();
        let list = self.parse_list(depth + 1)?;

        match self.peek() {
            Some(close) if close.kind == TokenKind::RParen => {
                if list.is_empty() {
                    return Err(ParseError::new(
                        ErrorKind::EmptyGroup,
                        "empty group",
                        open.span.start,
                    ));
                }
                self.advance();
                Ok(Clause::Group(list))
            }
            _ => Err(ParseError::new(
                ErrorKind::MismatchedBrackets,
                "unclosed '(': expected ')'",
                open.span.start,
            )),
        }
    }

    /// Parses: WORD ":" (range | clause)
    fn parse_field(&mut self, depth: usize) -> Result<Clause, ParseError> {
        let name = self.advance_token();
        let colon = self.advance_token();

        match self.peek().map(|t| t.kind) {
            Some(TokenKind::LBracket | TokenKind::LBrace) => self.parse_range(&name.text),
            None | Some(TokenKind::RParen) => Err(ParseError::new(
                ErrorKind::UnexpectedToken,
                format!("expected a clause after '{}:'", name.text),
                colon.span.start,
            )),
            Some(_) => {
                let inner = self.parse_clause(depth + 1)?;
                Ok(Clause::Field {
                    name: name.text.clone(),
                    inner: Box::new(inner),
                })
            }
        }
    }

    /// Parses: ("[" | "{") bound WS "TO" WS bound ("]" | "}")
    fn parse_range(&mut self, name: &str) -> Result<Clause, ParseError> {
        let open = self.advance_token();
        let inclusive = open.kind == TokenKind::LBracket;

        let lower = self.parse_bound(open)?;

        match self.peek() {
            Some(token) if token.kind == TokenKind::To => {
                if self.to_touches_bound(token) {
                    return Err(ParseError::new(
                        ErrorKind::MalformedRange,
                        "'TO' must be separated from the range bounds by whitespace",
                        token.span.start,
                    ));
                }
                self.advance();
            }
            Some(token) => {
                return Err(ParseError::new(
                    ErrorKind::MalformedRange,
                    format!("expected 'TO' in range, found '{}'", token.text),
                    token.span.start,
                ));
            }
            None => return Err(unterminated_range(open)),
        }

        let upper = self.parse_bound(open)?;

        match self.peek() {
            Some(close) if matches!(close.kind, TokenKind::RBracket | TokenKind::RBrace) => {
                if (close.kind == TokenKind::RBracket) != inclusive {
                    return Err(ParseError::new(
                        ErrorKind::MismatchedBrackets,
                        format!("range opened with '{}' but closed with '{}'", open.text, close.text),
                        close.span.start,
                    ));
                }
                self.advance();
            }
            Some(token) => {
                return Err(ParseError::new(
                    ErrorKind::MalformedRange,
                    format!("expected end of range, found '{}'", token.text),
                    token.span.start,
                ));
            }
            None => return Err(unterminated_range(open)),
        }

        Ok(Clause::FieldRange {
            name: name.to_string(),
            inclusive,
            lower,
            upper,
        })
    }

    /// Returns true if the current `TO` token is glued to the lower bound or the upper bound.
    fn to_touches_bound(&self, to: &Token) -> bool {
        let lower = self
            .position
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i));
        let upper = self
            .tokens
            .get(self.position + 1)
            .filter(|next| !matches!(next.kind, TokenKind::RBracket | TokenKind::RBrace));
        lower.is_some_and(|prev| to.follows(prev)) || upper.is_some_and(|next| next.follows(to))
    }

    /// Parses one range bound.
    fn parse_bound(&mut self, open: &Token) -> Result<Bound, ParseError> {
        let Some(token) = self.peek() else {
            return Err(unterminated_range(open));
        };

        match token.kind {
            TokenKind::Word if token.text == "*" => {
                self.advance();
                Ok(Bound::Wildcard)
            }
            TokenKind::Word | TokenKind::QuotedString => {
                self.advance();
                Ok(Bound::Value(token.text.clone()))
            }
            TokenKind::Minus => match self.tokens.get(self.position + 1) {
                Some(value) if value.kind == TokenKind::Word && value.follows(token) => {
                    self.position += 2;
                    Ok(Bound::Value(format!("-{}", value.text)))
                }
                _ => Err(ParseError::new(
                    ErrorKind::MalformedRange,
                    "expected a value after '-' in range bound",
                    token.span.start,
                )),
            },
            _ => Err(ParseError::new(
                ErrorKind::MalformedRange,
                format!("expected a range bound, found '{}'", token.text),
                token.span.start,
            )),
        }
    }

    /// Parses a term or phrase with an optional proximity or boost suffix.
    fn parse_operand(&mut self) -> Result<Clause, ParseError> {
        let token = self.advance_token();

        let operand = if token.kind == TokenKind::QuotedString {
            validate_phrase(token)?;
            Operand::Phrase(token.text.clone())
        } else {
            Operand::Term(token.text.clone())
        };

        let Some(next) = self.peek().filter(|next| next.follows(token)) else {
            return Ok(operand.into());
        };

        match next.kind {
            TokenKind::Tilde => {
                self.advance();
                let distance = self.parse_adjacent_number(next)?;
                Ok(Clause::Proximity {
                    base: operand,
                    distance,
                })
            }
            TokenKind::Caret => {
                self.advance();
                match self.parse_adjacent_number(next)? {
                    Some(factor) => Ok(Clause::Boosted {
                        base: operand,
                        factor,
                    }),
                    None => Err(ParseError::new(
                        ErrorKind::MissingBoostFactor,
                        "expected a boost factor after '^'",
                        next.span.start,
                    )),
                }
            }
            _ => Ok(operand.into()),
        }
    }

    /// Parses the number directly after a `~` or `^`, if there is one.
    fn parse_adjacent_number(&mut self, op: &Token) -> Result<Option<Number>, ParseError> {
        let Some(token) = self.peek().filter(|t| t.follows(op)) else {
            return Ok(None);
        };

        match token.kind {
            TokenKind::RParen => Ok(None),
            TokenKind::Word => {
                let number = Number::parse(&token.text).ok_or_else(|| {
                    ParseError::new(
                        ErrorKind::InvalidNumber,
                        format!("'{}' is not an unsigned number", token.text),
                        token.span.start,
                    )
                })?;
                self.advance();
                Ok(Some(number))
            }
            _ => Err(ParseError::new(
                ErrorKind::InvalidNumber,
                format!("expected a number after '{}'", op.text),
                token.span.start,
            )),
        }
    }

    /// Checks if the current token closes the enclosing list.
    fn at_list_end(&self) -> bool {
        self.peek().is_none_or(|t| t.kind == TokenKind::RParen)
    }

    /// Returns the binary operator at the current position, if any.
    fn peek_binary_op(&self) -> Option<BinaryOp> {
        match self.peek()?.kind {
            TokenKind::And => Some(BinaryOp::And),
            TokenKind::Or => Some(BinaryOp::Or),
            _ => None,
        }
    }

    /// Checks if the token after the current one is a `:` touching it.
    fn next_is_adjacent_colon(&self) -> bool {
        match (self.peek(), self.tokens.get(self.position + 1)) {
            (Some(word), Some(colon)) => colon.kind == TokenKind::Colon && colon.follows(word),
            _ => false,
        }
    }

    /// Byte position just past the last token.
    fn end_position(&self) -> usize {
        self.tokens.last().map_or(0, |t| t.span.end)
    }

    /// Returns the current token without consuming it.
    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.position)
    }

    /// Consumes the current token, which the caller has already peeked.
    fn advance_token(&mut self) -> &'t Token {
        let tokens = self.tokens;
        let token = &tokens[self.position];
        self.position += 1;
        token
    }

    /// Advances to the next token.
    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }
}

/// Error for a range that runs off the end of the query.
fn unterminated_range(open: &Token) -> ParseError {
    ParseError::new(
        ErrorKind::MalformedRange,
        format!("unterminated range opened with '{}'", open.text),
        open.span.start,
    )
}

/// Rejects empty phrases and phrases with a segment starting with a bare `:`.
fn validate_phrase(token: &Token) -> Result<(), ParseError> {
    let interior = token
        .text
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(&token.text);

    if interior.trim().is_empty() {
        return Err(ParseError::new(
            ErrorKind::EmptyOrInvalidPhrase,
            "empty phrase",
            token.span.start,
        ));
    }

    if let Some(segment) = interior.split_whitespace().find(|s| s.starts_with(':')) {
        return Err(ParseError::new(
            ErrorKind::EmptyOrInvalidPhrase,
            format!("phrase segment '{segment}' starts with a bare ':'"),
            token.span.start,
        ));
    }

    Ok(())
}

/// Parses a token stream with the default limits.
pub fn parse(tokens: &[Token]) -> Result<ClauseList, ParseError> {
    parse_with_limits(tokens, &Limits::default())
}

/// Parses a token stream into a clause list.
pub fn parse_with_limits(tokens: &[Token], limits: &Limits) -> Result<ClauseList, ParseError> {
    Parser::new(tokens, limits).parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn parse_str(input: &str) -> Result<ClauseList, ParseError> {
        parse(&tokenize(input).unwrap())
    }

    fn kind_of(input: &str) -> ErrorKind {
        parse_str(input).unwrap_err().kind
    }

    fn term(s: &str) -> Clause {
        Clause::Term(s.into())
    }

    fn flat(clauses: Vec<Clause>) -> ClauseList {
        ClauseList::flat(clauses)
    }

    fn field(name: &str, inner: Clause) -> Clause {
        Clause::Field {
            name: name.into(),
            inner: Box::new(inner),
        }
    }

    fn prefixed(kind: PrefixKind, inner: Clause) -> Clause {
        Clause::Prefixed {
            kind,
            inner: Box::new(inner),
        }
    }

    #[test]
    fn empty_query() {
        assert_eq!(parse(&[]).unwrap_err().kind, ErrorKind::EmptyQuery);
    }

    #[test]
    fn juxtaposed_terms() {
        assert_eq!(
            parse_str("a b cdefg").unwrap(),
            flat(vec![term("a"), term("b"), term("cdefg")])
        );
    }

    #[test]
    fn chain_is_right_folded() {
        assert_eq!(
            parse_str("a AND b OR c").unwrap(),
            ClauseList::chain(
                term("a"),
                BinaryOp::And,
                ClauseList::chain(term("b"), BinaryOp::Or, flat(vec![term("c")]))
            )
        );
    }

    #[test]
    fn symbolic_operators_canonicalize() {
        assert_eq!(parse_str("a && b").unwrap(), parse_str("a AND b").unwrap());
        assert_eq!(parse_str("a || b").unwrap(), parse_str("a OR b").unwrap());
    }

    #[test]
    fn chain_rest_absorbs_remaining_clauses() {
        assert_eq!(
            parse_str("a AND b c").unwrap(),
            ClauseList::chain(term("a"), BinaryOp::And, flat(vec![term("b"), term("c")]))
        );
    }

    #[test]
    fn juxtaposition_before_chain() {
        assert_eq!(
            parse_str("a b AND c").unwrap(),
            ClauseList::with_chain(
                vec![term("a")],
                term("b"),
                BinaryOp::And,
                flat(vec![term("c")])
            )
        );
    }

    #[test]
    fn long_chain_does_not_recurse() {
        let query = vec!["t"; 5000].join(" OR ");
        let list = parse_str(&query).unwrap();
        assert_eq!(list.chain_len(), 4999);
    }

    #[test]
    fn prefix_binds_single_clause() {
        assert_eq!(
            parse_str("a NOT b c").unwrap(),
            flat(vec![
                term("a"),
                prefixed(PrefixKind::Not, term("b")),
                term("c")
            ])
        );
        assert_eq!(
            parse_str("-a AND b").unwrap(),
            ClauseList::chain(
                prefixed(PrefixKind::Minus, term("a")),
                BinaryOp::And,
                flat(vec![term("b")])
            )
        );
    }

    #[test]
    fn bang_with_and_without_space() {
        assert_eq!(parse_str("a ! b").unwrap(), parse_str("a !b").unwrap());
        assert_eq!(parse_str("a !b").unwrap(), parse_str("a NOT b").unwrap());
    }

    #[test]
    fn dangling_operators() {
        for input in ["NOT", "a NOT", "(NOT)", "a AND", "a OR )", "+", "(a -)", "NOT AND b"] {
            let err = parse(&tokenize(input).unwrap()).unwrap_err();
            assert_eq!(err.kind, ErrorKind::DanglingOperator, "input {input:?}");
        }
    }

    #[test]
    fn dangling_operator_position() {
        let err = parse_str("a AND").unwrap_err();
        assert_eq!(err.position, 2);
        assert!(err.message.contains("'AND'"));
    }

    #[test]
    fn reserved_words_rejected() {
        for input in ["AND", "OR", "&&", "||", ":", "a :b", "AND a"] {
            assert_eq!(kind_of(input), ErrorKind::ReservedWordAsTerm, "input {input:?}");
        }
    }

    #[test]
    fn to_outside_range_is_a_term() {
        assert_eq!(parse_str("TO").unwrap(), flat(vec![term("TO")]));
    }

    #[test]
    fn field_scopes_any_clause() {
        assert_eq!(
            parse_str("afield:(a b)").unwrap(),
            flat(vec![field(
                "afield",
                Clause::Group(flat(vec![term("a"), term("b")]))
            )])
        );
        assert_eq!(
            parse_str("f:\"x y\"").unwrap(),
            flat(vec![field("f", Clause::Phrase("\"x y\"".into()))])
        );
    }

    #[test]
    fn field_without_value() {
        assert_eq!(kind_of("title:"), ErrorKind::UnexpectedToken);
        assert_eq!(kind_of("(title:)"), ErrorKind::UnexpectedToken);
    }

    #[test]
    fn ranges() {
        assert_eq!(
            parse_str("f:{* TO -5}").unwrap(),
            flat(vec![Clause::FieldRange {
                name: "f".into(),
                inclusive: false,
                lower: Bound::Wildcard,
                upper: Bound::Value("-5".into()),
            }])
        );
    }

    #[test]
    fn malformed_ranges() {
        for input in [
            "f:[a b]",
            "f:[TO b]",
            "f:[a TO]",
            "f:[a TO b",
            "f:[a",
            "f:[a TO b c]",
            "f:[AND TO b]",
            "f:[- TO b]",
            "f:[a TO\"b\"]",
            "f:[\"a\"TO b]",
        ] {
            assert_eq!(kind_of(input), ErrorKind::MalformedRange, "input {input:?}");
        }
    }

    #[test]
    fn mismatched_range_brackets() {
        assert_eq!(kind_of("f:[a TO b}"), ErrorKind::MismatchedBrackets);
        assert_eq!(kind_of("f:{a TO b]"), ErrorKind::MismatchedBrackets);
    }

    #[test]
    fn unbalanced_parentheses() {
        assert_eq!(kind_of("(a b"), ErrorKind::MismatchedBrackets);
        assert_eq!(kind_of("a b)"), ErrorKind::MismatchedBrackets);
        assert_eq!(kind_of(")"), ErrorKind::MismatchedBrackets);
        assert_eq!(kind_of("()"), ErrorKind::EmptyGroup);
    }

    #[test]
    fn stray_range_brackets() {
        assert_eq!(kind_of("[a TO b]"), ErrorKind::UnexpectedToken);
        assert_eq!(kind_of("a }"), ErrorKind::UnexpectedToken);
    }

    #[test]
    fn proximity_distance_is_optional() {
        assert_eq!(
            parse_str("word~").unwrap(),
            flat(vec![Clause::Proximity {
                base: Operand::Term("word".into()),
                distance: None,
            }])
        );
        assert_eq!(
            parse_str("\"a b\"~10").unwrap(),
            flat(vec![Clause::Proximity {
                base: Operand::Phrase("\"a b\"".into()),
                distance: Number::parse("10"),
            }])
        );
    }

    #[test]
    fn boost_factor_is_mandatory() {
        assert_eq!(kind_of("foo^"), ErrorKind::MissingBoostFactor);
        assert_eq!(kind_of("foo^ 2"), ErrorKind::MissingBoostFactor);
        assert_eq!(kind_of("(foo^)"), ErrorKind::MissingBoostFactor);
        assert_eq!(kind_of("foo^x"), ErrorKind::InvalidNumber);
        assert_eq!(kind_of("foo~1.2.3"), ErrorKind::InvalidNumber);
        assert_eq!(kind_of("foo~-1"), ErrorKind::InvalidNumber);
    }

    #[test]
    fn postfix_must_touch_operand() {
        assert_eq!(kind_of("foo ^2"), ErrorKind::UnexpectedToken);
        assert_eq!(kind_of("~"), ErrorKind::UnexpectedToken);
        assert_eq!(kind_of("a~2^3"), ErrorKind::UnexpectedToken);
        assert_eq!(kind_of("(a b)^2"), ErrorKind::UnexpectedToken);
    }

    #[test]
    fn invalid_phrases() {
        assert_eq!(kind_of("\"\""), ErrorKind::EmptyOrInvalidPhrase);
        assert_eq!(kind_of("\"   \""), ErrorKind::EmptyOrInvalidPhrase);
        assert_eq!(kind_of("\":not:a:term\""), ErrorKind::EmptyOrInvalidPhrase);
        assert_eq!(kind_of("\"a :bad:\""), ErrorKind::EmptyOrInvalidPhrase);
        assert!(parse_str("\"a b:c\"").is_ok());
        assert!(parse_str(r#""a \:b""#).is_ok());
    }

    #[test]
    fn depth_limit() {
        let limits = Limits {
            max_depth: 3,
            ..Limits::default()
        };
        let ok = tokenize("(((a)))").unwrap();
        assert!(parse_with_limits(&ok, &limits).is_ok());

        let deep = tokenize("((((a))))").unwrap();
        let err = parse_with_limits(&deep, &limits).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DepthExceeded);

        let prefixes = tokenize("- - - - a").unwrap();
        let err = parse_with_limits(&prefixes, &limits).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DepthExceeded);
    }

    #[test]
    fn pathological_nesting_fails_closed() {
        let query = format!("{}a{}", "(".repeat(10_000), ")".repeat(10_000));
        let err = parse_str(&query).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DepthExceeded);
    }
}
