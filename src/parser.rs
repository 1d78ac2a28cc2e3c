use crate::{
    ast::{ParsedValue, Property, SpannedToken, Token, Unsupported},
    convert,
    lexer::Position,
    options::DEFAULT_MAX_DEPTH,
};
use thiserror::Error;

/// Structural failures that abandon the literal being parsed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("Syntax error at {position}: {message}")]
    Syntax { message: String, position: Position },

    #[error("Literal nested deeper than {limit} levels at {position}")]
    TooDeep { limit: usize, position: Position },
}

static EOF: Token = Token::Eof;

/// Recursive-descent parser for the literal subset of JS.
///
/// Works over a token buffer that ends with [`Token::Eof`]. Unsupported
/// constructs are never parsed, only skipped as balanced token groups.
pub struct Parser<'t> {
    tokens: &'t [SpannedToken],
    pos: usize,
    depth: usize,
    max_depth: usize,
}

impl<'t> Parser<'t> {
    pub fn new(tokens: &'t [SpannedToken]) -> Self {
        Parser {
            tokens,
            pos: 0,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn current(&self) -> &'t Token {
        self.tokens.get(self.pos).map_or(&EOF, |t| &t.token)
    }

    fn peek(&self, offset: usize) -> &'t Token {
        self.tokens
            .get(self.pos + offset)
            .map_or(&EOF, |t| &t.token)
    }

    /// Position of the current token.
    pub fn position(&self) -> Position {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|t| t.position)
            .unwrap_or_default()
    }

    /// Token just before the cursor.
    pub fn previous(&self) -> Option<&'t SpannedToken> {
        self.pos.checked_sub(1).and_then(|i| self.tokens.get(i))
    }

    /// Tokens in `start..end`, empty when out of range.
    pub fn slice(&self, start: usize, end: usize) -> &'t [SpannedToken] {
        self.tokens.get(start..end).unwrap_or(&[])
    }

    pub fn index(&self) -> usize {
        self.pos
    }

    pub fn seek(&mut self, index: usize) {
        self.pos = index;
    }

    pub fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    pub fn check(&self, token: &Token) -> bool {
        std::mem::discriminant(self.current()) == std::mem::discriminant(token)
    }

    fn expect(&mut self, expected: Token) -> Result<(), ParseError> {
        if self.current() != &expected {
            return Err(self.error(format!("expected {}, got {}", expected, self.current())));
        }
        self.advance();
        Ok(())
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::Syntax {
            message: message.into(),
            position: self.position(),
        }
    }

    fn enter(&mut self) -> Result<(), ParseError> {
        if self.depth >= self.max_depth {
            return Err(ParseError::TooDeep {
                limit: self.max_depth,
                position: self.position(),
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn at_separator(&self, closer: &Token) -> bool {
        let current = self.current();
        current == &Token::Comma || current == closer
    }

    /// Skip one balanced `{}` / `[]` / `()` group starting at the current
    /// opener, leaving the cursor after its closer.
    pub fn skip_group(&mut self) -> Result<(), ParseError> {
        let mut expected: Vec<Token> = Vec::new();
        loop {
            let token = self.current();
            if let Some(closer) = token.closer() {
                expected.push(closer);
            } else if token.is_closer() {
                match expected.pop() {
                    Some(closer) if &closer == token => {}
                    Some(closer) => {
                        return Err(self.error(format!("expected {}, got {}", closer, token)));
                    }
                    None => return Err(self.error(format!("unexpected {}", token))),
                }
            } else if token == &Token::Eof {
                return Err(self.error("unexpected end of input inside bracketed group"));
            }
            self.advance();
            if expected.is_empty() {
                return Ok(());
            }
        }
    }

    /// Skip an unsupported expression up to (not including) the next `,` or
    /// `closer` at the current nesting level.
    fn skip_to_separator(&mut self, closer: &Token) -> Result<(), ParseError> {
        loop {
            let token = self.current();
            if self.at_separator(closer) {
                return Ok(());
            }
            if token.is_opener() {
                self.skip_group()?;
                continue;
            }
            if self.starts_new_statement() {
                return Err(self.error(format!("expected ',' or {} before {}", closer, token)));
            }
            match token {
                Token::Eof => {
                    return Err(self.error(format!("unexpected end of input, expected {}", closer)));
                }
                Token::Semicolon => return Err(self.error("unexpected ';' inside literal")),
                Token::Operator(op) if op == "<" && self.follows_name() => {
                    match self.type_arguments_end(self.pos) {
                        Some(end) => self.seek(end),
                        None => self.advance(),
                    }
                }
                t if t.is_closer() => {
                    return Err(self.error(format!("expected {}, got {}", closer, t)));
                }
                _ => self.advance(),
            }
        }
    }

    /// Whether a semicolon would be inserted before the cursor: a word on a
    /// new line right after a complete operand.
    pub fn starts_new_statement(&self) -> bool {
        let Some(previous) = self.previous() else {
            return false;
        };
        match self.current() {
            Token::Identifier(word) => {
                !is_operator_word(word)
                    && self.position().line > previous.position.line
                    && ends_operand(&previous.token)
            }
            _ => false,
        }
    }

    fn follows_name(&self) -> bool {
        matches!(self.previous(), Some(SpannedToken { token: Token::Identifier(_), .. }))
    }

    /// Index just past a `<...>` type-argument list starting at `start`, when
    /// one is there and a call follows it (`new Map<K, V>()`, `f<T>(x)`).
    fn type_arguments_end(&self, start: usize) -> Option<usize> {
        let mut angle = 0usize;
        let mut index = start;
        loop {
            match &self.tokens.get(index)?.token {
                Token::Operator(op) if op == "<" => angle += 1,
                Token::Operator(op) if op.chars().all(|c| c == '>') => {
                    angle = angle.checked_sub(op.len())?;
                }
                Token::Operator(op) if matches!(op.as_str(), "|" | "&" | "?") => {}
                Token::Identifier(_)
                | Token::String(_)
                | Token::Number(_)
                | Token::Boolean(_)
                | Token::Null
                | Token::Undefined
                | Token::Comma
                | Token::Dot
                | Token::LBracket
                | Token::RBracket => {}
                _ => return None,
            }
            index += 1;
            if angle == 0 {
                let next = self.tokens.get(index).map(|t| &t.token);
                return matches!(next, Some(Token::LParen | Token::Template(_))).then_some(index);
            }
        }
    }

    /// Parse the value at the cursor without consuming unsupported tokens.
    ///
    /// Returns `Invalid` with the cursor still on the offending construct;
    /// callers skip it.
    fn parse_value(&mut self) -> Result<ParsedValue, ParseError> {
        let token = self.current();
        if let Some(value) = convert::scalar(token) {
            self.advance();
            return Ok(value);
        }

        let reason = match token {
            Token::LBrace => return self.parse_object(),
            Token::LBracket => return self.parse_array(),
            Token::Minus => {
                if let Token::Number(lexeme) = self.peek(1) {
                    if let Some(number) = convert::number(lexeme) {
                        self.advance();
                        self.advance();
                        return Ok(ParsedValue::Num(convert::negate(number)));
                    }
                }
                Unsupported::Expression
            }
            Token::Eof => return Err(self.error("unexpected end of input, expected a value")),
            Token::Undefined => Unsupported::Undefined,
            Token::BigInt(_) => Unsupported::BigInt,
            Token::Template(_) => Unsupported::Template,
            Token::Regex(_) => Unsupported::Regex,
            Token::Ellipsis => Unsupported::Spread,
            Token::Identifier(name) => match name.as_str() {
                "function" | "async" | "class" => Unsupported::Function,
                "new" => Unsupported::Call,
                _ => match self.peek(1) {
                    Token::LParen => Unsupported::Call,
                    Token::Operator(op) if op == "=>" => Unsupported::Function,
                    Token::Operator(op)
                        if op == "<" && self.type_arguments_end(self.pos + 1).is_some() =>
                    {
                        Unsupported::Call
                    }
                    _ => Unsupported::Identifier,
                },
            },
            Token::LParen => {
                let mut lookahead = Parser::new(self.tokens);
                lookahead.seek(self.pos);
                match lookahead.skip_group() {
                    Ok(()) if is_arrow(lookahead.current()) => Unsupported::Function,
                    _ => Unsupported::Expression,
                }
            }
            _ => Unsupported::Expression,
        };
        Ok(ParsedValue::Invalid(reason))
    }

    /// Parse one property value or array element, consuming everything up
    /// to the next separator. A literal that turns out to be the start of a
    /// larger expression is reported as invalid.
    fn parse_element(&mut self, closer: &Token) -> Result<ParsedValue, ParseError> {
        let position = self.position();
        let value = self.parse_value()?;
        if self.at_separator(closer) {
            return Ok(value);
        }

        let reason = match value {
            ParsedValue::Invalid(reason) => reason,
            _ => Unsupported::Expression,
        };
        self.skip_to_separator(closer)?;
        log::debug!("skipped unsupported {} at {}", reason, position);
        Ok(ParsedValue::Invalid(reason))
    }

    fn parse_object(&mut self) -> Result<ParsedValue, ParseError> {
        self.enter()?;
        self.expect(Token::LBrace)?;
        let mut properties = vec![];

        loop {
            match self.current() {
                Token::RBrace => break,
                Token::Eof => return Err(self.error("unterminated object literal")),
                Token::Comma => return Err(self.error("unexpected ',' in object literal")),
                _ => {}
            }

            if let Some(property) = self.parse_property()? {
                properties.push(property);
            }

            if self.check(&Token::Comma) {
                self.advance();
            } else if !self.check(&Token::RBrace) {
                return Err(self.error(format!("expected ',' or '}}', got {}", self.current())));
            }
        }

        self.expect(Token::RBrace)?;
        self.leave();
        Ok(ParsedValue::Object(properties))
    }

    /// Parse one member of an object literal, stopping before `,` or `}`.
    ///
    /// Members without a static key (spreads, computed keys, accessors,
    /// generators) yield `None`. Methods and shorthands keep their key with
    /// an invalid value, which conversion drops.
    fn parse_property(&mut self) -> Result<Option<Property>, ParseError> {
        let closer = Token::RBrace;
        let position = self.position();

        let (key, is_identifier) = match self.current() {
            Token::Ellipsis => {
                self.skip_to_separator(&closer)?;
                log::debug!("skipped spread property at {}", position);
                return Ok(None);
            }
            Token::LBracket => {
                self.skip_group()?;
                self.skip_to_separator(&closer)?;
                log::debug!("skipped computed property at {}", position);
                return Ok(None);
            }
            Token::Operator(op) if op == "*" => {
                self.skip_to_separator(&closer)?;
                log::debug!("skipped generator method at {}", position);
                return Ok(None);
            }
            Token::Identifier(name) => (name.clone(), true),
            Token::String(s) => (s.clone(), false),
            Token::Number(lexeme) | Token::BigInt(lexeme) => match convert::number(lexeme) {
                Some(number) => (convert::number_key(number), false),
                None => return Err(self.error(format!("invalid numeric key '{}'", lexeme))),
            },
            Token::Boolean(b) => (b.to_string(), true),
            Token::Null => ("null".to_string(), true),
            Token::Undefined => ("undefined".to_string(), true),
            other => return Err(self.error(format!("unexpected {} in object literal", other))),
        };
        self.advance();

        match self.current() {
            Token::Colon => {
                self.advance();
                if self.at_separator(&closer) {
                    return Err(self.error(format!("missing value for property '{}'", key)));
                }
                let value = self.parse_element(&closer)?;
                Ok(Some(Property { key, value }))
            }
            Token::Comma | Token::RBrace if is_identifier => {
                log::debug!("skipped shorthand property '{}' at {}", key, position);
                Ok(Some(Property {
                    key,
                    value: ParsedValue::Invalid(Unsupported::Identifier),
                }))
            }
            Token::LParen => {
                self.skip_to_separator(&closer)?;
                log::debug!("skipped method '{}' at {}", key, position);
                Ok(Some(Property {
                    key,
                    value: ParsedValue::Invalid(Unsupported::Function),
                }))
            }
            Token::Operator(op) if op == "<" => {
                self.skip_to_separator(&closer)?;
                log::debug!("skipped generic method '{}' at {}", key, position);
                Ok(Some(Property {
                    key,
                    value: ParsedValue::Invalid(Unsupported::Function),
                }))
            }
            // get x() {}, set x(v) {}, async x() {}, async *x() {}
            Token::Identifier(_)
            | Token::String(_)
            | Token::Number(_)
            | Token::LBracket
            | Token::Operator(_)
                if is_accessor_prefix(&key) =>
            {
                self.skip_to_separator(&closer)?;
                log::debug!("skipped '{}' member at {}", key, position);
                Ok(None)
            }
            other => Err(self.error(format!(
                "expected ':' after property key '{}', got {}",
                key, other
            ))),
        }
    }

    fn parse_array(&mut self) -> Result<ParsedValue, ParseError> {
        self.enter()?;
        self.expect(Token::LBracket)?;
        let closer = Token::RBracket;
        let mut elements = vec![];

        loop {
            match self.current() {
                Token::RBracket => break,
                Token::Eof => return Err(self.error("unterminated array literal")),
                Token::Comma => {
                    self.advance();
                    elements.push(ParsedValue::Invalid(Unsupported::Hole));
                    continue;
                }
                _ => {}
            }

            elements.push(self.parse_element(&closer)?);

            if self.check(&Token::Comma) {
                self.advance();
            } else if !self.check(&Token::RBracket) {
                return Err(self.error(format!("expected ',' or ']', got {}", self.current())));
            }
        }

        self.expect(Token::RBracket)?;
        self.leave();
        Ok(ParsedValue::Array(elements))
    }

    /// Parse the literal at the cursor as the root of a declaration.
    pub fn parse_root(&mut self) -> Result<ParsedValue, ParseError> {
        self.depth = 0;
        self.parse_value()
    }

    /// Parse a token buffer holding exactly one literal.
    pub fn parse(&mut self) -> Result<ParsedValue, ParseError> {
        self.depth = 0;
        let value = self.parse_element(&Token::Eof)?;
        if !self.check(&Token::Eof) {
            return Err(self.error(format!("unexpected {} after literal", self.current())));
        }
        Ok(value)
    }
}

fn is_accessor_prefix(key: &str) -> bool {
    matches!(key, "get" | "set" | "async" | "static")
}

fn is_arrow(token: &Token) -> bool {
    matches!(token, Token::Operator(op) if op == "=>")
}

fn is_operator_word(word: &str) -> bool {
    matches!(word, "in" | "of" | "instanceof" | "as" | "satisfies")
}

fn ends_operand(token: &Token) -> bool {
    matches!(
        token,
        Token::String(_)
            | Token::Number(_)
            | Token::BigInt(_)
            | Token::Boolean(_)
            | Token::Null
            | Token::Undefined
            | Token::Template(_)
            | Token::Regex(_)
            | Token::Identifier(_)
            | Token::RParen
            | Token::RBracket
            | Token::RBrace
    )
}
