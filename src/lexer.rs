use crate::ast::{SpannedToken, Token};
use thiserror::Error;

/// Location of a character in the source text.
///
/// `line` and `column` are 1-based, `offset` counts chars from the start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl Default for Position {
    fn default() -> Self {
        Position {
            line: 1,
            column: 1,
            offset: 0,
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Errors that make the token stream itself unreliable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("Unterminated string starting at {0}")]
    UnterminatedString(Position),

    #[error("Unterminated block comment starting at {0}")]
    UnterminatedComment(Position),

    #[error("Unterminated template literal starting at {0}")]
    UnterminatedTemplate(Position),

    #[error("Unterminated regular expression starting at {0}")]
    UnterminatedRegex(Position),

    #[error("Invalid escape sequence '\\{sequence}' at {position}")]
    InvalidEscape { sequence: String, position: Position },

    #[error("Malformed number '{lexeme}' at {position}")]
    MalformedNumber { lexeme: String, position: Position },

    #[error("Unexpected character '{ch}' at {position}")]
    IllegalCharacter { ch: char, position: Position },
}

impl LexError {
    pub fn position(&self) -> Position {
        match self {
            LexError::UnterminatedString(p)
            | LexError::UnterminatedComment(p)
            | LexError::UnterminatedTemplate(p)
            | LexError::UnterminatedRegex(p) => *p,
            LexError::InvalidEscape { position, .. }
            | LexError::MalformedNumber { position, .. }
            | LexError::IllegalCharacter { position, .. } => *position,
        }
    }
}

/// Punctuators other than the single-character delimiters, longest first.
const OPERATORS: &[&str] = &[
    ">>>=", "...", "===", "!==", "**=", "<<=", ">>=", ">>>", "&&=", "||=", "??=", "=>", "==",
    "!=", "<=", ">=", "&&", "||", "??", "?.", "++", "--", "+=", "-=", "*=", "/=", "%=", "&=",
    "|=", "^=", "**", "<<", ">>", "=", "<", ">", "+", "-", "*", "/", "%", "&", "|", "^", "!",
    "~", "?", "@",
];

/// Words after which a `/` starts a regular expression even though they
/// look like identifiers.
const REGEX_PRECEDING_KEYWORDS: &[&str] = &[
    "return", "typeof", "instanceof", "in", "of", "new", "delete", "void", "throw", "case", "do",
    "else", "yield", "await",
];

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
    slash_is_regex: bool,
    /// One entry per open `(`: whether it holds an `if`/`while`/`for`/`with` condition.
    condition_parens: Vec<bool>,
    after_condition_keyword: bool,
    finished: bool,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        let mut lexer = Lexer {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            slash_is_regex: true,
            condition_parens: Vec::new(),
            after_condition_keyword: false,
            finished: false,
        };

        if lexer.current_char() == Some('\u{FEFF}') {
            lexer.position += 1;
        }
        if lexer.current_char() == Some('#') && lexer.peek_char(1) == Some('!') {
            while lexer.current_char().is_some_and(|c| c != '\n') {
                lexer.advance();
            }
        }
        lexer
    }

    /// Consume the whole input, returning every token up to and including `Eof`.
    pub fn tokenize(self) -> Result<Vec<SpannedToken>, LexError> {
        self.collect()
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        if let Some(ch) = self.current_char() {
            self.position += 1;
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    fn advance_by(&mut self, count: usize) {
        for _ in 0..count {
            self.advance();
        }
    }

    fn here(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
            offset: self.position,
        }
    }

    fn starts_with(&self, text: &str) -> bool {
        text.chars()
            .enumerate()
            .all(|(i, c)| self.peek_char(i) == Some(c))
    }

    fn skip_trivia(&mut self) -> Result<(), LexError> {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() || ch == '\u{FEFF}' {
                self.advance();
            } else if self.starts_with("//") {
                while self.current_char().is_some_and(|c| c != '\n') {
                    self.advance();
                }
            } else if self.starts_with("/*") {
                let start = self.here();
                self.advance_by(2);
                loop {
                    if self.current_char().is_none() {
                        return Err(LexError::UnterminatedComment(start));
                    }
                    if self.starts_with("*/") {
                        self.advance_by(2);
                        break;
                    }
                    self.advance();
                }
            } else {
                break;
            }
        }
        Ok(())
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if is_identifier_part(ch) {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn read_string(&mut self, quote: char, start: Position) -> Result<Token, LexError> {
        let mut result = String::new();
        self.advance(); // opening quote

        loop {
            match self.current_char() {
                None | Some('\n') | Some('\r') => return Err(LexError::UnterminatedString(start)),
                Some(c) if c == quote => {
                    self.advance();
                    return Ok(Token::String(result));
                }
                Some('\\') => {
                    let escape_start = self.here();
                    self.advance();
                    self.read_escape(&mut result, start, escape_start)?;
                }
                Some(c) => {
                    result.push(c);
                    self.advance();
                }
            }
        }
    }

    /// Decode one escape sequence; the backslash is already consumed.
    fn read_escape(
        &mut self,
        out: &mut String,
        string_start: Position,
        escape_start: Position,
    ) -> Result<(), LexError> {
        let Some(ch) = self.current_char() else {
            return Err(LexError::UnterminatedString(string_start));
        };
        self.advance();

        match ch {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' => out.push('\0'),
            'x' => {
                let code = self
                    .read_hex_digits(2)
                    .ok_or_else(|| self.invalid_escape(escape_start))?;
                // Two hex digits always form a valid scalar value.
                out.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
            'u' => {
                let decoded = self.read_unicode_escape(escape_start)?;
                out.push(decoded);
            }
            // Line continuation
            '\r' => {
                if self.current_char() == Some('\n') {
                    self.advance();
                }
            }
            '\n' | '\u{2028}' | '\u{2029}' => {}
            other => out.push(other),
        }
        Ok(())
    }

    /// Decode `\uHHHH`, `\u{H..}` and surrogate pairs; `\u` is already consumed.
    fn read_unicode_escape(&mut self, escape_start: Position) -> Result<char, LexError> {
        if self.current_char() == Some('{') {
            self.advance();
            let mut code: u32 = 0;
            let mut digits = 0;
            while let Some(d) = self.current_char().and_then(|c| c.to_digit(16)) {
                code = code.saturating_mul(16).saturating_add(d);
                digits += 1;
                self.advance();
            }
            if digits == 0 || self.current_char() != Some('}') || code > 0x10FFFF {
                return Err(self.invalid_escape(escape_start));
            }
            self.advance();
            return Ok(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
        }

        let high = self
            .read_hex_digits(4)
            .ok_or_else(|| self.invalid_escape(escape_start))?;

        if (0xD800..=0xDBFF).contains(&high) {
            if let Some(low) = self.peek_low_surrogate() {
                self.advance_by(6);
                let combined = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                return Ok(char::from_u32(combined).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
        }
        Ok(char::from_u32(high).unwrap_or(char::REPLACEMENT_CHARACTER))
    }

    /// A `\uDC00`..`\uDFFF` escape directly at the cursor, without consuming it.
    fn peek_low_surrogate(&self) -> Option<u32> {
        if self.current_char() != Some('\\') || self.peek_char(1) != Some('u') {
            return None;
        }
        let mut code = 0;
        for i in 2..6 {
            code = code * 16 + self.peek_char(i)?.to_digit(16)?;
        }
        (0xDC00..=0xDFFF).contains(&code).then_some(code)
    }

    fn read_hex_digits(&mut self, count: usize) -> Option<u32> {
        let mut code = 0;
        for _ in 0..count {
            let digit = self.current_char()?.to_digit(16)?;
            code = code * 16 + digit;
            self.advance();
        }
        Some(code)
    }

    fn invalid_escape(&self, escape_start: Position) -> LexError {
        let sequence: String = self.input[escape_start.offset + 1..self.position]
            .iter()
            .collect();
        LexError::InvalidEscape {
            sequence,
            position: escape_start,
        }
    }

    fn read_template(&mut self, start: Position) -> Result<Token, LexError> {
        let mut raw = String::new();
        self.advance(); // opening backtick
        self.read_template_body(&mut raw, start)?;
        Ok(Token::Template(raw))
    }

    /// Copy template text up to the closing backtick, which is consumed but
    /// not copied. Substitutions are copied verbatim.
    fn read_template_body(&mut self, raw: &mut String, start: Position) -> Result<(), LexError> {
        loop {
            match self.current_char() {
                None => return Err(LexError::UnterminatedTemplate(start)),
                Some('`') => {
                    self.advance();
                    return Ok(());
                }
                Some('\\') => {
                    raw.push('\\');
                    self.advance();
                    let escaped = self
                        .current_char()
                        .ok_or(LexError::UnterminatedTemplate(start))?;
                    raw.push(escaped);
                    self.advance();
                }
                Some('$') if self.peek_char(1) == Some('{') => {
                    raw.push_str("${");
                    self.advance_by(2);
                    self.read_substitution(raw, start)?;
                }
                Some(c) => {
                    raw.push(c);
                    self.advance();
                }
            }
        }
    }

    /// Copy a `${ ... }` substitution including its closing brace.
    fn read_substitution(&mut self, raw: &mut String, start: Position) -> Result<(), LexError> {
        let mut depth = 0usize;
        loop {
            let Some(ch) = self.current_char() else {
                return Err(LexError::UnterminatedTemplate(start));
            };
            match ch {
                '{' => depth += 1,
                '}' if depth == 0 => {
                    raw.push('}');
                    self.advance();
                    return Ok(());
                }
                '}' => depth -= 1,
                '`' => {
                    raw.push('`');
                    self.advance();
                    self.read_template_body(raw, start)?;
                    raw.push('`');
                    continue;
                }
                '"' | '\'' => {
                    self.copy_quoted(raw, ch, start)?;
                    continue;
                }
                '/' if self.peek_char(1) == Some('/') => {
                    while self.current_char().is_some_and(|c| c != '\n') {
                        self.advance();
                    }
                    continue;
                }
                '/' if self.peek_char(1) == Some('*') => {
                    self.advance_by(2);
                    while !self.starts_with("*/") {
                        if self.current_char().is_none() {
                            return Err(LexError::UnterminatedTemplate(start));
                        }
                        self.advance();
                    }
                    self.advance_by(2);
                    continue;
                }
                _ => {}
            }
            raw.push(ch);
            self.advance();
        }
    }

    fn copy_quoted(&mut self, raw: &mut String, quote: char, start: Position) -> Result<(), LexError> {
        raw.push(quote);
        self.advance();
        loop {
            match self.current_char() {
                None | Some('\n') => return Err(LexError::UnterminatedTemplate(start)),
                Some('\\') => {
                    raw.push('\\');
                    self.advance();
                    if let Some(c) = self.current_char() {
                        raw.push(c);
                        self.advance();
                    }
                }
                Some(c) => {
                    raw.push(c);
                    self.advance();
                    if c == quote {
                        return Ok(());
                    }
                }
            }
        }
    }

    fn read_regex(&mut self, start: Position) -> Result<Token, LexError> {
        let mut raw = String::from("/");
        let mut in_class = false;
        self.advance(); // opening slash

        loop {
            match self.current_char() {
                None | Some('\n') | Some('\r') => return Err(LexError::UnterminatedRegex(start)),
                Some('\\') => {
                    raw.push('\\');
                    self.advance();
                    match self.current_char() {
                        None | Some('\n') | Some('\r') => {
                            return Err(LexError::UnterminatedRegex(start));
                        }
                        Some(c) => {
                            raw.push(c);
                            self.advance();
                        }
                    }
                }
                Some('/') if !in_class => {
                    raw.push('/');
                    self.advance();
                    break;
                }
                Some(c) => {
                    if c == '[' {
                        in_class = true;
                    } else if c == ']' {
                        in_class = false;
                    }
                    raw.push(c);
                    self.advance();
                }
            }
        }

        // Flags
        raw.push_str(&self.read_identifier());
        Ok(Token::Regex(raw))
    }

    fn read_number(&mut self, start: Position) -> Result<Token, LexError> {
        let mut number = String::new();

        let radix = match (self.current_char(), self.peek_char(1)) {
            (Some('0'), Some('x' | 'X')) => Some(16),
            (Some('0'), Some('b' | 'B')) => Some(2),
            (Some('0'), Some('o' | 'O')) => Some(8),
            _ => None,
        };

        let mut is_integer = true;
        if let Some(radix) = radix {
            number.push('0');
            number.extend(self.peek_char(1));
            self.advance_by(2);
            if self.read_digits(&mut number, radix) == 0 {
                return Err(self.malformed_number(number, start));
            }
        } else {
            self.read_digits(&mut number, 10);
            if self.current_char() == Some('.') {
                is_integer = false;
                number.push('.');
                self.advance();
                self.read_digits(&mut number, 10);
            }
            if matches!(self.current_char(), Some('e' | 'E')) {
                is_integer = false;
                number.extend(self.current_char());
                self.advance();
                if let Some(sign @ ('+' | '-')) = self.current_char() {
                    number.push(sign);
                    self.advance();
                }
                if self.read_digits(&mut number, 10) == 0 {
                    return Err(self.malformed_number(number, start));
                }
            }
        }

        if is_integer && self.current_char() == Some('n') {
            self.advance();
            return Ok(Token::BigInt(number));
        }

        if let Some(ch) = self.current_char().filter(|c| is_identifier_part(*c)) {
            number.push(ch);
            return Err(self.malformed_number(number, start));
        }

        Ok(Token::Number(number))
    }

    /// Append digits of `radix` (skipping `_` separators), returning how many were read.
    fn read_digits(&mut self, number: &mut String, radix: u32) -> usize {
        let mut count = 0;
        while let Some(ch) = self.current_char() {
            if ch.is_digit(radix) {
                number.push(ch);
                count += 1;
            } else if ch != '_' || count == 0 {
                break;
            }
            self.advance();
        }
        count
    }

    fn malformed_number(&self, lexeme: String, position: Position) -> LexError {
        LexError::MalformedNumber { lexeme, position }
    }

    fn read_operator(&mut self) -> Option<Token> {
        let op = OPERATORS.iter().find(|op| self.starts_with(op))?;
        // `?.5` is a conditional followed by a number, not optional chaining
        if *op == "?." && self.peek_char(2).is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
            return Some(Token::Operator("?".to_string()));
        }
        self.advance_by(op.chars().count());

        Some(match *op {
            "..." => Token::Ellipsis,
            "=" => Token::Equals,
            "-" => Token::Minus,
            other => Token::Operator(other.to_string()),
        })
    }

    /// Next token with the position of its first character.
    pub fn next_spanned(&mut self) -> Result<SpannedToken, LexError> {
        self.skip_trivia()?;
        let position = self.here();

        let token = match self.current_char() {
            None => Token::Eof,
            Some('{') => self.single(Token::LBrace),
            Some('}') => self.single(Token::RBrace),
            Some('[') => self.single(Token::LBracket),
            Some(']') => self.single(Token::RBracket),
            Some('(') => self.single(Token::LParen),
            Some(')') => self.single(Token::RParen),
            Some(':') => self.single(Token::Colon),
            Some(',') => self.single(Token::Comma),
            Some(';') => self.single(Token::Semicolon),
            Some('"') => self.read_string('"', position)?,
            Some('\'') => self.read_string('\'', position)?,
            Some('`') => self.read_template(position)?,
            Some(ch) if ch.is_ascii_digit() => self.read_number(position)?,
            Some('.') if self.peek_char(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.read_number(position)?
            }
            Some('.') if !self.starts_with("...") => self.single(Token::Dot),
            Some('/') if self.slash_is_regex => self.read_regex(position)?,
            Some('#') if self.peek_char(1).is_some_and(is_identifier_start) => {
                self.advance();
                Token::Identifier(format!("#{}", self.read_identifier()))
            }
            Some(ch) if is_identifier_start(ch) => {
                let ident = self.read_identifier();

                match ident.as_str() {
                    "true" => Token::Boolean(true),
                    "false" => Token::Boolean(false),
                    "null" => Token::Null,
                    "undefined" => Token::Undefined,
                    _ => Token::Identifier(ident),
                }
            }
            Some(ch) => match self.read_operator() {
                Some(token) => token,
                None => return Err(LexError::IllegalCharacter { ch, position }),
            },
        };

        self.slash_is_regex = match &token {
            // `if (x) /re/.test(y)`: a statement starts after the condition
            Token::RParen => self.condition_parens.pop().unwrap_or(false),
            _ => !produces_value(&token),
        };
        if token == Token::LParen {
            self.condition_parens.push(self.after_condition_keyword);
        }
        self.after_condition_keyword = matches!(
            &token,
            Token::Identifier(word) if matches!(word.as_str(), "if" | "while" | "for" | "with")
        );
        log::trace!("token {} at {}", token, position);
        Ok(SpannedToken { token, position })
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.next_spanned().map(|spanned| spanned.token)
    }

    fn single(&mut self, token: Token) -> Token {
        self.advance();
        token
    }
}

impl Iterator for Lexer {
    type Item = Result<SpannedToken, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let result = self.next_spanned();
        if matches!(&result, Ok(SpannedToken { token: Token::Eof, .. }) | Err(_)) {
            self.finished = true;
        }
        Some(result)
    }
}

fn is_identifier_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_' || ch == '$'
}

fn is_identifier_part(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$' || ch == '\u{200C}' || ch == '\u{200D}'
}

/// Whether a `/` after this token is division rather than a regex.
fn produces_value(token: &Token) -> bool {
    match token {
        Token::Identifier(name) => !REGEX_PRECEDING_KEYWORDS.contains(&name.as_str()),
        Token::Operator(op) => op == "++" || op == "--",
        Token::String(_)
        | Token::Number(_)
        | Token::BigInt(_)
        | Token::Boolean(_)
        | Token::Null
        | Token::Undefined
        | Token::Template(_)
        | Token::Regex(_)
        | Token::RParen
        | Token::RBracket => true,
        _ => false,
    }
}

#[test]
fn test_keywords() {
    let mut lexer = Lexer::new("true false null undefined const");
    assert_eq!(lexer.next_token(), Ok(Token::Boolean(true)));
    assert_eq!(lexer.next_token(), Ok(Token::Boolean(false)));
    assert_eq!(lexer.next_token(), Ok(Token::Null));
    assert_eq!(lexer.next_token(), Ok(Token::Undefined));
    assert_eq!(lexer.next_token(), Ok(Token::Identifier("const".to_string())));
    assert_eq!(lexer.next_token(), Ok(Token::Eof));
}

#[test]
fn test_positions() {
    let tokens = Lexer::new("a\n  {").tokenize().unwrap();
    assert_eq!(tokens[1].position.line, 2);
    assert_eq!(tokens[1].position.column, 3);
    assert_eq!(tokens[1].position.offset, 4);
}

#[test]
fn test_iterator_stops_after_eof() {
    let mut lexer = Lexer::new("x");
    assert!(lexer.next().is_some());
    assert!(matches!(lexer.next(), Some(Ok(SpannedToken { token: Token::Eof, .. }))));
    assert!(lexer.next().is_none());
}
