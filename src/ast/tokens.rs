use crate::lexer::Position;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    /// String literal enclosed in single or double quotes, escapes already decoded
    ///
    /// # Examples
    /// ```text
    /// "hello"
    /// 'it\'s'
    /// ```
    String(String),

    /// Numeric literal, kept as its source lexeme (separators stripped)
    ///
    /// Base decoding happens in the converter.
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 3.14
    /// 1e6
    /// 0x1A
    /// 0b101
    /// 0o17
    /// ```
    Number(String),

    /// BigInt literal (`10n`), lexeme without the suffix
    BigInt(String),

    /// `true` / `false`
    Boolean(bool),

    /// `null`
    Null,

    /// `undefined`
    Undefined,

    /// Template literal, kept opaque (raw text between the backticks)
    ///
    /// # Examples
    /// ```text
    /// `plain`
    /// `hello ${world}`
    /// ```
    Template(String),

    /// Regular expression literal, kept opaque (raw text including flags)
    ///
    /// # Examples
    /// ```text
    /// /ab+c/gi
    /// ```
    Regex(String),

    // Identifiers
    /// Any identifier-shaped word that is not one of the literal keywords
    ///
    /// Keywords such as `const` or `function` are identifiers too; the
    /// collector and parser look at their text.
    ///
    /// # Examples
    /// ```text
    /// storyWorld
    /// $el
    /// _private
    /// #field
    /// ```
    Identifier(String),

    // Delimiters
    /// Left brace
    LBrace,

    /// Right brace
    RBrace,

    /// Left bracket
    LBracket,

    /// Right bracket
    RBracket,

    /// Left parenthesis
    LParen,

    /// Right parenthesis
    RParen,

    /// Colon separating an object key from its value
    Colon,

    /// Comma separating properties, elements and declarators
    Comma,

    /// Statement terminator
    Semicolon,

    /// Plain assignment `=` (not `==`, `=>`, `+=`, ...)
    Equals,

    /// Unary or binary minus
    Minus,

    /// Member access dot
    Dot,

    /// Spread / rest `...`
    Ellipsis,

    /// Every other punctuator, longest match first
    ///
    /// # Examples
    /// ```text
    /// =>
    /// ===
    /// ?.
    /// &&=
    /// ```
    Operator(String),

    /// End of input
    Eof,
}

impl Token {
    /// Whether this token opens a bracketed group.
    pub fn is_opener(&self) -> bool {
        matches!(self, Token::LBrace | Token::LBracket | Token::LParen)
    }

    /// Whether this token closes a bracketed group.
    pub fn is_closer(&self) -> bool {
        matches!(self, Token::RBrace | Token::RBracket | Token::RParen)
    }

    /// The closer that balances this opener.
    pub fn closer(&self) -> Option<Token> {
        match self {
            Token::LBrace => Some(Token::RBrace),
            Token::LBracket => Some(Token::RBracket),
            Token::LParen => Some(Token::RParen),
            _ => None,
        }
    }

    /// Whether this is the identifier `word`.
    pub fn is_word(&self, word: &str) -> bool {
        matches!(self, Token::Identifier(name) if name == word)
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::String(s) => write!(f, "string {:?}", s),
            Token::Number(n) => write!(f, "number {}", n),
            Token::BigInt(n) => write!(f, "bigint {}n", n),
            Token::Boolean(b) => write!(f, "'{}'", b),
            Token::Null => write!(f, "'null'"),
            Token::Undefined => write!(f, "'undefined'"),
            Token::Template(_) => write!(f, "template literal"),
            Token::Regex(r) => write!(f, "regex {}", r),
            Token::Identifier(name) => write!(f, "identifier '{}'", name),
            Token::LBrace => write!(f, "'{{'"),
            Token::RBrace => write!(f, "'}}'"),
            Token::LBracket => write!(f, "'['"),
            Token::RBracket => write!(f, "']'"),
            Token::LParen => write!(f, "'('"),
            Token::RParen => write!(f, "')'"),
            Token::Colon => write!(f, "':'"),
            Token::Comma => write!(f, "','"),
            Token::Semicolon => write!(f, "';'"),
            Token::Equals => write!(f, "'='"),
            Token::Minus => write!(f, "'-'"),
            Token::Dot => write!(f, "'.'"),
            Token::Ellipsis => write!(f, "'...'"),
            Token::Operator(op) => write!(f, "'{}'", op),
            Token::Eof => write!(f, "end of input"),
        }
    }
}

/// A token together with the position of its first character.
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub position: Position,
}
