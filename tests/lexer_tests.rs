// tests/lexer_tests.rs

use dictify_js::ast::Token;
use dictify_js::lexer::{LexError, Lexer};

fn tokens(input: &str) -> Vec<Token> {
    Lexer::new(input)
        .tokenize()
        .unwrap()
        .into_iter()
        .map(|t| t.token)
        .collect()
}

fn ident(name: &str) -> Token {
    Token::Identifier(name.to_string())
}

fn string(s: &str) -> Token {
    Token::String(s.to_string())
}

fn number(lexeme: &str) -> Token {
    Token::Number(lexeme.to_string())
}

fn op(op: &str) -> Token {
    Token::Operator(op.to_string())
}

// ============================================================================
// Punctuation
// ============================================================================

#[test]
fn test_single_char_tokens() {
    let test_cases = vec![
        ("{", Token::LBrace),
        ("}", Token::RBrace),
        ("[", Token::LBracket),
        ("]", Token::RBracket),
        ("(", Token::LParen),
        (")", Token::RParen),
        (":", Token::Colon),
        (",", Token::Comma),
        (";", Token::Semicolon),
        ("=", Token::Equals),
        ("-", Token::Minus),
        (".", Token::Dot),
    ];

    for (input, expected) in test_cases {
        let mut lexer = Lexer::new(input);
        let token = lexer.next_token().unwrap();
        assert_eq!(token, expected, "Failed for input: {}", input);
        assert_eq!(lexer.next_token().unwrap(), Token::Eof);
    }
}

#[test]
fn test_operators_longest_match() {
    assert_eq!(tokens("=> === ..."), vec![op("=>"), op("==="), Token::Ellipsis, Token::Eof]);
    assert_eq!(tokens("a?.b"), vec![ident("a"), op("?."), ident("b"), Token::Eof]);
    assert_eq!(
        tokens("x ?.5 : 1"),
        vec![ident("x"), op("?"), number(".5"), Token::Colon, number("1"), Token::Eof]
    );
}

// ============================================================================
// Keywords and identifiers
// ============================================================================

#[test]
fn test_keywords_vs_identifiers() {
    assert_eq!(
        tokens("true false null undefined trueish $el _x #priv"),
        vec![
            Token::Boolean(true),
            Token::Boolean(false),
            Token::Null,
            Token::Undefined,
            ident("trueish"),
            ident("$el"),
            ident("_x"),
            ident("#priv"),
            Token::Eof,
        ]
    );
}

#[test]
fn test_unicode_identifier() {
    assert_eq!(tokens("café"), vec![ident("café"), Token::Eof]);
}

// ============================================================================
// Strings
// ============================================================================

#[test]
fn test_quotes() {
    assert_eq!(
        tokens(r#""double" 'single' "it's" 'say "hi"'"#),
        vec![
            string("double"),
            string("single"),
            string("it's"),
            string("say \"hi\""),
            Token::Eof,
        ]
    );
}

#[test]
fn test_simple_escapes() {
    assert_eq!(
        tokens(r#""line1\nline2\t\\\"\'\r\0""#),
        vec![string("line1\nline2\t\\\"'\r\0"), Token::Eof]
    );
}

#[test]
fn test_hex_and_unicode_escapes() {
    assert_eq!(tokens(r#""\x41B\u{43}""#), vec![string("ABC"), Token::Eof]);
    assert_eq!(tokens(r#""\u0041""#), vec![string("A"), Token::Eof]);
}

#[test]
fn test_surrogate_pair() {
    assert_eq!(tokens(r#""\uD83D\uDE00""#), vec![string("😀"), Token::Eof]);
    assert_eq!(tokens(r#""\uD83D""#), vec![string("\u{FFFD}"), Token::Eof]);
}

#[test]
fn test_line_continuation() {
    assert_eq!(tokens("'ab\\\ncd'"), vec![string("abcd"), Token::Eof]);
}

#[test]
fn test_unterminated_string() {
    let result = Lexer::new("const x = 'open").tokenize();
    assert!(matches!(result, Err(LexError::UnterminatedString(_))));

    let result = Lexer::new("'broken\nline'").tokenize();
    assert!(matches!(result, Err(LexError::UnterminatedString(_))));
}

#[test]
fn test_invalid_escape() {
    let result = Lexer::new(r#""\xZZ""#).tokenize();
    assert!(matches!(result, Err(LexError::InvalidEscape { .. })));
    assert!(result.unwrap_err().to_string().contains("Invalid escape"));
}

// ============================================================================
// Numbers
// ============================================================================

#[test]
fn test_numbers() {
    assert_eq!(
        tokens("42 3.14 1e6 -3.2e-4 .5 0x1A 0b101 0o17 1_000"),
        vec![
            number("42"),
            number("3.14"),
            number("1e6"),
            Token::Minus,
            number("3.2e-4"),
            number(".5"),
            number("0x1A"),
            number("0b101"),
            number("0o17"),
            number("1000"),
            Token::Eof,
        ]
    );
}

#[test]
fn test_bigint() {
    assert_eq!(tokens("10n"), vec![Token::BigInt("10".into()), Token::Eof]);
}

#[test]
fn test_malformed_numbers() {
    assert!(matches!(
        Lexer::new("0x").tokenize(),
        Err(LexError::MalformedNumber { .. })
    ));
    assert!(matches!(
        Lexer::new("1e+").tokenize(),
        Err(LexError::MalformedNumber { .. })
    ));
    assert!(matches!(
        Lexer::new("3px").tokenize(),
        Err(LexError::MalformedNumber { .. })
    ));
}

// ============================================================================
// Comments and whitespace
// ============================================================================

#[test]
fn test_comments_skipped() {
    assert_eq!(
        tokens("a // line\n/* block\n * more */ b /**/c"),
        vec![ident("a"), ident("b"), ident("c"), Token::Eof]
    );
}

#[test]
fn test_comment_markers_inside_strings() {
    assert_eq!(
        tokens("'http://x' \"/* no */\""),
        vec![string("http://x"), string("/* no */"), Token::Eof]
    );
}

#[test]
fn test_unterminated_comment() {
    let result = Lexer::new("a /* never closed").tokenize();
    assert!(matches!(result, Err(LexError::UnterminatedComment(_))));
}

#[test]
fn test_shebang_and_bom() {
    assert_eq!(
        tokens("\u{FEFF}#!/usr/bin/env node\nx"),
        vec![ident("x"), Token::Eof]
    );
}

// ============================================================================
// Templates and regular expressions
// ============================================================================

#[test]
fn test_template_is_single_token() {
    assert_eq!(
        tokens("`a ${b + `c${ {d: '}'}.d }`} e` ,"),
        vec![
            Token::Template("a ${b + `c${ {d: '}'}.d }`} e".into()),
            Token::Comma,
            Token::Eof,
        ]
    );
}

#[test]
fn test_unterminated_template() {
    let result = Lexer::new("`abc ${x").tokenize();
    assert!(matches!(result, Err(LexError::UnterminatedTemplate(_))));
}

#[test]
fn test_regex_vs_division() {
    assert_eq!(
        tokens("x: /a[/]b/gi, y = a / b"),
        vec![
            ident("x"),
            Token::Colon,
            Token::Regex("/a[/]b/gi".into()),
            Token::Comma,
            ident("y"),
            Token::Equals,
            ident("a"),
            op("/"),
            ident("b"),
            Token::Eof,
        ]
    );
}

#[test]
fn test_regex_after_condition() {
    assert_eq!(
        tokens("if (x) /'/.test(y)"),
        vec![
            ident("if"),
            Token::LParen,
            ident("x"),
            Token::RParen,
            Token::Regex("/'/".into()),
            Token::Dot,
            ident("test"),
            Token::LParen,
            ident("y"),
            Token::RParen,
            Token::Eof,
        ]
    );
    assert_eq!(
        tokens("(a) / f(b) / 2"),
        vec![
            Token::LParen,
            ident("a"),
            Token::RParen,
            op("/"),
            ident("f"),
            Token::LParen,
            ident("b"),
            Token::RParen,
            op("/"),
            number("2"),
            Token::Eof,
        ]
    );
}

#[test]
fn test_regex_after_return() {
    assert_eq!(
        tokens("return /x/"),
        vec![ident("return"), Token::Regex("/x/".into()), Token::Eof]
    );
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_illegal_character() {
    let mut lexer = Lexer::new("a § b");
    lexer.next_token().unwrap();
    let result = lexer.next_token();
    assert!(matches!(result, Err(LexError::IllegalCharacter { ch: '§', .. })));
    assert!(result.unwrap_err().to_string().contains("line 1, column 3"));
}

#[test]
fn test_lexer_is_restartable() {
    let source = "{ a: 1 }";
    let first: Vec<_> = Lexer::new(source).collect();
    let second: Vec<_> = Lexer::new(source).collect();
    assert_eq!(first, second);
    assert_eq!(first.len(), 6);
}
