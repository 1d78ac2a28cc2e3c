//! Discovery of `const` / `let` / `var` bindings initialised with object literals.

use crate::{
    ast::{SpannedToken, Token},
    convert,
    lexer::{LexError, Lexer},
    options::Options,
    parser::{ParseError, Parser},
    value::Value,
};
use std::collections::HashMap;

pub struct Collector<'o> {
    options: &'o Options,
}

impl<'o> Collector<'o> {
    pub fn new(options: &'o Options) -> Self {
        Collector { options }
    }

    /// Tokenize `source` and collect its object-literal bindings.
    pub fn collect(&self, source: &str) -> Result<HashMap<String, Value>, LexError> {
        let tokens = Lexer::new(source).tokenize()?;
        Ok(self.collect_tokens(&tokens))
    }

    /// Collect bindings from an already tokenized buffer ending in `Eof`.
    ///
    /// Brackets are counted as the scan goes, so declarations nested in
    /// blocks, functions or parentheses are only considered when
    /// [`Options::nested_declarations`] is set.
    pub fn collect_tokens(&self, tokens: &[SpannedToken]) -> HashMap<String, Value> {
        let mut bindings = HashMap::new();
        self.scan(tokens, 0, &mut bindings);
        bindings
    }

    /// Scan `tokens` for declarations. `level` counts how many skipped
    /// initializers enclose them.
    fn scan(&self, tokens: &[SpannedToken], level: usize, bindings: &mut HashMap<String, Value>) {
        let mut parser = Parser::new(tokens).with_max_depth(self.options.max_depth);
        let mut depth = 0usize;

        while !parser.check(&Token::Eof) {
            let token = parser.current();

            if (depth == 0 || self.options.nested_declarations) && is_declaration_keyword(token) {
                let keyword_index = parser.index();
                let position = parser.position();
                parser.advance();
                match self.parse_declaration(&mut parser, level, bindings) {
                    Ok(()) => {}
                    // The literal is balanced but too deep: rescan it so the
                    // bracket count stays right.
                    Err(e @ ParseError::TooDeep { .. }) => {
                        log::debug!("dropping declaration at {}: {}", position, e);
                        parser.seek(keyword_index + 1);
                    }
                    // Malformed literal: resume at the offending token.
                    Err(e @ ParseError::Syntax { .. }) => {
                        log::debug!("dropping declaration at {}: {}", position, e);
                    }
                }
                continue;
            }

            if token.is_opener() {
                depth += 1;
            } else if token.is_closer() {
                depth = depth.saturating_sub(1);
            }
            parser.advance();
        }
    }

    /// Parse the declarators after a `const`/`let`/`var` keyword.
    ///
    /// Initializers that are not object literals are skipped so the
    /// declarators after them are still seen. Returns with the cursor on the
    /// token that ends the statement.
    fn parse_declaration(
        &self,
        parser: &mut Parser<'_>,
        level: usize,
        bindings: &mut HashMap<String, Value>,
    ) -> Result<(), ParseError> {
        loop {
            let name = match parser.current() {
                Token::Identifier(name) => Some(name.clone()),
                // Destructuring pattern
                Token::LBrace | Token::LBracket => {
                    parser.skip_group()?;
                    None
                }
                _ => return Ok(()),
            };
            if name.is_some() {
                parser.advance();
            }

            // Definite assignment assertion: `let x!: T`
            if matches!(parser.current(), Token::Operator(op) if op == "!") {
                parser.advance();
            }
            let mut initialized = false;
            if parser.check(&Token::Colon) {
                parser.advance();
                initialized = skip_type_annotation(parser)?;
            }

            if !initialized {
                match parser.current() {
                    Token::Equals => parser.advance(),
                    Token::Comma => {
                        parser.advance();
                        continue;
                    }
                    _ => return Ok(()),
                }
            }

            match name {
                Some(name) if parser.check(&Token::LBrace) => {
                    self.parse_initializer(parser, name, level, bindings)?;
                }
                _ => {
                    log::trace!("skipping initializer at {}", parser.position());
                    self.skip_initializer(parser, level, bindings)?;
                }
            }

            if !parser.check(&Token::Comma) {
                return Ok(());
            }
            parser.advance();
        }
    }

    /// Parse an object-literal initializer and record it under `name`.
    fn parse_initializer(
        &self,
        parser: &mut Parser<'_>,
        name: String,
        level: usize,
        bindings: &mut HashMap<String, Value>,
    ) -> Result<(), ParseError> {
        let position = parser.position();
        let parsed = parser.parse_root()?;

        if continues_expression(parser.current()) {
            log::debug!("'{}' at {} is part of a larger expression", name, position);
            return self.skip_initializer(parser, level, bindings);
        }
        skip_type_assertion(parser)?;

        match convert::to_value(parsed) {
            // Nothing static survived
            Some(Value::Object(map)) if map.is_empty() => {
                log::debug!("'{}' at {} has no static properties", name, position);
            }
            Some(value @ Value::Object(_)) if self.options.accepts_name(&name) => {
                log::debug!("collected '{}' at {}", name, position);
                bindings.insert(name, value);
            }
            _ => log::trace!("'{}' filtered out", name),
        }
        Ok(())
    }

    /// Skip a non-literal initializer up to the `,` that starts the next
    /// declarator or the token that ends the statement.
    ///
    /// With nested declarations enabled, the bracketed groups passed over
    /// (function bodies, call arguments) are scanned too.
    fn skip_initializer(
        &self,
        parser: &mut Parser<'_>,
        level: usize,
        bindings: &mut HashMap<String, Value>,
    ) -> Result<(), ParseError> {
        loop {
            let token = parser.current();
            if parser.starts_new_statement() {
                return Ok(());
            }
            if token.is_opener() {
                let start = parser.index();
                parser.skip_group()?;
                if self.options.nested_declarations {
                    if level < self.options.max_depth {
                        let inner = parser.slice(start + 1, parser.index() - 1);
                        self.scan(inner, level + 1, bindings);
                    } else {
                        log::debug!("not scanning initializer nested {} levels deep", level);
                    }
                }
                continue;
            }
            match token {
                Token::Comma | Token::Semicolon | Token::Eof => return Ok(()),
                t if t.is_closer() => return Ok(()),
                _ => parser.advance(),
            }
        }
    }
}

fn is_declaration_keyword(token: &Token) -> bool {
    matches!(token, Token::Identifier(word) if matches!(word.as_str(), "const" | "let" | "var"))
}

/// Whether the token after an object literal makes it an operand rather
/// than the whole initializer (`{...}.a`, `{...}[k]`, `{...} + x`).
fn continues_expression(token: &Token) -> bool {
    match token {
        Token::Dot
        | Token::LBracket
        | Token::LParen
        | Token::Equals
        | Token::Minus
        | Token::Template(_) => true,
        // TypeScript non-null assertion
        Token::Operator(op) => op != "!",
        _ => false,
    }
}

/// Skip a TypeScript annotation up to the `=`, `,` or `;` that ends it.
///
/// Returns `true` when the `=` was glued to a closing angle (`Record<K, V>=`)
/// and has already been consumed.
fn skip_type_annotation(parser: &mut Parser<'_>) -> Result<bool, ParseError> {
    let mut angle = 0usize;
    loop {
        let token = parser.current();
        if token.is_opener() {
            parser.skip_group()?;
            continue;
        }
        match token {
            Token::Equals | Token::Comma | Token::Semicolon if angle == 0 => return Ok(false),
            Token::Eof => return Ok(false),
            Token::Operator(op) if op == "<" => angle += 1,
            Token::Operator(op) if op.starts_with('>') => {
                angle = angle.saturating_sub(closing_angles(op));
                if op.ends_with('=') {
                    parser.advance();
                    return Ok(angle == 0);
                }
            }
            t if t.is_closer() => return Ok(false),
            _ => {}
        }
        parser.advance();
    }
}

/// Number of `>` in `>`, `>>`, `>>>`, `>=`, `>>=`, `>>>=`.
fn closing_angles(op: &str) -> usize {
    op.chars().take_while(|&c| c == '>').count()
}

/// Skip `as const`, `as Config`, `satisfies Record<K, V>` after an initializer.
fn skip_type_assertion(parser: &mut Parser<'_>) -> Result<(), ParseError> {
    while parser.current().is_word("as") || parser.current().is_word("satisfies") {
        parser.advance();
        if !matches!(parser.current(), Token::Identifier(_)) {
            return Ok(());
        }
        parser.advance();
        while parser.check(&Token::Dot) {
            parser.advance();
            parser.advance();
        }
        if matches!(parser.current(), Token::Operator(op) if op == "<") {
            let mut angle = 0usize;
            loop {
                let token = parser.current();
                if token.is_opener() {
                    parser.skip_group()?;
                    continue;
                }
                match token {
                    Token::Operator(op) if op == "<" => angle += 1,
                    Token::Operator(op) if op.starts_with('>') => {
                        angle = angle.saturating_sub(closing_angles(op));
                    }
                    Token::Eof | Token::Semicolon => return Ok(()),
                    t if t.is_closer() => return Ok(()),
                    _ => {}
                }
                parser.advance();
                if angle == 0 {
                    break;
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(source: &str) -> HashMap<String, Value> {
        Collector::new(&Options::default()).collect(source).unwrap()
    }

    #[test]
    fn test_type_annotation_skipped() {
        let result = collect("const x: Record<string, number> = { a: 1 };");
        assert_eq!(result["x"].get("a"), Some(&Value::Integer(1)));
    }

    #[test]
    fn test_as_const() {
        let result = collect("export const x = { a: 1 } as const;\nconst y = { b: 2 };");
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_object_used_as_operand() {
        let result = collect("const x = { a: 1 }.a; const y = { a: 1 }['a']; const z = { b: 2 }");
        assert_eq!(result.keys().collect::<Vec<_>>(), vec!["z"]);
    }

    #[test]
    fn test_multiple_declarators() {
        let result = collect("const a = { x: 1 }, b = { y: 2 };");
        assert_eq!(result.len(), 2);
        assert_eq!(result["b"].get("y"), Some(&Value::Integer(2)));
    }

    #[test]
    fn test_failed_declaration_does_not_hide_the_next() {
        let result = collect("const bad = { a: 1\nconst good = { b: 2 };");
        assert!(!result.contains_key("bad"));
        assert_eq!(result["good"].get("b"), Some(&Value::Integer(2)));
    }

    #[test]
    fn test_angle_closed_with_equals() {
        let result = collect(
            "const a: Record<string, number>= { v: 1 };\n\
             const c: Map<string, Array<Set<number>>>= { x: 1 };\n\
             const b = { w: 2 };",
        );
        assert_eq!(result.len(), 3);
        assert_eq!(result["a"].get("v"), Some(&Value::Integer(1)));
    }

    #[test]
    fn test_assertion_with_nested_generics() {
        let result = collect("const a = { v: 1 } as A<B<C<D>>>;\nconst b = { w: 2 };");
        assert!(result.contains_key("a"));
        assert!(result.contains_key("b"));
    }

    #[test]
    fn test_non_object_declarators_skipped() {
        let result = collect(
            "const x = { a: 1, }, y = [1], n = fn(1, 2), s = 'a,b', { d } = o, z = { b: 2 };",
        );
        let mut names: Vec<_> = result.keys().cloned().collect();
        names.sort();
        assert_eq!(names, vec!["x", "z"]);
    }

    #[test]
    fn test_line_break_ends_skipped_initializer() {
        let result = collect("let count = 1\nconst later = { a: 1 }");
        assert!(result.contains_key("later"));

        let result = collect("let total = price\n  * qty, extra = { b: 1 }");
        assert!(result.contains_key("extra"));
    }

    #[test]
    fn test_empty_roots_dropped() {
        let result = collect("const e = {}; const handlers = { onClick() {}, onHover() {} };");
        assert!(result.is_empty());
    }

    #[test]
    fn test_nested_mode_scans_skipped_initializers() {
        let source = "const f = () => {\n  const inner = { a: 1 };\n}, g = { b: 2 };";

        let result = collect(source);
        assert_eq!(result.keys().collect::<Vec<_>>(), vec!["g"]);

        let options = Options::new().nested_declarations(true);
        let result = Collector::new(&options).collect(source).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result["inner"].get("a"), Some(&Value::Integer(1)));
    }
}
