/// A numeric literal after base decoding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Integer(i64),
    Float(f64),
}

/// Why a value position could not be turned into a literal.
///
/// Used only for diagnostics; every reason is dropped the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unsupported {
    /// Bare identifier used as a value (`SOME_CONST`, `NaN`, `Infinity`)
    Identifier,
    /// `function` expression or arrow function
    Function,
    /// Call expression (`fn()`, `new Foo()`)
    Call,
    /// Template literal
    Template,
    /// Regular expression literal
    Regex,
    /// Spread element (`...rest`)
    Spread,
    /// The `undefined` keyword
    Undefined,
    /// BigInt literal
    BigInt,
    /// Array hole (`[1, , 2]`)
    Hole,
    /// Literal that continues into a larger expression (`1 + 2`, `"a".length`)
    Expression,
}

impl std::fmt::Display for Unsupported {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Unsupported::Identifier => "identifier reference",
            Unsupported::Function => "function",
            Unsupported::Call => "call expression",
            Unsupported::Template => "template literal",
            Unsupported::Regex => "regular expression",
            Unsupported::Spread => "spread element",
            Unsupported::Undefined => "undefined",
            Unsupported::BigInt => "bigint literal",
            Unsupported::Hole => "array hole",
            Unsupported::Expression => "expression",
        };
        f.write_str(name)
    }
}

/// Literal tree produced by the parser.
///
/// `Invalid` marks a value position that held an unsupported construct; it
/// is removed (together with its property or element) when the tree is
/// converted to a public [`Value`](crate::Value).
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedValue {
    /// Object literal, properties in source order (duplicates kept)
    Object(Vec<Property>),
    /// Array literal, elements in source order
    Array(Vec<ParsedValue>),
    Str(String),
    Num(Number),
    Bool(bool),
    Null,
    Invalid(Unsupported),
}

impl ParsedValue {
    pub fn is_invalid(&self) -> bool {
        matches!(self, ParsedValue::Invalid(_))
    }
}

/// One `key: value` pair of an object literal.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub key: String,
    pub value: ParsedValue,
}
