//! # dictify-js - Token and literal trees
//!
//! Two small data models sit between the lexer and the public [`Value`](crate::Value):
//!
//! - **[tokens]** - lexical tokens produced by the [`Lexer`](crate::Lexer)
//! - **[literal]** - the tagged literal tree produced by the [`Parser`](crate::Parser)
//!
//! ## Literal grammar
//!
//! ```text
//! Value       := Object | Array | String | Number | Boolean | Null | Unsupported
//! Object      := '{' (Property (',' Property)* ','?)? '}'
//! Property    := Key ':' Value | MethodShorthand | ComputedKey ':' Value | Spread
//! Key         := String | Number | Identifier
//! Array       := '[' (Value (',' Value)* ','?)? ']'
//! ```
//!
//! Anything in a value position that is not a literal becomes
//! [`ParsedValue::Invalid`] and is dropped later. Methods and shorthands keep
//! their key with an invalid value; forms with no static key (computed keys,
//! spreads, accessors, generators) never produce a [`Property`] at all.
pub mod literal;
pub mod tokens;

pub use literal::{Number, ParsedValue, Property, Unsupported};
pub use tokens::{SpannedToken, Token};
