//! Conversion from tokens and literal trees to native values.
//!
//! Leaf conversion ([`scalar`], [`number`], [`negate`]) is called by the
//! parser as it meets terminal tokens. Tree conversion ([`to_value`]) runs
//! once per collected binding and is where `Invalid` nodes disappear.

use crate::ast::{Number, ParsedValue, Token};
use crate::value::Value;
use std::collections::HashMap;

/// Convert a terminal token to a literal, or `None` if the token is not a
/// literal scalar.
pub fn scalar(token: &Token) -> Option<ParsedValue> {
    match token {
        Token::String(s) => Some(ParsedValue::Str(s.clone())),
        Token::Number(lexeme) => number(lexeme).map(ParsedValue::Num),
        Token::Boolean(b) => Some(ParsedValue::Bool(*b)),
        Token::Null => Some(ParsedValue::Null),
        _ => None,
    }
}

/// Decode a numeric lexeme.
///
/// Radix literals (including legacy `0`-prefixed octal) are always integers;
/// decimal lexemes are integers unless they carry a fraction or exponent.
/// Integers that do not fit in `i64` become floats.
pub fn number(lexeme: &str) -> Option<Number> {
    let radix = match lexeme.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0b" | "0B") => Some(2),
        Some("0o" | "0O") => Some(8),
        _ => None,
    };

    if let Some(radix) = radix {
        let digits = &lexeme[2..];
        if digits.is_empty() {
            return None;
        }
        return match i64::from_str_radix(digits, radix) {
            Ok(n) => Some(Number::Integer(n)),
            Err(_) => radix_to_float(digits, radix).map(Number::Float),
        };
    }

    // Sloppy-mode legacy octal: `010` is 8, but `089` stays decimal
    if lexeme.len() > 1 && lexeme.starts_with('0') && lexeme.bytes().all(|b| (b'0'..b'8').contains(&b)) {
        return match i64::from_str_radix(lexeme, 8) {
            Ok(n) => Some(Number::Integer(n)),
            Err(_) => radix_to_float(lexeme, 8).map(Number::Float),
        };
    }

    let is_float = lexeme.contains(['.', 'e', 'E']);
    if !is_float {
        if let Ok(n) = lexeme.parse::<i64>() {
            return Some(Number::Integer(n));
        }
    }
    lexeme.parse::<f64>().ok().map(Number::Float)
}

fn radix_to_float(digits: &str, radix: u32) -> Option<f64> {
    digits.chars().try_fold(0.0f64, |acc, c| {
        c.to_digit(radix).map(|d| acc * radix as f64 + d as f64)
    })
}

/// Apply a unary minus.
pub fn negate(number: Number) -> Number {
    match number {
        Number::Integer(n) => match n.checked_neg() {
            Some(neg) => Number::Integer(neg),
            None => Number::Float(-(n as f64)),
        },
        Number::Float(f) => Number::Float(-f),
    }
}

/// Property name a numeric key coerces to (`0x10` -> `"16"`, `1.50` -> `"1.5"`).
pub fn number_key(number: Number) -> String {
    match number {
        Number::Integer(n) => n.to_string(),
        Number::Float(f) => f.to_string(),
    }
}

/// Convert a literal tree to a public value.
///
/// Returns `None` for `Invalid`. Invalid properties and elements are dropped
/// recursively; duplicate keys keep the last occurrence.
pub fn to_value(parsed: ParsedValue) -> Option<Value> {
    match parsed {
        ParsedValue::Object(properties) => {
            let mut map = HashMap::with_capacity(properties.len());
            for property in properties {
                match to_value(property.value) {
                    Some(value) => {
                        map.insert(property.key, value);
                    }
                    None => log::debug!("dropping property '{}'", property.key),
                }
            }
            Some(Value::Object(map))
        }
        ParsedValue::Array(elements) => {
            Some(Value::Array(elements.into_iter().filter_map(to_value).collect()))
        }
        ParsedValue::Str(s) => Some(Value::String(s)),
        ParsedValue::Num(Number::Integer(n)) => Some(Value::Integer(n)),
        ParsedValue::Num(Number::Float(f)) => Some(Value::Float(f)),
        ParsedValue::Bool(b) => Some(Value::Boolean(b)),
        ParsedValue::Null => Some(Value::Null),
        ParsedValue::Invalid(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Property, Unsupported};

    #[test]
    fn test_radix_numbers() {
        assert_eq!(number("0x1A"), Some(Number::Integer(26)));
        assert_eq!(number("0B101"), Some(Number::Integer(5)));
        assert_eq!(number("0o17"), Some(Number::Integer(15)));
    }

    #[test]
    fn test_decimal_numbers() {
        assert_eq!(number("42"), Some(Number::Integer(42)));
        assert_eq!(number("4.2"), Some(Number::Float(4.2)));
        assert_eq!(number("1e6"), Some(Number::Float(1e6)));
        assert_eq!(number(".5"), Some(Number::Float(0.5)));
        assert_eq!(number("1."), Some(Number::Float(1.0)));
    }

    #[test]
    fn test_overflow_becomes_float() {
        assert_eq!(
            number("99999999999999999999"),
            Some(Number::Float(99999999999999999999.0))
        );
        assert_eq!(
            number("0x10000000000000000"),
            Some(Number::Float(18446744073709551616.0))
        );
    }

    #[test]
    fn test_negate() {
        assert_eq!(negate(Number::Float(4.2)), Number::Float(-4.2));
        assert_eq!(negate(Number::Integer(10)), Number::Integer(-10));
        assert_eq!(negate(Number::Integer(0)), Number::Integer(0));
    }

    #[test]
    fn test_number_key() {
        assert_eq!(number_key(Number::Integer(16)), "16");
        assert_eq!(number_key(Number::Float(1.5)), "1.5");
    }

    #[test]
    fn test_invalid_nodes_dropped() {
        let parsed = ParsedValue::Object(vec![
            Property {
                key: "keep".to_string(),
                value: ParsedValue::Array(vec![
                    ParsedValue::Num(Number::Integer(1)),
                    ParsedValue::Invalid(Unsupported::Call),
                    ParsedValue::Null,
                ]),
            },
            Property {
                key: "drop".to_string(),
                value: ParsedValue::Invalid(Unsupported::Identifier),
            },
        ]);

        let value = to_value(parsed).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 1);
        assert_eq!(
            object["keep"],
            Value::Array(vec![Value::Integer(1), Value::Null])
        );
    }

    #[test]
    fn test_duplicate_keys_last_wins() {
        let parsed = ParsedValue::Object(vec![
            Property {
                key: "a".to_string(),
                value: ParsedValue::Num(Number::Integer(1)),
            },
            Property {
                key: "a".to_string(),
                value: ParsedValue::Num(Number::Integer(2)),
            },
        ]);
        let value = to_value(parsed).unwrap();
        assert_eq!(value.get("a"), Some(&Value::Integer(2)));
    }

    #[test]
    fn test_legacy_octal() {
        assert_eq!(number("010"), Some(Number::Integer(8)));
        assert_eq!(number("0777"), Some(Number::Integer(511)));
        assert_eq!(number("089"), Some(Number::Integer(89)));
        assert_eq!(number("0"), Some(Number::Integer(0)));
        assert_eq!(number("0.5"), Some(Number::Float(0.5)));
    }

    #[test]
    fn test_later_invalid_duplicate_keeps_earlier_value() {
        let parsed = ParsedValue::Object(vec![
            Property {
                key: "a".to_string(),
                value: ParsedValue::Num(Number::Integer(1)),
            },
            Property {
                key: "a".to_string(),
                value: ParsedValue::Invalid(Unsupported::Function),
            },
        ]);
        let value = to_value(parsed).unwrap();
        assert_eq!(value.get("a"), Some(&Value::Integer(1)));
    }
}
