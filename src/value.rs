use std::collections::HashMap;

/// A literal value extracted from JS/TS source.
///
/// This mirrors a JSON value but keeps integers and floats apart, the way
/// the source literal was written: `1` is an integer, `1.0` and `1e3` are
/// floats, radix literals (`0xFF`) are integers.
///
/// Object equality ignores key order; array equality does not.
///
/// # Examples
///
/// ```
/// use dictify_js::Value;
/// use std::collections::HashMap;
///
/// let mut obj = HashMap::new();
/// obj.insert("nums".to_string(), Value::Array(vec![Value::Integer(1), Value::Float(2.5)]));
/// let object = Value::Object(obj);
///
/// assert_eq!(object.get("nums").and_then(Value::as_array).map(Vec::len), Some(2));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `null`
    Null,

    /// `true` / `false`
    Boolean(bool),

    /// Floating-point number
    Float(f64),

    /// Integer number (preserved separately from floats)
    Integer(i64),

    /// Decoded string
    String(String),

    /// Array of values, in source order
    Array(Vec<Value>),

    /// Object with string keys
    Object(HashMap<String, Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Get as float, widening integers
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&HashMap<String, Value>> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Look up a key on an object; `None` for missing keys and non-objects.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|obj| obj.get(key))
    }
}

impl From<Value> for serde_json::Value {
    /// Non-finite floats have no JSON form and become `null`.
    fn from(v: Value) -> Self {
        match v {
            Value::Null => serde_json::Value::Null,
            Value::Boolean(b) => serde_json::Value::Bool(b),
            Value::Integer(i) => serde_json::Value::Number(i.into()),
            Value::Float(f) => serde_json::Number::from_f64(f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s),
            Value::Array(arr) => {
                serde_json::Value::Array(arr.into_iter().map(serde_json::Value::from).collect())
            }
            Value::Object(obj) => serde_json::Value::Object(
                obj.into_iter()
                    .map(|(k, v)| (k, serde_json::Value::from(v)))
                    .collect(),
            ),
        }
    }
}

/// Convert a binding map to a JSON object.
pub fn bindings_to_json(bindings: HashMap<String, Value>) -> serde_json::Value {
    serde_json::Value::Object(
        bindings
            .into_iter()
            .map(|(name, value)| (name, serde_json::Value::from(value)))
            .collect(),
    )
}
