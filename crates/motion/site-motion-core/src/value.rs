//! Presentation values handed to the rendering collaborator.
//!
//! Serialized externally tagged, e.g. `{ "float": 0.5 }` or `{ "vec2": [1, 2] }`.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Value {
    Float(f32),
    Bool(bool),
    Vec2([f32; 2]),
    Text(String),
}

impl Value {
    pub fn as_float(&self) -> Option<f32> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_vec2(&self) -> Option<[f32; 2]> {
        match self {
            Value::Vec2(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<[f32; 2]> for Value {
    fn from(v: [f32; 2]) -> Self {
        Value::Vec2(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_shape_is_externally_tagged() {
        assert_eq!(serde_json::to_value(Value::Float(0.5)).unwrap(), json!({ "float": 0.5 }));
        assert_eq!(
            serde_json::to_value(Value::Vec2([1.0, -2.0])).unwrap(),
            json!({ "vec2": [1.0, -2.0] })
        );
        let v: Value = serde_json::from_value(json!({ "text": "exit" })).unwrap();
        assert_eq!(v.as_text(), Some("exit"));
    }
}
