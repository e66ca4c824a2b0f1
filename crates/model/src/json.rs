//! Token graph ⇄ JSON.
//!
//! Persisted files use 4-space indentation with one exception: a reference
//! object is always written on one line (`{"ref": "..."}`), and the key
//! spelling found on input is kept so a no-op run rewrites identical bytes.

use serde::Serialize;
use serde_json::Value;

use crate::error::{ModelError, Result};
use crate::token::{RefStyle, Reference, Scalar, Token, TokenMap};

const INDENT: &str = "    ";

/// Parse a persisted token file
pub fn parse_token_file(text: &str) -> Result<Token> {
    let value: Value = serde_json::from_str(text)?;
    if !value.is_object() {
        return Err(ModelError::RootNotObject);
    }
    token_from_value(value)
}

/// Convert an already parsed JSON value
pub fn token_from_value(value: Value) -> Result<Token> {
    convert(value, &mut Vec::new())
}

fn convert(value: Value, path: &mut Vec<String>) -> Result<Token> {
    match value {
        Value::String(s) => Ok(Token::Literal(Scalar::String(s))),
        Value::Number(n) => Ok(Token::Literal(Scalar::Number(n))),
        Value::Bool(b) => Ok(Token::Literal(Scalar::Bool(b))),
        Value::Null => Err(ModelError::UnsupportedValue {
            path: path.join("/"),
            kind: "null",
        }),
        Value::Array(_) => Err(ModelError::UnsupportedValue {
            path: path.join("/"),
            kind: "array",
        }),
        Value::Object(object) => {
            if let Some(reference) = reference_shape(&object, path) {
                return Ok(Token::Reference(reference));
            }
            let mut map = TokenMap::with_capacity(object.len());
            for (key, child) in object {
                path.push(key.clone());
                let token = convert(child, path)?;
                path.pop();
                map.insert(key, token);
            }
            Ok(Token::Node(map))
        }
    }
}

fn reference_shape(object: &serde_json::Map<String, Value>, path: &[String]) -> Option<Reference> {
    if object.len() != 1 {
        return None;
    }
    let (key, value) = object.iter().next()?;
    let style = RefStyle::from_key(key)?;
    let Some(pointer) = value.as_str() else {
        log::warn!(
            "'{key}' at /{} is not a string, keeping it as a plain container",
            path.join("/")
        );
        return None;
    };
    Some(Reference::new(pointer).with_style(style))
}

/// Convert back into a JSON value (key order preserved)
pub fn token_to_value(token: &Token) -> Value {
    match token {
        Token::Literal(Scalar::String(s)) => Value::String(s.clone()),
        Token::Literal(Scalar::Number(n)) => Value::Number(n.clone()),
        Token::Literal(Scalar::Bool(b)) => Value::Bool(*b),
        Token::Reference(reference) => {
            let mut object = serde_json::Map::new();
            object.insert(
                reference.style.key().to_string(),
                Value::String(reference.pointer.clone()),
            );
            Value::Object(object)
        }
        Token::Node(map) => Value::Object(
            map.iter()
                .map(|(key, child)| (key.clone(), token_to_value(child)))
                .collect(),
        ),
    }
}

impl Serialize for Token {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        token_to_value(self).serialize(serializer)
    }
}

impl Serialize for Scalar {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        token_to_value(&Token::Literal(self.clone())).serialize(serializer)
    }
}

/// Canonical persisted text, newline terminated
pub fn to_canonical_json(token: &Token) -> String {
    let mut out = String::new();
    write_token(&mut out, token, 0);
    out.push('\n');
    out
}

fn write_token(out: &mut String, token: &Token, depth: usize) {
    match token {
        Token::Literal(scalar) => write_scalar(out, scalar),
        Token::Reference(reference) => {
            out.push('{');
            out.push_str(&quote(reference.style.key()));
            out.push_str(": ");
            out.push_str(&quote(&reference.pointer));
            out.push('}');
        }
        Token::Node(map) if map.is_empty() => out.push_str("{}"),
        Token::Node(map) => {
            out.push_str("{\n");
            let last = map.len() - 1;
            for (idx, (key, child)) in map.iter().enumerate() {
                push_indent(out, depth + 1);
                out.push_str(&quote(key));
                out.push_str(": ");
                write_token(out, child, depth + 1);
                if idx != last {
                    out.push(',');
                }
                out.push('\n');
            }
            push_indent(out, depth);
            out.push('}');
        }
    }
}

fn write_scalar(out: &mut String, scalar: &Scalar) {
    match scalar {
        Scalar::String(s) => out.push_str(&quote(s)),
        Scalar::Number(n) => out.push_str(&n.to_string()),
        Scalar::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
    }
}

fn quote(text: &str) -> String {
    Value::String(text.to_string()).to_string()
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}
