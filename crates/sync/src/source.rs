//! The design-tool export: collection name → nested literal tree.

use indexmap::IndexMap;
use serde_json::Value;

use tokens_model::{json, Scalar, Token};

use crate::error::{Result, SyncError};

const RGB_KEYS: [&str; 3] = ["r", "g", "b"];
const ALPHA_KEY: &str = "a";

/// Parsed source collections in export order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceSet {
    collections: IndexMap<String, Token>,
    /// Collections whose content could not be turned into a token tree
    rejected: Vec<(String, String)>,
}

impl SourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(object) = value else {
            return Err(SyncError::SourceShape);
        };
        let mut set = Self::new();
        for (name, content) in object {
            if !content.is_object() {
                set.rejected.push((name, "collection is not an object".to_string()));
                continue;
            }
            match json::token_from_value(content) {
                Ok(token) => {
                    set.collections.insert(name, token);
                }
                Err(err) => set.rejected.push((name, err.to_string())),
            }
        }
        Ok(set)
    }

    #[must_use]
    pub fn with_collection(mut self, name: &str, token: Token) -> Self {
        self.collections.insert(name.to_string(), token);
        self
    }

    pub fn collections(&self) -> impl Iterator<Item = (&str, &Token)> {
        self.collections.iter().map(|(name, token)| (name.as_str(), token))
    }

    pub fn get(&self, name: &str) -> Option<&Token> {
        self.collections.get(name)
    }

    pub fn rejected(&self) -> &[(String, String)] {
        &self.rejected
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }
}

/// Leaf value of a source node: literals as they are, `{r, g, b[, a]}`
/// components as lowercase `#rrggbb`. Anything else is a container.
pub fn source_leaf(token: &Token) -> Option<Scalar> {
    match token {
        Token::Literal(scalar) => Some(scalar.clone()),
        Token::Reference(_) => None,
        Token::Node(map) => {
            let is_rgb = RGB_KEYS.iter().all(|key| map.contains_key(*key))
                && map
                    .keys()
                    .all(|key| RGB_KEYS.contains(&key.as_str()) || key == ALPHA_KEY);
            if !is_rgb {
                return None;
            }
            let channel = |key: &str| -> Option<u8> {
                let value = map.get(key)?.as_literal()?.as_f64()?;
                Some((value.clamp(0.0, 1.0) * 255.0).round() as u8)
            };
            let [r, g, b] = [channel("r")?, channel("g")?, channel("b")?];
            Some(Scalar::String(format!("#{r:02x}{g:02x}{b:02x}")))
        }
    }
}
