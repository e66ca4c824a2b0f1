use indexmap::IndexMap;
use serde_json::Number;
use std::fmt;

use crate::error::Result;
use crate::pointer::Pointer;

/// Children of an inner node, in file insertion order
pub type TokenMap = IndexMap<String, Token>;

/// A literal leaf value
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    String(String),
    Number(Number),
    Bool(bool),
}

impl Scalar {
    /// Textual form used for every loose comparison.
    ///
    /// Integral floats render without a fractional part (`4.0` → `"4"`),
    /// matching how the source tool stringifies numbers.
    pub fn coerce(&self) -> String {
        match self {
            Self::String(s) => s.clone(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => format_number(n),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    /// Build a numeric scalar, falling back to text for non-finite input
    pub fn from_f64(value: f64) -> Self {
        if value.is_finite() && value.fract() == 0.0 && value.abs() < 9.0e15 {
            return Self::Number(Number::from(value as i64));
        }
        Number::from_f64(value)
            .map(Self::Number)
            .unwrap_or_else(|| Self::String(value.to_string()))
    }
}

fn format_number(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15 => format!("{f:.0}"),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.coerce())
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::Number(Number::from(value))
    }
}

impl From<u64> for Scalar {
    fn from(value: u64) -> Self {
        Self::Number(Number::from(value))
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Self::from_f64(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Spelling of the single key of a reference object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefStyle {
    /// `{"ref": "..."}`
    #[default]
    Plain,
    /// `{"$ref": "..."}`, as written by older tooling
    Dollar,
}

impl RefStyle {
    pub const fn key(self) -> &'static str {
        match self {
            Self::Plain => "ref",
            Self::Dollar => "$ref",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ref" => Some(Self::Plain),
            "$ref" => Some(Self::Dollar),
            _ => None,
        }
    }
}

/// Symbolic pointer to another leaf
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    pub pointer: String,
    pub style: RefStyle,
}

impl Reference {
    pub fn new(pointer: impl Into<String>) -> Self {
        Self {
            pointer: pointer.into(),
            style: RefStyle::Plain,
        }
    }

    #[must_use]
    pub fn with_style(mut self, style: RefStyle) -> Self {
        self.style = style;
        self
    }

    /// Parse the pointer text
    pub fn parse(&self) -> Result<Pointer> {
        Pointer::parse(&self.pointer)
    }
}

/// A node of the token graph
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Literal(Scalar),
    Reference(Reference),
    Node(TokenMap),
}

impl Token {
    /// Empty inner node
    pub fn node() -> Self {
        Self::Node(TokenMap::new())
    }

    pub fn literal(value: impl Into<Scalar>) -> Self {
        Self::Literal(value.into())
    }

    pub fn reference(pointer: impl Into<String>) -> Self {
        Self::Reference(Reference::new(pointer))
    }

    pub const fn is_node(&self) -> bool {
        matches!(self, Self::Node(_))
    }

    pub const fn is_leaf(&self) -> bool {
        !self.is_node()
    }

    pub const fn as_node(&self) -> Option<&TokenMap> {
        match self {
            Self::Node(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_node_mut(&mut self) -> Option<&mut TokenMap> {
        match self {
            Self::Node(map) => Some(map),
            _ => None,
        }
    }

    pub const fn as_literal(&self) -> Option<&Scalar> {
        match self {
            Self::Literal(scalar) => Some(scalar),
            _ => None,
        }
    }

    pub const fn as_reference(&self) -> Option<&Reference> {
        match self {
            Self::Reference(reference) => Some(reference),
            _ => None,
        }
    }

    /// Direct child lookup; `None` for leaves
    pub fn get(&self, key: &str) -> Option<&Token> {
        self.as_node()?.get(key)
    }

    /// Walk `path` from this node
    pub fn get_path<S: AsRef<str>>(&self, path: &[S]) -> Option<&Token> {
        path.iter()
            .try_fold(self, |current, segment| current.get(segment.as_ref()))
    }

    /// Every non-node token below this one, depth first in insertion order,
    /// with its path relative to `self`
    pub fn leaves(&self) -> Vec<(Vec<String>, &Token)> {
        let mut out = Vec::new();
        collect_leaves(self, &mut Vec::new(), &mut out);
        out
    }

    /// Set `value` at `path`, creating containers on the way.
    ///
    /// Leaves found where a container is needed are replaced.
    #[must_use]
    pub fn with_leaf<S: AsRef<str>>(self, path: &[S], value: Token) -> Token {
        let Some((head, rest)) = path.split_first() else {
            return value;
        };
        let mut map = match self {
            Self::Node(map) => map,
            _ => TokenMap::new(),
        };
        let key = head.as_ref();
        let child = map
            .get_mut(key)
            .map(|slot| std::mem::replace(slot, Token::node()))
            .unwrap_or_else(Token::node);
        insert_preserving(&mut map, key, child.with_leaf(rest, value));
        Self::Node(map)
    }

    /// Deep merge: nodes merge key by key, anything else in `other` wins
    #[must_use]
    pub fn merged(self, other: Token) -> Token {
        match (self, other) {
            (Self::Node(mut base), Self::Node(incoming)) => {
                for (key, value) in incoming {
                    let merged = match base.get(&key) {
                        Some(existing) => existing.clone().merged(value),
                        None => value,
                    };
                    insert_preserving(&mut base, &key, merged);
                }
                Self::Node(base)
            }
            (_, other) => other,
        }
    }

    /// Remove the token at `path`, then drop containers left empty whose
    /// depth exceeds `keep_depth`. Returns the new tree and whether anything
    /// was removed.
    #[must_use]
    pub fn without<S: AsRef<str>>(self, path: &[S], keep_depth: usize) -> (Token, bool) {
        match self {
            Self::Node(mut map) => {
                let removed = remove_at(&mut map, path, 0, keep_depth);
                (Self::Node(map), removed)
            }
            other => (other, false),
        }
    }

    pub fn is_empty_node(&self) -> bool {
        self.as_node().is_some_and(IndexMap::is_empty)
    }
}

impl From<Scalar> for Token {
    fn from(value: Scalar) -> Self {
        Self::Literal(value)
    }
}

impl From<Reference> for Token {
    fn from(value: Reference) -> Self {
        Self::Reference(value)
    }
}

fn collect_leaves<'a>(
    token: &'a Token,
    prefix: &mut Vec<String>,
    out: &mut Vec<(Vec<String>, &'a Token)>,
) {
    match token {
        Token::Node(map) => {
            for (key, child) in map {
                prefix.push(key.clone());
                collect_leaves(child, prefix, out);
                prefix.pop();
            }
        }
        leaf => out.push((prefix.clone(), leaf)),
    }
}

/// Insert keeping the key's original position when it already existed
fn insert_preserving(map: &mut TokenMap, key: &str, value: Token) {
    if let Some(slot) = map.get_mut(key) {
        *slot = value;
    } else {
        map.insert(key.to_string(), value);
    }
}

fn remove_at<S: AsRef<str>>(map: &mut TokenMap, path: &[S], depth: usize, keep: usize) -> bool {
    let Some((head, rest)) = path.split_first() else {
        return false;
    };
    if rest.is_empty() {
        return map.shift_remove(head.as_ref()).is_some();
    }
    let Some(Token::Node(child)) = map.get_mut(head.as_ref()) else {
        return false;
    };
    let removed = remove_at(child, rest, depth + 1, keep);
    if removed && child.is_empty() && depth + 1 > keep {
        map.shift_remove(head.as_ref());
    }
    removed
}
