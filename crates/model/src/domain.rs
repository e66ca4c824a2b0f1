use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::token::{Scalar, TokenMap};

/// Token category with its own formatting rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Color,
    Spacing,
    Radius,
    Typography,
}

impl Domain {
    pub const ALL: [Domain; 4] = [Self::Color, Self::Spacing, Self::Radius, Self::Typography];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Color => "color",
            Self::Spacing => "spacing",
            Self::Radius => "radius",
            Self::Typography => "typography",
        }
    }

    pub const fn rules(self) -> &'static DomainRules {
        match self {
            Self::Color => &COLOR_RULES,
            Self::Spacing => &SPACING_RULES,
            Self::Radius => &RADIUS_RULES,
            Self::Typography => &TYPOGRAPHY_RULES,
        }
    }

    /// Domain from a token file name such as `color-semantic-dark`
    pub fn from_file_name(file: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|domain| file.split('-').next() == Some(domain.as_str()))
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|domain| domain.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown domain '{s}'"))
    }
}

/// Per-domain formatting record shared by the differ, rewriter and projector
#[derive(Debug)]
pub struct DomainRules {
    pub domain: Domain,
    /// Unit suffix appended to numeric values
    pub unit: Option<&'static str>,
    /// Zero is written as a bare `"0"`
    pub zero_is_unitless: bool,
    /// Key families ordered by their trailing integer (`spacing-4`)
    pub numeric_prefixes: &'static [&'static str],
    /// Leaf keys (`key` or `key-*`) that take the unit; empty means all
    pub unit_keys: &'static [&'static str],
}

static COLOR_RULES: DomainRules = DomainRules {
    domain: Domain::Color,
    unit: None,
    zero_is_unitless: false,
    numeric_prefixes: &[],
    unit_keys: &[],
};

static SPACING_RULES: DomainRules = DomainRules {
    domain: Domain::Spacing,
    unit: Some("px"),
    zero_is_unitless: true,
    numeric_prefixes: &["spacing-"],
    unit_keys: &[],
};

static RADIUS_RULES: DomainRules = DomainRules {
    domain: Domain::Radius,
    unit: Some("px"),
    zero_is_unitless: true,
    numeric_prefixes: &["radius-"],
    unit_keys: &[],
};

static TYPOGRAPHY_RULES: DomainRules = DomainRules {
    domain: Domain::Typography,
    unit: Some("px"),
    zero_is_unitless: true,
    numeric_prefixes: &["font-size-"],
    unit_keys: &["font-size"],
};

impl DomainRules {
    /// Whether a value stored at `path` carries the unit suffix
    pub fn takes_unit<S: AsRef<str>>(&self, path: &[S]) -> bool {
        if self.unit.is_none() {
            return false;
        }
        if self.unit_keys.is_empty() {
            return true;
        }
        let Some(leaf) = path.last().map(|segment| segment.as_ref()) else {
            return false;
        };
        self.unit_keys.iter().any(|key| {
            leaf.strip_prefix(*key)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('-'))
        })
    }

    /// Canonical persisted form of a value stored at `path`.
    ///
    /// Bare finite numbers and numeric strings gain the unit; zero becomes `"0"`.
    pub fn format_value<S: AsRef<str>>(&self, path: &[S], value: &Scalar) -> Scalar {
        let Some(unit) = self.unit.filter(|_| self.takes_unit(path)) else {
            return value.clone();
        };
        let text = value.coerce();
        let bare = text.strip_suffix(unit).unwrap_or(&text);
        match bare.trim().parse::<f64>() {
            Ok(number)
                if number.is_finite() && matches!(value, Scalar::Number(_) | Scalar::String(_)) =>
            {
                if number == 0.0 && self.zero_is_unitless {
                    Scalar::from("0")
                } else {
                    Scalar::String(format!("{}{unit}", Scalar::from_f64(number).coerce()))
                }
            }
            _ => value.clone(),
        }
    }

    /// Lookup key for the reference index
    pub fn canonical_text<S: AsRef<str>>(&self, path: &[S], value: &Scalar) -> String {
        self.format_value(path, value).coerce()
    }

    /// `(stem, n)` for keys of a numeric family such as `radius-12`
    pub fn numeric_family<'a>(&self, key: &'a str) -> Option<(&'a str, u64)> {
        self.numeric_prefixes.iter().find_map(|prefix| {
            let rest = key.strip_prefix(prefix)?;
            let number = rest.parse::<u64>().ok()?;
            Some((&key[..prefix.len()], number))
        })
    }

    /// Persisted key order: numeric families by trailing integer, the rest
    /// alphabetical
    pub fn compare_keys(&self, a: &str, b: &str) -> Ordering {
        self.order_key(a).cmp(&self.order_key(b))
    }

    fn order_key<'a>(&self, key: &'a str) -> (&'a str, Option<u64>, &'a str) {
        match self.numeric_family(key) {
            Some((stem, number)) => (stem, Some(number), key),
            None => (key, None, key),
        }
    }

    /// Re-sort a flat primitive map in place
    pub fn sort_keys(&self, map: &mut TokenMap) {
        map.sort_by(|a, _, b, _| self.compare_keys(a, b));
    }
}

/// Strip one trailing `px` for unit-insensitive comparison
pub fn strip_px(text: &str) -> &str {
    text.strip_suffix("px").unwrap_or(text)
}

/// Loose equality: coerce both sides to text, ignore a `px` suffix.
///
/// `true` and `"true"` compare equal; likely unintended, kept until checked
/// against real exports.
pub fn loosely_equal(a: &Scalar, b: &Scalar) -> bool {
    strip_px(&a.coerce()) == strip_px(&b.coerce())
}

/// Top-level namespace of a token file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    Primitive,
    Semantic,
}

impl Namespace {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Primitive => "primitive",
            Self::Semantic => "semantic",
        }
    }
}

/// Where a file's tokens live: `primitive.color`, `primitive`, `semantic.<domain>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileLayout {
    pub namespace: Namespace,
    pub domain: Domain,
}

impl FileLayout {
    pub fn from_file_name(file: &str) -> Option<Self> {
        let domain = Domain::from_file_name(file)?;
        let namespace = if file.contains("-primitive") {
            Namespace::Primitive
        } else {
            Namespace::Semantic
        };
        Some(Self { namespace, domain })
    }

    /// Path from the file root to the domain root
    pub fn root(&self) -> Vec<String> {
        match (self.namespace, self.domain) {
            (Namespace::Primitive, Domain::Color) => vec!["primitive".into(), "color".into()],
            (Namespace::Primitive, _) => vec!["primitive".into()],
            (Namespace::Semantic, domain) => vec!["semantic".into(), domain.as_str().into()],
        }
    }
}
