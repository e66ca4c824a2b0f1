use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SearchError;

/// Coarse token category guessed from a dotted path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Color,
    Typography,
    Spacing,
    Radius,
    Other,
}

const RULES: [(Category, &[&str]); 4] = [
    (Category::Color, &["color", "background"]),
    (Category::Typography, &["font", "text", "size"]),
    (Category::Spacing, &["spacing", "margin", "padding"]),
    (Category::Radius, &["radius"]),
];

impl Category {
    /// First rule whose keyword occurs in `path` wins
    pub fn infer(path: &str) -> Self {
        let path = path.to_lowercase();
        RULES
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|keyword| path.contains(keyword)))
            .map_or(Self::Other, |(category, _)| *category)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Color => "color",
            Self::Typography => "typography",
            Self::Spacing => "spacing",
            Self::Radius => "radius",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "color" => Ok(Self::Color),
            "typography" => Ok(Self::Typography),
            "spacing" => Ok(Self::Spacing),
            "radius" => Ok(Self::Radius),
            "other" => Ok(Self::Other),
            _ => Err(SearchError::UnknownCategory(s.to_string())),
        }
    }
}
