use std::fmt;
use std::str::FromStr;

use crate::error::{ModelError, Result};
use crate::store::FileId;

/// Optional directory segment of the long pointer form
/// (`core-tokens/json/color-primitive.json#/...`)
pub const JSON_DIR: &str = "json";

/// Minimum number of path segments after `#`
pub const MIN_PATH_SEGMENTS: usize = 1;

/// Parsed `<package>/<file>.json#/<path>` pointer
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pointer {
    pub package: String,
    pub file: String,
    pub path: Vec<String>,
}

impl Pointer {
    pub fn new(package: impl Into<String>, file: impl Into<String>, path: Vec<String>) -> Self {
        Self {
            package: package.into(),
            file: file.into(),
            path,
        }
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let (file_part, path_part) = raw
            .split_once('#')
            .ok_or_else(|| ModelError::malformed(raw, "missing '#' separator"))?;

        let segments: Vec<&str> = file_part.split('/').collect();
        let (package, file) = match segments.as_slice() {
            [package, file] | [package, JSON_DIR, file] => (*package, *file),
            _ => {
                return Err(ModelError::malformed(
                    raw,
                    "expected '<package>/<file>.json' before '#'",
                ))
            }
        };
        if package.is_empty() {
            return Err(ModelError::malformed(raw, "empty package name"));
        }
        let file = file
            .strip_suffix(".json")
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ModelError::malformed(raw, "file must be '<name>.json'"))?;

        let path_part = path_part
            .strip_prefix('/')
            .ok_or_else(|| ModelError::malformed(raw, "path must start with '/'"))?;
        let path: Vec<String> = path_part.split('/').map(unescape_segment).collect();
        if path.len() < MIN_PATH_SEGMENTS || path.iter().any(String::is_empty) {
            return Err(ModelError::malformed(raw, "empty path segment"));
        }

        Ok(Self::new(package, file, path))
    }

    /// `<package>/<file>.json`, the part before `#`
    pub fn file_prefix(package: &str, file: &str) -> String {
        format!("{package}/{file}.json")
    }

    pub fn file_id(&self) -> FileId {
        FileId::new(&self.package, &self.file)
    }
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#", Self::file_prefix(&self.package, &self.file))?;
        for segment in &self.path {
            write!(f, "/{}", escape_segment(segment))?;
        }
        Ok(())
    }
}

impl FromStr for Pointer {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn unescape_segment(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

pub fn escape_segment(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_form() {
        let pointer = Pointer::parse("core-tokens/color-primitive.json#/primitive/color/black").unwrap();
        assert_eq!(pointer.package, "core-tokens");
        assert_eq!(pointer.file, "color-primitive");
        assert_eq!(pointer.path, vec!["primitive", "color", "black"]);
    }

    #[test]
    fn parses_long_form_with_json_dir() {
        let pointer =
            Pointer::parse("core-tokens/json/color-primitive.json#/primitive/color/white").unwrap();
        assert_eq!(pointer.file, "color-primitive");
        assert_eq!(
            pointer.to_string(),
            "core-tokens/color-primitive.json#/primitive/color/white"
        );
    }

    #[test]
    fn rejects_malformed_pointers() {
        for raw in [
            "core-tokens/color-primitive.json",
            "color-primitive.json#/primitive",
            "core-tokens/color-primitive#/primitive",
            "core-tokens/color-primitive.json#",
            "core-tokens/color-primitive.json#/",
            "core-tokens/a/b/color-primitive.json#/primitive",
            "/color-primitive.json#/primitive",
        ] {
            assert!(
                matches!(Pointer::parse(raw), Err(ModelError::MalformedPointer { .. })),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn escapes_roundtrip() {
        let pointer = Pointer::new("p", "f", vec!["a/b".into(), "c~d".into()]);
        let text = pointer.to_string();
        assert_eq!(text, "p/f.json#/a~1b/c~0d");
        assert_eq!(Pointer::parse(&text).unwrap(), pointer);
    }
}
