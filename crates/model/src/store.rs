use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::pointer::JSON_DIR;
use crate::token::Token;

/// Directory under the repository root holding one directory per package
pub const PACKAGES_DIR: &str = "packages";

/// Identifies one persisted token file
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileId {
    pub package: String,
    pub file: String,
}

impl FileId {
    pub fn new(package: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            file: file.into(),
        }
    }

    /// Path of the JSON file relative to the packages directory
    pub fn json_rel_path(&self) -> String {
        format!("{}/{JSON_DIR}/{}.json", self.package, self.file)
    }

    /// Path of the JSON file relative to the repository root
    pub fn repo_rel_path(&self) -> String {
        format!("{PACKAGES_DIR}/{}", self.json_rel_path())
    }

    pub fn is_primitive(&self) -> bool {
        self.file.ends_with("-primitive")
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.package, self.file)
    }
}

/// The persisted package tree: package → file → token graph
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenStore {
    packages: BTreeMap<String, BTreeMap<String, Token>>,
}

impl TokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a package even if it has no files yet
    pub fn ensure_package(&mut self, package: impl Into<String>) {
        self.packages.entry(package.into()).or_default();
    }

    pub fn insert_file(&mut self, id: FileId, token: Token) -> Option<Token> {
        let previous = self
            .packages
            .entry(id.package.clone())
            .or_default()
            .insert(id.file.clone(), token);
        if previous.is_none() {
            log::debug!("New token file {}/{}", id.package, id.file);
        }
        previous
    }

    #[must_use]
    pub fn with_file(mut self, package: &str, file: &str, token: Token) -> Self {
        self.insert_file(FileId::new(package, file), token);
        self
    }

    pub fn file(&self, package: &str, file: &str) -> Option<&Token> {
        self.packages.get(package)?.get(file)
    }

    pub fn get(&self, id: &FileId) -> Option<&Token> {
        self.file(&id.package, &id.file)
    }

    pub fn take(&mut self, id: &FileId) -> Option<Token> {
        self.packages.get_mut(&id.package)?.remove(&id.file)
    }

    pub fn contains_package(&self, package: &str) -> bool {
        self.packages.contains_key(package)
    }

    pub fn package_names(&self) -> impl Iterator<Item = &str> {
        self.packages.keys().map(String::as_str)
    }

    pub fn package_files(&self, package: &str) -> impl Iterator<Item = (&str, &Token)> {
        self.packages
            .get(package)
            .into_iter()
            .flat_map(|files| files.iter().map(|(name, token)| (name.as_str(), token)))
    }

    /// Every file in package then file-name order
    pub fn files(&self) -> impl Iterator<Item = (FileId, &Token)> {
        self.packages.iter().flat_map(|(package, files)| {
            files
                .iter()
                .map(move |(file, token)| (FileId::new(package, file), token))
        })
    }

    pub fn file_count(&self) -> usize {
        self.packages.values().map(BTreeMap::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn files_iterate_in_stable_order() {
        let store = TokenStore::new()
            .with_file("web-tokens", "radius-semantic", Token::node())
            .with_file("core-tokens", "spacing-primitive", Token::node())
            .with_file("core-tokens", "color-primitive", Token::node());
        let ids: Vec<String> = store.files().map(|(id, _)| id.to_string()).collect();
        assert_eq!(
            ids,
            vec![
                "core-tokens/color-primitive",
                "core-tokens/spacing-primitive",
                "web-tokens/radius-semantic"
            ]
        );
        assert_eq!(store.file_count(), 3);
    }

    #[test]
    fn json_rel_path_uses_json_dir() {
        let id = FileId::new("core-tokens", "color-primitive");
        assert_eq!(id.json_rel_path(), "core-tokens/json/color-primitive.json");
        assert_eq!(id.repo_rel_path(), "packages/core-tokens/json/color-primitive.json");
        assert!(id.is_primitive());
    }
}
