use std::cmp::Reverse;

use tokens_model::{Token, TokenStore};
use tokens_projector::css_var;
use tokens_protocol::{PackageListing, SearchResponse, TokenHit};
use tokens_refs::Resolver;

use crate::category::Category;
use crate::error::{Result, SearchError};
use crate::fuzzy::FuzzyScorer;

/// Default number of hits returned by a search
pub const DEFAULT_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    /// Only hits of this category
    pub category: Option<Category>,
    pub limit: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            category: None,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// One flattened leaf of the package tree
#[derive(Debug, Clone)]
struct Entry {
    segments: Vec<String>,
    path: String,
    category: Category,
    hit: TokenHit,
}

/// Read-only query surface over an explicitly loaded package tree
#[derive(Debug, Clone, Default)]
pub struct TokenQuery {
    store: TokenStore,
    entries: Vec<Entry>,
}

impl TokenQuery {
    pub fn new(store: TokenStore) -> Self {
        let entries = flatten(&store);
        log::debug!("Indexed {} token leaves from {} file(s)", entries.len(), store.file_count());
        Self { store, entries }
    }

    /// Replace the loaded tree
    pub fn reload(&mut self, store: TokenStore) {
        *self = Self::new(store);
    }

    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Case-insensitive substring search over dotted paths and displayed values.
    ///
    /// Ranking: exact name match, then fuzzy score of the path, then path.
    pub fn search(&self, query: &str, options: &SearchOptions) -> Result<SearchResponse> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        let needle = query.to_lowercase();
        let mut scorer = FuzzyScorer::new(query);

        let mut ranked: Vec<(bool, u32, &Entry)> = self
            .entries
            .iter()
            .filter(|entry| options.category.map_or(true, |category| entry.category == category))
            .filter(|entry| {
                entry.path.to_lowercase().contains(&needle)
                    || entry.hit.value.to_lowercase().contains(&needle)
            })
            .map(|entry| {
                let exact = entry.path.eq_ignore_ascii_case(query)
                    || entry
                        .segments
                        .last()
                        .is_some_and(|name| name.eq_ignore_ascii_case(query));
                let score = scorer.score([entry.path.as_str()]).unwrap_or(0);
                (exact, score, entry)
            })
            .collect();
        ranked.sort_by_key(|(exact, score, entry)| (Reverse(*exact), Reverse(*score), entry.path.clone()));

        let total = ranked.len();
        log::debug!("search '{query}': {total} match(es)");
        Ok(SearchResponse {
            query: query.to_string(),
            total,
            hits: ranked
                .into_iter()
                .take(options.limit)
                .map(|(_, _, entry)| entry.hit.clone())
                .collect(),
        })
    }

    /// Exact dotted path, first match in package order
    pub fn lookup(&self, path: &str) -> Result<TokenHit> {
        let path = path.trim();
        self.entries
            .iter()
            .find(|entry| entry.path == path)
            .map(|entry| entry.hit.clone())
            .ok_or_else(|| SearchError::NotFound(path.to_string()))
    }

    pub fn packages(&self) -> Vec<PackageListing> {
        self.store
            .package_names()
            .map(|name| PackageListing {
                name: name.to_string(),
                files: self.store.package_files(name).map(|(file, _)| file.to_string()).collect(),
            })
            .collect()
    }
}

fn flatten(store: &TokenStore) -> Vec<Entry> {
    let resolver = Resolver::new(store);
    let mut entries = Vec::new();
    for (id, file) in store.files() {
        for (segments, leaf) in file.leaves() {
            let path = segments.join(".");
            let (value, reference) = match leaf {
                Token::Literal(scalar) => (scalar.coerce(), None),
                Token::Reference(reference) => {
                    let value = resolver
                        .resolve(&reference.pointer)
                        .map(|scalar| scalar.coerce())
                        .unwrap_or_else(|err| {
                            log::debug!("{id}: {path}: {err}");
                            reference.pointer.clone()
                        });
                    (value, Some(reference.pointer.clone()))
                }
                Token::Node(_) => continue,
            };
            let category = Category::infer(&path);
            entries.push(Entry {
                hit: TokenHit {
                    path: path.clone(),
                    value,
                    package: id.package.clone(),
                    file: id.file.clone(),
                    domain: category.to_string(),
                    css_var: css_var(segments.as_slice()),
                    reference,
                },
                segments,
                path,
                category,
            });
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tokens_model::json::parse_token_file;

    fn store() -> TokenStore {
        TokenStore::new()
            .with_file(
                "core-tokens",
                "color-primitive",
                parse_token_file(r##"{"primitive": {"color": {"black": "#000000", "gray-10": "#1a1a1a"}}}"##)
                    .unwrap(),
            )
            .with_file(
                "core-tokens",
                "spacing-primitive",
                parse_token_file(r#"{"primitive": {"spacing-4": "4px", "spacing-8": "8px"}}"#).unwrap(),
            )
            .with_file(
                "webos-tokens",
                "color-semantic-dark",
                parse_token_file(
                    r##"{"semantic": {"color": {
                        "surface": {"default": {"ref": "core-tokens/color-primitive.json#/primitive/color/black"}},
                        "black": {"missing": {"ref": "core-tokens/color-primitive.json#/primitive/color/nope"}}
                    }}}"##,
                )
                .unwrap(),
            )
    }

    #[test]
    fn test_lookup_resolves_references() {
        let query = TokenQuery::new(store());
        let hit = query.lookup("semantic.color.surface.default").unwrap();
        assert_eq!(hit.value, "#000000");
        assert_eq!(hit.package, "webos-tokens");
        assert_eq!(hit.file, "color-semantic-dark");
        assert_eq!(hit.domain, "color");
        assert_eq!(hit.css_var, "--semantic-color-surface-default");
        assert_eq!(
            hit.reference.as_deref(),
            Some("core-tokens/color-primitive.json#/primitive/color/black")
        );

        assert_eq!(
            query.lookup("semantic.color.nope"),
            Err(SearchError::NotFound("semantic.color.nope".to_string()))
        );
    }

    #[test]
    fn test_unresolvable_reference_shows_pointer() {
        let query = TokenQuery::new(store());
        let hit = query.lookup("semantic.color.black.missing").unwrap();
        assert_eq!(hit.value, "core-tokens/color-primitive.json#/primitive/color/nope");
    }

    #[test]
    fn test_search_matches_values_and_ranks_exact_names_first() {
        let query = TokenQuery::new(store());
        let response = query.search("black", &SearchOptions::default()).unwrap();
        let paths: Vec<&str> = response.hits.iter().map(|hit| hit.path.as_str()).collect();
        assert_eq!(response.total, 2);
        assert_eq!(paths[0], "primitive.color.black");
        assert!(paths.contains(&"semantic.color.black.missing"));

        let by_value = query.search("#000000", &SearchOptions::default()).unwrap();
        assert_eq!(by_value.total, 2);
    }

    #[test]
    fn test_search_category_filter_and_limit() {
        let query = TokenQuery::new(store());
        let options = SearchOptions {
            category: Some(Category::Spacing),
            limit: 1,
        };
        let response = query.search("primitive", &options).unwrap();
        assert_eq!(response.total, 2);
        assert_eq!(response.hits.len(), 1);
        assert_eq!(response.hits[0].domain, "spacing");

        assert_eq!(query.search("   ", &options), Err(SearchError::EmptyQuery));
    }

    #[test]
    fn test_reload_replaces_the_tree() {
        let mut query = TokenQuery::new(store());
        assert_eq!(query.len(), 6);
        query.reload(TokenStore::new());
        assert!(query.is_empty());
        assert!(query.packages().is_empty());
    }

    #[test]
    fn test_packages_list_files() {
        let listing = TokenQuery::new(store()).packages();
        assert_eq!(listing.len(), 2);
        assert_eq!(listing[0].name, "core-tokens");
        assert_eq!(listing[0].files, vec!["color-primitive", "spacing-primitive"]);
    }
}
