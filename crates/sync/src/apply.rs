//! Applies a classified diff to a copy of the package tree.

use std::collections::{BTreeMap, BTreeSet};

use tokens_model::{Domain, FileId, FileLayout, Namespace, Pointer, Token, TokenStore};
use tokens_protocol::SkippedRecord;
use tokens_refs::{build_index, rewrite, ReferenceIndex};

use crate::config::SyncConfig;
use crate::diff::{ChangeKind, DiffRecord, DiffSet};

/// Updated tree plus what changed and what could not be applied
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplyOutcome {
    pub store: TokenStore,
    pub touched: BTreeSet<FileId>,
    pub skipped: Vec<SkippedRecord>,
}

impl ApplyOutcome {
    /// Fold a later outcome into this one; the later store wins
    pub fn absorb(&mut self, later: ApplyOutcome) {
        self.store = later.store;
        self.touched.extend(later.touched);
        self.skipped.extend(later.skipped);
    }
}

/// Apply every change in `diff` to a copy of `store`.
///
/// Primitive files go first. Semantic files written afterwards have their
/// literals collapsed into references against the updated primitives.
pub fn apply(diff: &DiffSet, store: &TokenStore, config: &SyncConfig) -> ApplyOutcome {
    let mut by_file: BTreeMap<FileId, Vec<&DiffRecord>> = BTreeMap::new();
    let mut outcome = ApplyOutcome {
        store: store.clone(),
        ..ApplyOutcome::default()
    };

    for record in diff.changes() {
        if let Some(reason) = unmappable(record) {
            log::warn!("Skipping {}: {reason}", record.key());
            outcome.skipped.push(SkippedRecord {
                key: record.key(),
                reason: reason.to_string(),
            });
            continue;
        }
        by_file.entry(record.target.clone()).or_default().push(record);
    }

    let (primitives, semantics): (Vec<_>, Vec<_>) =
        by_file.into_iter().partition(|(id, _)| id.is_primitive());

    for (id, records) in primitives {
        if apply_file(&mut outcome, &id, &records) {
            sort_file(&mut outcome.store, &id);
            outcome.touched.insert(id);
        }
    }

    if semantics.is_empty() {
        return outcome;
    }
    let indexes = primitive_indexes(&outcome.store, config);
    for (id, records) in semantics {
        if apply_file(&mut outcome, &id, &records) {
            rewrite_file(&mut outcome.store, &id, &indexes, config);
            outcome.touched.insert(id);
        }
    }
    outcome
}

fn unmappable(record: &DiffRecord) -> Option<&'static str> {
    if record.target.package.is_empty() || record.target.file.is_empty() {
        return Some("no destination package/file");
    }
    if record.path.is_empty() {
        return Some("empty destination path");
    }
    if record.kind != ChangeKind::Removed && record.after.is_none() {
        return Some("no value to write");
    }
    None
}

/// Apply the records of one file in order; true when the file changed
fn apply_file(outcome: &mut ApplyOutcome, id: &FileId, records: &[&DiffRecord]) -> bool {
    let existing = outcome.store.take(id);
    let missing = existing.is_none();
    let mut token = existing.unwrap_or_else(Token::node);
    let mut changed = false;

    for record in records {
        if missing && record.kind != ChangeKind::Added {
            log::warn!("Skipping {}: no local file {id}", record.key());
            outcome.skipped.push(SkippedRecord {
                key: record.key(),
                reason: format!("no local file {id}"),
            });
            continue;
        }
        let path = record.full_path();
        match (record.kind, &record.after) {
            (ChangeKind::Removed, _) => {
                let (next, removed) = token.without(&path, record.root.len());
                token = next;
                if removed {
                    changed = true;
                } else {
                    log::debug!("{}: already absent", record.key());
                }
            }
            (ChangeKind::Added | ChangeKind::Modified, Some(after)) => {
                token = token.with_leaf(&path, Token::Literal(after.clone()));
                changed = true;
            }
            _ => {}
        }
    }

    if !missing || changed {
        if missing {
            log::info!("Creating {id}");
        }
        outcome.store.insert_file(id.clone(), token);
    }
    changed
}

/// Re-sort the numeric key families of a primitive file.
///
/// Color primitives have no numeric family, so their keys keep the order in
/// which they were written or added.
fn sort_file(store: &mut TokenStore, id: &FileId) -> bool {
    let Some(layout) = FileLayout::from_file_name(&id.file) else {
        return false;
    };
    let rules = layout.domain.rules();
    if rules.numeric_prefixes.is_empty() {
        return false;
    }
    let Some(mut token) = store.take(id) else {
        return false;
    };
    let mut reordered = false;
    if let Some(map) = token
        .as_node_mut()
        .and_then(|root| root.get_mut(Namespace::Primitive.as_str()))
        .and_then(Token::as_node_mut)
    {
        let before: Vec<String> = map.keys().cloned().collect();
        rules.sort_keys(map);
        reordered = map.keys().ne(before.iter());
    }
    store.insert_file(id.clone(), token);
    reordered
}

/// Canonical key order for every primitive file, optionally in one package
pub fn sort_primitives(store: &TokenStore, package: Option<&str>) -> ApplyOutcome {
    let mut outcome = ApplyOutcome {
        store: store.clone(),
        ..ApplyOutcome::default()
    };
    let ids: Vec<FileId> = store
        .files()
        .map(|(id, _)| id)
        .filter(|id| id.is_primitive() && package.map_or(true, |name| id.package == name))
        .collect();
    for id in ids {
        if sort_file(&mut outcome.store, &id) {
            log::info!("Re-sorted {id}");
            outcome.touched.insert(id);
        }
    }
    outcome
}

fn primitive_indexes(store: &TokenStore, config: &SyncConfig) -> BTreeMap<Domain, (String, ReferenceIndex)> {
    Domain::ALL
        .into_iter()
        .filter_map(|domain| {
            let id = config.primitive_file(domain);
            let file = store.get(&id)?;
            let prefix = Pointer::file_prefix(&id.package, &id.file);
            Some((domain, (prefix, build_index(file, domain))))
        })
        .collect()
}

fn rewrite_file(
    store: &mut TokenStore,
    id: &FileId,
    indexes: &BTreeMap<Domain, (String, ReferenceIndex)>,
    config: &SyncConfig,
) {
    let Some(layout) = FileLayout::from_file_name(&id.file)
        .filter(|layout| layout.namespace == Namespace::Semantic)
    else {
        return;
    };
    let Some((prefix, index)) = indexes.get(&layout.domain) else {
        log::debug!(
            "No {} primitives in {}; leaving {id} literal",
            layout.domain,
            config.primitive_package
        );
        return;
    };
    let Some(token) = store.take(id) else {
        return;
    };
    let root = layout.root();
    let token = match token.get_path(&root) {
        Some(subtree) => {
            let rewritten = rewrite(subtree, index, prefix);
            if rewritten.replaced > 0 {
                log::info!("{id}: {} literal(s) now reference primitives", rewritten.replaced);
            }
            token.with_leaf(&root, rewritten.token)
        }
        None => token,
    };
    store.insert_file(id.clone(), token);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tokens_model::json::{parse_token_file, to_canonical_json};
    use tokens_model::Scalar;

    fn record(kind: ChangeKind, target: (&str, &str), root: &[&str], path: &[&str], after: Option<&str>) -> DiffRecord {
        DiffRecord {
            kind,
            collection: "test".to_string(),
            target: FileId::new(target.0, target.1),
            raw_path: path.iter().map(|s| s.to_string()).collect(),
            root: root.iter().map(|s| s.to_string()).collect(),
            path: path.iter().map(|s| s.to_string()).collect(),
            domain: Domain::Spacing,
            before: None,
            after: after.map(Scalar::from),
        }
    }

    fn spacing_store() -> TokenStore {
        let file = parse_token_file(
            r#"{"primitive": {"spacing-4": "4px", "spacing-64": "64px", "spacing-68": "68px", "spacing-99": "99px"}}"#,
        )
        .unwrap();
        TokenStore::new().with_file("core-tokens", "spacing-primitive", file)
    }

    #[test]
    fn added_spacing_lands_in_numeric_order() {
        let mut diff = DiffSet::new();
        diff.insert(record(
            ChangeKind::Added,
            ("core-tokens", "spacing-primitive"),
            &["primitive"],
            &["spacing-66"],
            Some("66px"),
        ));
        diff.insert(record(
            ChangeKind::Removed,
            ("core-tokens", "spacing-primitive"),
            &["primitive"],
            &["spacing-99"],
            None,
        ));
        let store = spacing_store();
        let outcome = apply(&diff, &store, &SyncConfig::default());

        let file = outcome.store.file("core-tokens", "spacing-primitive").unwrap();
        assert_eq!(
            to_canonical_json(file),
            "{\n    \"primitive\": {\n        \"spacing-4\": \"4px\",\n        \"spacing-64\": \"64px\",\n        \"spacing-66\": \"66px\",\n        \"spacing-68\": \"68px\"\n    }\n}\n"
        );
        assert!(outcome.touched.contains(&FileId::new("core-tokens", "spacing-primitive")));
        assert_eq!(store, spacing_store(), "input store is never mutated");
    }

    #[test]
    fn removal_prunes_up_to_domain_root() {
        let file = parse_token_file(
            r##"{"semantic": {"color": {"popup": {"inner": {"bg": "#000000"}}}}}"##,
        )
        .unwrap();
        let store = TokenStore::new().with_file("webos-tokens", "color-semantic-dark", file);
        let mut diff = DiffSet::new();
        diff.insert(record(
            ChangeKind::Removed,
            ("webos-tokens", "color-semantic-dark"),
            &["semantic", "color"],
            &["popup", "inner", "bg"],
            None,
        ));
        let outcome = apply(&diff, &store, &SyncConfig::default());
        let file = outcome.store.file("webos-tokens", "color-semantic-dark").unwrap();
        assert_eq!(
            to_canonical_json(file),
            "{\n    \"semantic\": {\n        \"color\": {}\n    }\n}\n"
        );
    }

    #[test]
    fn semantic_literals_become_references() {
        let primitives = parse_token_file(r##"{"primitive": {"color": {"black": "#000000"}}}"##).unwrap();
        let semantic = parse_token_file(r#"{"semantic": {"color": {}}}"#).unwrap();
        let store = TokenStore::new()
            .with_file("core-tokens", "color-primitive", primitives)
            .with_file("webos-tokens", "color-semantic-dark", semantic);
        let mut diff = DiffSet::new();
        diff.insert(record(
            ChangeKind::Added,
            ("webos-tokens", "color-semantic-dark"),
            &["semantic", "color"],
            &["surface", "default"],
            Some("#000000"),
        ));
        let outcome = apply(&diff, &store, &SyncConfig::default());
        let file = outcome.store.file("webos-tokens", "color-semantic-dark").unwrap();
        assert_eq!(
            to_canonical_json(file),
            "{\n    \"semantic\": {\n        \"color\": {\n            \"surface\": {\n                \"default\": {\"ref\": \"core-tokens/color-primitive.json#/primitive/color/black\"}\n            }\n        }\n    }\n}\n"
        );
    }

    #[test]
    fn missing_file_only_accepts_additions() {
        let mut diff = DiffSet::new();
        diff.insert(record(
            ChangeKind::Modified,
            ("web-tokens", "radius-semantic"),
            &["semantic", "radius"],
            &["full"],
            Some("999px"),
        ));
        let outcome = apply(&diff, &TokenStore::new(), &SyncConfig::default());
        assert_eq!(outcome.skipped.len(), 1);
        assert!(outcome.touched.is_empty());
        assert!(outcome.store.file("web-tokens", "radius-semantic").is_none());

        let mut diff = DiffSet::new();
        diff.insert(record(
            ChangeKind::Added,
            ("web-tokens", "radius-semantic"),
            &["semantic", "radius"],
            &["full"],
            Some("999px"),
        ));
        let outcome = apply(&diff, &TokenStore::new(), &SyncConfig::default());
        assert_eq!(
            outcome.store.file("web-tokens", "radius-semantic").and_then(|f| f.get_path(&["semantic", "radius", "full"])),
            Some(&Token::literal("999px"))
        );
    }

    #[test]
    fn unmappable_records_are_skipped() {
        let mut diff = DiffSet::new();
        diff.insert(record(ChangeKind::Added, ("", "x"), &["primitive"], &["a"], Some("1px")));
        let outcome = apply(&diff, &TokenStore::new(), &SyncConfig::default());
        assert_eq!(outcome.skipped[0].reason, "no destination package/file");
    }

    #[test]
    fn sort_primitives_reports_reordered_files() {
        let file = parse_token_file(r#"{"primitive": {"radius-8": "8px", "radius-2": "2px"}}"#).unwrap();
        let store = TokenStore::new().with_file("core-tokens", "radius-primitive", file);
        let outcome = sort_primitives(&store, None);
        assert_eq!(outcome.touched.len(), 1);
        let keys: Vec<&String> = outcome
            .store
            .file("core-tokens", "radius-primitive")
            .and_then(|f| f.get("primitive"))
            .and_then(Token::as_node)
            .unwrap()
            .keys()
            .collect();
        assert_eq!(keys, vec!["radius-2", "radius-8"]);

        let again = sort_primitives(&outcome.store, None);
        assert!(again.touched.is_empty());
    }

    #[test]
    fn color_primitives_keep_insertion_order() {
        let file = parse_token_file(
            r##"{"primitive": {"color": {"white": "#ffffff", "gray-20": "#333333", "black": "#000000", "gray-10": "#1a1a1a"}}}"##,
        )
        .unwrap();
        let store = TokenStore::new().with_file("core-tokens", "color-primitive", file);
        let outcome = sort_primitives(&store, None);
        assert!(outcome.touched.is_empty());
        assert_eq!(outcome.store, store);

        let mut diff = DiffSet::new();
        diff.insert(record(
            ChangeKind::Added,
            ("core-tokens", "color-primitive"),
            &["primitive", "color"],
            &["amber-10"],
            Some("#ffbf00"),
        ));
        let outcome = apply(&diff, &store, &SyncConfig::default());
        let keys: Vec<&String> = outcome
            .store
            .file("core-tokens", "color-primitive")
            .and_then(|f| f.get_path(&["primitive", "color"]))
            .and_then(Token::as_node)
            .unwrap()
            .keys()
            .collect();
        assert_eq!(keys, vec!["white", "gray-20", "black", "gray-10", "amber-10"]);
    }
}
