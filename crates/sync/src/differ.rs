//! Structural comparison of a source collection against its persisted file.
//!
//! Both sides are flattened to `path below domain root → leaf` maps first:
//! the source through its collection-specific shape rules and key aliases,
//! the local file restricted to the key families the collection owns. The
//! comparison itself is then the same for every kind of collection.

use indexmap::IndexMap;

use tokens_model::{loosely_equal, Scalar, Token, TokenStore};
use tokens_protocol::{SkipReason, SkippedCollection};
use tokens_refs::Resolver;

use crate::config::{ResolvedRoute, RouteKind, SyncConfig};
use crate::diff::{ChangeKind, DiffRecord, DiffReport};
use crate::error::{Result, SyncError};
use crate::source::{source_leaf, SourceSet};

const FONT_SIZE_PREFIX: &str = "font-size-";
const FONT_WEIGHT_KEY: &str = "font-weight";

#[derive(Debug, Clone, PartialEq)]
struct SourceLeaf {
    raw: Vec<String>,
    value: Scalar,
}

type SourceLeaves = IndexMap<Vec<String>, SourceLeaf>;
type LocalLeaves<'t> = IndexMap<Vec<String>, &'t Token>;

/// Compares source collections against one snapshot of the package tree
#[derive(Debug, Clone, Copy)]
pub struct Differ<'a> {
    config: &'a SyncConfig,
    store: &'a TokenStore,
    resolver: Resolver<'a>,
}

impl<'a> Differ<'a> {
    pub fn new(config: &'a SyncConfig, store: &'a TokenStore) -> Self {
        Self {
            config,
            store,
            resolver: Resolver::new(store).with_max_chain(config.max_ref_chain),
        }
    }

    /// Classify every collection of `source`
    pub fn diff(&self, source: &SourceSet) -> DiffReport {
        let mut report = rejected_report(source);
        for (name, collection) in source.collections() {
            report.extend(self.diff_collection(name, collection));
        }
        report
    }

    /// Classify one named collection, routing it through the config
    pub fn diff_collection(&self, name: &str, collection: &Token) -> DiffReport {
        match self.config.route(name) {
            Ok(route) => self.diff_route(&route, collection),
            Err(skipped) => {
                log::info!("Skipping collection {name} ({:?})", skipped.reason);
                DiffReport {
                    skipped: vec![skipped],
                    ..DiffReport::default()
                }
            }
        }
    }

    /// Classify one collection against an already resolved route
    pub fn diff_route(&self, route: &ResolvedRoute, collection: &Token) -> DiffReport {
        let mut report = DiffReport::default();
        let Some(local_file) = self.store.get(&route.target) else {
            log::warn!(
                "Skipping collection {}: no local file {}",
                route.collection,
                route.target
            );
            report.skipped.push(SkippedCollection {
                collection: route.collection.clone(),
                reason: SkipReason::MissingLocalFile,
                detail: Some(route.target.to_string()),
            });
            return report;
        };

        let source = match flatten_source(self.config, route, collection) {
            Ok(source) => source,
            Err(err) => {
                log::warn!("{err}");
                report.skipped.push(SkippedCollection {
                    collection: route.collection.clone(),
                    reason: SkipReason::Structural,
                    detail: Some(err.to_string()),
                });
                return report;
            }
        };
        let local = local_leaves(route, local_file);

        self.classify(route, &source, &local, &mut report);
        let counts = report.diff.counts();
        log::info!(
            "{} → {}: {} added, {} modified, {} removed, {} unchanged",
            route.collection,
            route.target,
            counts.added,
            counts.modified,
            counts.removed,
            report.diff.unchanged.len()
        );
        report
    }

    fn classify(
        &self,
        route: &ResolvedRoute,
        source: &SourceLeaves,
        local: &LocalLeaves<'_>,
        report: &mut DiffReport,
    ) {
        let rules = route.domain().rules();
        let root = route.root();
        let record = |kind, raw: &[String], path: &[String], before: Option<&Token>, after| DiffRecord {
            kind,
            collection: route.collection.clone(),
            target: route.target.clone(),
            raw_path: raw.to_vec(),
            root: root.clone(),
            path: path.to_vec(),
            domain: route.domain(),
            before: before.cloned(),
            after,
        };

        for (path, leaf) in source {
            let full: Vec<&str> = root.iter().chain(path).map(String::as_str).collect();
            let after = rules.format_value(&full, &leaf.value);
            let Some(&local_token) = local.get(path) else {
                if self.is_local_group(route, &full) {
                    let warning = format!(
                        "{}/{}: replaces the local group {}",
                        route.collection,
                        leaf.raw.join("/"),
                        full.join("/")
                    );
                    log::warn!("Source leaf lands on a group: {warning}");
                    report.warnings.push(warning);
                }
                log::debug!("added {}: {}", full.join("/"), after);
                report
                    .diff
                    .insert(record(ChangeKind::Added, &leaf.raw, path, None, Some(after)));
                continue;
            };

            let kind = match self.local_value(local_token) {
                Some(Ok(current)) if loosely_equal(&current, &leaf.value) => ChangeKind::Unchanged,
                Some(Ok(current)) => {
                    log::debug!("modified {}: {} → {}", full.join("/"), current, after);
                    ChangeKind::Modified
                }
                None => {
                    let warning = format!(
                        "{}/{}: local value is a group, not a leaf",
                        route.collection,
                        leaf.raw.join("/")
                    );
                    log::warn!("Leaving local group untouched: {warning}");
                    report.warnings.push(warning);
                    ChangeKind::Unchanged
                }
                Some(Err(err)) => {
                    let warning = format!("{}/{}: {err}", route.collection, leaf.raw.join("/"));
                    log::warn!("Treating unresolvable reference as unchanged: {warning}");
                    report.warnings.push(warning);
                    ChangeKind::Unchanged
                }
            };
            report
                .diff
                .insert(record(kind, &leaf.raw, path, Some(local_token), Some(after)));
        }

        for (path, &local_token) in local {
            if source.contains_key(path) {
                continue;
            }
            log::debug!("removed {}/{}", root.join("/"), path.join("/"));
            report
                .diff
                .insert(record(ChangeKind::Removed, path, path, Some(local_token), None));
        }
    }

    /// Effective value of a local leaf; `None` for a group
    fn local_value(&self, token: &Token) -> Option<tokens_refs::Result<Scalar>> {
        match token {
            Token::Literal(scalar) => Some(Ok(scalar.clone())),
            Token::Reference(reference) => Some(self.resolver.resolve(&reference.pointer)),
            Token::Node(_) => None,
        }
    }

    fn is_local_group(&self, route: &ResolvedRoute, full: &[&str]) -> bool {
        self.store
            .get(&route.target)
            .and_then(|file| file.get_path(full))
            .is_some_and(|token| token.as_node().is_some_and(|map| !map.is_empty()))
    }
}

/// One-shot diff of a whole source export
pub fn diff(source: &SourceSet, store: &TokenStore, config: &SyncConfig) -> DiffReport {
    Differ::new(config, store).diff(source)
}

/// Collections the source parser could not turn into token trees
pub(crate) fn rejected_report(source: &SourceSet) -> DiffReport {
    DiffReport {
        skipped: source
            .rejected()
            .iter()
            .map(|(collection, reason)| SkippedCollection {
                collection: collection.clone(),
                reason: SkipReason::Structural,
                detail: Some(reason.clone()),
            })
            .collect(),
        ..DiffReport::default()
    }
}

fn flatten_source(config: &SyncConfig, route: &ResolvedRoute, collection: &Token) -> Result<SourceLeaves> {
    let mut out = SourceLeaves::new();
    match route.kind {
        RouteKind::ColorPrimitive => color_primitive_leaves(collection, &mut out),
        RouteKind::SpacingPrimitive | RouteKind::RadiusPrimitive => {
            let group = route.domain().as_str();
            let scale = collection
                .get(group)
                .filter(|token| token.is_node())
                .ok_or_else(|| SyncError::structural(&route.collection, format!("missing '{group}' group")))?;
            for (size, child) in children(scale) {
                if let Some(value) = leaf_or_log(&route.collection, size, child) {
                    out.insert(
                        vec![format!("{group}-{size}")],
                        SourceLeaf {
                            raw: vec![group.to_string(), size.clone()],
                            value,
                        },
                    );
                }
            }
        }
        RouteKind::TypographyPrimitive => typography_leaves(&route.collection, collection, &mut out),
        RouteKind::SemanticRadius => {
            let (body, mut prefix) = match collection.get("radius") {
                Some(inner) if inner.is_node() => (inner, vec!["radius".to_string()]),
                _ => (collection, Vec::new()),
            };
            nested_leaves(config, &route.collection, body, &mut prefix, &mut Vec::new(), &mut out);
        }
        RouteKind::SemanticColor | RouteKind::Generic => {
            nested_leaves(config, &route.collection, collection, &mut Vec::new(), &mut Vec::new(), &mut out);
        }
        RouteKind::Covered => {}
    }
    Ok(out)
}

fn children(token: &Token) -> impl Iterator<Item = (&String, &Token)> {
    token.as_node().into_iter().flat_map(|map| map.iter())
}

fn leaf_or_log(collection: &str, key: &str, token: &Token) -> Option<Scalar> {
    let value = source_leaf(token);
    if value.is_none() {
        log::debug!("{collection}: ignoring non-leaf value at '{key}'");
    }
    value
}

fn color_primitive_leaves(collection: &Token, out: &mut SourceLeaves) {
    for (family, value) in children(collection) {
        if let Some(value) = source_leaf(value) {
            out.insert(
                vec![family.clone()],
                SourceLeaf {
                    raw: vec![family.clone()],
                    value,
                },
            );
            continue;
        }
        for (shade, leaf) in children(value) {
            if let Some(value) = leaf_or_log("color primitive", shade, leaf) {
                out.insert(
                    vec![format!("{family}-{shade}")],
                    SourceLeaf {
                        raw: vec![family.clone(), shade.clone()],
                        value,
                    },
                );
            }
        }
    }
}

fn is_oblique(weight: &str) -> bool {
    weight.to_lowercase().contains("oblique")
}

fn typography_leaves(name: &str, collection: &Token, out: &mut SourceLeaves) {
    for (category, values) in children(collection) {
        match category.as_str() {
            "fontsize" => {
                for (size, child) in children(values) {
                    if let Some(value) = leaf_or_log(name, size, child) {
                        out.insert(
                            vec![format!("{FONT_SIZE_PREFIX}{size}")],
                            SourceLeaf {
                                raw: vec![category.clone(), size.clone()],
                                value,
                            },
                        );
                    }
                }
            }
            "fontweight" => {
                for (weight, child) in children(values) {
                    if is_oblique(weight) {
                        log::debug!("{name}: skipping oblique font weight {weight}");
                        continue;
                    }
                    if let Some(value) = leaf_or_log(name, weight, child) {
                        out.insert(
                            vec![FONT_WEIGHT_KEY.to_string(), weight.clone()],
                            SourceLeaf {
                                raw: vec![category.clone(), weight.clone()],
                                value,
                            },
                        );
                    }
                }
            }
            "fontfamily" => log::debug!("{name}: skipping font families"),
            other => log::debug!("{name}: ignoring typography category '{other}'"),
        }
    }
}

fn nested_leaves(
    config: &SyncConfig,
    name: &str,
    token: &Token,
    raw: &mut Vec<String>,
    mapped: &mut Vec<String>,
    out: &mut SourceLeaves,
) {
    for (key, child) in children(token) {
        let segments = config.alias(key);
        raw.push(key.clone());
        let depth = mapped.len();
        mapped.extend(segments.iter().map(|s| s.to_string()));

        if let Some(value) = source_leaf(child) {
            out.insert(
                mapped.clone(),
                SourceLeaf {
                    raw: raw.clone(),
                    value,
                },
            );
        } else if child.is_node() {
            nested_leaves(config, name, child, raw, mapped, out);
        } else {
            log::debug!("{name}: ignoring reference at '{}'", raw.join("/"));
        }

        mapped.truncate(depth);
        raw.pop();
    }
}

/// Local leaves under the route's domain root that the collection owns
fn local_leaves<'t>(route: &ResolvedRoute, file: &'t Token) -> LocalLeaves<'t> {
    let Some(subtree) = file.get_path(&route.root()) else {
        return LocalLeaves::new();
    };
    let owned = |path: &[String]| match route.kind {
        RouteKind::SpacingPrimitive | RouteKind::RadiusPrimitive => {
            let prefix = format!("{}-", route.domain());
            matches!(path, [key] if key.starts_with(&prefix))
        }
        RouteKind::TypographyPrimitive => match path {
            [key] => key.starts_with(FONT_SIZE_PREFIX),
            [group, weight] => group == FONT_WEIGHT_KEY && !is_oblique(weight),
            _ => false,
        },
        _ => true,
    };
    subtree
        .leaves()
        .into_iter()
        .filter(|(path, _)| owned(path))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tokens_model::json::parse_token_file;

    fn store() -> TokenStore {
        let spacing = parse_token_file(
            r#"{"primitive": {"spacing-4": "4px", "spacing-8": "8px", "spacing-99": "99px", "note": "keep"}}"#,
        )
        .unwrap();
        let typography = parse_token_file(
            r#"{"primitive": {"font-size-24": "24px", "font-weight": {"bold": 700, "bold-oblique": 700}, "font-family": {"base": "LG Smart"}}}"#,
        )
        .unwrap();
        let colors = parse_token_file(r##"{"primitive": {"color": {"black": "#000000", "gray-10": "#1a1a1a"}}}"##).unwrap();
        let semantic = parse_token_file(
            r##"{"semantic": {"color": {
                "surface": {"default": {"ref": "core-tokens/color-primitive.json#/primitive/color/black"}},
                "on": {"background": {"main": "#1a1a1a"}},
                "broken": {"ref": "core-tokens/color-primitive.json#/primitive/color/nope"}
            }}}"##,
        )
        .unwrap();
        TokenStore::new()
            .with_file("core-tokens", "spacing-primitive", spacing)
            .with_file("core-tokens", "typography-primitive", typography)
            .with_file("core-tokens", "color-primitive", colors)
            .with_file("webos-tokens", "color-semantic-dark", semantic)
    }

    fn run(name: &str, collection: serde_json::Value) -> DiffReport {
        let config = SyncConfig::default();
        let store = store();
        let source = SourceSet::new().with_collection(name, tokens_model::json::token_from_value(collection).unwrap());
        diff(&source, &store, &config)
    }

    #[test]
    fn spacing_units_compare_loosely() {
        let report = run(
            "lg.spacing.primitive",
            serde_json::json!({"spacing": {"4": 4, "8": 10, "66": 66}}),
        );
        let diff = &report.diff;
        assert!(diff.unchanged.contains_key("lg.spacing.primitive/spacing/4"));

        let modified = &diff.modified["lg.spacing.primitive/spacing/8"];
        assert_eq!(modified.after, Some(Scalar::from("10px")));
        assert_eq!(modified.before, Some(Token::literal("8px")));
        assert_eq!(modified.full_path(), vec!["primitive", "spacing-8"]);

        let added = &diff.added["lg.spacing.primitive/spacing/66"];
        assert_eq!(added.path, vec!["spacing-66"]);
        assert_eq!(added.after, Some(Scalar::from("66px")));

        let removed: Vec<&String> = diff.removed.keys().collect();
        assert_eq!(removed, vec!["lg.spacing.primitive/spacing-99"]);
    }

    #[test]
    fn missing_scale_group_is_structural() {
        let report = run("lg.spacing.primitive", serde_json::json!({"4": 4}));
        assert!(report.diff.is_empty());
        assert_eq!(report.skipped[0].reason, SkipReason::Structural);
    }

    #[test]
    fn oblique_weights_and_families_are_ignored() {
        let report = run(
            "lg.typography.primitive",
            serde_json::json!({
                "fontsize": {"24": 24},
                "fontweight": {"bold": 700, "oblique-bold": 700},
                "fontfamily": {"base": "Other"}
            }),
        );
        let diff = &report.diff;
        assert!(diff.is_empty());
        let unchanged: Vec<&String> = diff.unchanged.keys().collect();
        assert_eq!(
            unchanged,
            vec![
                "lg.typography.primitive/fontsize/24",
                "lg.typography.primitive/fontweight/bold"
            ]
        );
    }

    #[test]
    fn color_primitives_flatten_families() {
        let report = run(
            "lg.color.primitive",
            serde_json::json!({
                "black": {"r": 0, "g": 0, "b": 0, "a": 1},
                "gray": {"10": "#1a1a1a", "20": "#333333"}
            }),
        );
        let diff = &report.diff;
        assert!(diff.unchanged.contains_key("lg.color.primitive/black"));
        assert!(diff.unchanged.contains_key("lg.color.primitive/gray/10"));
        assert_eq!(diff.added["lg.color.primitive/gray/20"].path, vec!["gray-20"]);
    }

    #[test]
    fn semantic_references_resolve_before_comparing() {
        let report = run(
            "lg.webOS.color.semantic.dark",
            serde_json::json!({
                "surface": {"default": "#000000"},
                "onbackground": {"main": "#ffffff"},
                "broken": "#123456"
            }),
        );
        let diff = &report.diff;
        assert!(diff.unchanged.contains_key("lg.webOS.color.semantic.dark/surface/default"));
        let modified = &diff.modified["lg.webOS.color.semantic.dark/onbackground/main"];
        assert_eq!(modified.path, vec!["on", "background", "main"]);
        assert!(diff.unchanged.contains_key("lg.webOS.color.semantic.dark/broken"));
        assert_eq!(report.warnings.len(), 1);
        assert!(diff.removed.is_empty());
    }

    #[test]
    fn leaf_over_local_group_is_flagged() {
        let report = run(
            "lg.webOS.color.semantic.dark",
            serde_json::json!({"surface": "#000000"}),
        );
        assert!(report.diff.added.contains_key("lg.webOS.color.semantic.dark/surface"));
        assert_eq!(
            report.warnings,
            vec!["lg.webOS.color.semantic.dark/surface: replaces the local group semantic/color/surface".to_string()]
        );
    }

    #[test]
    fn group_has_no_local_value() {
        let config = SyncConfig::default();
        let store = store();
        let differ = Differ::new(&config, &store);
        assert!(differ.local_value(&Token::node()).is_none());
        assert_eq!(
            differ.local_value(&Token::literal("#000000")).map(|value| value.ok()),
            Some(Some(Scalar::from("#000000")))
        );
        let resolved = differ
            .local_value(&Token::reference("core-tokens/color-primitive.json#/primitive/color/gray-10"))
            .map(|value| value.ok());
        assert_eq!(resolved, Some(Some(Scalar::from("#1a1a1a"))));
    }

    #[test]
    fn skipped_collections_are_reported() {
        let report = run("lg.web.color.component", serde_json::json!({"a": "#000000"}));
        assert_eq!(report.skipped[0].reason, SkipReason::Component);

        let report = run("lg.webOS.radius.semantic", serde_json::json!({"radius": {"full": 999}}));
        assert_eq!(report.skipped[0].reason, SkipReason::MissingLocalFile);
    }
}
