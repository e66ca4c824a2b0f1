use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use tokens_model::{Domain, FileId, FileLayout, Namespace};
use tokens_protocol::{SkipReason, SkippedCollection};

use crate::error::{Result, SyncError};

/// How a source collection is compared against its target file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RouteKind {
    /// `{family: {shade: v}}` → `primitive.color.family-shade`
    ColorPrimitive,
    /// `{spacing: {N: v}}` → `primitive.spacing-N`
    SpacingPrimitive,
    /// `{radius: {N: v}}` → `primitive.radius-N`
    RadiusPrimitive,
    /// `fontsize.N` / `fontweight.W` → `primitive.font-size-N` / `primitive.font-weight.W`
    TypographyPrimitive,
    SemanticColor,
    /// Like [`RouteKind::Generic`] but unwraps a top-level `radius` key
    SemanticRadius,
    /// Nested walk with key aliases under the file's domain root
    Generic,
    /// Base collection whose content arrives through its mode collections
    Covered,
}

impl RouteKind {
    pub const fn is_primitive(self) -> bool {
        matches!(
            self,
            Self::ColorPrimitive | Self::SpacingPrimitive | Self::RadiusPrimitive | Self::TypographyPrimitive
        )
    }

    /// Layout the target file name must have, when the kind fixes one
    pub const fn expected_layout(self) -> Option<FileLayout> {
        let (namespace, domain) = match self {
            Self::ColorPrimitive => (Namespace::Primitive, Domain::Color),
            Self::SpacingPrimitive => (Namespace::Primitive, Domain::Spacing),
            Self::RadiusPrimitive => (Namespace::Primitive, Domain::Radius),
            Self::TypographyPrimitive => (Namespace::Primitive, Domain::Typography),
            Self::SemanticColor => (Namespace::Semantic, Domain::Color),
            Self::SemanticRadius => (Namespace::Semantic, Domain::Radius),
            Self::Generic | Self::Covered => return None,
        };
        Some(FileLayout { namespace, domain })
    }
}

/// Destination of one source collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub package: String,
    #[serde(default)]
    pub file: String,
    pub kind: RouteKind,
}

impl Route {
    fn new(package: &str, file: &str, kind: RouteKind) -> Self {
        Self {
            package: package.to_string(),
            file: file.to_string(),
            kind,
        }
    }
}

/// A route checked against the file naming rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    pub collection: String,
    pub target: FileId,
    pub kind: RouteKind,
    pub layout: FileLayout,
}

impl ResolvedRoute {
    pub fn domain(&self) -> Domain {
        self.layout.domain
    }

    /// Path from the file root to where this collection's tokens live
    pub fn root(&self) -> Vec<String> {
        self.layout.root()
    }
}

/// Sync configuration; `Default` reproduces the built-in LG routing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Collection name → destination. A `routes` table in a config file
    /// replaces the built-in one.
    pub routes: BTreeMap<String, Route>,

    /// Collection name prefix → package, for semantic color modes without an
    /// explicit route. The remainder of the name is the mode.
    pub semantic_color_prefixes: BTreeMap<String, String>,

    /// Collections that never take part in a sync
    pub excluded_collections: Vec<String>,

    /// Substring marking component collections
    pub component_marker: String,

    /// Source key → target path segments
    pub key_aliases: BTreeMap<String, Vec<String>>,

    /// Package holding the primitive files references point at
    pub primitive_package: String,

    /// Longest reference chain followed before reporting a cycle
    pub max_ref_chain: usize,
}

const PLATFORMS: [(&str, &str, &[&str]); 3] = [
    ("lg.webOS.color.semantic", "webos-tokens", &["dark", "light", "high-contrast"]),
    (
        "lg.web.color.semantic",
        "web-tokens",
        &["mono-white", "mono-black", "lg-brand", "mobile", "web"],
    ),
    (
        "lg.mobile.color.semantic",
        "mobile-tokens",
        &["mono-white", "mono-black", "lg-brand", "mobile", "web"],
    ),
];

const ALIASES: [(&str, &[&str]); 8] = [
    ("inputfield", &["input-field"]),
    ("inputfield-success", &["input-field-success"]),
    ("button_icon", &["button-icon"]),
    ("button_icon-pressed", &["button-icon-pressed"]),
    ("notificationcard", &["notification-card"]),
    ("textfield-disabled", &["text-field-disabled"]),
    ("onbackground", &["on", "background"]),
    ("onsurface", &["on", "surface"]),
];

impl Default for SyncConfig {
    fn default() -> Self {
        let mut routes = BTreeMap::new();
        for (name, file, kind) in [
            ("lg.color.primitive", "color-primitive", RouteKind::ColorPrimitive),
            ("lg.spacing.primitive", "spacing-primitive", RouteKind::SpacingPrimitive),
            ("lg.radius.primitive", "radius-primitive", RouteKind::RadiusPrimitive),
            ("lg.typography.primitive", "typography-primitive", RouteKind::TypographyPrimitive),
        ] {
            routes.insert(name.to_string(), Route::new("core-tokens", file, kind));
        }

        let mut semantic_color_prefixes = BTreeMap::new();
        for (base, package, modes) in PLATFORMS {
            routes.insert(base.to_string(), Route::new(package, "", RouteKind::Covered));
            for mode in modes {
                routes.insert(
                    format!("{base}.{mode}"),
                    Route::new(package, &semantic_color_file(mode), RouteKind::SemanticColor),
                );
            }
            semantic_color_prefixes.insert(format!("{base}."), package.to_string());
        }
        routes.insert(
            "lg.webOS.radius.semantic".to_string(),
            Route::new("webos-tokens", "radius-semantic", RouteKind::SemanticRadius),
        );

        Self {
            routes,
            semantic_color_prefixes,
            excluded_collections: [
                "Documentation",
                "lg.sys.color-common",
                "webOS.spacing",
                "tq.typography",
                "webOS.radius",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            component_marker: ".component".to_string(),
            key_aliases: ALIASES
                .into_iter()
                .map(|(key, target)| {
                    (
                        key.to_string(),
                        target.iter().map(|s| s.to_string()).collect(),
                    )
                })
                .collect(),
            primitive_package: "core-tokens".to_string(),
            max_ref_chain: tokens_refs::DEFAULT_MAX_CHAIN,
        }
    }
}

/// File name of the semantic color file for a mode (`color-semantic-dark`)
pub fn semantic_color_file(mode: &str) -> String {
    let mode = mode
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-");
    format!("color-semantic-{mode}")
}

impl SyncConfig {
    /// Parse TOML; omitted fields keep their defaults
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_ref_chain == 0 {
            return Err(SyncError::Config("max_ref_chain must be > 0".to_string()));
        }
        if self.component_marker.is_empty() {
            return Err(SyncError::Config("component_marker must not be empty".to_string()));
        }
        if self.primitive_package.is_empty() {
            return Err(SyncError::Config("primitive_package must not be empty".to_string()));
        }
        for (key, target) in &self.key_aliases {
            if target.is_empty() || target.iter().any(String::is_empty) {
                return Err(SyncError::Config(format!(
                    "key alias '{key}' must map to non-empty segments"
                )));
            }
        }
        for (collection, route) in &self.routes {
            if route.package.is_empty() {
                return Err(SyncError::Config(format!(
                    "route '{collection}' has no package"
                )));
            }
            if route.kind != RouteKind::Covered {
                check_layout(collection, route)?;
            }
        }
        Ok(())
    }

    /// Where `collection` goes, or why it is skipped
    pub fn route(&self, collection: &str) -> std::result::Result<ResolvedRoute, SkippedCollection> {
        let skip = |reason, detail: Option<String>| SkippedCollection {
            collection: collection.to_string(),
            reason,
            detail,
        };

        if collection.contains(&self.component_marker) {
            return Err(skip(SkipReason::Component, None));
        }
        if self.excluded_collections.iter().any(|name| name == collection) {
            return Err(skip(SkipReason::Excluded, None));
        }

        let route = match self.routes.get(collection) {
            Some(route) if route.kind == RouteKind::Covered => {
                return Err(skip(
                    SkipReason::Covered,
                    Some("handled via mode-specific collections".to_string()),
                ))
            }
            Some(route) => route.clone(),
            None => self
                .semantic_color_prefixes
                .iter()
                .find_map(|(prefix, package)| {
                    let mode = collection.strip_prefix(prefix.as_str())?;
                    (!mode.is_empty()).then(|| {
                        Route::new(package, &semantic_color_file(mode), RouteKind::SemanticColor)
                    })
                })
                .ok_or_else(|| skip(SkipReason::Unmapped, None))?,
        };

        let layout = check_layout(collection, &route)
            .map_err(|err| skip(SkipReason::Unmapped, Some(err.to_string())))?;
        Ok(ResolvedRoute {
            collection: collection.to_string(),
            target: FileId::new(&route.package, &route.file),
            kind: route.kind,
            layout,
        })
    }

    /// Target segments for one source key
    pub fn alias<'a>(&'a self, key: &'a str) -> Vec<&'a str> {
        match self.key_aliases.get(key) {
            Some(target) => target.iter().map(String::as_str).collect(),
            None => vec![key],
        }
    }

    /// `<primitive_package>/<domain>-primitive`
    pub fn primitive_file(&self, domain: Domain) -> FileId {
        FileId::new(&self.primitive_package, format!("{domain}-primitive"))
    }
}

fn check_layout(collection: &str, route: &Route) -> Result<FileLayout> {
    let layout = FileLayout::from_file_name(&route.file).ok_or_else(|| {
        SyncError::Config(format!(
            "route '{collection}' targets '{}', which names no known domain",
            route.file
        ))
    })?;
    match route.kind.expected_layout() {
        Some(expected) if expected != layout => Err(SyncError::Config(format!(
            "route '{collection}' of kind {:?} cannot target '{}'",
            route.kind, route.file
        ))),
        _ => Ok(layout),
    }
}
