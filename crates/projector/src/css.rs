//! `:root { --name: value; }` stylesheets, one per token file.

use regex::Regex;

use tokens_model::{Domain, DomainRules, FileId, FileLayout, Namespace, Token, TokenMap, TokenStore};
use tokens_refs::Resolver;

use crate::config::ProjectorConfig;
use crate::error::{ProjectError, Result};
use crate::naming::{css_var, css_var_for_pointer};

const PRIMITIVE_VAR_PREFIX: &str = "--primitive-";
const FONT_SIZE_PREFIX: &str = "font-size-";
const FONT_WEIGHT_KEY: &str = "font-weight";

/// Coarse buckets of a semantic color stylesheet, in output order
const SEMANTIC_COLOR_GROUPS: [&str; 7] = [
    "Background",
    "On Background",
    "Surface",
    "On Surface",
    "Stroke",
    "Scrim",
    "Other",
];

#[derive(Debug, Default)]
struct Section {
    label: Option<String>,
    lines: Vec<(String, String)>,
}

impl Section {
    fn labelled(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            lines: Vec::new(),
        }
    }
}

/// Renders token files as CSS custom properties
#[derive(Debug)]
pub struct CssProjector {
    header: Vec<String>,
    color_groups: Vec<(String, Regex)>,
    other_colors_label: String,
}

impl CssProjector {
    pub fn new(config: &ProjectorConfig) -> Result<Self> {
        let color_groups = config
            .color_groups
            .iter()
            .map(|group| {
                Regex::new(&group.pattern)
                    .map(|regex| (group.label.clone(), regex))
                    .map_err(|source| ProjectError::Pattern {
                        pattern: group.pattern.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            header: config.header.clone(),
            color_groups,
            other_colors_label: config.other_colors_label.clone(),
        })
    }

    /// Stylesheet text for one file. `store` resolves semantic references.
    pub fn render(&self, id: &FileId, file: &Token, store: &TokenStore) -> Result<String> {
        let layout = FileLayout::from_file_name(&id.file).ok_or_else(|| ProjectError::UnknownLayout {
            file: id.to_string(),
        })?;
        let root_path = layout.root();
        let root = file
            .get_path(&root_path)
            .and_then(Token::as_node)
            .ok_or_else(|| ProjectError::shape(id.to_string(), format!("no '{}' object", root_path.join("."))))?;
        let rules = layout.domain.rules();

        let sections = match (layout.namespace, layout.domain) {
            (Namespace::Primitive, Domain::Color) => self.color_primitive(root, rules),
            (Namespace::Primitive, Domain::Typography) => typography_primitive(root, rules),
            (Namespace::Semantic, Domain::Color) => semantic_color(id, root, store, rules),
            _ => vec![Section {
                label: None,
                lines: flat_lines(&root_path, root, rules),
            }],
        };

        let mut out = crate::naming::block_comment(&self.header);
        out.push_str(&format!(
            "/* {}.css */\n\n/* ----------------------------------------\n{}\n---------------------------------------- */\n\n:root {{\n",
            id.file,
            title(&id.file, layout)
        ));
        for section in sections.iter().filter(|section| !section.lines.is_empty()) {
            if let Some(label) = &section.label {
                out.push_str(&format!("\n\t/* {label} */\n"));
            }
            for (name, value) in &section.lines {
                out.push_str(&format!("\t{name}: {value};\n"));
            }
        }
        out.push_str("}\n");
        Ok(out)
    }

    fn color_primitive(&self, root: &TokenMap, rules: &DomainRules) -> Vec<Section> {
        let mut sections: Vec<Section> = self
            .color_groups
            .iter()
            .map(|(label, _)| Section::labelled(label.as_str()))
            .chain(std::iter::once(Section::labelled(self.other_colors_label.as_str())))
            .collect();
        let other = self.color_groups.len();

        for (key, token) in root {
            let slot = self
                .color_groups
                .iter()
                .position(|(_, regex)| regex.is_match(key))
                .unwrap_or(other);
            let prefix = ["primitive".to_string(), "color".to_string(), key.clone()];
            sections[slot].lines.extend(subtree_lines(&prefix, token, rules));
        }
        sections
    }
}

fn typography_primitive(root: &TokenMap, rules: &DomainRules) -> Vec<Section> {
    let mut sizes: Vec<(&String, &Token)> = root
        .iter()
        .filter(|(key, _)| key.starts_with(FONT_SIZE_PREFIX))
        .collect();
    sizes.sort_by_key(|(key, _)| rules.numeric_family(key).map_or(0, |(_, n)| n));

    let weight_prefix = format!("{FONT_WEIGHT_KEY}-");
    let mut weight_keys: Vec<(&String, &Token)> = root
        .iter()
        .filter(|(key, _)| key.starts_with(&weight_prefix))
        .collect();
    weight_keys.sort_by(|a, b| a.0.cmp(b.0));

    let mut others: Vec<(&String, &Token)> = root
        .iter()
        .filter(|(key, _)| {
            !key.starts_with(FONT_SIZE_PREFIX) && !key.starts_with(&weight_prefix) && *key != FONT_WEIGHT_KEY
        })
        .collect();
    others.sort_by(|a, b| a.0.cmp(b.0));

    let section = |label: &str, entries: &[(&String, &Token)]| {
        let mut section = Section::labelled(label);
        for (key, token) in entries {
            let prefix = ["primitive".to_string(), (*key).clone()];
            section.lines.extend(subtree_lines(&prefix, token, rules));
        }
        section
    };

    let mut weights = Section::labelled("Font Weights");
    if let Some(Token::Node(map)) = root.get(FONT_WEIGHT_KEY) {
        for (weight, token) in map {
            let prefix = ["primitive".to_string(), FONT_WEIGHT_KEY.to_string(), weight.clone()];
            weights.lines.extend(subtree_lines(&prefix, token, rules));
        }
    }

    vec![
        section("Font Sizes", &sizes),
        section("Font Weight Tokens", &weight_keys),
        weights,
        section("Other Typography", &others),
    ]
}

fn semantic_color(id: &FileId, root: &TokenMap, store: &TokenStore, rules: &DomainRules) -> Vec<Section> {
    let resolver = Resolver::new(store);
    let mut sections: Vec<Section> = SEMANTIC_COLOR_GROUPS.iter().map(|label| Section::labelled(*label)).collect();
    let base = ["semantic".to_string(), "color".to_string()];

    for (key, token) in root {
        let prefix: Vec<String> = base.iter().cloned().chain([key.clone()]).collect();
        for (path, leaf) in Token::leaves(token) {
            if let Token::Reference(reference) = leaf {
                if let Err(err) = resolver.resolve(&reference.pointer) {
                    log::warn!("{id}: {err}");
                }
            }
            let full: Vec<String> = prefix.iter().cloned().chain(path).collect();
            let Some(value) = css_value(&full, leaf, rules) else {
                continue;
            };
            let slot = semantic_color_group(&full[base.len()..]);
            sections[slot].lines.push((css_var(full.as_slice()), value));
        }
    }
    sections
}

/// Index into [`SEMANTIC_COLOR_GROUPS`] inferred from the path below `semantic.color`
fn semantic_color_group(path: &[String]) -> usize {
    let joined = path.join("-").to_lowercase();
    let on = |what: &str| joined.starts_with(&format!("on-{what}")) || joined.contains(&format!("on{what}"));
    if on("background") {
        1
    } else if on("surface") {
        3
    } else if joined.contains("background") {
        0
    } else if joined.contains("surface") {
        2
    } else if joined.contains("stroke") {
        4
    } else if joined.contains("scrim") {
        5
    } else {
        6
    }
}

fn flat_lines(prefix: &[String], root: &TokenMap, rules: &DomainRules) -> Vec<(String, String)> {
    root.iter()
        .flat_map(|(key, token)| {
            let prefix: Vec<String> = prefix.iter().cloned().chain([key.clone()]).collect();
            subtree_lines(&prefix, token, rules)
        })
        .collect()
}

/// One line per leaf of `token`, named after `prefix` plus the leaf path
fn subtree_lines(prefix: &[String], token: &Token, rules: &DomainRules) -> Vec<(String, String)> {
    token
        .leaves()
        .into_iter()
        .filter_map(|(path, leaf)| {
            let full: Vec<String> = prefix.iter().cloned().chain(path).collect();
            css_value(&full, leaf, rules).map(|value| (css_var(full.as_slice()), value))
        })
        .collect()
}

fn css_value(path: &[String], token: &Token, rules: &DomainRules) -> Option<String> {
    match token {
        Token::Literal(scalar) => {
            let text = rules.format_value(path, scalar).coerce();
            if text.starts_with(PRIMITIVE_VAR_PREFIX) {
                Some(format!("var({text})"))
            } else {
                Some(text)
            }
        }
        Token::Reference(reference) => match css_var_for_pointer(&reference.pointer) {
            Some(name) => Some(format!("var({name})")),
            None => {
                log::warn!("Dropping {}: malformed pointer '{}'", path.join("."), reference.pointer);
                None
            }
        },
        Token::Node(_) => None,
    }
}

fn title(file: &str, layout: FileLayout) -> String {
    let namespace = capitalize(layout.namespace.as_str());
    let domain = capitalize(layout.domain.as_str());
    let mode = file
        .strip_prefix(&format!("{}-{}-", layout.domain, layout.namespace.as_str()))
        .filter(|mode| !mode.is_empty());
    match mode {
        Some(mode) => format!("{namespace} {domain} Tokens ({mode})"),
        None => format!("{namespace} {domain} Tokens"),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
