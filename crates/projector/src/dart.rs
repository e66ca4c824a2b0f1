//! Flutter bindings: singleton primitive classes and per-category semantic
//! color classes whose getters point back at `ColorPrimitive.instance`.

use tokens_model::{Domain, FileId, FileLayout, Namespace, Pointer, Scalar, Token, TokenMap};

use crate::error::{ProjectError, Result};
use crate::naming::{block_comment, camel_case, pascal_case, snake_case};
use crate::Artifact;

const DART_DIR: &str = "dart";
const FONT_SIZE_PREFIX: &str = "font-size-";

/// `on.*` subtrees published as their own `on_<name>` category
const ON_CATEGORIES: [&str; 4] = ["background", "surface", "primary", "secondary"];

const FONT_WEIGHTS: [(&str, u16); 9] = [
    ("thin", 100),
    ("extralight", 200),
    ("light", 300),
    ("regular", 400),
    ("medium", 500),
    ("semiBold", 600),
    ("bold", 700),
    ("extrabold", 800),
    ("black", 900),
];

/// Dart sources for one token file; files with no binding yield none
pub fn render(id: &FileId, file: &Token, header: &[String]) -> Result<Vec<Artifact>> {
    let Some(layout) = FileLayout::from_file_name(&id.file) else {
        return Err(ProjectError::UnknownLayout { file: id.to_string() });
    };
    let root = || {
        let path = layout.root();
        file.get_path(&path)
            .and_then(Token::as_node)
            .ok_or_else(|| ProjectError::shape(id.to_string(), format!("no '{}' object", path.join("."))))
    };

    let primitive = |content: String| {
        vec![Artifact::new(
            &id.package,
            format!("{DART_DIR}/{}.dart", snake_case(&id.file)),
            content,
        )]
    };
    let artifacts = match (layout.namespace, layout.domain) {
        (Namespace::Primitive, Domain::Color) => primitive(color_primitive(root()?, header)),
        (Namespace::Primitive, Domain::Radius) => primitive(radius_primitive(root()?, header)),
        (Namespace::Primitive, Domain::Spacing) => primitive(spacing_primitive(root()?, header)),
        (Namespace::Primitive, Domain::Typography) => primitive(typography_primitive(root()?, header)),
        (Namespace::Semantic, Domain::Color) => semantic_color(id, root()?, header),
        _ => {
            log::debug!("{id}: no Dart binding for this file");
            Vec::new()
        }
    };
    Ok(artifacts)
}

fn class_preamble(name: &str, header: &[String]) -> String {
    format!(
        "{}import 'package:flutter/material.dart';\n\nclass {name} {{\n  {name}._();\n\n  static {name}? _instance;\n  static {name} get instance => _instance ??= {name}._();\n",
        block_comment(header)
    )
}

/// `#rgb` / `#rrggbb` → channels
fn hex_channels(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    let expanded: String = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        n if n >= 6 => digits.chars().take(6).collect(),
        _ => return None,
    };
    let channel = |at: usize| u8::from_str_radix(expanded.get(at..at + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

fn color_primitive(colors: &TokenMap, header: &[String]) -> String {
    let properties: Vec<String> = colors
        .iter()
        .filter_map(|(name, token)| {
            let hex = token.as_literal()?.as_str()?;
            let Some((r, g, b)) = hex_channels(hex) else {
                log::debug!("color-primitive: '{name}' is not a hex color");
                return None;
            };
            Some(format!(
                "\n  /// {name} - {hex}\n  late final Color {} = const Color.fromRGBO({r}, {g}, {b}, 1.0);",
                camel_case(name)
            ))
        })
        .collect();
    format!("{}{}\n}}\n", class_preamble("ColorPrimitive", header), properties.join("\n"))
}

/// Pixel amount of `"4px"`, `"4"` or `4`
fn pixels(token: &Token) -> Option<Scalar> {
    let text = token.as_literal()?.coerce();
    let number: f64 = text.strip_suffix("px").unwrap_or(&text).trim().parse().ok()?;
    Some(Scalar::from_f64(number))
}

fn radius_primitive(radii: &TokenMap, header: &[String]) -> String {
    let mut out = class_preamble("RadiusPrimitive", header);
    for (name, token) in radii {
        if let Some(px) = pixels(token) {
            out.push_str(&format!(
                "\n  late final Radius {} = const Radius.circular({px});",
                camel_case(name)
            ));
        }
    }
    out.push_str("\n}\n");
    out
}

fn spacing_primitive(spacings: &TokenMap, header: &[String]) -> String {
    let mut out = class_preamble("SpacingPrimitive", header);
    for (name, token) in spacings {
        if let Some(px) = pixels(token) {
            let kind = if px.as_f64().is_some_and(|n| n.fract() == 0.0) {
                "int"
            } else {
                "double"
            };
            out.push_str(&format!("\n  late final {kind} {} = {px};", camel_case(name)));
        }
    }
    out.push_str("\n}\n");
    out
}

fn typography_primitive(primitive: &TokenMap, header: &[String]) -> String {
    let mut sizes: Vec<(u64, Scalar)> = primitive
        .iter()
        .filter_map(|(name, token)| {
            let size = name.strip_prefix(FONT_SIZE_PREFIX)?.parse::<u64>().ok()?;
            Some((size, pixels(token)?))
        })
        .collect();
    sizes.sort_by_key(|(size, _)| *size);

    let mut out = class_preamble("FontSizePrimitive", header);
    for (size, px) in sizes {
        out.push_str(&format!("\n  late final double size{size} = {px};"));
    }
    out.push_str("\n}\n\nclass FontWeightPrimitive {\n  FontWeightPrimitive._();\n\n  static FontWeightPrimitive? _instance;\n  static FontWeightPrimitive get instance => _instance ??= FontWeightPrimitive._();\n\n");
    for (name, weight) in FONT_WEIGHTS {
        out.push_str(&format!("  late final FontWeight {name} = FontWeight.w{weight};\n"));
    }
    out.push_str("}\n");
    out
}

/// Getter name of a semantic leaf; `default` is reserved in Dart
fn dart_property(key: &str) -> String {
    if key == "default" {
        "defaultColor".to_string()
    } else {
        camel_case(key)
    }
}

/// `ColorPrimitive` field a reference lands on
fn primitive_field(pointer: &str) -> String {
    let last = Pointer::parse(pointer)
        .ok()
        .and_then(|parsed| parsed.path.last().cloned())
        .unwrap_or_else(|| pointer.rsplit('/').next().unwrap_or_default().to_string());
    camel_case(&last)
}

fn color_getters(values: &TokenMap) -> String {
    values
        .iter()
        .filter_map(|(key, token)| {
            let reference = token.as_reference()?;
            Some(format!(
                "  @override\n  Color get {} => ColorPrimitive.instance.{};\n",
                dart_property(key),
                primitive_field(&reference.pointer)
            ))
        })
        .collect()
}

fn subcategories(values: &TokenMap) -> impl Iterator<Item = (&String, &TokenMap)> {
    values
        .iter()
        .filter_map(|(key, token)| token.as_node().map(|map| (key, map)))
}

fn semantic_color(id: &FileId, colors: &TokenMap, header: &[String]) -> Vec<Artifact> {
    let theme = snake_case(id.file.strip_prefix("color-semantic-").unwrap_or(&id.file));
    let mut categories: Vec<(String, &TokenMap)> = Vec::new();
    for (category, token) in colors {
        let Some(values) = token.as_node() else {
            log::debug!("{id}: top-level leaf '{category}' has no Dart category");
            continue;
        };
        if category == "on" {
            for sub in ON_CATEGORIES {
                if let Some(inner) = values.get(sub).and_then(Token::as_node) {
                    categories.push((format!("on_{sub}"), inner));
                }
            }
        } else {
            categories.push((category.clone(), values));
        }
    }

    let mut artifacts = Vec::new();
    for (category, values) in categories {
        let dir = format!("{DART_DIR}/{theme}/color/{category}");
        artifacts.push(Artifact::new(
            &id.package,
            format!("{dir}/{category}.dart"),
            category_file(&category, values, header),
        ));
        for (sub, sub_values) in subcategories(values) {
            artifacts.push(Artifact::new(
                &id.package,
                format!("{dir}/{sub}/{sub}.dart"),
                subcategory_file(&category, sub, sub_values, header),
            ));
        }
    }
    artifacts
}

fn category_file(category: &str, values: &TokenMap, header: &[String]) -> String {
    let class = pascal_case(category);
    let getters = color_getters(values);
    let subs: Vec<&String> = subcategories(values).map(|(key, _)| key).collect();

    let mut out = block_comment(header);
    if !getters.is_empty() {
        out.push_str("import 'package:flutter/material.dart' show Color;\n\n");
        out.push_str("import '../../../../core_tokens/color_primitive.dart';\n");
    }
    out.push_str(&format!("import '../../../base/color/{category}/{category}_base.dart';\n"));
    for sub in &subs {
        out.push_str(&format!("import '{sub}/{sub}.dart';\n"));
    }
    out.push_str(&format!("\nclass {class} extends {class}Base {{\n  const {class}();\n\n"));
    for sub in &subs {
        let sub_class = pascal_case(sub);
        out.push_str(&format!(
            "  @override\n  {sub_class} get {} => const {sub_class}();\n",
            camel_case(sub)
        ));
    }
    out.push_str(&getters);
    out.push_str("}\n");
    out
}

fn subcategory_file(parent: &str, sub: &str, values: &TokenMap, header: &[String]) -> String {
    let class = pascal_case(sub);
    format!(
        "{}import 'package:flutter/material.dart' show Color;\n\nimport '../../../../../core_tokens/color_primitive.dart';\nimport '../../../../base/color/{parent}/{sub}/{sub}_base.dart';\n\nclass {class} extends {class}Base {{\n  const {class}();\n\n{}}}\n",
        block_comment(header),
        color_getters(values)
    )
}
