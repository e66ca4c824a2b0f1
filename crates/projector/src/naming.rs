//! Identifier spelling shared by the CSS and Dart projections.

use tokens_model::Pointer;

/// `--<segments joined by '-'>`
pub fn css_var<S: AsRef<str>>(segments: &[S]) -> String {
    let joined: Vec<&str> = segments.iter().map(|s| s.as_ref()).collect();
    format!("--{}", joined.join("-"))
}

/// Variable a pointer's target is published under
/// (`.../color-primitive.json#/primitive/color/black` → `--primitive-color-black`)
pub fn css_var_for_pointer(pointer: &str) -> Option<String> {
    Pointer::parse(pointer).ok().map(|parsed| css_var(parsed.path.as_slice()))
}

/// `neutral-gray-5` → `neutralGray5`
pub fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut chars = name.chars().peekable();
    while let Some(c) = chars.next() {
        match chars.peek() {
            Some(&next) if (c == '-' || c == '_') && is_word(next) => {
                out.extend(next.to_uppercase());
                chars.next();
            }
            _ => out.push(c),
        }
    }
    out
}

/// `on_surface` → `OnSurface`
pub fn pascal_case(name: &str) -> String {
    name.split(['-', '_'])
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect()
}

/// `color-semantic-dark` → `color_semantic_dark`
pub fn snake_case(name: &str) -> String {
    name.replace('-', "_")
}

/// Lines wrapped in a `/* ... */` block plus a blank line; empty input
/// yields nothing
pub(crate) fn block_comment(lines: &[String]) -> String {
    if lines.is_empty() {
        return String::new();
    }
    let mut out = String::from("/*\n");
    for line in lines {
        if line.is_empty() {
            out.push_str(" *\n");
        } else {
            out.push_str(&format!(" * {line}\n"));
        }
    }
    out.push_str(" */\n\n");
    out
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camel_case_follows_separator_rule() {
        assert_eq!(camel_case("neutral-gray-5"), "neutralGray5");
        assert_eq!(camel_case("input_field"), "inputField");
        assert_eq!(camel_case("black"), "black");
        assert_eq!(camel_case("a--b"), "a-B");
    }

    #[test]
    fn pascal_case_splits_both_separators() {
        assert_eq!(pascal_case("on_surface"), "OnSurface");
        assert_eq!(pascal_case("popup"), "Popup");
        assert_eq!(pascal_case("input-field"), "InputField");
    }

    #[test]
    fn pointer_targets_become_variables() {
        assert_eq!(
            css_var_for_pointer("core-tokens/color-primitive.json#/primitive/color/black").as_deref(),
            Some("--primitive-color-black")
        );
        assert_eq!(
            css_var_for_pointer("core-tokens/json/spacing-primitive.json#/primitive/spacing-4").as_deref(),
            Some("--primitive-spacing-4")
        );
        assert_eq!(css_var_for_pointer("not a pointer"), None);
    }
}
