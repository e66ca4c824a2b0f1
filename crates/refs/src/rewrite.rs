use tokens_model::{Token, TokenMap};

use crate::index::{pointer_text, ReferenceIndex};

/// Result of rewriting one subtree
#[derive(Debug, Clone, PartialEq)]
pub struct Rewritten {
    pub token: Token,
    /// Literals replaced by references
    pub replaced: usize,
    /// Paths (relative to the subtree) of literals with no primitive match
    pub unmatched: Vec<String>,
}

/// Replace every literal under `subtree` whose canonical value matches a
/// primitive with `{"ref": "<file_prefix>#/<path>"}`.
///
/// Existing references and unmatched literals are left as they are, so a
/// second pass over the output changes nothing.
pub fn rewrite(subtree: &Token, index: &ReferenceIndex, file_prefix: &str) -> Rewritten {
    let mut out = Rewritten {
        token: Token::node(),
        replaced: 0,
        unmatched: Vec::new(),
    };
    let token = walk(subtree, index, file_prefix, &mut Vec::new(), &mut out);
    out.token = token;
    if !out.unmatched.is_empty() {
        log::debug!(
            "{} {} literal(s) have no primitive: {}",
            out.unmatched.len(),
            index.domain(),
            out.unmatched.join(", ")
        );
    }
    out
}

fn walk(
    token: &Token,
    index: &ReferenceIndex,
    file_prefix: &str,
    path: &mut Vec<String>,
    out: &mut Rewritten,
) -> Token {
    match token {
        Token::Reference(_) => token.clone(),
        Token::Literal(value) => match index.lookup(path.as_slice(), value) {
            Some(target) => {
                out.replaced += 1;
                Token::reference(pointer_text(file_prefix, target))
            }
            None => {
                out.unmatched.push(path.join("/"));
                token.clone()
            }
        },
        Token::Node(map) => {
            let mut rewritten = TokenMap::with_capacity(map.len());
            for (key, child) in map {
                path.push(key.clone());
                rewritten.insert(key.clone(), walk(child, index, file_prefix, path, out));
                path.pop();
            }
            Token::Node(rewritten)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::build_index;
    use crate::resolver::Resolver;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use tokens_model::{Domain, Scalar, TokenStore};

    const PREFIX: &str = "core-tokens/color-primitive.json";

    fn primitives() -> Token {
        Token::node()
            .with_leaf(&["primitive", "color", "black"], Token::literal("#000000"))
            .with_leaf(&["primitive", "color", "white"], Token::literal("#ffffff"))
    }

    #[test]
    fn replaces_matching_literals() {
        let index = build_index(&primitives(), Domain::Color);
        let subtree = Token::node()
            .with_leaf(&["surface", "default"], Token::literal("#000000"))
            .with_leaf(&["surface", "odd"], Token::literal("#123456"));
        let out = rewrite(&subtree, &index, PREFIX);
        assert_eq!(out.replaced, 1);
        assert_eq!(out.unmatched, vec!["surface/odd".to_string()]);
        assert_eq!(
            out.token.get_path(&["surface", "default"]),
            Some(&Token::reference(
                "core-tokens/color-primitive.json#/primitive/color/black"
            ))
        );
        assert_eq!(
            out.token.get_path(&["surface", "odd"]),
            Some(&Token::literal("#123456"))
        );
    }

    #[test]
    fn radius_numbers_become_references() {
        let file = Token::node()
            .with_leaf(&["primitive", "radius-8"], Token::literal("8px"));
        let index = build_index(&file, Domain::Radius);
        let subtree = Token::node().with_leaf(&["md"], Token::literal(8i64));
        let out = rewrite(&subtree, &index, "core-tokens/radius-primitive.json");
        assert_eq!(
            out.token.get("md"),
            Some(&Token::reference("core-tokens/radius-primitive.json#/primitive/radius-8"))
        );
    }

    #[test]
    fn line_height_is_not_taken_for_a_font_size() {
        let file = Token::node().with_leaf(&["primitive", "font-size-24"], Token::literal("24px"));
        let index = build_index(&file, Domain::Typography);
        let subtree = Token::node()
            .with_leaf(&["body", "line-height"], Token::literal(24i64))
            .with_leaf(&["body", "font-size"], Token::literal(24i64));
        let out = rewrite(&subtree, &index, "core-tokens/typography-primitive.json");
        assert_eq!(out.replaced, 1);
        assert_eq!(out.unmatched, vec!["body/line-height".to_string()]);
        assert_eq!(
            out.token.get_path(&["body", "line-height"]),
            Some(&Token::literal(24i64))
        );
        assert_eq!(
            out.token.get_path(&["body", "font-size"]),
            Some(&Token::reference(
                "core-tokens/typography-primitive.json#/primitive/font-size-24"
            ))
        );
    }

    #[test]
    fn rewrite_is_idempotent() {
        let index = build_index(&primitives(), Domain::Color);
        let subtree = Token::node()
            .with_leaf(&["surface", "default"], Token::literal("#ffffff"))
            .with_leaf(&["scrim"], Token::literal("#00000080"));
        let once = rewrite(&subtree, &index, PREFIX).token;
        let twice = rewrite(&once, &index, PREFIX);
        assert_eq!(twice.token, once);
        assert_eq!(twice.replaced, 0);
    }

    proptest! {
        #[test]
        fn rewritten_references_resolve_to_the_original_literal(
            picks in proptest::collection::vec(prop_oneof![
                Just("#000000".to_string()),
                Just("#ffffff".to_string()),
                "#[0-9a-f]{6}",
            ], 1..12)
        ) {
            let index = build_index(&primitives(), Domain::Color);
            let mut subtree = Token::node();
            for (idx, value) in picks.iter().enumerate() {
                subtree = subtree.with_leaf(&[format!("k{idx}")], Token::literal(value.as_str()));
            }
            let out = rewrite(&subtree, &index, PREFIX);
            let store = TokenStore::new().with_file("core-tokens", "color-primitive", primitives());
            let resolved = Resolver::new(&store).resolve_all(&out.token);
            for (idx, value) in picks.iter().enumerate() {
                prop_assert_eq!(
                    resolved.get(&format!("k{idx}")).and_then(Token::as_literal),
                    Some(&Scalar::from(value.as_str()))
                );
            }
        }
    }
}
