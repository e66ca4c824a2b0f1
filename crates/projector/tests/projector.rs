use pretty_assertions::assert_eq;

use tokens_model::json::parse_token_file;
use tokens_model::{FileId, TokenStore};
use tokens_projector::{Artifact, Projector, ProjectorConfig};

fn store() -> TokenStore {
    TokenStore::new()
        .with_file(
            "core-tokens",
            "color-primitive",
            parse_token_file(r##"{"primitive": {"color": {"black": "#000000", "white": "#ffffff"}}}"##).unwrap(),
        )
        .with_file(
            "webos-tokens",
            "color-semantic-dark",
            parse_token_file(
                r##"{"semantic": {"color": {
                    "background": {"main": {"ref": "core-tokens/color-primitive.json#/primitive/color/black"}},
                    "on": {"background": {"main": {"$ref": "core-tokens/json/color-primitive.json#/primitive/color/white"}}}
                }}}"##,
            )
            .unwrap(),
        )
}

fn find<'a>(artifacts: &'a [Artifact], path: &str) -> &'a Artifact {
    artifacts
        .iter()
        .find(|artifact| artifact.repo_rel_path() == path)
        .unwrap_or_else(|| panic!("missing {path}"))
}

#[test]
fn semantic_stylesheet_cascades_from_primitives() {
    let projector = Projector::new(ProjectorConfig::default()).unwrap();
    let projection = projector.project_store(&store(), None);
    assert!(projection.failures.is_empty());

    let css = find(&projection.artifacts, "packages/webos-tokens/css/color-semantic-dark.css");
    assert!(css
        .content
        .contains("\n\t/* Background */\n\t--semantic-color-background-main: var(--primitive-color-black);\n"));
    assert!(css
        .content
        .contains("\n\t/* On Background */\n\t--semantic-color-on-background-main: var(--primitive-color-white);\n"));

    let dart = find(
        &projection.artifacts,
        "packages/webos-tokens/dart/dark/color/on_background/on_background.dart",
    );
    assert!(dart.content.contains("Color get main => ColorPrimitive.instance.white;"));
}

#[test]
fn projecting_twice_is_byte_identical() {
    let projector = Projector::new(ProjectorConfig::default()).unwrap();
    let store = store();
    let ids = [
        FileId::new("core-tokens", "color-primitive"),
        FileId::new("webos-tokens", "color-semantic-dark"),
    ];
    let first = projector.project_files(&store, &ids);
    let second = projector.project_files(&store, &ids);
    assert_eq!(first.artifacts, second.artifacts);
}
