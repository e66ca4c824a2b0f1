use serde::{Deserialize, Serialize};

/// One named bucket of the color primitive stylesheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorGroup {
    /// Comment written above the group
    pub label: String,
    /// Regex matched against the primitive key
    pub pattern: String,
}

impl ColorGroup {
    pub fn new(label: &str, pattern: &str) -> Self {
        Self {
            label: label.to_string(),
            pattern: pattern.to_string(),
        }
    }
}

/// Projection settings; `Default` reproduces the stock LG output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectorConfig {
    /// Lines of a block comment opening every artifact
    pub header: Vec<String>,

    /// Emit Dart bindings next to the stylesheets
    pub dart: bool,

    /// Color primitive groups; the first matching group wins
    pub color_groups: Vec<ColorGroup>,

    /// Comment of the group collecting unmatched color keys
    pub other_colors_label: String,
}

const COLOR_FAMILIES: [(&str, &str); 23] = [
    ("Neutral Gray", "neutral-gray"),
    ("Mist Gray", "mist-gray"),
    ("Cool Gray", "cool-gray"),
    ("Blue Gray", "blue-gray"),
    ("Warm Gray", "warm-gray"),
    ("Heritage Red", "heritage-red"),
    ("Active Red", "active-red"),
    ("Red Orange", "red-orange"),
    ("Deep Orange", "deep-orange"),
    ("Orange", "orange"),
    ("Yellow", "yellow"),
    ("Yellow Green", "yellow-green"),
    ("Green", "green"),
    ("Mint Green", "mint-green"),
    ("Teal Green", "teal-green"),
    ("Blue Green", "blue-green"),
    ("Sky Blue", "sky-blue"),
    ("Cobalt Blue", "cobalt-blue"),
    ("Navy", "navy"),
    ("Violet", "violet"),
    ("Purple", "purple"),
    ("Red Brown", "red-brown"),
    ("Brown", "brown"),
];

impl Default for ProjectorConfig {
    fn default() -> Self {
        let mut color_groups = vec![ColorGroup::new("Basic Colors", "^(black|white)$")];
        color_groups.extend(
            COLOR_FAMILIES
                .iter()
                .map(|(label, stem)| ColorGroup::new(&format!("{label} Colors"), &format!("^{stem}-"))),
        );
        color_groups.push(ColorGroup::new("Primary Colors", "^(primary-|secondary-|tertiary-)"));
        for status in ["Success", "Warning", "Danger", "Info"] {
            color_groups.push(ColorGroup::new(
                &format!("{status} Colors"),
                &format!("^{}-", status.to_lowercase()),
            ));
        }

        Self {
            header: Vec::new(),
            dart: true,
            color_groups,
            other_colors_label: "Other Colors".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_groups_keep_catalogue_order() {
        let config = ProjectorConfig::default();
        let labels: Vec<&str> = config.color_groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels.len(), 29);
        assert_eq!(labels[0], "Basic Colors");
        assert_eq!(labels[1], "Neutral Gray Colors");
        assert_eq!(labels[24], "Primary Colors");
        assert_eq!(labels[28], "Info Colors");
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: ProjectorConfig = toml::from_str("dart = false\nheader = [\"Copyright\"]").unwrap();
        assert!(!config.dart);
        assert_eq!(config.header, vec!["Copyright"]);
        assert_eq!(config.color_groups, ProjectorConfig::default().color_groups);
    }
}
