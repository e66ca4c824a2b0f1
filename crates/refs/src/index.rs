use std::collections::HashMap;

use tokens_model::{Domain, FileLayout, Namespace, Pointer, Scalar, Token};

/// Reverse lookup from a canonical literal to the primitive that defines it
#[derive(Debug, Clone)]
pub struct ReferenceIndex {
    domain: Domain,
    entries: HashMap<String, Vec<String>>,
}

impl ReferenceIndex {
    pub fn empty(domain: Domain) -> Self {
        Self {
            domain,
            entries: HashMap::new(),
        }
    }

    pub const fn domain(&self) -> Domain {
        self.domain
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Path (from the primitive file root) of the primitive whose value
    /// equals `value` once both are in canonical form for `path`
    pub fn lookup<S: AsRef<str>>(&self, path: &[S], value: &Scalar) -> Option<&[String]> {
        if matches!(value, Scalar::Bool(_)) {
            return None;
        }
        let key = self.domain.rules().canonical_text(path, value);
        self.entries.get(&key).map(Vec::as_slice)
    }

    fn insert(&mut self, key: String, path: Vec<String>) {
        if let Some(existing) = self.entries.get(&key) {
            log::debug!(
                "Duplicate {} primitive value '{key}': keeping {} over {}",
                self.domain,
                existing.join("/"),
                path.join("/")
            );
            return;
        }
        self.entries.insert(key, path);
    }
}

/// Index every literal leaf under the domain's primitive root of
/// `primitive_file`. The first primitive declaring a value wins.
pub fn build_index(primitive_file: &Token, domain: Domain) -> ReferenceIndex {
    let mut index = ReferenceIndex::empty(domain);
    let root = FileLayout {
        namespace: Namespace::Primitive,
        domain,
    }
    .root();
    let Some(subtree) = primitive_file.get_path(&root) else {
        log::debug!("No {domain} primitives to index");
        return index;
    };

    let rules = domain.rules();
    for (relative, leaf) in subtree.leaves() {
        let Some(value) = leaf.as_literal() else {
            continue;
        };
        if matches!(value, Scalar::Bool(_)) {
            continue;
        }
        let path: Vec<String> = root.iter().cloned().chain(relative).collect();
        index.insert(rules.canonical_text(&path, value), path);
    }
    log::debug!("Indexed {} {domain} primitive values", index.len());
    index
}

/// Pointer text for a primitive path inside the file named by `file_prefix`
pub fn pointer_text(file_prefix: &str, path: &[String]) -> String {
    let Some((package, file)) = file_prefix
        .strip_suffix(".json")
        .and_then(|rest| rest.split_once('/'))
    else {
        return format!("{file_prefix}#/{}", path.join("/"));
    };
    Pointer::new(package, file, path.to_vec()).to_string()
}
