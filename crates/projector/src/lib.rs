//! # Tokens Projector
//!
//! Turns persisted token files into platform artifacts.
//!
//! ```text
//! packages/<pkg>/json/<file>.json ──► css/<file>.css
//!                                 └─► dart/<file_snake>.dart            (primitives)
//!                                     dart/<theme>/color/<cat>/<cat>.dart (semantic colors)
//! ```
//!
//! Output depends only on the input tree and the [`ProjectorConfig`], so
//! generated files diff cleanly in version control.

mod config;
mod css;
mod dart;
mod error;
mod naming;

use std::collections::BTreeSet;

use tokens_model::{FileId, Token, TokenStore, PACKAGES_DIR};

pub use config::{ColorGroup, ProjectorConfig};
pub use css::CssProjector;
pub use error::{ProjectError, Result};
pub use naming::{camel_case, css_var, css_var_for_pointer, pascal_case};

/// One generated file, addressed relative to its package directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub package: String,
    pub rel_path: String,
    pub content: String,
}

impl Artifact {
    pub fn new(package: &str, rel_path: impl Into<String>, content: String) -> Self {
        Self {
            package: package.to_string(),
            rel_path: rel_path.into(),
            content,
        }
    }

    /// `packages/<package>/<rel_path>`
    pub fn repo_rel_path(&self) -> String {
        format!("{PACKAGES_DIR}/{}/{}", self.package, self.rel_path)
    }
}

/// Artifacts of many files plus the files that could not be projected
#[derive(Debug, Default)]
pub struct Projection {
    pub artifacts: Vec<Artifact>,
    pub failures: Vec<(FileId, ProjectError)>,
}

#[derive(Debug)]
pub struct Projector {
    config: ProjectorConfig,
    css: CssProjector,
}

impl Projector {
    pub fn new(config: ProjectorConfig) -> Result<Self> {
        let css = CssProjector::new(&config)?;
        Ok(Self { config, css })
    }

    pub fn config(&self) -> &ProjectorConfig {
        &self.config
    }

    /// Every artifact of one file. `store` resolves semantic references.
    pub fn project(&self, id: &FileId, file: &Token, store: &TokenStore) -> Result<Vec<Artifact>> {
        let mut artifacts = vec![Artifact::new(
            &id.package,
            format!("css/{}.css", id.file),
            self.css.render(id, file, store)?,
        )];
        if self.config.dart {
            artifacts.extend(dart::render(id, file, &self.config.header)?);
        }
        Ok(artifacts)
    }

    /// Project the listed files; a failing file does not stop the others
    pub fn project_files<'a>(
        &self,
        store: &TokenStore,
        ids: impl IntoIterator<Item = &'a FileId>,
    ) -> Projection {
        let mut projection = Projection::default();
        for id in ids {
            let Some(file) = store.get(id) else {
                log::debug!("{id}: not loaded, nothing to project");
                continue;
            };
            match self.project(id, file, store) {
                Ok(artifacts) => {
                    log::debug!("{id}: {} artifact(s)", artifacts.len());
                    projection.artifacts.extend(artifacts);
                }
                Err(err) => {
                    log::warn!("Cannot project {id}: {err}");
                    projection.failures.push((id.clone(), err));
                }
            }
        }
        projection
    }

    /// Project every file, optionally restricted to one package
    pub fn project_store(&self, store: &TokenStore, package: Option<&str>) -> Projection {
        let ids: BTreeSet<FileId> = store
            .files()
            .map(|(id, _)| id)
            .filter(|id| package.map_or(true, |name| id.package == name))
            .collect();
        self.project_files(store, &ids)
    }
}
