use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tokens_projector::Projector;
use tokens_protocol::{
    serialize_json_pretty, GenerateSummary, IoFailure, PackageListing, SearchResponse, SyncSummary, TokenHit,
};
use tokens_search::{Category, SearchOptions, TokenQuery};
use tokens_sync::{sort_primitives, SourceSet, SyncEngine};

use crate::config::AppConfig;
use crate::disk::{artifact_jobs, json_jobs, load_store, write_files, LoadedStore};

/// Repository root plus the configuration every command runs with
#[derive(Debug, Clone)]
pub struct Workspace {
    pub root: PathBuf,
    pub config: AppConfig,
}

#[derive(Debug, Clone, Default)]
pub struct SyncRequest {
    /// Design-tool export (JSON object of collections)
    pub source: PathBuf,
    pub dry_run: bool,
    /// Full classified diff, written even on a dry run
    pub diff_out: Option<PathBuf>,
    /// Change manifest for the pull-request tooling
    pub manifest_out: Option<PathBuf>,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>, config: AppConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    async fn load(&self) -> Result<LoadedStore> {
        load_store(&self.root).await
    }

    fn ensure_package(loaded: &LoadedStore, package: Option<&str>) -> Result<()> {
        match package {
            Some(name) if !loaded.store.contains_package(name) => bail!("Unknown package '{name}'"),
            _ => Ok(()),
        }
    }

    /// Diff the export against the package tree, write touched JSON and
    /// regenerate artifacts of the touched files.
    pub async fn sync(&self, request: &SyncRequest) -> Result<SyncSummary> {
        let text = tokio::fs::read_to_string(&request.source)
            .await
            .with_context(|| format!("Failed to read source export {}", request.source.display()))?;
        let source = SourceSet::from_json(&text)
            .with_context(|| format!("Invalid source export {}", request.source.display()))?;
        let engine = SyncEngine::new(self.config.sync.clone())?;
        let projector = Projector::new(self.config.projector.clone())?;

        let loaded = self.load().await?;
        let outcome = engine.run(&source, &loaded.store);
        let mut summary = outcome.summary(request.dry_run);
        let mut warnings = loaded.warnings;
        warnings.append(&mut summary.warnings);
        summary.warnings = warnings;
        summary.io_errors.extend(loaded.io_errors);

        if request.dry_run {
            log::info!("Dry run, nothing written");
        } else if !outcome.touched.is_empty() {
            let mut jobs = json_jobs(&outcome.store, &outcome.touched);
            let projection = projector.project_files(&outcome.store, &outcome.touched);
            summary
                .warnings
                .extend(projection.failures.iter().map(|(id, err)| format!("{id}: {err}")));
            jobs.extend(artifact_jobs(projection.artifacts));
            let report = write_files(&self.root, jobs).await;
            log::info!("Wrote {} file(s)", report.written.len());
            summary.io_errors.extend(report.failures);
        }

        if let Some(path) = &request.diff_out {
            let content = serialize_json_pretty(&outcome.report)?;
            write_output(path, content, &mut summary.io_errors).await;
        }
        if let Some(path) = &request.manifest_out {
            let content = serialize_json_pretty(&summary.manifest())?;
            write_output(path, content, &mut summary.io_errors).await;
        }
        Ok(summary)
    }

    /// Regenerate artifacts for every file, or for one package
    pub async fn generate(&self, package: Option<&str>) -> Result<GenerateSummary> {
        let projector = Projector::new(self.config.projector.clone())?;
        let loaded = self.load().await?;
        Self::ensure_package(&loaded, package)?;

        let projection = projector.project_store(&loaded.store, package);
        let mut summary = GenerateSummary {
            warnings: loaded.warnings,
            io_errors: loaded.io_errors,
            ..GenerateSummary::default()
        };
        summary
            .warnings
            .extend(projection.failures.iter().map(|(id, err)| format!("{id}: {err}")));
        let report = write_files(&self.root, artifact_jobs(projection.artifacts)).await;
        summary.written = report.written;
        summary.io_errors.extend(report.failures);
        Ok(summary)
    }

    /// Rewrite primitive files whose keys are out of canonical order
    pub async fn sort(&self, package: Option<&str>) -> Result<SyncSummary> {
        let loaded = self.load().await?;
        Self::ensure_package(&loaded, package)?;

        let outcome = sort_primitives(&loaded.store, package);
        let report = write_files(&self.root, json_jobs(&outcome.store, &outcome.touched)).await;
        let mut io_errors = loaded.io_errors;
        io_errors.extend(report.failures);
        Ok(SyncSummary {
            updated_files: report.written,
            warnings: loaded.warnings,
            io_errors,
            ..SyncSummary::default()
        })
    }

    pub async fn query(&self) -> Result<TokenQuery> {
        Ok(TokenQuery::new(self.load().await?.store))
    }

    pub async fn search(&self, query: &str, domain: Option<&str>, limit: usize) -> Result<SearchResponse> {
        let category = domain.map(str::parse::<Category>).transpose()?;
        let options = SearchOptions { category, limit };
        Ok(self.query().await?.search(query, &options)?)
    }

    pub async fn lookup(&self, path: &str) -> Result<TokenHit> {
        Ok(self.query().await?.lookup(path)?)
    }

    pub async fn packages(&self) -> Result<Vec<PackageListing>> {
        Ok(self.query().await?.packages())
    }
}

async fn write_output(path: &Path, content: String, io_errors: &mut Vec<IoFailure>) {
    if let Err(err) = tokio::fs::write(path, content).await {
        log::warn!("Cannot write {}: {err}", path.display());
        io_errors.push(IoFailure {
            path: path.display().to_string(),
            message: err.to_string(),
        });
    }
}
