use std::collections::BTreeSet;

use tokens_model::{FileId, Token, TokenStore};
use tokens_protocol::{SkippedRecord, SyncSummary};

use crate::apply::{apply, ApplyOutcome};
use crate::config::{ResolvedRoute, SyncConfig};
use crate::diff::DiffReport;
use crate::differ::{rejected_report, Differ};
use crate::error::Result;
use crate::source::SourceSet;

/// Result of one sync run over an in-memory package tree
#[derive(Debug, Clone, PartialEq)]
pub struct SyncOutcome {
    pub store: TokenStore,
    pub report: DiffReport,
    pub touched: BTreeSet<FileId>,
    pub skipped_records: Vec<SkippedRecord>,
}

impl SyncOutcome {
    /// Repository-relative paths of the JSON files that changed
    pub fn updated_files(&self) -> Vec<String> {
        self.touched.iter().map(FileId::repo_rel_path).collect()
    }

    pub fn summary(&self, dry_run: bool) -> SyncSummary {
        SyncSummary {
            dry_run,
            changes: self.report.diff.counts(),
            unchanged: self.report.diff.unchanged.len(),
            updated_files: self.updated_files(),
            skipped_collections: self.report.skipped.clone(),
            skipped_records: self.skipped_records.clone(),
            warnings: self.report.warnings.clone(),
            io_errors: Vec::new(),
        }
    }
}

/// Diff and merge driver for a validated [`SyncConfig`]
#[derive(Debug, Clone)]
pub struct SyncEngine {
    config: SyncConfig,
}

impl SyncEngine {
    pub fn new(config: SyncConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Classify without applying
    pub fn diff(&self, source: &SourceSet, store: &TokenStore) -> DiffReport {
        Differ::new(&self.config, store).diff(source)
    }

    /// Diff and apply in two passes: primitive collections first, then the
    /// rest against the updated primitives, so semantic leaves compare
    /// against the values they will actually resolve to.
    pub fn run(&self, source: &SourceSet, store: &TokenStore) -> SyncOutcome {
        let mut report = rejected_report(source);
        let mut primitives = Vec::new();
        let mut others = Vec::new();
        for (name, collection) in source.collections() {
            match self.config.route(name) {
                Ok(route) if route.kind.is_primitive() => primitives.push((route, collection)),
                Ok(route) => others.push((route, collection)),
                Err(skipped) => {
                    log::info!("Skipping collection {name} ({:?})", skipped.reason);
                    report.skipped.push(skipped);
                }
            }
        }

        let mut applied = ApplyOutcome {
            store: store.clone(),
            ..ApplyOutcome::default()
        };
        for batch in [primitives, others] {
            let pass = self.diff_routes(&batch, &applied.store);
            let outcome = apply(&pass.diff, &applied.store, &self.config);
            applied.absorb(outcome);
            report.extend(pass);
        }

        let counts = report.diff.counts();
        log::info!(
            "Sync: {} added, {} modified, {} removed across {} file(s)",
            counts.added,
            counts.modified,
            counts.removed,
            applied.touched.len()
        );
        SyncOutcome {
            store: applied.store,
            report,
            touched: applied.touched,
            skipped_records: applied.skipped,
        }
    }

    fn diff_routes(&self, routes: &[(ResolvedRoute, &Token)], store: &TokenStore) -> DiffReport {
        let differ = Differ::new(&self.config, store);
        let mut report = DiffReport::default();
        for (route, collection) in routes {
            report.extend(differ.diff_route(route, collection));
        }
        report
    }
}
