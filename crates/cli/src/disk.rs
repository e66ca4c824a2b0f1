//! Package tree I/O: concurrent loading and per-file writes.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use tokio::task::JoinSet;
use tokens_model::json::{parse_token_file, to_canonical_json};
use tokens_model::{FileId, TokenStore, JSON_DIR, PACKAGES_DIR};
use tokens_projector::Artifact;
use tokens_protocol::IoFailure;
use walkdir::WalkDir;

/// A loaded package tree plus every file that could not be loaded
#[derive(Debug, Default)]
pub struct LoadedStore {
    pub store: TokenStore,
    /// Files that were read but could not be parsed
    pub warnings: Vec<String>,
    pub io_errors: Vec<IoFailure>,
}

enum Loaded {
    File(FileId, tokens_model::Token),
    Invalid(String),
    Unreadable(IoFailure),
}

fn failure(path: &Path, err: impl std::fmt::Display) -> IoFailure {
    IoFailure {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

/// `<packages>/<package>/json/<file>.json` → id
fn file_id(packages_dir: &Path, path: &Path) -> Option<FileId> {
    let rel = path.strip_prefix(packages_dir).ok()?;
    let mut parts = rel.iter().map(|part| part.to_str());
    let package = parts.next()??;
    let dir = parts.next()??;
    let file = parts.next()??.strip_suffix(".json")?;
    (dir == JSON_DIR && parts.next().is_none()).then(|| FileId::new(package, file))
}

/// Read every token file under `<root>/packages` concurrently.
///
/// A file that cannot be read or parsed is reported and left out; its
/// package is still registered.
pub async fn load_store(root: &Path) -> Result<LoadedStore> {
    let packages_dir = root.join(PACKAGES_DIR);
    if !packages_dir.is_dir() {
        bail!("No {PACKAGES_DIR}/ directory under {}", root.display());
    }

    let mut loaded = LoadedStore::default();
    let mut tasks = JoinSet::new();
    for entry in WalkDir::new(&packages_dir)
        .min_depth(1)
        .max_depth(3)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let path = err.path().map_or_else(|| packages_dir.clone(), Path::to_path_buf);
                log::warn!("Cannot walk {}: {err}", path.display());
                loaded.io_errors.push(failure(&path, err));
                continue;
            }
        };
        if entry.depth() == 1 && entry.file_type().is_dir() {
            loaded.store.ensure_package(entry.file_name().to_string_lossy());
            continue;
        }
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(id) = file_id(&packages_dir, entry.path()) else {
            continue;
        };
        let path = entry.into_path();
        tasks.spawn(async move {
            match tokio::fs::read_to_string(&path).await {
                Ok(text) => match parse_token_file(&text) {
                    Ok(token) => Loaded::File(id, token),
                    Err(err) => Loaded::Invalid(format!("{}: {err}", path.display())),
                },
                Err(err) => Loaded::Unreadable(failure(&path, err)),
            }
        });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Loaded::File(id, token)) => {
                log::debug!("Loaded {id}");
                loaded.store.insert_file(id, token);
            }
            Ok(Loaded::Invalid(message)) => {
                log::warn!("Skipping {message}");
                loaded.warnings.push(message);
            }
            Ok(Loaded::Unreadable(io)) => {
                log::warn!("Cannot read {}: {}", io.path, io.message);
                loaded.io_errors.push(io);
            }
            Err(err) => loaded.io_errors.push(failure(&packages_dir, err)),
        }
    }
    loaded.warnings.sort();
    log::info!(
        "Loaded {} token file(s) from {}",
        loaded.store.file_count(),
        packages_dir.display()
    );
    Ok(loaded)
}

/// Outcome of a batch of independent writes
#[derive(Debug, Default, PartialEq, Eq)]
pub struct WriteReport {
    /// Repository-relative paths, sorted
    pub written: Vec<String>,
    pub failures: Vec<IoFailure>,
}

/// Write each `(repo-relative path, content)` pair under `root`; one failing
/// write does not stop the others
pub async fn write_files(root: &Path, files: Vec<(String, String)>) -> WriteReport {
    let mut tasks = JoinSet::new();
    for (rel, content) in files {
        let path: PathBuf = root.join(&rel);
        tasks.spawn(async move {
            let result = write_one(&path, content).await;
            (rel, result)
        });
    }

    let mut report = WriteReport::default();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((rel, Ok(()))) => report.written.push(rel),
            Ok((rel, Err(err))) => report.failures.push(failure(Path::new(&rel), err)),
            Err(err) => report.failures.push(failure(root, err)),
        }
    }
    for io in &report.failures {
        log::warn!("Cannot write {}: {}", io.path, io.message);
    }
    report.written.sort();
    report
}

async fn write_one(path: &Path, content: String) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, content).await
}

/// Canonical JSON of the given files as write jobs
pub fn json_jobs<'a>(store: &TokenStore, ids: impl IntoIterator<Item = &'a FileId>) -> Vec<(String, String)> {
    ids.into_iter()
        .filter_map(|id| Some((id.repo_rel_path(), to_canonical_json(store.get(id)?))))
        .collect()
}

pub fn artifact_jobs(artifacts: Vec<Artifact>) -> Vec<(String, String)> {
    artifacts
        .into_iter()
        .map(|artifact| (artifact.repo_rel_path(), artifact.content))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn write(root: &Path, rel: &str, text: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }

    #[test]
    fn only_json_dir_files_are_tokens() {
        let packages = Path::new("/repo/packages");
        assert_eq!(
            file_id(packages, Path::new("/repo/packages/core-tokens/json/spacing-primitive.json")),
            Some(FileId::new("core-tokens", "spacing-primitive"))
        );
        assert_eq!(file_id(packages, Path::new("/repo/packages/core-tokens/css/a.json")), None);
        assert_eq!(file_id(packages, Path::new("/repo/packages/core-tokens/json/a.css")), None);
    }

    #[tokio::test]
    async fn broken_files_are_reported_and_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "packages/core-tokens/json/spacing-primitive.json", r#"{"primitive": {"spacing-4": "4px"}}"#);
        write(root, "packages/core-tokens/json/radius-primitive.json", "{not json");
        write(root, "packages/core-tokens/css/spacing-primitive.css", ":root {}");
        fs::create_dir_all(root.join("packages/empty-tokens/json")).unwrap();

        let loaded = load_store(root).await.unwrap();
        assert_eq!(loaded.store.file_count(), 1);
        assert!(loaded.store.file("core-tokens", "spacing-primitive").is_some());
        assert!(loaded.store.contains_package("empty-tokens"));
        assert_eq!(loaded.warnings.len(), 1);
        assert!(loaded.warnings[0].contains("radius-primitive.json"));
        assert!(loaded.io_errors.is_empty());
    }

    #[tokio::test]
    async fn missing_packages_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_store(dir.path()).await.is_err());
    }

    #[tokio::test]
    async fn writes_create_directories_and_report_per_file() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "blocker", "file in the way");

        let report = write_files(
            root,
            vec![
                ("packages/web-tokens/css/a.css".to_string(), "a".to_string()),
                ("blocker/b.css".to_string(), "b".to_string()),
            ],
        )
        .await;
        assert_eq!(report.written, vec!["packages/web-tokens/css/a.css"]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].path, "blocker/b.css");
        assert_eq!(fs::read_to_string(root.join("packages/web-tokens/css/a.css")).unwrap(), "a");
    }
}
