//! Human-readable rendering of command results.

use std::fmt::Write as _;

use tokens_protocol::{GenerateSummary, IoFailure, PackageListing, SearchResponse, SyncSummary, TokenHit};

fn section(out: &mut String, title: &str, lines: impl IntoIterator<Item = String>) {
    let mut lines = lines.into_iter().peekable();
    if lines.peek().is_none() {
        return;
    }
    let _ = writeln!(out, "{title}:");
    for line in lines {
        let _ = writeln!(out, "  {line}");
    }
}

fn io_lines(errors: &[IoFailure]) -> impl Iterator<Item = String> + '_ {
    errors.iter().map(|io| format!("{}: {}", io.path, io.message))
}

pub fn sync_summary(title: &str, summary: &SyncSummary) -> String {
    let mut out = String::new();
    let changes = summary.changes;
    let _ = writeln!(
        out,
        "{title}{}: {} added, {} modified, {} removed, {} unchanged",
        if summary.dry_run { " (dry run)" } else { "" },
        changes.added,
        changes.modified,
        changes.removed,
        summary.unchanged
    );
    section(&mut out, "Updated files", summary.updated_files.iter().cloned());
    section(
        &mut out,
        "Skipped collections",
        summary.skipped_collections.iter().map(|skipped| match &skipped.detail {
            Some(detail) => format!("{} ({}: {detail})", skipped.collection, skipped.reason.as_str()),
            None => format!("{} ({})", skipped.collection, skipped.reason.as_str()),
        }),
    );
    section(
        &mut out,
        "Skipped records",
        summary
            .skipped_records
            .iter()
            .map(|record| format!("{}: {}", record.key, record.reason)),
    );
    section(&mut out, "Warnings", summary.warnings.iter().cloned());
    section(&mut out, "I/O errors", io_lines(&summary.io_errors));
    out
}

pub fn generate_summary(summary: &GenerateSummary) -> String {
    let mut out = format!("Generated {} artifact(s)\n", summary.written.len());
    section(&mut out, "Warnings", summary.warnings.iter().cloned());
    section(&mut out, "I/O errors", io_lines(&summary.io_errors));
    out
}

fn hit_line(hit: &TokenHit) -> String {
    let mut line = format!("{} = {}  [{}/{}, {}]  {}", hit.path, hit.value, hit.package, hit.file, hit.domain, hit.css_var);
    if let Some(reference) = &hit.reference {
        let _ = write!(line, "\n     -> {reference}");
    }
    line
}

pub fn search_response(response: &SearchResponse) -> String {
    let mut out = String::new();
    for (i, hit) in response.hits.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, hit_line(hit));
    }
    let _ = writeln!(
        out,
        "{} of {} match(es) for '{}'",
        response.hits.len(),
        response.total,
        response.query
    );
    out
}

pub fn token_hit(hit: &TokenHit) -> String {
    format!("{}\n", hit_line(hit))
}

pub fn package_listing(packages: &[PackageListing]) -> String {
    let mut out = String::new();
    for package in packages {
        let _ = writeln!(out, "{} ({} file(s))", package.name, package.files.len());
        for file in &package.files {
            let _ = writeln!(out, "  {file}");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tokens_protocol::{ChangeCounts, SkipReason, SkippedCollection};

    #[test]
    fn sync_summary_lists_only_non_empty_sections() {
        let summary = SyncSummary {
            dry_run: true,
            changes: ChangeCounts {
                added: 1,
                modified: 0,
                removed: 2,
            },
            unchanged: 7,
            skipped_collections: vec![SkippedCollection {
                collection: "lg.web.button.component".to_string(),
                reason: SkipReason::Component,
                detail: None,
            }],
            ..SyncSummary::default()
        };
        assert_eq!(
            sync_summary("Sync complete", &summary),
            "Sync complete (dry run): 1 added, 0 modified, 2 removed, 7 unchanged\n\
             Skipped collections:\n  lg.web.button.component (component)\n"
        );
    }

    #[test]
    fn packages_are_listed_with_files() {
        let listing = vec![PackageListing {
            name: "core-tokens".to_string(),
            files: vec!["color-primitive".to_string()],
        }];
        assert_eq!(package_listing(&listing), "core-tokens (1 file(s))\n  color-primitive\n");
    }
}
