use anyhow::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq, JsonSchema)]
pub struct ChangeCounts {
    pub added: usize,
    pub modified: usize,
    pub removed: usize,
}

impl ChangeCounts {
    pub const fn total(&self) -> usize {
        self.added + self.modified + self.removed
    }

    pub const fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Consumed by the pull-request tooling
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq, JsonSchema)]
pub struct ChangeManifest {
    pub updated_files: Vec<String>,
    pub changes_applied: ChangeCounts,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Component,
    Excluded,
    /// Base collection handled through its mode collections
    Covered,
    Unmapped,
    MissingLocalFile,
    Structural,
}

impl SkipReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Component => "component",
            Self::Excluded => "excluded",
            Self::Covered => "covered",
            Self::Unmapped => "unmapped",
            Self::MissingLocalFile => "missing_local_file",
            Self::Structural => "structural",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct SkippedCollection {
    pub collection: String,
    pub reason: SkipReason,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct SkippedRecord {
    pub key: String,
    pub reason: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct IoFailure {
    pub path: String,
    pub message: String,
}

/// End-of-run summary; printed for every sync, including no-op runs
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq, JsonSchema)]
pub struct SyncSummary {
    pub dry_run: bool,
    pub changes: ChangeCounts,
    pub unchanged: usize,
    pub updated_files: Vec<String>,
    #[serde(default)]
    pub skipped_collections: Vec<SkippedCollection>,
    #[serde(default)]
    pub skipped_records: Vec<SkippedRecord>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub io_errors: Vec<IoFailure>,
}

impl SyncSummary {
    pub fn has_io_errors(&self) -> bool {
        !self.io_errors.is_empty()
    }

    pub fn manifest(&self) -> ChangeManifest {
        ChangeManifest {
            updated_files: self.updated_files.clone(),
            changes_applied: self.changes,
        }
    }
}

/// Result of regenerating artifacts outside a sync
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq, JsonSchema)]
pub struct GenerateSummary {
    pub written: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub io_errors: Vec<IoFailure>,
}

impl GenerateSummary {
    pub fn has_io_errors(&self) -> bool {
        !self.io_errors.is_empty()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct TokenHit {
    /// Dotted path from the file root (`semantic.color.surface.default`)
    pub path: String,
    /// Resolved literal, or the raw pointer when resolution failed
    pub value: String,
    pub package: String,
    pub file: String,
    pub domain: String,
    pub css_var: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct SearchResponse {
    pub query: String,
    pub total: usize,
    pub hits: Vec<TokenHit>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct PackageListing {
    pub name: String,
    pub files: Vec<String>,
}

pub fn serialize_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(Into::into)
}

/// Two-space pretty JSON with a trailing newline
pub fn serialize_json_pretty<T: Serialize>(value: &T) -> Result<String> {
    let mut out = serde_json::to_string_pretty(value)?;
    out.push('\n');
    Ok(out)
}
