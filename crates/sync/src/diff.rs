use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use tokens_model::{Domain, FileId, Scalar, Token};
use tokens_protocol::{ChangeCounts, SkippedCollection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Modified,
    Removed,
    Unchanged,
}

impl ChangeKind {
    /// Order in which changes are applied
    pub const APPLY_ORDER: [ChangeKind; 3] = [Self::Removed, Self::Added, Self::Modified];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Modified => "modified",
            Self::Removed => "removed",
            Self::Unchanged => "unchanged",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classified leaf
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffRecord {
    pub kind: ChangeKind,
    pub collection: String,
    #[serde(flatten)]
    pub target: FileId,
    /// Path in the source collection's naming
    pub raw_path: Vec<String>,
    /// Domain root inside the target file (`["semantic", "color"]`)
    pub root: Vec<String>,
    /// Path below `root` in the persisted naming
    pub path: Vec<String>,
    pub domain: Domain,
    /// Local leaf, possibly a reference
    pub before: Option<Token>,
    /// Domain-formatted source literal
    pub after: Option<Scalar>,
}

impl DiffRecord {
    /// `<collection>/<raw path>`
    pub fn key(&self) -> String {
        format!("{}/{}", self.collection, self.raw_path.join("/"))
    }

    /// Path from the file root
    pub fn full_path(&self) -> Vec<String> {
        self.root.iter().chain(&self.path).cloned().collect()
    }
}

/// Classified records keyed by `<collection>/<raw path>`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DiffSet {
    pub added: BTreeMap<String, DiffRecord>,
    pub modified: BTreeMap<String, DiffRecord>,
    pub removed: BTreeMap<String, DiffRecord>,
    pub unchanged: BTreeMap<String, DiffRecord>,
}

impl DiffSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: DiffRecord) {
        let key = record.key();
        self.bucket_mut(record.kind).insert(key, record);
    }

    pub fn bucket(&self, kind: ChangeKind) -> &BTreeMap<String, DiffRecord> {
        match kind {
            ChangeKind::Added => &self.added,
            ChangeKind::Modified => &self.modified,
            ChangeKind::Removed => &self.removed,
            ChangeKind::Unchanged => &self.unchanged,
        }
    }

    fn bucket_mut(&mut self, kind: ChangeKind) -> &mut BTreeMap<String, DiffRecord> {
        match kind {
            ChangeKind::Added => &mut self.added,
            ChangeKind::Modified => &mut self.modified,
            ChangeKind::Removed => &mut self.removed,
            ChangeKind::Unchanged => &mut self.unchanged,
        }
    }

    /// Every change in apply order (removed, added, modified)
    pub fn changes(&self) -> impl Iterator<Item = &DiffRecord> {
        ChangeKind::APPLY_ORDER
            .into_iter()
            .flat_map(move |kind| self.bucket(kind).values())
    }

    pub fn counts(&self) -> ChangeCounts {
        ChangeCounts {
            added: self.added.len(),
            modified: self.modified.len(),
            removed: self.removed.len(),
        }
    }

    /// No added, modified or removed records
    pub fn is_empty(&self) -> bool {
        self.counts().is_empty()
    }

    pub fn extend(&mut self, other: DiffSet) {
        self.added.extend(other.added);
        self.modified.extend(other.modified);
        self.removed.extend(other.removed);
        self.unchanged.extend(other.unchanged);
    }
}

/// Differ output: the classified records plus everything that was skipped
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DiffReport {
    pub diff: DiffSet,
    pub skipped: Vec<SkippedCollection>,
    pub warnings: Vec<String>,
}

impl DiffReport {
    pub fn extend(&mut self, other: DiffReport) {
        self.diff.extend(other.diff);
        self.skipped.extend(other.skipped);
        self.warnings.extend(other.warnings);
    }
}
