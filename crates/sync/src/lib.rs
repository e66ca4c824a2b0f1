//! # Tokens Sync
//!
//! Brings persisted token packages in line with a design-tool export.
//!
//! ## Flow
//!
//! ```text
//! SourceSet ──► SyncConfig::route ──► Differ ──► DiffSet ──► apply ──► TokenStore'
//!                  (skip reasons)       │                     │
//!                                       └─ Resolver           └─ ReferenceIndex + rewrite
//! ```
//!
//! Primitive collections are diffed and applied before everything else so
//! that semantic files are compared and re-referenced against the updated
//! primitives. Every step returns new values; the input store is never
//! mutated.

mod apply;
mod config;
mod diff;
mod differ;
mod engine;
mod error;
mod source;

pub use apply::{apply, sort_primitives, ApplyOutcome};
pub use config::{semantic_color_file, ResolvedRoute, Route, RouteKind, SyncConfig};
pub use diff::{ChangeKind, DiffRecord, DiffReport, DiffSet};
pub use differ::{diff, Differ};
pub use engine::{SyncEngine, SyncOutcome};
pub use error::{Result, SyncError};
pub use source::{source_leaf, SourceSet};
