//! # Tokens CLI
//!
//! Disk-facing side of the `design-tokens` binary. The package tree lives at
//! `<root>/packages/<package>/json/<file>.json`; artifacts are written next to
//! it under `css/` and `dart/`.

pub mod commands;
pub mod config;
pub mod disk;
pub mod report;

pub use commands::{SyncRequest, Workspace};
pub use config::{AppConfig, CONFIG_ENV};
