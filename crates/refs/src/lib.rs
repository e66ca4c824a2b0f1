//! # Tokens Refs
//!
//! Everything that deals with `{"ref": "..."}` leaves.
//!
//! ```text
//! pointer ──► Resolver ──► literal          (follows chains, bounded)
//! primitives ──► build_index ──► ReferenceIndex
//! semantic literals + ReferenceIndex ──► rewrite ──► references
//! ```
//!
//! All operations are pure over a [`tokens_model::TokenStore`] snapshot.

mod error;
mod index;
mod resolver;
mod rewrite;

pub use error::{ResolveError, Result};
pub use index::{build_index, pointer_text, ReferenceIndex};
pub use resolver::{resolve, Resolver, DEFAULT_MAX_CHAIN};
pub use rewrite::{rewrite, Rewritten};
