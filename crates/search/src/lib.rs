//! # Tokens Search
//!
//! Read-only lookup over a loaded package tree: substring search with fuzzy
//! ranking, exact dotted-path lookup and package listing. Every query runs
//! against the [`TokenQuery`] it was asked of; reloading is explicit.

mod category;
mod error;
mod fuzzy;
mod query;

pub use category::Category;
pub use error::{Result, SearchError};
pub use fuzzy::FuzzyScorer;
pub use query::{SearchOptions, TokenQuery, DEFAULT_LIMIT};
