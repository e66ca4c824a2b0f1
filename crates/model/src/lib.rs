//! # Tokens Model
//!
//! The shared vocabulary of the design-token pipeline.
//!
//! ## Shape
//!
//! ```text
//! TokenStore
//!     └── package (core-tokens, web-tokens, mobile-tokens, webos-tokens)
//!           └── file (color-primitive, color-semantic-dark, ...)
//!                 └── Token
//!                       ├─ Literal(Scalar)     "#000000", "4px", 700
//!                       ├─ Reference           {"ref": "core-tokens/color-primitive.json#/primitive/color/black"}
//!                       └─ Node(map)           nested containers
//! ```
//!
//! Every component matches on the `Token` tag; nothing sniffs JSON shapes
//! after parsing. Formatting rules that vary by category live in one
//! [`DomainRules`] record per [`Domain`].

mod domain;
mod error;
pub mod json;
mod pointer;
mod store;
mod token;

pub use domain::{loosely_equal, strip_px, Domain, DomainRules, FileLayout, Namespace};
pub use error::{ModelError, Result};
pub use pointer::{escape_segment, Pointer, JSON_DIR, MIN_PATH_SEGMENTS};
pub use store::{FileId, TokenStore, PACKAGES_DIR};
pub use token::{RefStyle, Reference, Scalar, Token, TokenMap};
