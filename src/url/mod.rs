//! URL handling module for Site-Harvest
//!
//! This module provides URL normalization, scope checking, and the mapping
//! from page URLs to output file paths. Everything here is pure and free of
//! I/O, so it can be shared between the dispatcher and tests.

mod filename;
mod normalize;
mod scope;

// Re-export main functions
pub use filename::url_to_filename;
pub use normalize::normalize_url;
pub use scope::{in_scope, is_http_url};
