//! URL handling module for Archive-Scout
//!
//! This module provides root URL normalization, visited-set keys, link
//! resolution against a listing base, display-name decoding and
//! allow-list matching for external links.

mod matcher;
mod normalize;
mod resolve;

// Re-export main functions
pub use matcher::{matches_allowed, matches_wildcard};
pub use normalize::{normalize_root_url, visit_key};
pub use resolve::{display_name, is_within, resolve_directory, resolve_file};
