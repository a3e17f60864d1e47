//! Storage module for persisting mirrored content
//!
//! This module handles all file-system operations for the crawler, including:
//! - Deriving a file path from a page's final URL and content type
//! - Writing page bytes under the save root
//! - Collapsing childless `segment/index.html` directories after the crawl

mod content;
mod normalize;

pub use content::{derive_path, ContentStore, INDEX_FILE};
pub use normalize::{normalize_domain_dir, normalize_save_root};
