//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `VisitLabel`: the label attached to a claimed page
//! - `CrawlGraph`: concurrent dedup table and discovery graph shared by all crawl tasks

mod graph;
mod visit_state;

// Re-export main types
pub use graph::{CrawlGraph, PageNode};
pub use visit_state::VisitLabel;
