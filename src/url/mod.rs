//! URL handling module for Sumi-Mirror
//!
//! This module provides the crawl gate (scheme and domain allow-list) and
//! the page key used to deduplicate visits.

mod gate;
mod key;

pub use gate::{GateRejection, UriGate};
pub use key::page_key;
