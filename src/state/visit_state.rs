/// Visit label definitions for pages in the crawl graph
use std::fmt;

/// Label attached to a node in the crawl graph
///
/// A page with no node has not been claimed yet; once claimed, a node is
/// never removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisitLabel {
    /// The page has been claimed by exactly one crawl task
    Visited,
}

impl VisitLabel {
    /// Returns the label as a string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Visited => "visited",
        }
    }
}

impl fmt::Display for VisitLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
