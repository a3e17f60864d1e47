//! Concurrent crawl graph
//!
//! Nodes are keyed by page key and stored in discovery order. Each node keeps
//! an append-only list of neighbor keys rather than references, so the
//! structure has no cycles and exports trivially.

use crate::state::VisitLabel;
use crate::GraphError;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A claimed page and the pages discovered from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageNode {
    pub key: String,
    pub label: VisitLabel,
    pub neighbors: Vec<String>,
}

#[derive(Debug, Default)]
struct GraphInner {
    index: HashMap<String, usize>,
    nodes: Vec<PageNode>,
}

/// Thread-safe dedup table and discovery graph
///
/// `try_visit` is the only gate that decides which task fetches a page;
/// `find` is a best-effort pre-filter and may race with concurrent claims.
#[derive(Debug, Default)]
pub struct CrawlGraph {
    inner: RwLock<GraphInner>,
}

impl CrawlGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, GraphInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, GraphInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claims `key`, returning true to exactly one caller per key
    pub fn try_visit(&self, key: &str) -> bool {
        let mut inner = self.write();
        if inner.index.contains_key(key) {
            return false;
        }

        let position = inner.nodes.len();
        inner.nodes.push(PageNode {
            key: key.to_string(),
            label: VisitLabel::Visited,
            neighbors: Vec::new(),
        });
        inner.index.insert(key.to_string(), position);
        true
    }

    /// Returns a snapshot of the node for `key`, if it has been claimed
    pub fn find(&self, key: &str) -> Option<PageNode> {
        let inner = self.read();
        inner.index.get(key).map(|&i| inner.nodes[i].clone())
    }

    /// Returns true if `key` has been claimed
    pub fn contains(&self, key: &str) -> bool {
        self.read().index.contains_key(key)
    }

    /// Records a directed discovery edge `from -> to`
    ///
    /// Both endpoints must already have been claimed.
    pub fn add_edge(&self, from: &str, to: &str) -> Result<(), GraphError> {
        let mut inner = self.write();
        let (Some(&from_idx), true) = (inner.index.get(from), inner.index.contains_key(to)) else {
            return Err(GraphError::InvalidEdge {
                from: from.to_string(),
                to: to.to_string(),
            });
        };

        inner.nodes[from_idx].neighbors.push(to.to_string());
        Ok(())
    }

    /// Returns every node with at least one outgoing edge, in claim order
    pub fn export(&self) -> Vec<(String, Vec<String>)> {
        self.read()
            .nodes
            .iter()
            .filter(|node| !node.neighbors.is_empty())
            .map(|node| (node.key.clone(), node.neighbors.clone()))
            .collect()
    }

    /// Number of claimed pages
    pub fn len(&self) -> usize {
        self.read().nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of recorded edges
    pub fn edge_count(&self) -> usize {
        self.read().nodes.iter().map(|n| n.neighbors.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier};

    #[test]
    fn test_try_visit_claims_once() {
        let graph = CrawlGraph::new();
        assert!(graph.try_visit("a.com/"));
        assert!(!graph.try_visit("a.com/"));
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_concurrent_claims_have_single_winner() {
        const THREADS: usize = 32;

        let graph = Arc::new(CrawlGraph::new());
        let barrier = Arc::new(Barrier::new(THREADS));
        let winners = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let graph = Arc::clone(&graph);
                let barrier = Arc::clone(&barrier);
                let winners = Arc::clone(&winners);
                std::thread::spawn(move || {
                    barrier.wait();
                    if graph.try_visit("a.com/contested") {
                        winners.fetch_add(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(winners.load(Ordering::SeqCst), 1);
        assert_eq!(graph.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_claims_across_tasks() {
        let graph = Arc::new(CrawlGraph::new());
        let mut set = tokio::task::JoinSet::new();

        for _ in 0..100 {
            let graph = Arc::clone(&graph);
            set.spawn(async move { graph.try_visit("a.com/page") });
        }

        let mut wins = 0;
        while let Some(result) = set.join_next().await {
            if result.unwrap() {
                wins += 1;
            }
        }
        assert_eq!(wins, 1);
    }

    #[test]
    fn test_find() {
        let graph = CrawlGraph::new();
        assert!(graph.find("a.com/").is_none());

        graph.try_visit("a.com/");
        let node = graph.find("a.com/").unwrap();
        assert_eq!(node.key, "a.com/");
        assert_eq!(node.label, VisitLabel::Visited);
        assert!(node.neighbors.is_empty());
    }

    #[test]
    fn test_add_edge_requires_both_nodes() {
        let graph = CrawlGraph::new();
        graph.try_visit("a");

        assert_eq!(
            graph.add_edge("a", "b"),
            Err(GraphError::InvalidEdge {
                from: "a".to_string(),
                to: "b".to_string()
            })
        );
        assert!(graph.add_edge("b", "a").is_err());

        graph.try_visit("b");
        assert!(graph.add_edge("a", "b").is_ok());
        assert_eq!(graph.find("a").unwrap().neighbors, vec!["b".to_string()]);
    }

    #[test]
    fn test_export_skips_leaf_nodes() {
        let graph = CrawlGraph::new();
        for key in ["a", "b", "c", "d"] {
            graph.try_visit(key);
        }
        graph.add_edge("a", "b").unwrap();
        graph.add_edge("a", "c").unwrap();
        graph.add_edge("c", "d").unwrap();

        let exported = graph.export();
        assert_eq!(
            exported,
            vec![
                ("a".to_string(), vec!["b".to_string(), "c".to_string()]),
                ("c".to_string(), vec!["d".to_string()]),
            ]
        );
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn test_concurrent_edges_are_not_lost() {
        let graph = Arc::new(CrawlGraph::new());
        graph.try_visit("root");
        for i in 0..64 {
            graph.try_visit(&format!("child{}", i));
        }

        let handles: Vec<_> = (0..64)
            .map(|i| {
                let graph = Arc::clone(&graph);
                std::thread::spawn(move || graph.add_edge("root", &format!("child{}", i)))
            })
            .collect();

        for handle in handles {
            handle.join().unwrap().unwrap();
        }

        assert_eq!(graph.find("root").unwrap().neighbors.len(), 64);
    }
}
