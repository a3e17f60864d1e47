//! Graphviz sitemap export

use crate::state::CrawlGraph;
use std::fmt::Write as _;
use std::io;
use std::path::{Path, PathBuf};

/// Name of the sitemap file written under the save root
pub const SITEMAP_FILE: &str = "sitemap.dot";

/// Renders the crawl graph as a DOT digraph
///
/// Each node with outgoing edges produces one line of the form
/// `"key" -> {"n1" "n2"}`, in the order nodes were claimed. Nodes without
/// outgoing edges produce no line.
///
/// # Example
///
/// ```
/// use sumi_mirror::state::CrawlGraph;
/// use sumi_mirror::output::render_sitemap;
///
/// let graph = CrawlGraph::new();
/// graph.try_visit("a.com/");
/// graph.try_visit("a.com/b");
/// graph.add_edge("a.com/", "a.com/b").unwrap();
///
/// let dot = render_sitemap(&graph);
/// assert!(dot.contains(r#""a.com/" -> {"a.com/b"}"#));
/// ```
pub fn render_sitemap(graph: &CrawlGraph) -> String {
    let mut out = String::from("digraph sitemap {\n");

    for (key, neighbors) in graph.export() {
        let targets = neighbors
            .iter()
            .map(|n| quote(n))
            .collect::<Vec<_>>()
            .join(" ");
        // Writing to a String cannot fail
        let _ = writeln!(out, "    {} -> {{{}}}", quote(&key), targets);
    }

    out.push_str("}\n");
    out
}

/// Writes `sitemap.dot` under `root`, returning its path
pub async fn write_sitemap(graph: &CrawlGraph, root: &Path) -> io::Result<PathBuf> {
    tokio::fs::create_dir_all(root).await?;
    let path = root.join(SITEMAP_FILE);
    tokio::fs::write(&path, render_sitemap(graph)).await?;
    tracing::info!("Sitemap written to {}", path.display());
    Ok(path)
}

/// Quotes a node id for DOT
fn quote(id: &str) -> String {
    format!("\"{}\"", id.replace('\\', "\\\\").replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn edge_lines(dot: &str) -> Vec<String> {
        dot.lines()
            .map(str::trim)
            .filter(|l| l.contains("->"))
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_fan_out_line() {
        let graph = CrawlGraph::new();
        for key in ["a", "b", "c"] {
            graph.try_visit(key);
        }
        graph.add_edge("a", "b").unwrap();
        graph.add_edge("a", "c").unwrap();

        let dot = render_sitemap(&graph);
        assert_eq!(edge_lines(&dot), vec![r#""a" -> {"b" "c"}"#.to_string()]);
    }

    #[test]
    fn test_empty_graph_has_no_edge_lines() {
        let graph = CrawlGraph::new();
        graph.try_visit("a.com/");

        let dot = render_sitemap(&graph);
        assert!(edge_lines(&dot).is_empty());
        assert!(dot.starts_with("digraph sitemap {"));
        assert!(dot.trim_end().ends_with('}'));
    }

    #[test]
    fn test_lines_follow_claim_order() {
        let graph = CrawlGraph::new();
        for key in ["root", "x", "y"] {
            graph.try_visit(key);
        }
        graph.add_edge("x", "y").unwrap();
        graph.add_edge("root", "x").unwrap();

        let lines = edge_lines(&render_sitemap(&graph));
        assert_eq!(lines[0], r#""root" -> {"x"}"#);
        assert_eq!(lines[1], r#""x" -> {"y"}"#);
    }

    #[test]
    fn test_quotes_are_escaped() {
        assert_eq!(quote(r#"a.com/"q""#), r#""a.com/\"q\"""#);
    }

    #[tokio::test]
    async fn test_write_sitemap() {
        let dir = TempDir::new().unwrap();
        let graph = CrawlGraph::new();
        graph.try_visit("a");

        let path = write_sitemap(&graph, dir.path()).await.unwrap();

        assert_eq!(path, dir.path().join(SITEMAP_FILE));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "digraph sitemap {\n}\n");
    }
}
