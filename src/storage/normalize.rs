//! Post-crawl directory normalization
//!
//! A page saved as `segment/index.html` that has no child pages is collapsed
//! into a plain file named `segment`.

use crate::storage::INDEX_FILE;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Normalizes every allow-listed domain directory present under `root`
///
/// Returns the number of directories collapsed.
pub fn normalize_save_root<'a, I>(root: &Path, domains: I) -> io::Result<usize>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut collapsed = 0;
    for domain in domains {
        let dir = root.join(domain);
        if dir.is_dir() {
            collapsed += normalize_domain_dir(&dir)?;
        }
    }
    Ok(collapsed)
}

/// Normalizes the tree under one domain directory
///
/// The domain directory itself is never collapsed; each of its descendants is
/// checked depth-first. A directory holding exactly one entry, a file named
/// `index.html`, becomes a file with that content. Any other directory is
/// left in place and its subdirectories are visited.
pub fn normalize_domain_dir(dir: &Path) -> io::Result<usize> {
    let mut collapsed = 0;
    for subdir in list_dir(dir)?.subdirs {
        collapsed += normalize_dir(&subdir)?;
    }
    Ok(collapsed)
}

fn normalize_dir(dir: &Path) -> io::Result<usize> {
    let listing = list_dir(dir)?;

    if listing.subdirs.is_empty() && listing.files.len() == 1 && listing.files[0] == INDEX_FILE {
        collapse(dir)?;
        return Ok(1);
    }

    let mut collapsed = 0;
    for subdir in listing.subdirs {
        collapsed += normalize_dir(&subdir)?;
    }
    Ok(collapsed)
}

/// Replaces `dir` with a file holding the bytes of `dir/index.html`
fn collapse(dir: &Path) -> io::Result<()> {
    let bytes = fs::read(dir.join(INDEX_FILE))?;
    fs::remove_dir_all(dir)?;
    fs::write(dir, bytes)?;
    tracing::debug!("Collapsed {}", dir.display());
    Ok(())
}

struct Listing {
    subdirs: Vec<PathBuf>,
    files: Vec<String>,
}

fn list_dir(dir: &Path) -> io::Result<Listing> {
    let mut listing = Listing {
        subdirs: Vec::new(),
        files: Vec::new(),
    };

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            listing.subdirs.push(entry.path());
        } else {
            listing
                .files
                .push(entry.file_name().to_string_lossy().into_owned());
        }
    }

    listing.subdirs.sort();
    Ok(listing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &[u8]) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_collapses_leaf_page() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.com/index.html", b"home");
        write(dir.path(), "a.com/foo/index.html", b"foo page");

        let collapsed = normalize_domain_dir(&dir.path().join("a.com")).unwrap();

        assert_eq!(collapsed, 1);
        let foo = dir.path().join("a.com/foo");
        assert!(foo.is_file());
        assert_eq!(fs::read(foo).unwrap(), b"foo page");
    }

    #[test]
    fn test_domain_dir_is_never_collapsed() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.com/index.html", b"home");

        normalize_domain_dir(&dir.path().join("a.com")).unwrap();

        assert!(dir.path().join("a.com/index.html").is_file());
    }

    #[test]
    fn test_directory_with_children_is_kept_and_descended() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.com/docs/index.html", b"docs");
        write(dir.path(), "a.com/docs/intro/index.html", b"intro");

        let collapsed = normalize_domain_dir(&dir.path().join("a.com")).unwrap();

        assert_eq!(collapsed, 1);
        assert!(dir.path().join("a.com/docs").is_dir());
        assert!(dir.path().join("a.com/docs/index.html").is_file());
        assert_eq!(fs::read(dir.path().join("a.com/docs/intro")).unwrap(), b"intro");
    }

    #[test]
    fn test_directory_with_other_files_is_kept() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.com/blog/index.html", b"blog");
        write(dir.path(), "a.com/blog/feed.xml", b"<rss/>");

        let collapsed = normalize_domain_dir(&dir.path().join("a.com")).unwrap();

        assert_eq!(collapsed, 0);
        assert!(dir.path().join("a.com/blog/index.html").is_file());
    }

    #[test]
    fn test_single_non_index_file_is_kept() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.com/img/logo.png", b"png");

        normalize_domain_dir(&dir.path().join("a.com")).unwrap();

        assert!(dir.path().join("a.com/img/logo.png").is_file());
    }

    #[test]
    fn test_normalize_save_root_skips_missing_domains() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.com/foo/index.html", b"foo");

        let collapsed = normalize_save_root(dir.path(), ["a.com", "b.com"]).unwrap();

        assert_eq!(collapsed, 1);
        assert!(!dir.path().join("b.com").exists());
    }
}
