//! Input tree discovery
//!
//! Iterative depth-first walk (walkdir keeps its own stack, so deep trees
//! never grow the call stack). Entries are produced lazily; sibling order is
//! whatever the filesystem returns.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::paths;

/// One item found while walking the input tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveredEntry {
    /// A file whose extension matches the source filter
    File(PathBuf),
    /// A directory or entry that could not be read
    Unreadable { path: PathBuf, error: String },
}

impl DiscoveredEntry {
    pub fn path(&self) -> &Path {
        match self {
            DiscoveredEntry::File(path) => path,
            DiscoveredEntry::Unreadable { path, .. } => path,
        }
    }
}

/// Lazily walk `root` yielding files with the given extension
pub fn discover<'a>(
    root: &'a Path,
    extension: &'a str,
) -> impl Iterator<Item = DiscoveredEntry> + 'a {
    WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(move |entry| match entry {
            Ok(entry) => {
                let is_match =
                    entry.file_type().is_file() && paths::has_extension(entry.path(), extension);
                is_match.then(|| DiscoveredEntry::File(entry.into_path()))
            }
            Err(e) => {
                let path = e
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root.to_path_buf());
                Some(DiscoveredEntry::Unreadable {
                    path,
                    error: e.to_string(),
                })
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_discover_recurses_and_filters() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        touch(&root.join("top.dds"));
        touch(&root.join("a/mid.DDS"));
        touch(&root.join("a/b/c/deep.dds"));
        touch(&root.join("a/readme.txt"));
        touch(&root.join("a/b/notes.dds.bak"));
        std::fs::create_dir_all(root.join("empty.dds")).unwrap();

        let found: BTreeSet<_> = discover(root, "dds")
            .map(|e| match e {
                DiscoveredEntry::File(p) => p.strip_prefix(root).unwrap().to_path_buf(),
                other => panic!("unexpected {:?}", other),
            })
            .collect();

        let expected: BTreeSet<_> = ["top.dds", "a/mid.DDS", "a/b/c/deep.dds"]
            .iter()
            .map(PathBuf::from)
            .collect();
        assert_eq!(found, expected);
    }

    #[test]
    fn test_discover_handles_very_deep_tree() {
        let temp = tempfile::tempdir().unwrap();
        let mut dir = temp.path().to_path_buf();
        for i in 0..64 {
            dir.push(format!("d{}", i));
        }
        touch(&dir.join("leaf.dds"));

        let found: Vec<_> = discover(temp.path(), "dds").collect();
        assert_eq!(found, vec![DiscoveredEntry::File(dir.join("leaf.dds"))]);
    }

    #[test]
    fn test_discover_missing_root_reports_unreadable() {
        let temp = tempfile::tempdir().unwrap();
        let missing = temp.path().join("gone");
        let found: Vec<_> = discover(&missing, "dds").collect();
        assert_eq!(found.len(), 1);
        assert!(matches!(found[0], DiscoveredEntry::Unreadable { .. }));
        assert_eq!(found[0].path(), missing.as_path());
    }
}
