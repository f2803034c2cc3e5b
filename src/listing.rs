//! # Resource Stat Collector
//!
//! Reads one directory's entries and resolves per-entry metadata: whether
//! each name is a regular file, a directory, or a symbolic link. This is the
//! pure I/O leaf of the overlay pipeline; everything above it works with the
//! immutable [`DirectoryListing`] snapshots produced here.
//!
//! Classification uses `symlink_metadata`, never following links: a symlink
//! to a directory is a `SymbolicLink`, not a `Directory`, because the
//! materializer treats origin symlinks specially (copy instead of link).
//!
//! Per-entry stat lookups for one directory run concurrently through rayon
//! and are joined before the listing is returned; the first failing lookup
//! fails the whole listing.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::error::{Error, Result};

/// Semantic classification of one directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Directory,
    RegularFile,
    SymbolicLink,
}

/// Metadata for one named entry, enough to repeat the classification later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceStat {
    pub kind: ResourceKind,
}

impl ResourceStat {
    pub fn is_dir(&self) -> bool {
        self.kind == ResourceKind::Directory
    }

    fn from_metadata(meta: &fs::Metadata) -> Self {
        let kind = if meta.file_type().is_symlink() {
            ResourceKind::SymbolicLink
        } else if meta.is_dir() {
            ResourceKind::Directory
        } else {
            ResourceKind::RegularFile
        };
        Self { kind }
    }
}

/// One directory's entries and their stats, immutable after creation.
///
/// `entries` is sorted so the merge walk (and therefore the report stream)
/// is deterministic regardless of readdir order.
#[derive(Debug, Clone)]
pub struct DirectoryListing {
    /// Absolute path of the directory that was listed.
    pub path: PathBuf,
    /// The origin root this directory belongs to.
    pub root: PathBuf,
    /// Unique entry names, sorted.
    pub entries: BTreeSet<String>,
    /// Per-name stats; keys always mirror `entries`.
    pub stats: HashMap<String, ResourceStat>,
}

impl DirectoryListing {
    /// List `path` and stat every entry.
    ///
    /// Fails with [`Error::NotFound`] if the directory does not exist,
    /// [`Error::NotADirectory`] if it is not a directory, and
    /// [`Error::PermissionDenied`] on access failure.
    pub fn read(path: &Path, root: &Path) -> Result<Self> {
        let dir = fs::read_dir(path).map_err(|e| Error::from_io(e, path))?;

        let mut names = Vec::new();
        for entry in dir {
            let entry = entry.map_err(|e| Error::from_io(e, path))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            names.push(name);
        }

        // Fan out the stat calls; the join fails fast on the first error.
        let stats: HashMap<String, ResourceStat> = names
            .par_iter()
            .map(|name| {
                let entry_path = path.join(name);
                let meta = fs::symlink_metadata(&entry_path)
                    .map_err(|e| Error::from_io(e, &entry_path))?;
                Ok((name.clone(), ResourceStat::from_metadata(&meta)))
            })
            .collect::<Result<_>>()?;

        Ok(Self {
            path: path.to_path_buf(),
            root: root.to_path_buf(),
            entries: names.into_iter().collect(),
            stats,
        })
    }

    /// The listed directory's path relative to its origin root, using
    /// forward slashes and a trailing slash (empty for the root itself).
    pub fn relative_dir(&self) -> String {
        relative_dir(&self.path, &self.root)
    }

    /// Root-relative path for one entry, forward-slash separated, with a
    /// trailing slash when the entry is a directory. This is the form
    /// ignore patterns match against.
    pub fn relative_entry(&self, name: &str) -> String {
        let mut rel = format!("{}{}", self.relative_dir(), name);
        if self.stats.get(name).is_some_and(ResourceStat::is_dir) {
            rel.push('/');
        }
        rel
    }

    /// Drop an entry (and its stat) from the listing.
    pub fn remove(&mut self, name: &str) {
        self.entries.remove(name);
        self.stats.remove(name);
    }
}

fn relative_dir(path: &Path, root: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let mut out = String::new();
    for component in rel.components() {
        out.push_str(&component.as_os_str().to_string_lossy());
        out.push('/');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_read_classifies_entries() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("file.txt"), "content").unwrap();
        fs::create_dir(temp.path().join("sub")).unwrap();
        #[cfg(unix)]
        std::os::unix::fs::symlink(temp.path().join("file.txt"), temp.path().join("link"))
            .unwrap();

        let listing = DirectoryListing::read(temp.path(), temp.path()).unwrap();

        assert_eq!(
            listing.stats["file.txt"].kind,
            ResourceKind::RegularFile
        );
        assert_eq!(listing.stats["sub"].kind, ResourceKind::Directory);
        #[cfg(unix)]
        assert_eq!(listing.stats["link"].kind, ResourceKind::SymbolicLink);
    }

    #[test]
    #[cfg(unix)]
    fn test_symlink_to_directory_is_symlink() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("real")).unwrap();
        std::os::unix::fs::symlink(temp.path().join("real"), temp.path().join("alias"))
            .unwrap();

        let listing = DirectoryListing::read(temp.path(), temp.path()).unwrap();
        assert_eq!(listing.stats["alias"].kind, ResourceKind::SymbolicLink);
    }

    #[test]
    fn test_read_missing_directory() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope");
        let err = DirectoryListing::read(&missing, temp.path()).unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn test_read_file_as_directory() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("plain.txt");
        fs::write(&file, "x").unwrap();
        let err = DirectoryListing::read(&file, temp.path()).unwrap_err();
        assert!(matches!(err, Error::NotADirectory { .. }));
    }

    #[test]
    fn test_entries_sorted() {
        let temp = TempDir::new().unwrap();
        for name in ["zebra", "apple", "mango"] {
            fs::write(temp.path().join(name), "").unwrap();
        }

        let listing = DirectoryListing::read(temp.path(), temp.path()).unwrap();
        let names: Vec<_> = listing.entries.iter().cloned().collect();
        assert_eq!(names, vec!["apple", "mango", "zebra"]);
    }

    #[test]
    fn test_relative_entry_paths() {
        let temp = TempDir::new().unwrap();
        let sub = temp.path().join("sub");
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("x.txt"), "").unwrap();
        fs::create_dir(sub.join("nested")).unwrap();

        let listing = DirectoryListing::read(&sub, temp.path()).unwrap();
        assert_eq!(listing.relative_dir(), "sub/");
        assert_eq!(listing.relative_entry("x.txt"), "sub/x.txt");
        assert_eq!(listing.relative_entry("nested"), "sub/nested/");
    }

    #[test]
    fn test_root_relative_dir_is_empty() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a"), "").unwrap();
        let listing = DirectoryListing::read(temp.path(), temp.path()).unwrap();
        assert_eq!(listing.relative_dir(), "");
        assert_eq!(listing.relative_entry("a"), "a");
    }

    #[test]
    fn test_remove_drops_entry_and_stat() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("keep"), "").unwrap();
        fs::write(temp.path().join("drop"), "").unwrap();

        let mut listing = DirectoryListing::read(temp.path(), temp.path()).unwrap();
        listing.remove("drop");
        assert!(!listing.entries.contains("drop"));
        assert!(!listing.stats.contains_key("drop"));
        assert!(listing.entries.contains("keep"));
    }
}
