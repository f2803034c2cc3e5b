//! # Materializer
//!
//! Walks a merged tree and realizes it under the destination root.
//!
//! - Intermediate nodes become real directories, created before any of
//!   their children.
//! - Terminal resources become symbolic links back to the winning origin
//!   path, except when the origin entry is itself a symbolic link: linking
//!   a symlink verbatim would either dangle (relative target) or alias
//!   through an unintended chain, so its resolved content is copied
//!   byte-for-byte instead, with exclusive-create semantics.
//!
//! Every recursive step is completed (and its errors propagated) before the
//! parent step is considered done, so report lines never interleave and no
//! failure is dropped. Under dry-run the full report is still produced but
//! the filesystem is never touched.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use log::debug;

use crate::error::{Error, Result};
use crate::listing::ResourceKind;
use crate::merge::MergeNode;
use crate::output::Report;

/// Realizes merged trees under a destination root.
#[derive(Debug, Clone, Copy)]
pub struct Materializer {
    dry_run: bool,
}

impl Materializer {
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    /// Materialize the top-level name-to-node mapping under `dest`.
    ///
    /// The destination root itself is created if missing; each entry below
    /// it is written exactly once, in name order.
    pub fn materialize<W: Write>(
        &self,
        tree: &BTreeMap<String, MergeNode>,
        dest: &Path,
        report: &mut Report<W>,
    ) -> Result<()> {
        self.create_dir(dest)?;
        for (name, node) in tree {
            self.materialize_node(node, &dest.join(name), report)?;
        }
        Ok(())
    }

    fn materialize_node<W: Write>(
        &self,
        node: &MergeNode,
        dest: &Path,
        report: &mut Report<W>,
    ) -> Result<()> {
        match node {
            MergeNode::Intermediate { children } => {
                self.create_dir(dest)?;
                for (name, child) in children {
                    self.materialize_node(child, &dest.join(name), report)?;
                }
                Ok(())
            }
            MergeNode::Terminal { stat, path, origin } => {
                report.resource(*origin, dest, stat.is_dir())?;
                if self.dry_run {
                    return Ok(());
                }
                match stat.kind {
                    ResourceKind::SymbolicLink => self.copy_resolved(path, dest),
                    ResourceKind::RegularFile | ResourceKind::Directory => {
                        self.link(path, dest, stat.is_dir())
                    }
                }
            }
        }
    }

    fn create_dir(&self, dest: &Path) -> Result<()> {
        if self.dry_run {
            return Ok(());
        }
        debug!("mkdir {}", dest.display());
        fs::create_dir_all(dest).map_err(|e| Error::from_io(e, dest))
    }

    /// Copy an origin symlink's resolved target to `dest`, failing if the
    /// destination already exists.
    fn copy_resolved(&self, origin: &Path, dest: &Path) -> Result<()> {
        debug!("copy {} -> {}", origin.display(), dest.display());
        // Opening through the link resolves it to the underlying content.
        let mut source = fs::File::open(origin).map_err(|e| Error::from_io(e, origin))?;
        let mut target = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(dest)
            .map_err(|e| Error::from_io(e, dest))?;
        io::copy(&mut source, &mut target).map_err(|e| Error::from_io(e, dest))?;
        Ok(())
    }

    /// Create a symbolic link at `dest` pointing at the origin's absolute
    /// path. The destination inherits live updates to the origin.
    fn link(&self, origin: &Path, dest: &Path, is_dir: bool) -> Result<()> {
        debug!("link {} -> {}", dest.display(), origin.display());
        #[cfg(unix)]
        {
            let _ = is_dir;
            std::os::unix::fs::symlink(origin, dest).map_err(|e| Error::from_io(e, dest))
        }
        #[cfg(windows)]
        {
            let result = if is_dir {
                std::os::windows::fs::symlink_dir(origin, dest)
            } else {
                std::os::windows::fs::symlink_file(origin, dest)
            };
            result.map_err(|e| Error::from_io(e, dest))
        }
    }
}
