//! # Overlay Merge Walker
//!
//! The recursive algorithm at the heart of `aug`. Given a pair of origin
//! directories (base and overlay), it produces a merged virtual tree that
//! records, name by name, which origin wins and whether recursion continues.
//!
//! ## Termination rules
//!
//! For each name present in either side's filtered listing, the overlay
//! wins whenever it lists the name at all. The node is terminal unless
//! *both* sides carry a same-named directory:
//!
//! 1. Base-only content is terminal: there is nothing on the overlay side
//!    to merge into it, so the whole subtree is referenced as one unit.
//! 2. A non-directory from the overlay is terminal.
//! 3. An overlay directory with no same-named base directory is terminal.
//! 4. Otherwise both sides have the directory: recurse and wrap the result
//!    as an intermediate node.
//!
//! The short-circuit bounds the walk's depth to the overlay tree's actual
//! shape rather than the potentially much larger base tree's shape.
//!
//! ## Ignore state
//!
//! Each origin side threads its own [`IgnoreRuleSet`] down its own
//! recursive path as a cloned value. Sibling subtrees are merged in
//! parallel; cloning keeps every branch's rules isolated from its siblings
//! and from the other origin.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::error::Result;
use crate::ignore::IgnoreRuleSet;
use crate::listing::{DirectoryListing, ResourceStat};

/// Which origin a terminal resource was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Src,
    Apply,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Src => "src",
            Origin::Apply => "apply",
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One node of the merged virtual tree.
#[derive(Debug, Clone)]
pub enum MergeNode {
    /// An opaque subtree to materialize as one unit.
    Terminal {
        stat: ResourceStat,
        /// Absolute path of the winning origin entry.
        path: PathBuf,
        origin: Origin,
    },
    /// Both origins contributed; children are themselves merge results.
    Intermediate {
        children: BTreeMap<String, MergeNode>,
    },
}

/// What to do for one name once origin selection has run.
enum Step {
    Leaf(MergeNode),
    Recurse { src_dir: PathBuf, apply_dir: PathBuf },
}

/// Walks a base/overlay pair of origin roots into a merged tree.
#[derive(Debug)]
pub struct MergeWalker {
    src_root: Option<PathBuf>,
    apply_root: Option<PathBuf>,
}

impl MergeWalker {
    /// `None` for either root means that origin contributes nothing.
    pub fn new(src_root: Option<PathBuf>, apply_root: Option<PathBuf>) -> Self {
        Self {
            src_root,
            apply_root,
        }
    }

    /// Merge both roots into the top-level name-to-node mapping.
    pub fn walk(&self) -> Result<BTreeMap<String, MergeNode>> {
        self.merge(
            self.src_root.as_deref(),
            self.apply_root.as_deref(),
            IgnoreRuleSet::new(),
            IgnoreRuleSet::new(),
        )
    }

    fn merge(
        &self,
        src_dir: Option<&Path>,
        apply_dir: Option<&Path>,
        src_rules: IgnoreRuleSet,
        apply_rules: IgnoreRuleSet,
    ) -> Result<BTreeMap<String, MergeNode>> {
        let src = self.side_listing(src_dir, self.src_root.as_deref(), src_rules)?;
        let apply = self.side_listing(apply_dir, self.apply_root.as_deref(), apply_rules)?;

        // Resolve each name in the union of both filtered listings to
        // either a terminal node or a recursion into the directory pair.
        let mut steps: Vec<(String, Step)> = Vec::new();

        if let Some((apply_listing, _)) = &apply {
            for name in &apply_listing.entries {
                let stat = apply_listing.stats[name];
                let path = apply_listing.path.join(name);
                let src_stat = src
                    .as_ref()
                    .and_then(|(l, _)| l.entries.contains(name).then(|| l.stats[name]));

                let step = match (&src, src_stat) {
                    // Both sides carry the directory: merge the pair.
                    (Some((src_listing, _)), Some(s)) if stat.is_dir() && s.is_dir() => {
                        Step::Recurse {
                            src_dir: src_listing.path.join(name),
                            apply_dir: path,
                        }
                    }
                    // Plain overlay file/symlink, or an overlay directory
                    // with nothing mergeable on the base side. Either way
                    // the overlay subtree is used as-is.
                    _ => Step::Leaf(MergeNode::Terminal {
                        stat,
                        path,
                        origin: Origin::Apply,
                    }),
                };
                steps.push((name.clone(), step));
            }
        }

        if let Some((src_listing, _)) = &src {
            let shadowed =
                |name: &str| apply.as_ref().is_some_and(|(l, _)| l.entries.contains(name));
            for name in src_listing.entries.iter().filter(|n| !shadowed(n.as_str())) {
                // Base-only content is never walked further; there is
                // nothing on the overlay side to merge into it.
                steps.push((
                    name.clone(),
                    Step::Leaf(MergeNode::Terminal {
                        stat: src_listing.stats[name],
                        path: src_listing.path.join(name),
                        origin: Origin::Src,
                    }),
                ));
            }
        }

        // Sibling subtrees are independent; recurse in parallel. Each
        // branch gets its own clone of the rulesets.
        steps
            .into_par_iter()
            .map(|(name, step)| {
                let node = match step {
                    Step::Leaf(node) => node,
                    Step::Recurse { src_dir, apply_dir } => {
                        let src_rules = src.as_ref().map(|(_, r)| r.clone()).unwrap_or_default();
                        let apply_rules =
                            apply.as_ref().map(|(_, r)| r.clone()).unwrap_or_default();
                        MergeNode::Intermediate {
                            children: self.merge(
                                Some(&src_dir),
                                Some(&apply_dir),
                                src_rules,
                                apply_rules,
                            )?,
                        }
                    }
                };
                Ok((name, node))
            })
            .collect()
    }

    /// Read one side's listing, fold in its manifest, and filter it.
    ///
    /// Returns the filtered listing together with the (possibly grown)
    /// ruleset so deeper recursion on this side sees the new rules.
    fn side_listing(
        &self,
        dir: Option<&Path>,
        root: Option<&Path>,
        mut rules: IgnoreRuleSet,
    ) -> Result<Option<(DirectoryListing, IgnoreRuleSet)>> {
        let (dir, root) = match (dir, root) {
            (Some(dir), Some(root)) => (dir, root),
            _ => return Ok(None),
        };
        let mut listing = DirectoryListing::read(dir, root)?;
        rules.apply_to(&mut listing)?;
        Ok(Some((listing, rules)))
    }
}
