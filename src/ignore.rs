//! # Ignore Rule Engine
//!
//! Maintains, per origin side, a growing set of glob exclusion patterns
//! seeded by optional per-directory `.augignore` manifests, and filters
//! directory listings before they reach the merge step.
//!
//! ## Manifest format
//!
//! One glob pattern per line, UTF-8. Blank lines and lines whose first
//! non-whitespace character is `#` are skipped. Patterns are anchored to
//! the declaring directory: a line `*.tmp` inside `sub/` becomes the rule
//! `sub/*.tmp`. Matching uses literal path separators, so `*` stays within
//! one component and `**` crosses components, `.gitignore`-style.
//!
//! ## Propagation
//!
//! A ruleset is a plain value: it is cloned into each deeper recursive call
//! on its own origin side and accumulates rules along that path only. The
//! two origins never share or see each other's rules, and rules never flow
//! back up to the caller. Rules are never removed.

use std::fs;
use std::path::Path;

use glob::{MatchOptions, Pattern};
use log::warn;

use crate::error::{Error, Result};
use crate::listing::DirectoryListing;

/// Fixed name of the per-directory ignore manifest.
pub const MANIFEST_NAME: &str = ".augignore";

/// An ordered, append-only set of root-anchored exclusion patterns for one
/// origin side.
#[derive(Debug, Clone, Default)]
pub struct IgnoreRuleSet {
    patterns: Vec<Pattern>,
}

impl IgnoreRuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of accumulated rules.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Append the rules declared by one manifest.
    ///
    /// `relative_dir` is the declaring directory's root-relative path with a
    /// trailing slash (empty for the root), so each line lands anchored to
    /// the directory that declared it. Lines that fail to compile as globs
    /// contribute nothing beyond a warning; an unreadable manifest is fatal.
    pub fn load_manifest(&mut self, manifest_path: &Path, relative_dir: &str) -> Result<()> {
        let text = fs::read_to_string(manifest_path).map_err(|e| match e.kind() {
            std::io::ErrorKind::InvalidData => Error::Manifest {
                path: manifest_path.to_path_buf(),
                message: e.to_string(),
            },
            _ => Error::from_io(e, manifest_path),
        })?;

        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let anchored = format!("{relative_dir}{trimmed}");
            match Pattern::new(&anchored) {
                Ok(pattern) => self.patterns.push(pattern),
                Err(e) => warn!(
                    "skipping malformed pattern {:?} in {}: {}",
                    trimmed,
                    manifest_path.display(),
                    e
                ),
            }
        }

        Ok(())
    }

    /// Test a root-relative path (trailing slash for directories) against
    /// the accumulated rules.
    pub fn is_ignored(&self, relative_path: &str) -> bool {
        const OPTIONS: MatchOptions = MatchOptions {
            case_sensitive: true,
            // `*` must not cross path components; `**` still does.
            require_literal_separator: true,
            require_literal_leading_dot: false,
        };

        self.patterns
            .iter()
            .any(|p| p.matches_with(relative_path, OPTIONS))
    }

    /// Fold a directory's manifest (if any) into this ruleset, then strip
    /// ignored entries from the listing.
    ///
    /// The manifest is merged *before* filtering, so a directory's own
    /// manifest can exclude its own siblings. The manifest entry itself is
    /// removed so it is never materialized.
    pub fn apply_to(&mut self, listing: &mut DirectoryListing) -> Result<()> {
        if listing.entries.contains(MANIFEST_NAME) {
            let manifest_path = listing.path.join(MANIFEST_NAME);
            self.load_manifest(&manifest_path, &listing.relative_dir())?;
            listing.remove(MANIFEST_NAME);
        }

        let ignored: Vec<String> = listing
            .entries
            .iter()
            .filter(|name| self.is_ignored(&listing.relative_entry(name)))
            .cloned()
            .collect();
        for name in &ignored {
            listing.remove(name);
        }

        Ok(())
    }
}
