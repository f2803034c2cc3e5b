//! # Aug Overlay Library
//!
//! This library provides the core functionality for the `aug` command-line
//! tool: overlaying one directory tree (the "apply" side) onto a base tree
//! (the "src" side) to produce a materialized destination directory, without
//! physically duplicating unchanged content. The destination is built, by
//! preference, out of symbolic links back to the originals, so edits to the
//! sources remain visible in the generated project.
//!
//! ## Quick Example
//!
//! ```no_run
//! use aug::materialize::Materializer;
//! use aug::merge::MergeWalker;
//! use aug::output::{OutputConfig, Report};
//! use std::path::{Path, PathBuf};
//!
//! # fn main() -> aug::error::Result<()> {
//! let walker = MergeWalker::new(
//!     Some(PathBuf::from("template")),
//!     Some(PathBuf::from("overrides")),
//! );
//! let tree = walker.walk()?;
//!
//! let mut report = Report::new(std::io::stdout(), OutputConfig::default());
//! Materializer::new(false).materialize(&tree, Path::new("out"), &mut report)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! - **Stat Collection (`listing`)**: One immutable snapshot per visited
//!   directory, classifying every entry as a regular file, directory, or
//!   symbolic link.
//! - **Ignore Rules (`ignore`)**: Per-origin, append-only glob rulesets
//!   seeded by `.augignore` manifests, filtering listings before they reach
//!   the merge step.
//! - **Overlay Merge (`merge`)**: The recursive walker that decides which
//!   origin wins per name and when a subtree can be referenced as one
//!   opaque unit, bounding the walk to the overlay tree's shape.
//! - **Materialization (`materialize`)**: Realizes the merged tree as
//!   directories, symlinks, and (for origin symlinks) byte copies, with
//!   exclusive-create semantics and a dry-run mode.
//! - **Reporting (`output`)**: The `<origin> --> <dest>[/*]` line stream,
//!   identical between dry and real runs.

pub mod error;
pub mod ignore;
pub mod listing;
pub mod materialize;
pub mod merge;
pub mod output;
