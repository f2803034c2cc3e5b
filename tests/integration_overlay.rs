//! Integration tests for the overlay pipeline
//!
//! These drive the public library API (walker + materializer) over real
//! temporary directory trees, covering the interactions the per-module unit
//! tests don't: nested manifests on both origins, deep merges, and dry-run
//! parity on a composite layout.

#![cfg(unix)]

use std::fs;
use std::path::Path;

use aug::materialize::Materializer;
use aug::merge::{MergeNode, MergeWalker};
use aug::output::{OutputConfig, Report};
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn overlay(src: &Path, apply: &Path, dest: &Path, dry_run: bool) -> String {
    let tree = MergeWalker::new(Some(src.to_path_buf()), Some(apply.to_path_buf()))
        .walk()
        .unwrap();
    let mut report = Report::new(Vec::new(), OutputConfig::without_color());
    Materializer::new(dry_run)
        .materialize(&tree, dest, &mut report)
        .unwrap();
    String::from_utf8(report.into_inner()).unwrap()
}

#[test]
fn test_deep_merge_with_manifests_on_both_origins() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("base");
    let apply = temp.path().join("overlay");
    let dest = temp.path().join("out");

    // Base: a project skeleton with its own ignore manifest.
    write(&src, ".augignore", "*.bak\n");
    write(&src, "README.md", "base readme");
    write(&src, "old.bak", "never materialized");
    write(&src, "src/main.txt", "base main");
    write(&src, "src/lib/core.txt", "base core");

    // Overlay: overrides the readme, adds into src/lib, carries its own
    // nested manifest that must not leak to the base side.
    write(&apply, "README.md", "overlay readme");
    write(&apply, "src/lib/.augignore", "*.tmp\n");
    write(&apply, "src/lib/extra.txt", "overlay extra");
    write(&apply, "src/lib/scratch.tmp", "never materialized");

    let report = overlay(&src, &apply, &dest, false);

    // Overlay wins the shared file.
    assert_eq!(
        fs::read_link(dest.join("README.md")).unwrap(),
        apply.join("README.md")
    );
    // Base manifest filtered its own side.
    assert!(!dest.join("old.bak").exists());
    assert!(!report.contains("old.bak"));
    // src/ exists on both sides, so it recursed: main.txt is base-only and
    // therefore a single link.
    assert!(dest.join("src").is_dir());
    assert_eq!(
        fs::read_link(dest.join("src/main.txt")).unwrap(),
        src.join("src/main.txt")
    );
    // src/lib recursed again; both origins contribute, overlay's nested
    // manifest excluded its own scratch file only.
    assert!(dest.join("src/lib").is_dir());
    assert!(dest.join("src/lib/core.txt").exists());
    assert!(dest.join("src/lib/extra.txt").exists());
    assert!(!dest.join("src/lib/scratch.tmp").exists());
    // Manifests themselves never materialize.
    assert!(!dest.join(".augignore").exists());
    assert!(!dest.join("src/lib/.augignore").exists());
}

#[test]
fn test_manifest_rules_do_not_cross_origins() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("base");
    let apply = temp.path().join("overlay");
    let dest = temp.path().join("out");

    write(&src, "notes.txt", "base notes");
    write(&apply, ".augignore", "notes.txt\n");
    write(&apply, "notes.txt", "overlay notes");

    overlay(&src, &apply, &dest, false);

    // The overlay ignores its own notes.txt, so the base one participates
    // and wins by default.
    assert_eq!(
        fs::read_link(dest.join("notes.txt")).unwrap(),
        src.join("notes.txt")
    );
}

#[test]
fn test_dry_run_parity_on_composite_layout() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("base");
    let apply = temp.path().join("overlay");
    let dest = temp.path().join("out");

    write(&src, "a.txt", "a");
    write(&src, "shared/x.txt", "x");
    write(&src, "shared/inner/deep.txt", "deep");
    write(&apply, "shared/y.txt", "y");
    write(&apply, "extras/tool.sh", "#!/bin/sh");

    let dry = overlay(&src, &apply, &dest, true);
    assert!(!dest.exists());

    let real = overlay(&src, &apply, &dest, false);
    assert_eq!(dry, real);

    // Terminal directories carry the linked-as-unit marker.
    assert!(real.contains(&format!("apply --> {}/*", dest.join("extras").display())));
    assert!(real.contains(&format!("src --> {}/*", dest.join("shared/inner").display())));
}

#[test]
fn test_overlay_symlink_copied_into_merged_directory() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("base");
    let apply = temp.path().join("overlay");
    let dest = temp.path().join("out");

    write(&src, "cfg/defaults.txt", "defaults");
    write(&apply, "cfg/real.txt", "payload");
    std::os::unix::fs::symlink("real.txt", apply.join("cfg/link.txt")).unwrap();

    overlay(&src, &apply, &dest, false);

    // The origin symlink became a plain copied file, not a link.
    let meta = fs::symlink_metadata(dest.join("cfg/link.txt")).unwrap();
    assert!(meta.file_type().is_file());
    assert_eq!(
        fs::read_to_string(dest.join("cfg/link.txt")).unwrap(),
        "payload"
    );
    // Its siblings stayed links.
    assert!(fs::symlink_metadata(dest.join("cfg/real.txt"))
        .unwrap()
        .file_type()
        .is_symlink());
}

#[test]
fn test_merged_tree_shape_matches_overlay_depth() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("base");
    let apply = temp.path().join("overlay");

    // A deep base tree under a name the overlay never touches must stay a
    // single terminal node: the walk is bounded by the overlay's shape.
    write(&src, "vendor/a/b/c/d/e.txt", "deep");
    write(&src, "touched/file.txt", "f");
    write(&apply, "touched/added.txt", "g");

    let tree = MergeWalker::new(Some(src.clone()), Some(apply.clone()))
        .walk()
        .unwrap();

    assert!(matches!(tree["vendor"], MergeNode::Terminal { .. }));
    match &tree["touched"] {
        MergeNode::Intermediate { children } => {
            let names: Vec<_> = children.keys().cloned().collect();
            assert_eq!(names, vec!["added.txt", "file.txt"]);
        }
        _ => panic!("expected intermediate node for touched/"),
    }
}
