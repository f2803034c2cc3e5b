//! Apply command implementation
//!
//! Runs the full overlay pipeline:
//! 1. Merge the base and apply trees into a virtual merged tree,
//!    accumulating `.augignore` rules per origin along the way.
//! 2. Materialize the merged tree under the destination root as symlinks
//!    (and copies for origin symlinks), or just report under dry-run.

use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};

/// Arguments for the apply command
#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Base project directory being augmented
    #[arg(short, long, value_name = "DIR")]
    pub base: Option<PathBuf>,

    /// Directory that will augment the base project
    #[arg(short, long, value_name = "DIR")]
    pub apply: Option<PathBuf>,

    /// Path where the augmented version of the project is materialized
    #[arg(short, long, value_name = "DIR")]
    pub dest: PathBuf,

    /// Show what would be done without making changes
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Suppress the summary (report lines still stream)
    #[arg(short, long)]
    pub quiet: bool,
}

/// Execute the apply command
pub fn execute(args: ApplyArgs, color_flag: &str) -> Result<()> {
    use aug::materialize::Materializer;
    use aug::merge::MergeWalker;
    use aug::output::{stdout_report, OutputConfig};
    use std::time::Instant;

    let start_time = Instant::now();

    let base = args
        .base
        .map(|p| absolute_origin(&p, "base"))
        .transpose()?;
    let apply = args
        .apply
        .map(|p| absolute_origin(&p, "apply"))
        .transpose()?;

    if !args.quiet && args.dry_run {
        println!("DRY RUN MODE - No changes will be made");
        println!();
    }

    let tree = MergeWalker::new(base, apply).walk()?;

    let mut report = stdout_report(OutputConfig::from_env_and_flag(color_flag));
    Materializer::new(args.dry_run).materialize(&tree, &args.dest, &mut report)?;

    if !args.quiet {
        let duration = start_time.elapsed();
        println!();
        println!(
            "Augmented {} entries in {:.2}s{}",
            tree.len(),
            duration.as_secs_f64(),
            if args.dry_run { " (dry run)" } else { "" }
        );
        if !args.dry_run {
            println!("Result written to: {}", args.dest.display());
        }
    }

    Ok(())
}

/// Resolve an origin directory to an absolute path.
///
/// Symlinks point at the origin's absolute path, so relative CLI arguments
/// must be resolved before the walk; otherwise links created inside the
/// destination would dangle.
fn absolute_origin(path: &Path, which: &str) -> Result<PathBuf> {
    path.canonicalize()
        .with_context(|| format!("{which} directory not found: {}", path.display()))
}
