//! Implementation of the `dxcpkg package` command.
//!
//! Harvests an already-built tree into the package layout. Useful after a
//! manual rebuild in `<work>/build`.

use anyhow::{Context, Result};

use crate::GlobalOpts;
use crate::TargetArgs;
use crate::output::{print_json, print_stat, print_success, truncate_hash};

pub fn cmd_package(opts: &GlobalOpts, target: &TargetArgs) -> Result<()> {
  let orchestrator = super::orchestrator(opts)?;
  let target = target.to_target();

  let (report, info) = orchestrator
    .package(&target)
    .with_context(|| format!("Packaging failed for {}", target))?;

  if opts.output.is_json() {
    return print_json(&serde_json::json!({
      "harvest": report,
      "package": info,
    }));
  }

  print_success(&format!("Packaged {} file(s)", report.files.len()));
  print_stat("Digest", truncate_hash(report.digest.as_str()));
  print_stat("Package", &report.package_dir.display().to_string());

  if opts.verbose {
    println!();
    for file in &report.files {
      println!("  {}", file.dest.display());
    }
  }

  Ok(())
}
