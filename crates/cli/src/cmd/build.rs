//! Implementation of the `dxcpkg build` command.
//!
//! Fetches the pinned sources, runs the platform build and harvests the
//! package for one target.

use anyhow::{Context, Result};
use tracing::info;

use dxcpkg_lib::exec::ProcessRunner;

use crate::GlobalOpts;
use crate::TargetArgs;
use crate::output::{format_duration, print_command, print_json, print_stat, print_success, truncate_hash};

pub fn cmd_build(opts: &GlobalOpts, target: &TargetArgs) -> Result<()> {
  let orchestrator = super::orchestrator(opts)?;
  let target = target.to_target();
  info!(work_dir = %orchestrator.layout().work_dir().display(), %target, "building");

  // Child output goes straight to the terminal in verbose text mode.
  let runner = ProcessRunner::new(opts.verbose && !opts.output.is_json());
  let rt = super::runtime()?;
  let report = rt
    .block_on(orchestrator.build(&target, &runner))
    .with_context(|| format!("Build failed for {}", target))?;

  if opts.output.is_json() {
    return print_json(&report);
  }

  println!();
  print_success(&format!(
    "Built {} {} for {}",
    report.package.name, report.package.version, report.platform
  ));
  print_stat("Compiler", &report.compiler);
  print_stat("Build type", &report.build_type);
  print_stat("Source", if report.source_reused { "reused" } else { "cloned" });
  print_stat("Files", &report.harvest.files.len().to_string());
  print_stat("Digest", truncate_hash(report.harvest.digest.as_str()));
  print_stat("Package", &report.harvest.package_dir.display().to_string());
  print_stat("Metadata", &report.metadata_path.display().to_string());
  print_stat("Elapsed", &format_duration(report.elapsed));

  if opts.verbose {
    println!();
    println!("Commands:");
    for command in &report.commands {
      print_command(command);
    }
  }

  Ok(())
}
