//! Implementation of the `dxcpkg info` command.
//!
//! Prints the metadata of the last package when one exists, otherwise the
//! recipe's platform-independent description.

use std::fs;

use anyhow::{Context, Result};

use dxcpkg_lib::package::PackageInfo;

use crate::GlobalOpts;
use crate::output::{print_json, print_stat, print_success, print_warning};

pub fn cmd_info(opts: &GlobalOpts) -> Result<()> {
  let orchestrator = super::orchestrator(opts)?;
  let metadata_path = orchestrator.layout().metadata_path();

  let (info, packaged_at) = if metadata_path.exists() {
    let info = PackageInfo::read(&metadata_path)
      .with_context(|| format!("Failed to read package metadata: {}", metadata_path.display()))?;
    let packaged_at = fs::metadata(&metadata_path)
      .and_then(|m| m.modified())
      .ok()
      .map(|t| humantime::format_rfc3339_seconds(t).to_string());
    (info, packaged_at)
  } else {
    (PackageInfo::new(orchestrator.recipe()), None)
  };

  if opts.output.is_json() {
    return print_json(&info);
  }

  if packaged_at.is_none() {
    print_warning("Not built yet; showing recipe defaults");
  }

  print_success(&format!("{} {}", info.name, info.version));
  print_stat("Description", &info.description);
  print_stat("License", &info.license);
  print_stat("Homepage", &info.homepage);
  print_stat("Libs", &info.libs.join(", "));
  print_stat("Include dirs", &info.include_dirs.join(", "));
  print_stat("Lib dirs", &info.lib_dirs.join(", "));
  print_stat("Bin dirs", &info.bin_dirs.join(", "));
  if let Some(platform) = &info.platform {
    print_stat("Platform", platform);
  }
  if let Some(build_type) = info.build_type {
    print_stat("Build type", build_type.as_str());
  }
  if let Some(at) = packaged_at {
    print_stat("Packaged", &at);
  }
  print_stat("Work dir", &orchestrator.layout().work_dir().display().to_string());

  Ok(())
}
