//! Implementation of the `dxcpkg source` command.

use anyhow::{Context, Result};

use dxcpkg_lib::exec::ProcessRunner;

use crate::GlobalOpts;
use crate::output::{print_json, print_stat, print_success};

pub fn cmd_source(opts: &GlobalOpts) -> Result<()> {
  let orchestrator = super::orchestrator(opts)?;
  let source = orchestrator.source_ref();

  let runner = ProcessRunner::new(opts.verbose && !opts.output.is_json());
  let rt = super::runtime()?;
  let reused = rt
    .block_on(orchestrator.fetch(&runner))
    .with_context(|| format!("Failed to fetch {} at {}", source.url, source.tag))?;

  if opts.output.is_json() {
    return print_json(&serde_json::json!({
      "url": source.url,
      "tag": source.tag,
      "checkout": source.checkout,
      "reused": reused,
    }));
  }

  if reused {
    print_success(&format!("Sources already at {}", source.tag));
  } else {
    print_success(&format!("Fetched {}", source.tag));
  }
  print_stat("Checkout", &source.checkout.display().to_string());

  Ok(())
}
