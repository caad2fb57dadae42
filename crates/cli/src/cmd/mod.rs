mod build;
mod info;
mod package;
mod plan;
mod platform;
mod source;

pub use build::cmd_build;
pub use info::cmd_info;
pub use package::cmd_package;
pub use plan::cmd_plan;
pub use platform::cmd_platform;
pub use source::cmd_source;

use anyhow::{Context, Result};

use dxcpkg_lib::orchestrate::Orchestrator;

use crate::GlobalOpts;

/// Load the recipe and resolve the work directory from the global options.
fn orchestrator(opts: &GlobalOpts) -> Result<Orchestrator> {
  Orchestrator::configure(opts.config.as_deref(), opts.work_dir.clone()).context("Failed to load recipe")
}

fn runtime() -> Result<tokio::runtime::Runtime> {
  tokio::runtime::Runtime::new().context("Failed to create async runtime")
}
