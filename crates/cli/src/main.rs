mod cmd;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use dxcpkg_lib::target::Target;

use crate::output::OutputFormat;

/// dxcpkg - build and package the DirectX Shader Compiler
#[derive(Parser)]
#[command(name = "dxcpkg")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Work directory holding source/, build/ and package/ [default: $DXCPKG_WORK_DIR or the cache dir]
  #[arg(long, global = true)]
  work_dir: Option<PathBuf>,

  /// Recipe file overriding the built-in DXC recipe
  #[arg(short, long, global = true)]
  config: Option<PathBuf>,

  /// Output format
  #[arg(short, long, global = true, value_enum, default_value = "text")]
  output: OutputFormat,

  #[command(subcommand)]
  command: Commands,
}

/// Target identity. Every setting defaults to the host.
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
  /// Target operating system (Windows, Linux, Macos)
  #[arg(long)]
  os: Option<String>,

  /// Target architecture (x86_64, armv8, x86)
  #[arg(long)]
  arch: Option<String>,

  /// Compiler identity; informational only
  #[arg(long)]
  compiler: Option<String>,

  /// Build type (Release or Debug)
  #[arg(long, default_value = "Release")]
  build_type: String,
}

impl TargetArgs {
  pub fn to_target(&self) -> Target {
    let host = Target::host();
    let mut target = Target::new(
      self.os.as_deref().unwrap_or(&host.os),
      self.arch.as_deref().unwrap_or(&host.arch),
    )
    .with_build_type(&self.build_type);
    if let Some(compiler) = &self.compiler {
      target = target.with_compiler(compiler);
    }
    target
  }
}

/// Settings every subcommand shares.
pub struct GlobalOpts {
  pub verbose: bool,
  pub work_dir: Option<PathBuf>,
  pub config: Option<PathBuf>,
  pub output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
  /// Fetch, build and package DXC for a target
  Build {
    #[command(flatten)]
    target: TargetArgs,
  },

  /// Fetch the pinned DXC sources without building
  Source,

  /// Show the commands a build would run (dry-run)
  Plan {
    #[command(flatten)]
    target: TargetArgs,
  },

  /// Harvest artifacts from an existing build directory
  Package {
    #[command(flatten)]
    target: TargetArgs,
  },

  /// Show package metadata
  Info,

  /// Show the detected host target
  Platform,
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "info" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let opts = GlobalOpts {
    verbose: cli.verbose,
    work_dir: cli.work_dir,
    config: cli.config,
    output: cli.output,
  };

  match cli.command {
    Commands::Build { target } => cmd::cmd_build(&opts, &target),
    Commands::Source => cmd::cmd_source(&opts),
    Commands::Plan { target } => cmd::cmd_plan(&opts, &target),
    Commands::Package { target } => cmd::cmd_package(&opts, &target),
    Commands::Info => cmd::cmd_info(&opts),
    Commands::Platform => cmd::cmd_platform(&opts),
  }
}
