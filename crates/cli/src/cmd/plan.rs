//! Implementation of the `dxcpkg plan` command.
//!
//! Resolves the target and prints every command a build would run, plus the
//! artifact manifest, without touching the work directory.

use anyhow::{Context, Result};

use crate::GlobalOpts;
use crate::TargetArgs;
use crate::output::{print_command, print_info, print_json, print_stat};

pub fn cmd_plan(opts: &GlobalOpts, target: &TargetArgs) -> Result<()> {
  let orchestrator = super::orchestrator(opts)?;
  let target = target.to_target();
  let plan = orchestrator
    .plan(&target)
    .with_context(|| format!("Cannot plan a build for {}", target))?;

  let commands: Vec<String> = plan.invocations().map(|i| i.command_line()).collect();

  if opts.output.is_json() {
    let rules: Vec<_> = plan
      .manifest
      .rules
      .iter()
      .map(|rule| {
        serde_json::json!({
          "pattern": rule.pattern.as_str(),
          "root": rule.root.to_string(),
          "dest": rule.dest.as_str(),
          "keep_path": rule.keep_path,
        })
      })
      .collect();
    return print_json(&serde_json::json!({
      "platform": plan.target.platform.triple(),
      "compiler": plan.target.compiler.as_str(),
      "build_type": plan.target.build_type.as_str(),
      "work_dir": orchestrator.layout().work_dir(),
      "clone": plan.clone.is_some(),
      "commands": commands,
      "artifacts": rules,
    }));
  }

  print_info(&format!("Plan for {}", plan.target.platform));
  print_stat("Compiler", plan.target.compiler.as_str());
  print_stat("Build type", plan.target.build_type.as_str());
  print_stat("Work dir", &orchestrator.layout().work_dir().display().to_string());
  if plan.clone.is_none() {
    print_stat("Source", "existing checkout will be reused");
  }

  println!();
  println!("Commands:");
  for command in &commands {
    print_command(command);
  }

  println!();
  println!("Artifacts:");
  for rule in &plan.manifest.rules {
    println!("  {}/{} -> {}/", rule.root, rule.pattern.as_str(), rule.dest);
  }

  Ok(())
}
