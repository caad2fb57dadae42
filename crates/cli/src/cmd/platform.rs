//! Implementation of the `dxcpkg platform` command.

use anyhow::Result;

use dxcpkg_lib::platform::platform_triple;
use dxcpkg_lib::target::Target;

use crate::GlobalOpts;
use crate::output::{print_info, print_json, print_stat, print_warning};

pub fn cmd_platform(opts: &GlobalOpts) -> Result<()> {
  let host = Target::host();
  let resolved = host.resolve();

  if opts.output.is_json() {
    let json = match &resolved {
      Ok(target) => serde_json::json!({
        "platform": target.platform.triple(),
        "compiler": target.compiler.as_str(),
        "buildable": true,
      }),
      Err(e) => serde_json::json!({
        "platform": platform_triple(),
        "os": host.os,
        "arch": host.arch,
        "buildable": false,
        "reason": e.to_string(),
      }),
    };
    return print_json(&json);
  }

  match resolved {
    Ok(target) => {
      print_info(&format!("Platform: {}", target.platform));
      print_stat("OS", target.os().as_str());
      print_stat("Arch", target.arch().as_str());
      print_stat("Compiler", target.compiler.as_str());
    }
    Err(e) => {
      print_info(&format!("Platform: {}-{}", host.arch, host.os));
      print_warning(&format!("Cannot build here: {}", e));
    }
  }

  Ok(())
}
