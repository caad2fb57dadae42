#[cfg(unix)]
use std::path::Path;

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn build_unsupported_os_leaves_no_trace() {
  let env = TestEnv::new();
  let work = env.temp.path().join("fresh");

  env
    .dxcpkg_cmd_in(&work)
    .args(["build", "--os", "FreeBSD", "--arch", "x86_64"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("unsupported OS: FreeBSD"));

  assert!(!work.exists());
}

#[test]
fn build_unsupported_arch_fails() {
  let env = TestEnv::new();

  env
    .dxcpkg_cmd()
    .args(["build", "--os", "Linux", "--arch", "x86"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("cannot be built"));
}

/// Stand-in git/cmake/ninja that leave behind what the real tools would.
#[cfg(unix)]
fn install_fake_toolchain(env: &TestEnv) {
  env.install_tool(
    "git",
    r#"for last; do :; done
mkdir -p "$last/include/dxc/Support" "$last/cmake/caches"
echo '// dxcapi' > "$last/include/dxc/dxcapi.h"
echo '// adapter' > "$last/include/dxc/Support/WinAdapter.h"
echo 'notes' > "$last/include/dxc/README.txt"
touch "$last/cmake/caches/PredefinedParams.cmake"
echo "$@" >> "$(dirname "$last")/tools.log""#,
  );
  env.install_tool("cmake", r#"echo "cmake $@" >> ../tools.log"#);
  env.install_tool(
    "ninja",
    r#"mkdir -p lib bin
echo elf > lib/libdxcompiler.so.3.7
ln -sf libdxcompiler.so.3.7 lib/libdxcompiler.so
echo elf > bin/dxc
echo "ninja $@" >> ../tools.log"#,
  );
}

#[test]
#[cfg(unix)]
fn build_linux_with_fake_toolchain() {
  let env = TestEnv::new();
  install_fake_toolchain(&env);

  env
    .dxcpkg_cmd()
    .env("PATH", env.path_with_tools())
    .args(["build", "--os", "Linux", "--arch", "x86_64"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Built dxc 1.7.2308 for x86_64-linux"));

  let package = env.package_path();
  assert!(package.join("include/dxcapi.h").is_file());
  assert!(package.join("include/Support/WinAdapter.h").is_file());
  assert!(!package.join("include/README.txt").exists());
  assert!(package.join("lib/libdxcompiler.so.3.7").is_file());
  assert!(
    std::fs::symlink_metadata(package.join("lib/libdxcompiler.so"))
      .unwrap()
      .file_type()
      .is_symlink()
  );
  assert!(package.join("bin/dxc").is_file());

  let log = std::fs::read_to_string(env.work_path().join("tools.log")).unwrap();
  assert!(log.contains("--depth 1 --recursive --branch v1.7.2308"));
  assert!(log.contains("-DCMAKE_CXX_COMPILER=clang++"));
  assert!(log.contains("ninja -j 4"));
}

#[test]
#[cfg(unix)]
fn build_failure_exits_non_zero_without_package() {
  let env = TestEnv::new();
  install_fake_toolchain(&env);
  env.install_tool("ninja", "echo 'compile error' >&2\nexit 2");

  env
    .dxcpkg_cmd()
    .env("PATH", env.path_with_tools())
    .args(["build", "--os", "Linux", "--arch", "x86_64"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("build failed"));

  assert!(!env.package_path().exists());
  assert!(!env.work_path().join("package.json").exists());
}

#[test]
#[cfg(unix)]
fn failed_clone_is_an_acquisition_error() {
  let env = TestEnv::new();
  env.install_tool("git", "exit 128");

  env
    .dxcpkg_cmd()
    .env("PATH", env.path_with_tools())
    .args(["build", "--os", "Linux", "--arch", "x86_64"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("source acquisition failed"));

  assert!(!env.work_path().join("source").exists());
}

#[test]
#[cfg(unix)]
fn build_with_relative_work_dir() {
  let env = TestEnv::new();
  install_fake_toolchain(&env);

  env
    .dxcpkg_cmd_in(Path::new("work"))
    .current_dir(env.temp.path())
    .env("PATH", env.path_with_tools())
    .args(["build", "--os", "Linux", "--arch", "x86_64"])
    .assert()
    .success();

  let work = env.work_path();
  assert!(work.join("source/include/dxc/dxcapi.h").is_file());
  assert!(!work.join("work").exists(), "checkout must not nest under the work dir");
  assert!(env.package_path().join("bin/dxc").is_file());
}

#[test]
#[cfg(unix)]
fn failed_build_removes_previous_metadata() {
  let env = TestEnv::new();
  env.seed_linux_build();
  env
    .dxcpkg_cmd()
    .args(["package", "--os", "Linux", "--arch", "x86_64"])
    .assert()
    .success();
  assert!(env.work_path().join("package.json").is_file());

  std::fs::remove_dir_all(env.work_path().join("source")).unwrap();
  env.install_tool("git", "exit 128");
  env
    .dxcpkg_cmd()
    .env("PATH", env.path_with_tools())
    .args(["build", "--os", "Linux", "--arch", "x86_64"])
    .assert()
    .failure();

  assert!(!env.work_path().join("package.json").exists());
  env
    .dxcpkg_cmd()
    .arg("info")
    .assert()
    .success()
    .stderr(predicate::str::contains("Not built yet"));
}
