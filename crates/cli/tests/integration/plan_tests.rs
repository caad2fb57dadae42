use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn plan_linux_lists_clone_configure_and_build() {
  let env = TestEnv::new();

  env
    .dxcpkg_cmd()
    .args(["plan", "--os", "Linux", "--arch", "x86_64"])
    .assert()
    .success()
    .stdout(predicate::str::contains("git clone --depth 1 --recursive --branch v1.7.2308"))
    .stdout(predicate::str::contains("-DCMAKE_C_COMPILER=clang"))
    .stdout(predicate::str::contains("ninja -j 4"));
}

#[test]
fn plan_windows_uses_hct_scripts() {
  let env = TestEnv::new();

  env
    .dxcpkg_cmd()
    .args(["plan", "--os", "Windows", "--arch", "x86_64"])
    .assert()
    .success()
    .stdout(predicate::str::contains("hctstart.cmd"))
    .stdout(predicate::str::contains("-dxc-cmake-system-version 10.0.20348.0"))
    .stdout(predicate::str::contains("Release/bin/dxc.exe"));
}

#[test]
fn plan_macos_x86_64_pins_architecture() {
  let env = TestEnv::new();

  env
    .dxcpkg_cmd()
    .args(["plan", "--os", "Macos", "--arch", "x86_64"])
    .assert()
    .success()
    .stdout(predicate::str::contains("-DCMAKE_OSX_ARCHITECTURES=x86_64"))
    .stdout(predicate::str::contains("CMAKE_C_COMPILER").not());
}

#[test]
fn plan_json_output_is_valid() {
  let env = TestEnv::new();

  let output = env
    .dxcpkg_cmd()
    .args(["plan", "--os", "Linux", "--arch", "armv8", "-o", "json"])
    .output()
    .unwrap();

  assert!(output.status.success());
  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(json["platform"], "aarch64-linux");
  assert_eq!(json["clone"], true);
  assert_eq!(json["commands"].as_array().unwrap().len(), 3);
}

#[test]
fn plan_honors_recipe_jobs() {
  let env = TestEnv::new();
  env.write_file("recipe.toml", "jobs = 16\n");

  env
    .dxcpkg_cmd()
    .args(["plan", "--os", "Linux", "--arch", "x86_64", "--config"])
    .arg(env.temp.path().join("recipe.toml"))
    .assert()
    .success()
    .stdout(predicate::str::contains("ninja -j 16"));
}

#[test]
fn plan_unsupported_os_fails() {
  let env = TestEnv::new();

  env
    .dxcpkg_cmd()
    .args(["plan", "--os", "Android", "--arch", "armv8"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("unsupported OS: Android"));
}
