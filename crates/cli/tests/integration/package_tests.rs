use std::path::{Path, PathBuf};

use predicates::prelude::*;

use super::common::{TestEnv, read_json};

#[test]
fn package_harvests_existing_build() {
  let env = TestEnv::new();
  env.seed_linux_build();

  env
    .dxcpkg_cmd()
    .args(["package", "--os", "Linux", "--arch", "x86_64"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Packaged 5 file(s)"));

  let package = env.package_path();
  assert!(package.join("include/dxcapi.h").is_file());
  assert!(package.join("include/Support/WinAdapter.h").is_file());
  assert!(package.join("lib/libdxcompiler.so").is_file());
  assert!(package.join("bin/dxc").is_file());

  let metadata = read_json(&env.work_path().join("package.json"));
  assert_eq!(metadata["libs"], serde_json::json!(["dxcompiler"]));
  assert_eq!(metadata["platform"], "x86_64-linux");
}

#[test]
fn package_twice_reports_same_digest() {
  let env = TestEnv::new();
  env.seed_linux_build();

  let digest = |env: &TestEnv| {
    let output = env
      .dxcpkg_cmd()
      .args(["package", "--os", "Linux", "--arch", "x86_64", "-o", "json"])
      .output()
      .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    json["harvest"]["digest"].as_str().unwrap().to_string()
  };

  assert_eq!(digest(&env), digest(&env));
}

#[test]
fn package_without_build_fails_and_writes_nothing() {
  let env = TestEnv::new();
  env.write_file("work/source/include/dxc/dxcapi.h", "// header");

  env
    .dxcpkg_cmd()
    .args(["package", "--os", "Linux", "--arch", "x86_64"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("harvest failed"));

  assert!(!env.package_path().exists());
}

#[test]
fn info_after_package_shows_platform() {
  let env = TestEnv::new();
  env.seed_linux_build();

  env
    .dxcpkg_cmd()
    .args(["package", "--os", "Linux", "--arch", "x86_64"])
    .assert()
    .success();

  env
    .dxcpkg_cmd()
    .arg("info")
    .assert()
    .success()
    .stdout(predicate::str::contains("x86_64-linux"))
    .stderr(predicate::str::contains("Not built yet").not());
}

#[test]
fn package_with_relative_work_dir() {
  let env = TestEnv::new();
  env.seed_linux_build();

  let output = env
    .dxcpkg_cmd_in(Path::new("work"))
    .current_dir(env.temp.path())
    .args(["package", "--os", "Linux", "--arch", "x86_64", "-o", "json"])
    .output()
    .unwrap();

  assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  let package_dir = PathBuf::from(json["harvest"]["package_dir"].as_str().unwrap());
  assert!(package_dir.is_absolute());
  assert!(env.package_path().join("include/dxcapi.h").is_file());
  assert!(env.work_path().join("package.json").is_file());
}
