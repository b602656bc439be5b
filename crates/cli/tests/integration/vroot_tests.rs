use std::path::PathBuf;

use super::common::{TestEnv, stdout_json};

fn built_root(env: &TestEnv, extra: &[&str]) -> serde_json::Value {
  let output = env
    .vroot_cmd("go1.22.1")
    .args(["-o", "json"])
    .args(extra)
    .output()
    .unwrap();
  assert!(
    output.status.success(),
    "vroot failed: {}",
    String::from_utf8_lossy(&output.stderr)
  );
  stdout_json(&output)
}

#[test]
fn vroot_builds_under_base_dir_env() {
  let env = TestEnv::empty().with_simple_trees();

  let output = env.vroot_cmd("go1.22.1").output().unwrap();
  assert!(output.status.success());

  let path = PathBuf::from(String::from_utf8(output.stdout).unwrap().trim());
  assert!(path.starts_with(env.roots_path()));
  assert!(path.file_name().unwrap().to_string_lossy().ends_with("-go1.22.1"));
  assert_eq!(
    std::fs::read_to_string(path.join("src/pkg/a.go")).unwrap(),
    "package pkg\n\nfunc B() {}\n"
  );
}

#[test]
fn vroot_base_dir_flag_overrides_env() {
  let env = TestEnv::empty().with_simple_trees();
  let base = env.path("elsewhere");

  let output = env.vroot_cmd("go1.22.1").arg("--base-dir").arg(&base).output().unwrap();
  assert!(output.status.success());

  let path = PathBuf::from(String::from_utf8(output.stdout).unwrap().trim());
  assert!(path.starts_with(&base));
  assert!(!env.roots_path().exists());
}

#[test]
fn vroot_reuses_up_to_date_root() {
  let env = TestEnv::empty().with_simple_trees();

  let first = built_root(&env, &[]);
  assert_eq!(first["rebuilt"], true);
  assert_eq!(first["stats"]["overlay_files"], 1);

  let second = built_root(&env, &[]);
  assert_eq!(second["rebuilt"], false);
  assert!(second["stats"].is_null());
  assert_eq!(second["path"], first["path"]);
  assert_eq!(second["fingerprint"], first["fingerprint"]);
}

#[test]
fn vroot_rebuilds_when_forced_or_overlay_changes() {
  let env = TestEnv::empty().with_simple_trees();

  let first = built_root(&env, &[]);

  let forced = built_root(&env, &["--force"]);
  assert_eq!(forced["rebuilt"], true);
  assert_eq!(forced["fingerprint"], first["fingerprint"]);

  env.write_file("overlay/src/pkg/b.go", "package pkg\n\nvar X = 2\n");
  let changed = built_root(&env, &[]);
  assert_eq!(changed["rebuilt"], true);
  assert_ne!(changed["fingerprint"], first["fingerprint"]);
  assert_eq!(changed["stats"]["overlay_files"], 2);
}

#[test]
fn vroot_versions_get_separate_roots() {
  let env = TestEnv::empty().with_simple_trees();

  let a = built_root(&env, &[]);
  let output = env.vroot_cmd("go1.23.0").args(["-o", "json"]).output().unwrap();
  assert!(output.status.success());
  let b = stdout_json(&output);

  assert_ne!(a["path"], b["path"]);
  assert_eq!(b["rebuilt"], true);
}
