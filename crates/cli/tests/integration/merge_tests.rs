use predicates::prelude::*;

use super::common::{TestEnv, stdout_json};

#[test]
fn merge_augments_package() {
  let env = TestEnv::empty().with_simple_trees();

  env.merge_cmd("merged").assert().success();

  assert_eq!(env.read_file("merged/src/pkg/a.go"), "package pkg\n\nfunc B() {}\n");
  assert_eq!(env.read_file("merged/src/pkg/b.go"), "package pkg\n\nvar X, _ int\n");
  assert_eq!(
    env.read_file("merged/src/pkg/vgoroot__a.go"),
    "package pkg\n\nfunc A() { println() }\n\nvar Y = 1\n"
  );
  assert_eq!(env.read_file("merged/src/other/o.go"), "package other\n");
}

#[test]
fn merge_drops_non_go_files_of_materialised_directories() {
  let env = TestEnv::empty().with_simple_trees();

  env.merge_cmd("merged").assert().success();

  assert!(!env.path("merged/VERSION").exists());
}

#[test]
fn merge_custom_prefix() {
  let env = TestEnv::empty().with_simple_trees();

  env
    .merge_cmd("merged")
    .args(["--prefix", "zz_"])
    .assert()
    .success();

  assert!(env.path("merged/src/pkg/zz_a.go").exists());
  assert!(!env.path("merged/src/pkg/vgoroot__a.go").exists());
}

#[test]
fn merge_json_output_is_valid() {
  let env = TestEnv::empty().with_simple_trees();

  let output = env.merge_cmd("merged").args(["-o", "json", "-j", "2"]).output().unwrap();
  assert!(output.status.success());

  let stats = stdout_json(&output);
  assert_eq!(stats["merged_dirs"], 3);
  assert_eq!(stats["linked_dirs"], 1);
  assert_eq!(stats["overlay_files"], 1);
  assert_eq!(stats["vanilla_files"], 2);
  assert_eq!(stats["rewritten_files"], 2);
}

#[test]
fn merge_into_populated_output_fails() {
  let env = TestEnv::empty().with_simple_trees();
  env.write_file("merged/src/pkg/a.go", "package pkg\n");

  env
    .merge_cmd("merged")
    .assert()
    .failure()
    .stderr(predicate::str::contains("Merge failed"));
}

#[test]
fn merge_rejects_invalid_overlay_source() {
  let env = TestEnv::empty().with_simple_trees();
  env.write_file("overlay/src/pkg/broken.go", "package pkg\n\nfunc (\n");

  env
    .merge_cmd("merged")
    .assert()
    .failure()
    .stderr(predicate::str::contains("broken.go"));
}
