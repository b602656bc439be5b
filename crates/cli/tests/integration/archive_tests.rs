use predicates::prelude::*;

use super::common::{TestEnv, stdout_json};

fn create_archive(env: &TestEnv) {
  env.write_file("in/__.PKGDEF", "go object linux amd64 go1.22.1\n");
  env.write_file("in/_go_.o", "odd");

  env
    .vgoroot_cmd()
    .args(["ar", "create"])
    .arg(env.path("lib.a"))
    .arg(env.path("in/__.PKGDEF"))
    .arg(env.path("in/_go_.o"))
    .assert()
    .success()
    .stdout(predicate::str::contains("2 entries"));
}

#[test]
fn ar_create_writes_ar_magic() {
  let env = TestEnv::empty();
  create_archive(&env);

  let bytes = std::fs::read(env.path("lib.a")).unwrap();
  assert!(bytes.starts_with(b"!<arch>\n"));
  // Odd-sized bodies are padded to an even length.
  assert_eq!(bytes.len() % 2, 0);
}

#[test]
fn ar_list_shows_entries() {
  let env = TestEnv::empty();
  create_archive(&env);

  env
    .vgoroot_cmd()
    .args(["ar", "list"])
    .arg(env.path("lib.a"))
    .assert()
    .success()
    .stdout(predicate::str::contains("__.PKGDEF"))
    .stdout(predicate::str::contains("_go_.o"))
    .stdout(predicate::str::contains("3 B"))
    .stdout(predicate::str::contains("rw-r--r--"));
}

#[test]
fn ar_list_json_output_is_valid() {
  let env = TestEnv::empty();
  create_archive(&env);

  let output = env
    .vgoroot_cmd()
    .args(["ar", "list", "-o", "json"])
    .arg(env.path("lib.a"))
    .output()
    .unwrap();
  assert!(output.status.success());

  let entries = stdout_json(&output);
  let entries = entries.as_array().unwrap();
  assert_eq!(entries.len(), 2);
  assert_eq!(entries[0]["name"], "__.PKGDEF");
  assert_eq!(entries[1]["name"], "_go_.o");
  assert_eq!(entries[1]["size"], 3);
  assert_eq!(entries[1]["mode"], "644");
}

#[test]
fn ar_extract_roundtrips_data() {
  let env = TestEnv::empty();
  create_archive(&env);

  env
    .vgoroot_cmd()
    .args(["ar", "extract"])
    .arg(env.path("lib.a"))
    .arg("_go_.o")
    .arg("-o")
    .arg(env.path("out.o"))
    .assert()
    .success();

  assert_eq!(env.read_file("out.o"), "odd");
}

#[test]
fn ar_extract_missing_entry_fails() {
  let env = TestEnv::empty();
  create_archive(&env);

  env
    .vgoroot_cmd()
    .args(["ar", "extract"])
    .arg(env.path("lib.a"))
    .arg("missing.o")
    .assert()
    .failure()
    .stderr(predicate::str::contains("No entry named"));
}

#[test]
fn ar_create_rejects_long_names() {
  let env = TestEnv::empty();
  env.write_file("in/a_rather_long_entry_name.o", "x");

  env
    .vgoroot_cmd()
    .args(["ar", "create"])
    .arg(env.path("lib.a"))
    .arg(env.path("in/a_rather_long_entry_name.o"))
    .assert()
    .failure()
    .stderr(predicate::str::contains("too long"));
}
