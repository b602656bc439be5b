//! Shared test helpers for CLI integration tests.

use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Isolated test environment.
///
/// Each test gets its own temporary directory holding the vanilla tree, the
/// overlay and every output path.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  pub fn empty() -> Self {
    Self {
      temp: TempDir::new().unwrap(),
    }
  }

  /// Write a file relative to the temp directory.
  pub fn write_file(&self, relative_path: &str, content: &str) {
    let path = self.temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
  }

  /// Read a file relative to the temp directory.
  pub fn read_file(&self, relative_path: &str) -> String {
    std::fs::read_to_string(self.path(relative_path))
      .unwrap_or_else(|e| panic!("Failed to read {}: {}", relative_path, e))
  }

  pub fn path(&self, relative_path: &str) -> PathBuf {
    self.temp.path().join(relative_path)
  }

  pub fn vanilla_path(&self) -> PathBuf {
    self.path("vanilla")
  }

  pub fn overlay_path(&self) -> PathBuf {
    self.path("overlay")
  }

  /// Base directory for virtual roots.
  pub fn roots_path(&self) -> PathBuf {
    self.path("roots")
  }

  /// Get a pre-configured Command for the vgoroot binary.
  ///
  /// Sets `VGOROOT_DIR` so virtual roots never land in the shared temp dir.
  pub fn vgoroot_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("vgoroot");
    cmd.env("VGOROOT_DIR", self.roots_path());
    cmd
  }

  /// A `merge` command over the vanilla and overlay trees, writing to `out`.
  pub fn merge_cmd(&self, out: &str) -> Command {
    let mut cmd = self.vgoroot_cmd();
    cmd
      .arg("merge")
      .arg("--vanilla")
      .arg(self.vanilla_path())
      .arg("--overlay")
      .arg(self.overlay_path())
      .arg("--out")
      .arg(self.path(out));
    cmd
  }

  /// A `vroot` command for the vanilla and overlay trees.
  pub fn vroot_cmd(&self, go_version: &str) -> Command {
    let mut cmd = self.vgoroot_cmd();
    cmd
      .arg("vroot")
      .arg("--goroot")
      .arg(self.vanilla_path())
      .args(["--go-version", go_version])
      .arg("--overlay")
      .arg(self.overlay_path());
    cmd
  }

  /// Lay out a tiny library root with one augmented package.
  pub fn with_simple_trees(self) -> Self {
    self.write_file(
      "vanilla/src/pkg/a.go",
      "package pkg\n\nfunc A() {}\n\nfunc B() {}\n",
    );
    self.write_file("vanilla/src/pkg/b.go", "package pkg\n\nvar X, Y int\n");
    self.write_file("vanilla/src/other/o.go", "package other\n");
    self.write_file("vanilla/VERSION", "go1.22.1\n");
    self.write_file(
      "overlay/src/pkg/a.go",
      "package pkg\n\nfunc A() { println() }\n\nvar Y = 1\n",
    );
    self
  }
}

/// Parse a command's stdout as JSON.
pub fn stdout_json(output: &std::process::Output) -> serde_json::Value {
  serde_json::from_slice(&output.stdout).unwrap_or_else(|e| {
    panic!(
      "stdout is not JSON ({}): {}",
      e,
      String::from_utf8_lossy(&output.stdout)
    )
  })
}
