//! End-to-end merges through the public API.

use std::sync::Arc;

use vgoroot_lib::goroot::{MergeConfig, MergeError, VirtualRoot, VirtualRootConfig, is_linked, merge};
use vgoroot_lib::vfs::{DirFs, MemFs};

use super::common::Trees;

fn runtime_tree() -> Trees {
  Trees::new(&[
    ("VERSION", "go1.22.1\n"),
    ("src/runtime/error.go", "package runtime\n\ntype Error interface{}\n\nfunc printpanicval() {}\n"),
    ("src/runtime/typekind.go", "package runtime\n\nconst kindBool = 1\n"),
    ("src/runtime/proc.go", "package runtime\n\nfunc main() {}\n"),
    ("src/runtime/asm_amd64.s", "TEXT ·f(SB),0,$0\n"),
    ("src/runtime/pprof/pprof.go", "package pprof\n"),
    ("src/fmt/print.go", "package fmt\n\nfunc Println() {}\n"),
  ])
}

#[tokio::test]
async fn default_file_filters_restrict_runtime() {
  let trees = runtime_tree();
  let overlay = MemFs::new()
    .with_file("src/runtime/vg.go", "package runtime\n\nfunc printpanicval() { print(1) }\n")
    .with_file("src/runtime/pprof/stub.go", "package pprof\n");

  let stats = merge(MergeConfig::new(&trees.vanilla, &trees.merged), Arc::new(overlay))
    .await
    .unwrap();

  let files = trees.merged_files();
  let names: Vec<&str> = files.keys().map(String::as_str).collect();
  assert_eq!(
    names,
    [
      "src/fmt/print.go",
      "src/runtime/error.go",
      "src/runtime/pprof/vgoroot__stub.go",
      "src/runtime/typekind.go",
      "src/runtime/vgoroot__vg.go",
    ]
  );
  assert_eq!(files["src/runtime/error.go"], "package runtime\n\ntype Error interface{}\n");
  assert!(is_linked(&trees.merged.join("src/fmt")));
  assert!(is_linked(&trees.merged.join("src/runtime/typekind.go")));
  assert_eq!(stats.overlay_files, 2);
  assert_eq!(stats.rewritten_files, 1);
}

#[tokio::test]
async fn parallelism_does_not_change_the_result() {
  let overlay = || {
    Arc::new(
      MemFs::new()
        .with_file("src/runtime/vg.go", "package runtime\n\nfunc printpanicval() { print(1) }\n")
        .with_file("src/fmt/vg.go", "package fmt\n\nfunc Println() { print(2) }\n"),
    )
  };

  let serial = runtime_tree();
  let mut config = MergeConfig::new(&serial.vanilla, &serial.merged);
  config.parallelism = 1;
  let serial_stats = merge(config, overlay()).await.unwrap();

  let parallel = runtime_tree();
  let mut config = MergeConfig::new(&parallel.vanilla, &parallel.merged);
  config.parallelism = 16;
  let parallel_stats = merge(config, overlay()).await.unwrap();

  assert_eq!(serial_stats, parallel_stats);
  assert_eq!(serial.merged_files(), parallel.merged_files());
}

#[tokio::test]
async fn disk_overlay_merges_like_memory_overlay() {
  let trees = runtime_tree();
  let overlay_root = trees.temp.path().join("overlay");
  std::fs::create_dir_all(overlay_root.join("src/fmt")).unwrap();
  std::fs::write(
    overlay_root.join("src/fmt/vg.go"),
    "package fmt\n\nfunc Println() { print(2) }\n",
  )
  .unwrap();

  let overlay = DirFs::new(&overlay_root).unwrap();
  merge(MergeConfig::new(&trees.vanilla, &trees.merged), Arc::new(overlay))
    .await
    .unwrap();

  assert_eq!(trees.read_merged("src/fmt/print.go"), "package fmt\n");
  assert_eq!(
    trees.read_merged("src/fmt/vgoroot__vg.go"),
    "package fmt\n\nfunc Println() { print(2) }\n"
  );
  assert!(is_linked(&trees.merged.join("src/fmt/vgoroot__vg.go")));
}

#[tokio::test]
async fn broken_vanilla_source_fails_the_merge() {
  let trees = Trees::new(&[("src/p/p.go", "package p\n\nfunc {\n")]);
  let overlay = MemFs::new().with_file("src/p/o.go", "package p\n");

  let err = merge(MergeConfig::new(&trees.vanilla, &trees.merged), Arc::new(overlay))
    .await
    .unwrap_err();

  assert!(matches!(err, MergeError::OriginalSource { ref dir, .. } if dir == "src/p"), "{err:?}");
}

#[tokio::test]
async fn virtual_root_round_trip() {
  let trees = runtime_tree();
  let overlay = Arc::new(MemFs::new().with_file("src/fmt/vg.go", "package fmt\n\nfunc Println() { print(2) }\n"));

  let mut config = VirtualRootConfig::new(&trees.vanilla, "go1.22.1");
  config.base_dir = trees.temp.path().join("roots");

  let first = VirtualRoot::new(config.clone(), overlay.clone()).build().await.unwrap();
  assert!(first.rebuilt);
  assert_eq!(
    std::fs::read_to_string(first.path.join("src/fmt/print.go")).unwrap(),
    "package fmt\n"
  );

  let second = VirtualRoot::new(config, overlay).build().await.unwrap();
  assert!(!second.rebuilt);
  assert_eq!(second.path, first.path);
}
