//! Implementation of the `vgoroot merge` command.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};

use vgoroot_lib::goroot::{MergeConfig, merge};
use vgoroot_lib::vfs::DirFs;

use crate::output::{OutputFormat, format_duration, print_json, print_stat, print_success};

/// Merge `overlay` onto `vanilla`, writing the merged tree to `out`.
pub fn cmd_merge(
  vanilla: &Path,
  overlay: &Path,
  out: &Path,
  prefix: String,
  jobs: Option<usize>,
  output: OutputFormat,
) -> Result<()> {
  let start = Instant::now();

  let overlay = DirFs::new(overlay).with_context(|| format!("Failed to open overlay {}", overlay.display()))?;

  let mut config = MergeConfig::new(vanilla, out);
  config.overlay_prefix = prefix;
  if let Some(jobs) = jobs {
    config.parallelism = jobs;
  }

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let stats = rt.block_on(merge(config, Arc::new(overlay))).context("Merge failed")?;

  if output.is_json() {
    print_json(&stats)?;
  } else {
    print_success(&format!("Merged into {}", out.display()));
    print_stat("Directories merged", &stats.merged_dirs.to_string());
    print_stat("Directories linked", &stats.linked_dirs.to_string());
    print_stat("Overlay files", &stats.overlay_files.to_string());
    print_stat("Vanilla files", &stats.vanilla_files.to_string());
    print_stat("Files rewritten", &stats.rewritten_files.to_string());
    print_stat("Duration", &format_duration(start.elapsed()));
  }

  Ok(())
}
