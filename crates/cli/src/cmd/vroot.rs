//! Implementation of the `vgoroot vroot` command.
//!
//! Prints the path of an up-to-date virtual root on stdout, so the command
//! can be used as `GOROOT=$(vgoroot vroot ...)`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use vgoroot_lib::goroot::{VirtualRoot, VirtualRootConfig};
use vgoroot_lib::vfs::DirFs;

use crate::output::{OutputFormat, print_json, truncate_hash};

pub struct VrootArgs {
  pub goroot: PathBuf,
  pub go_version: String,
  pub overlay: PathBuf,
  pub base_dir: Option<PathBuf>,
  pub force: bool,
  pub jobs: Option<usize>,
  pub output: OutputFormat,
}

pub fn cmd_vroot(args: VrootArgs) -> Result<()> {
  let overlay =
    DirFs::new(&args.overlay).with_context(|| format!("Failed to open overlay {}", args.overlay.display()))?;

  let mut config = VirtualRootConfig::new(args.goroot, args.go_version);
  config.force = args.force;
  if let Some(base_dir) = args.base_dir {
    config.base_dir = base_dir;
  }
  if let Some(jobs) = args.jobs {
    config.parallelism = jobs;
  }

  let vroot = VirtualRoot::new(config, Arc::new(overlay));

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let built = rt.block_on(vroot.build()).context("Failed to set up virtual root")?;

  if args.output.is_json() {
    print_json(&built)?;
  } else {
    info!(
      fingerprint = truncate_hash(&built.fingerprint.0),
      rebuilt = built.rebuilt,
      "virtual root ready"
    );
    println!("{}", built.path.display());
  }

  Ok(())
}
