use crate::consts::BASE_DIR_ENV;
use std::path::PathBuf;

/// Returns the directory virtual roots are created in.
///
/// `VGOROOT_DIR` takes precedence over the system temporary directory.
pub fn base_dir() -> PathBuf {
  std::env::var_os(BASE_DIR_ENV)
    .filter(|v| !v.is_empty())
    .map(PathBuf::from)
    .unwrap_or_else(std::env::temp_dir)
}
