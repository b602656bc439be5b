//! Cross-platform links into the vanilla tree.
//!
//! Merged trees point back at unmodified vanilla content through symbolic
//! links. Where links can't be created the content is copied instead, which
//! yields the same tree at a higher cost.

use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;
use walkdir::WalkDir;

/// Create `link` pointing at the file `target`.
pub fn link_file(target: &Path, link: &Path) -> io::Result<()> {
  match symlink_file(target, link) {
    Err(e) if should_copy(&e) => {
      debug!(target = %target.display(), link = %link.display(), "symlink unavailable, copying file");
      copy_file(target, link)
    }
    result => result,
  }
}

/// Create `link` pointing at the directory `target`.
pub fn link_dir(target: &Path, link: &Path) -> io::Result<()> {
  match symlink_dir(target, link) {
    Err(e) if should_copy(&e) => {
      debug!(target = %target.display(), link = %link.display(), "symlink unavailable, copying directory");
      copy_dir(target, link)
    }
    result => result,
  }
}

/// Copy `src` to `dst`, failing if `dst` already exists.
pub fn copy_file(src: &Path, dst: &Path) -> io::Result<()> {
  let mut reader = fs::File::open(src)?;
  let mut writer = fs::OpenOptions::new().write(true).create_new(true).open(dst)?;
  io::copy(&mut reader, &mut writer)?;
  Ok(())
}

/// Recursively copy the directory `src` to `dst`, which must not exist.
pub fn copy_dir(src: &Path, dst: &Path) -> io::Result<()> {
  if dst.exists() {
    return Err(io::Error::new(
      io::ErrorKind::AlreadyExists,
      format!("{} already exists", dst.display()),
    ));
  }

  for entry in WalkDir::new(src).follow_links(true) {
    let entry = entry.map_err(io::Error::other)?;
    let rel = entry.path().strip_prefix(src).map_err(io::Error::other)?;
    let out = dst.join(rel);
    if entry.file_type().is_dir() {
      fs::create_dir_all(&out)?;
    } else {
      copy_file(entry.path(), &out)?;
    }
  }
  Ok(())
}

#[cfg(windows)]
fn should_copy(e: &io::Error) -> bool {
  // Symlinks need developer mode or elevation on Windows.
  e.kind() == io::ErrorKind::PermissionDenied || e.raw_os_error() == Some(1314)
}

#[cfg(not(windows))]
fn should_copy(e: &io::Error) -> bool {
  e.kind() == io::ErrorKind::Unsupported
}

#[cfg(unix)]
fn symlink_file(target: &Path, link: &Path) -> io::Result<()> {
  std::os::unix::fs::symlink(target, link)
}

#[cfg(unix)]
fn symlink_dir(target: &Path, link: &Path) -> io::Result<()> {
  std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink_file(target: &Path, link: &Path) -> io::Result<()> {
  std::os::windows::fs::symlink_file(target, link)
}

#[cfg(windows)]
fn symlink_dir(target: &Path, link: &Path) -> io::Result<()> {
  std::os::windows::fs::symlink_dir(target, link)
}

#[cfg(not(any(unix, windows)))]
fn symlink_file(_target: &Path, _link: &Path) -> io::Result<()> {
  Err(io::ErrorKind::Unsupported.into())
}

#[cfg(not(any(unix, windows)))]
fn symlink_dir(_target: &Path, _link: &Path) -> io::Result<()> {
  Err(io::ErrorKind::Unsupported.into())
}
