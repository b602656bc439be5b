//! Loading, transforming and writing out a single source file.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::consts::WRITE_BUFFER_SIZE;
use crate::platform::link_file;
use crate::syntax::{ParseError, SourceFile, parse_file};
use crate::vfs::SourceFs;

#[derive(Debug, Error)]
pub enum ProcessError {
  #[error("failed to read {}", path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse {}", path.display())]
  Parse {
    path: PathBuf,
    #[source]
    source: ParseError,
  },

  #[error("{} already exists", path.display())]
  DestinationExists { path: PathBuf },

  #[error("failed to write {}", path.display())]
  Write {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to link {} to {}", path.display(), target.display())]
  Link {
    path: PathBuf,
    target: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// How a processed file ended up at its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
  /// Unchanged; the destination links to the original file.
  Linked,
  /// Unchanged; the original bytes were copied.
  Copied,
  /// Changed; the destination holds the re-emitted source.
  Rewritten,
}

/// Parse `load_path` from `fs`, run `transform` on it and write the result
/// to `write_path`.
///
/// When `transform` reports no change the original content is reused: linked
/// if `fs` is disk-backed, copied otherwise. `write_path` must not exist.
pub fn process_source<F>(
  fs: &dyn SourceFs,
  load_path: &Path,
  write_path: &Path,
  transform: F,
) -> Result<Outcome, ProcessError>
where
  F: FnOnce(&mut SourceFile) -> bool,
{
  if fs::symlink_metadata(write_path).is_ok() {
    return Err(ProcessError::DestinationExists {
      path: write_path.to_path_buf(),
    });
  }

  let data = fs.read(load_path).map_err(|source| ProcessError::Read {
    path: load_path.to_path_buf(),
    source,
  })?;
  let src = String::from_utf8(data).map_err(|e| ProcessError::Read {
    path: load_path.to_path_buf(),
    source: io::Error::new(io::ErrorKind::InvalidData, e),
  })?;

  let mut file = parse_file(&load_path.to_string_lossy(), src).map_err(|source| ProcessError::Parse {
    path: load_path.to_path_buf(),
    source,
  })?;

  let outcome = if transform(&mut file) {
    write_rewritten(&file, write_path)?;
    Outcome::Rewritten
  } else if let Some(target) = fs.real_path(load_path) {
    link_file(&target, write_path).map_err(|source| ProcessError::Link {
      path: write_path.to_path_buf(),
      target,
      source,
    })?;
    Outcome::Linked
  } else {
    write_bytes(file.source().as_bytes(), write_path)?;
    Outcome::Copied
  };

  debug!(src = %load_path.display(), dst = %write_path.display(), ?outcome, "processed source");
  Ok(outcome)
}

fn create(path: &Path) -> Result<fs::File, ProcessError> {
  fs::OpenOptions::new()
    .write(true)
    .create_new(true)
    .open(path)
    .map_err(|source| match source.kind() {
      io::ErrorKind::AlreadyExists => ProcessError::DestinationExists {
        path: path.to_path_buf(),
      },
      _ => ProcessError::Write {
        path: path.to_path_buf(),
        source,
      },
    })
}

fn write_rewritten(file: &SourceFile, path: &Path) -> Result<(), ProcessError> {
  let mut out = BufWriter::with_capacity(WRITE_BUFFER_SIZE, create(path)?);
  file
    .write_to(&mut out)
    .and_then(|()| out.flush())
    .map_err(|source| ProcessError::Write {
      path: path.to_path_buf(),
      source,
    })
}

fn write_bytes(data: &[u8], path: &Path) -> Result<(), ProcessError> {
  create(path)?.write_all(data).map_err(|source| ProcessError::Write {
    path: path.to_path_buf(),
    source,
  })
}
