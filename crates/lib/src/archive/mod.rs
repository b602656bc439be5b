//! Reading and writing `.a` package archives.
//!
//! The container is the classic Unix `ar` format as used by the Go toolchain:
//!
//! ```text
//! !<arch>\n
//! <60-byte header><data>[\0]
//! <60-byte header><data>[\0]
//! ...
//! ```
//!
//! Each header is a run of left-justified ASCII fields:
//!
//! | field | width | encoding |
//! |-------|-------|----------|
//! | name  | 16    | text     |
//! | mtime | 12    | decimal  |
//! | uid   | 6     | decimal  |
//! | gid   | 6     | decimal  |
//! | mode  | 8     | octal    |
//! | size  | 10    | decimal  |
//!
//! terminated by the two bytes `` `\n ``. Data is padded to an even length
//! with a single zero byte.

use std::io::{self, Read, Write};

use thiserror::Error;
use tracing::debug;

/// Entry name holding package meta information for the compiler.
pub const PKG_DEF: &str = "__.PKGDEF";

const ARCHIVE_MAGIC: &[u8; 8] = b"!<arch>\n";
const HEADER_END: &[u8; 2] = b"`\n";
const HEADER_LEN: usize = 60;
const ALIGNMENT: usize = 2;

/// Fixed header field layout: (name, start, width).
const NAME: (&str, usize, usize) = ("name", 0, 16);
const MTIME: (&str, usize, usize) = ("mtime", 16, 12);
const UID: (&str, usize, usize) = ("uid", 28, 6);
const GID: (&str, usize, usize) = ("gid", 34, 6);
const MODE: (&str, usize, usize) = ("mode", 40, 8);
const SIZE: (&str, usize, usize) = ("size", 48, 10);

/// Errors produced while reading or writing an archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
  /// The input does not start with `!<arch>\n`.
  #[error("invalid archive signature {found:?}, expected \"!<arch>\\n\"")]
  BadMagic { found: String },

  /// A section header is missing its `` `\n `` terminator.
  #[error("invalid header terminator {found:?} for entry #{index} at offset {offset}")]
  BadTerminator { index: usize, offset: u64, found: String },

  /// A numeric header field could not be decoded.
  #[error("failed to parse {field} field {raw:?} of entry #{index} at offset {offset}")]
  BadField {
    index: usize,
    offset: u64,
    field: &'static str,
    raw: String,
  },

  /// The entry name is not valid text.
  #[error("entry #{index} at offset {offset} has a non-UTF-8 name")]
  BadName { index: usize, offset: u64 },

  /// The input ended in the middle of a header.
  #[error("truncated header for entry #{index} at offset {offset}: got {got} of 60 bytes")]
  TruncatedHeader { index: usize, offset: u64, got: usize },

  /// The input ended before the declared entry size.
  #[error("truncated body of entry #{index} {name:?} at offset {offset}: expected {size} bytes")]
  TruncatedBody {
    index: usize,
    name: String,
    offset: u64,
    size: usize,
  },

  /// Entry name does not fit the 16-byte header field.
  #[error("entry name {0:?} is too long (max 16 bytes)")]
  NameTooLong(String),

  /// A numeric value does not fit its fixed-width header field.
  #[error("{field} value {value} of entry {name:?} does not fit in {width} bytes")]
  FieldOverflow {
    name: String,
    field: &'static str,
    value: String,
    width: usize,
  },

  /// Underlying read failure.
  #[error("failed to read archive at offset {offset}: {source}")]
  Read {
    offset: u64,
    #[source]
    source: io::Error,
  },

  /// Underlying write failure.
  #[error("failed to write archive entry #{index} {name:?}: {source}")]
  Write {
    index: usize,
    name: String,
    #[source]
    source: io::Error,
  },
}

/// A single file stored in an archive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
  pub name: String,
  pub mtime: i64,
  pub uid: u32,
  pub gid: u32,
  pub mode: u32,
  pub data: Vec<u8>,
}

impl Entry {
  /// Create an entry with metadata matching the Go toolchain defaults.
  pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
    Self {
      name: name.into(),
      mode: 0o644,
      data: data.into(),
      ..Default::default()
    }
  }

  /// Size of this entry once serialized, including header and padding.
  pub fn encoded_len(&self) -> usize {
    HEADER_LEN + self.data.len() + self.data.len() % ALIGNMENT
  }

  fn header(&self) -> Result<[u8; HEADER_LEN], ArchiveError> {
    if self.name.len() > NAME.2 {
      return Err(ArchiveError::NameTooLong(self.name.clone()));
    }

    let mut hdr = [b' '; HEADER_LEN];
    self.put(&mut hdr, NAME, self.name.clone())?;
    self.put(&mut hdr, MTIME, self.mtime.to_string())?;
    self.put(&mut hdr, UID, self.uid.to_string())?;
    self.put(&mut hdr, GID, self.gid.to_string())?;
    self.put(&mut hdr, MODE, format!("{:o}", self.mode))?;
    self.put(&mut hdr, SIZE, self.data.len().to_string())?;
    hdr[HEADER_LEN - 2..].copy_from_slice(HEADER_END);
    Ok(hdr)
  }

  fn put(
    &self,
    hdr: &mut [u8; HEADER_LEN],
    (field, start, width): (&'static str, usize, usize),
    value: String,
  ) -> Result<(), ArchiveError> {
    if value.len() > width {
      return Err(ArchiveError::FieldOverflow {
        name: self.name.clone(),
        field,
        value,
        width,
      });
    }
    hdr[start..start + value.len()].copy_from_slice(value.as_bytes());
    Ok(())
  }

  fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
    // Header errors are checked by the caller before anything is written.
    let hdr = self.header().map_err(io::Error::other)?;
    w.write_all(&hdr)?;
    w.write_all(&self.data)?;
    if self.data.len() % ALIGNMENT == 1 {
      w.write_all(&[0])?;
    }
    Ok(())
  }
}

/// An ordered collection of archive entries.
///
/// Order is preserved on load and write; lookups return the first match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Archive {
  pub entries: Vec<Entry>,
}

impl Archive {
  pub fn new(entries: Vec<Entry>) -> Self {
    Self { entries }
  }

  /// Load a whole archive into memory.
  pub fn load<R: Read>(r: R) -> Result<Self, ArchiveError> {
    let mut reader = SectionReader { inner: r, offset: 0 };

    let mut magic = [0u8; 8];
    let got = reader.fill(&mut magic)?;
    if got != magic.len() || &magic != ARCHIVE_MAGIC {
      return Err(ArchiveError::BadMagic {
        found: String::from_utf8_lossy(&magic[..got]).into_owned(),
      });
    }

    let mut entries = Vec::new();
    while let Some(entry) = reader.section(entries.len())? {
      entries.push(entry);
    }

    debug!(entries = entries.len(), bytes = reader.offset, "loaded archive");
    Ok(Self { entries })
  }

  /// Serialize the archive.
  ///
  /// The writer is expected to point at the beginning of an empty file or
  /// buffer; no seeking or truncation is performed.
  pub fn write<W: Write>(&self, mut w: W) -> Result<(), ArchiveError> {
    for entry in &self.entries {
      entry.header()?;
    }

    w.write_all(ARCHIVE_MAGIC).map_err(|source| ArchiveError::Write {
      index: 0,
      name: String::new(),
      source,
    })?;
    for (index, entry) in self.entries.iter().enumerate() {
      entry.write_to(&mut w).map_err(|source| ArchiveError::Write {
        index,
        name: entry.name.clone(),
        source,
      })?;
    }
    w.flush().map_err(|source| ArchiveError::Write {
      index: self.entries.len(),
      name: String::new(),
      source,
    })
  }

  /// Serialize into a fresh byte vector.
  pub fn to_bytes(&self) -> Result<Vec<u8>, ArchiveError> {
    let len = ARCHIVE_MAGIC.len() + self.entries.iter().map(Entry::encoded_len).sum::<usize>();
    let mut buf = Vec::with_capacity(len);
    self.write(&mut buf)?;
    Ok(buf)
  }

  /// Find the first entry named `name` along with its index.
  pub fn get(&self, name: &str) -> Option<(usize, &Entry)> {
    self.entries.iter().enumerate().find(|(_, e)| e.name == name)
  }

  pub fn get_mut(&mut self, name: &str) -> Option<(usize, &mut Entry)> {
    self.entries.iter_mut().enumerate().find(|(_, e)| e.name == name)
  }

  pub fn push(&mut self, entry: Entry) {
    self.entries.push(entry);
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

/// Reader wrapper tracking the byte offset for error reporting.
struct SectionReader<R> {
  inner: R,
  offset: u64,
}

impl<R: Read> SectionReader<R> {
  /// Read until `buf` is full or the input ends. Returns bytes read.
  fn fill(&mut self, buf: &mut [u8]) -> Result<usize, ArchiveError> {
    let mut got = 0;
    while got < buf.len() {
      match self.inner.read(&mut buf[got..]) {
        Ok(0) => break,
        Ok(n) => got += n,
        Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
        Err(source) => {
          return Err(ArchiveError::Read {
            offset: self.offset + got as u64,
            source,
          });
        }
      }
    }
    self.offset += got as u64;
    Ok(got)
  }

  /// Read up to `size` body bytes. The buffer grows only with bytes actually present.
  fn body(&mut self, size: usize) -> Result<Vec<u8>, ArchiveError> {
    let mut data = Vec::new();
    (&mut self.inner)
      .take(size as u64)
      .read_to_end(&mut data)
      .map_err(|source| ArchiveError::Read {
        offset: self.offset + data.len() as u64,
        source,
      })?;
    self.offset += data.len() as u64;
    Ok(data)
  }

  /// Parse one section. `None` marks a clean end of the archive.
  fn section(&mut self, index: usize) -> Result<Option<Entry>, ArchiveError> {
    let offset = self.offset;
    let mut hdr = [0u8; HEADER_LEN];
    match self.fill(&mut hdr)? {
      0 => return Ok(None),
      HEADER_LEN => {}
      got => return Err(ArchiveError::TruncatedHeader { index, offset, got }),
    }

    let end = &hdr[HEADER_LEN - 2..];
    if end != HEADER_END {
      return Err(ArchiveError::BadTerminator {
        index,
        offset,
        found: String::from_utf8_lossy(end).into_owned(),
      });
    }

    let name = std::str::from_utf8(&hdr[NAME.1..NAME.1 + NAME.2])
      .map_err(|_| ArchiveError::BadName { index, offset })?
      .trim_end_matches(' ')
      .to_string();

    let field = |(field, start, width): (&'static str, usize, usize), radix: u32| {
      let raw = &hdr[start..start + width];
      let text = std::str::from_utf8(raw).ok().map(|s| s.trim_end_matches(' '));
      text
        .and_then(|s| i64::from_str_radix(s, radix).ok())
        .ok_or_else(|| ArchiveError::BadField {
          index,
          offset,
          field,
          raw: String::from_utf8_lossy(raw).into_owned(),
        })
    };
    let bad = |(field, start, width): (&'static str, usize, usize)| ArchiveError::BadField {
      index,
      offset,
      field,
      raw: String::from_utf8_lossy(&hdr[start..start + width]).into_owned(),
    };

    let mtime = field(MTIME, 10)?;
    let uid = u32::try_from(field(UID, 10)?).map_err(|_| bad(UID))?;
    let gid = u32::try_from(field(GID, 10)?).map_err(|_| bad(GID))?;
    let mode = u32::try_from(field(MODE, 8)?).map_err(|_| bad(MODE))?;
    let size = usize::try_from(field(SIZE, 10)?).map_err(|_| bad(SIZE))?;

    let data = self.body(size)?;
    if data.len() != size {
      return Err(ArchiveError::TruncatedBody {
        index,
        name,
        offset: offset + HEADER_LEN as u64,
        size,
      });
    }

    // A final unpadded entry at EOF is accepted.
    if size % ALIGNMENT == 1 {
      let mut pad = [0u8; 1];
      self.fill(&mut pad)?;
    }

    Ok(Some(Entry {
      name,
      mtime,
      uid,
      gid,
      mode,
      data,
    }))
  }
}
