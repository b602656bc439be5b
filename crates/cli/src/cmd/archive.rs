//! Implementation of the `vgoroot ar` commands.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Serialize;

use vgoroot_lib::archive::{Archive, Entry};

use crate::output::{OutputFormat, print_entry_row, print_info, print_json, print_success, symbols};

#[derive(Debug, Serialize)]
struct EntryInfo<'a> {
  name: &'a str,
  mtime: i64,
  uid: u32,
  gid: u32,
  mode: String,
  size: usize,
}

impl<'a> From<&'a Entry> for EntryInfo<'a> {
  fn from(entry: &'a Entry) -> Self {
    Self {
      name: &entry.name,
      mtime: entry.mtime,
      uid: entry.uid,
      gid: entry.gid,
      mode: format!("{:o}", entry.mode),
      size: entry.data.len(),
    }
  }
}

fn load(file: &Path) -> Result<Archive> {
  let reader = BufReader::new(File::open(file).with_context(|| format!("Failed to open {}", file.display()))?);
  Archive::load(reader).with_context(|| format!("Failed to read archive {}", file.display()))
}

pub fn cmd_ar_list(file: &Path, output: OutputFormat) -> Result<()> {
  let archive = load(file)?;

  if output.is_json() {
    let entries: Vec<EntryInfo> = archive.entries.iter().map(EntryInfo::from).collect();
    print_json(&entries)?;
  } else if archive.is_empty() {
    print_info("Archive is empty");
  } else {
    for entry in &archive.entries {
      print_entry_row(entry.mode, entry.uid, entry.gid, entry.data.len() as u64, &entry.name);
    }
  }

  Ok(())
}

pub fn cmd_ar_extract(file: &Path, name: &str, out: Option<&Path>) -> Result<()> {
  let archive = load(file)?;

  let Some((_, entry)) = archive.get(name) else {
    bail!("No entry named {:?} in {}", name, file.display());
  };

  let out = out.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from(name));
  fs::write(&out, &entry.data).with_context(|| format!("Failed to write {}", out.display()))?;

  print_success(&format!("{} {} {}", name, symbols::ARROW, out.display()));
  Ok(())
}

pub fn cmd_ar_create(out: &Path, inputs: &[PathBuf]) -> Result<()> {
  let mut archive = Archive::default();
  for input in inputs {
    let name = input
      .file_name()
      .with_context(|| format!("{} has no file name", input.display()))?
      .to_string_lossy()
      .into_owned();
    let data = fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
    archive.push(Entry::new(name, data));
  }

  let file = File::create(out).with_context(|| format!("Failed to create {}", out.display()))?;
  let mut writer = BufWriter::new(file);
  archive
    .write(&mut writer)
    .with_context(|| format!("Failed to write archive {}", out.display()))?;
  writer
    .flush()
    .with_context(|| format!("Failed to write archive {}", out.display()))?;

  print_success(&format!("Created {} with {} entries", out.display(), archive.len()));
  Ok(())
}
