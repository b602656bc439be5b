//! Archive editing through the public API.

use std::io::Cursor;

use vgoroot_lib::archive::{Archive, ArchiveError, Entry, PKG_DEF};

fn object_archive() -> Archive {
  Archive::new(vec![
    Entry::new(PKG_DEF, "go object linux amd64 go1.22.1\n$$B\n"),
    Entry::new("_go_.o", vec![0u8, 1, 2]),
  ])
}

#[test]
fn replacing_the_package_definition() {
  let bytes = object_archive().to_bytes().unwrap();

  let mut archive = Archive::load(Cursor::new(bytes)).unwrap();
  let (index, entry) = archive.get_mut(PKG_DEF).unwrap();
  assert_eq!(index, 0);
  entry.data = b"go object linux amd64 go1.22.1 X:vgoroot\n".to_vec();

  let reloaded = Archive::load(Cursor::new(archive.to_bytes().unwrap())).unwrap();
  assert_eq!(reloaded.len(), 2);
  assert_eq!(
    reloaded.get(PKG_DEF).unwrap().1.data,
    b"go object linux amd64 go1.22.1 X:vgoroot\n"
  );
  assert_eq!(reloaded.get("_go_.o").unwrap().1.data, [0u8, 1, 2]);
}

#[test]
fn appended_entries_keep_their_order() {
  let mut archive = object_archive();
  archive.push(Entry::new("extra.o", "x"));

  let reloaded = Archive::load(Cursor::new(archive.to_bytes().unwrap())).unwrap();
  let names: Vec<&str> = reloaded.entries.iter().map(|e| e.name.as_str()).collect();
  assert_eq!(names, [PKG_DEF, "_go_.o", "extra.o"]);
}

#[test]
fn truncated_archives_are_rejected() {
  let mut bytes = object_archive().to_bytes().unwrap();
  bytes.truncate(bytes.len() - 2);

  let err = Archive::load(Cursor::new(bytes)).unwrap_err();
  assert!(matches!(err, ArchiveError::TruncatedBody { .. }), "{err:?}");
}
