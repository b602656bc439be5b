//! Top-level Go syntax.
//!
//! A lossless, top-level-only view of a Go source file: the package clause and
//! every top-level declaration with byte spans into the original text. Function
//! bodies, struct fields and interface method lists are kept as opaque text.
//!
//! Edits are recorded as marks on the tree (delete a declaration, delete a spec,
//! rename an identifier) and applied when the file is printed, so every byte
//! outside an edited node is reproduced exactly.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod printer;

use thiserror::Error;

pub use ast::{Decl, DeclKind, FuncDecl, GenDecl, Ident, ImportSpec, Receiver, SourceFile, Spec, TypeSpec, ValueSpec};
pub use parser::parse_file;

/// Half-open byte range into the source text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Span {
  pub start: usize,
  pub end: usize,
}

impl Span {
  pub fn new(start: usize, end: usize) -> Self {
    Self { start, end }
  }

  pub fn len(&self) -> usize {
    self.end - self.start
  }

  pub fn is_empty(&self) -> bool {
    self.start == self.end
  }
}

/// A syntax error with its position in the file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{file}:{line}:{column}: {message}")]
pub struct ParseError {
  pub file: String,
  pub line: usize,
  pub column: usize,
  pub message: String,
}

/// Maps byte offsets to 1-based line and column numbers.
#[derive(Debug, Clone)]
pub struct LineIndex {
  starts: Vec<usize>,
}

impl LineIndex {
  pub fn new(src: &str) -> Self {
    let mut starts = vec![0];
    starts.extend(src.match_indices('\n').map(|(i, _)| i + 1));
    Self { starts }
  }

  /// Zero-based line containing `offset`.
  pub fn line(&self, offset: usize) -> usize {
    match self.starts.binary_search(&offset) {
      Ok(line) => line,
      Err(next) => next - 1,
    }
  }

  pub fn line_start(&self, line: usize) -> usize {
    self.starts[line]
  }

  /// 1-based (line, column) for `offset`, counting columns in characters.
  pub fn position(&self, src: &str, offset: usize) -> (usize, usize) {
    let line = self.line(offset);
    let column = src[self.starts[line]..offset].chars().count() + 1;
    (line + 1, column)
  }
}
