//! Re-emitting an edited source file.
//!
//! Untouched text is copied from the original source. Deleted nodes are cut
//! out together with their doc comment, trailing line comment and line break.
//! Removals never leave two blank lines in a row, or blank lines at the end
//! of the file, behind.

use std::io::{self, Write};

use super::ast::{Decl, SourceFile, Spec};
use super::Span;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Edit {
  span: Span,
  text: String,
  removal: bool,
}

impl SourceFile {
  /// Whether any node of the file was deleted or renamed.
  pub fn is_modified(&self) -> bool {
    !self.edits().is_empty()
  }

  /// Render the file with all edits applied.
  pub fn render(&self) -> String {
    let mut out = String::with_capacity(self.src.len());
    let mut cursor = 0;
    let mut removed_to_eof = false;
    for edit in self.edits() {
      // Widened removals may overlap their neighbours.
      if edit.span.end <= cursor && !edit.span.is_empty() {
        continue;
      }
      let start = edit.span.start.max(cursor);
      out.push_str(&self.src[cursor..start]);
      out.push_str(&edit.text);
      cursor = edit.span.end.max(cursor);

      if edit.removal {
        // Don't leave two blank lines behind.
        if out.ends_with("\n\n") || out.ends_with("\n\r\n") {
          while let Some(len) = blank_line(&self.src[cursor..]) {
            cursor += len;
          }
        }
        removed_to_eof = cursor == self.src.len();
      }
    }
    out.push_str(&self.src[cursor..]);

    if removed_to_eof {
      loop {
        if out.ends_with("\n\n") {
          out.pop();
        } else if out.ends_with("\n\r\n") {
          out.truncate(out.len() - 2);
        } else {
          break;
        }
      }
    }
    out
  }

  pub fn write_to<W: Write>(&self, mut w: W) -> io::Result<()> {
    w.write_all(self.render().as_bytes())
  }

  fn edits(&self) -> Vec<Edit> {
    let mut edits = Vec::new();
    let mut remove = |extent: Span| {
      edits.push(Edit {
        span: removal(&self.src, extent),
        text: String::new(),
        removal: true,
      })
    };

    let mut renames = Vec::new();
    for decl in &self.decls {
      match decl {
        Decl::Func(f) if f.is_deleted() => remove(f.extent()),
        Decl::Func(_) => {}
        Decl::Gen(g) if g.is_emptied() => remove(g.extent()),
        Decl::Gen(g) => {
          for spec in &g.specs {
            match spec {
              Spec::Type(t) if t.is_deleted() => remove(t.extent()),
              Spec::Value(v) => renames.extend(
                v.names
                  .iter()
                  .filter(|n| n.name != self.text(n.span))
                  .map(|n| Edit {
                    span: n.span,
                    text: n.name.clone(),
                    removal: false,
                  }),
              ),
              _ => {}
            }
          }
        }
      }
    }

    edits.extend(renames);
    edits.sort_by_key(|e| (e.span.start, e.span.end));
    edits
  }
}

/// Widen `extent` to the text that has to go with it.
fn removal(src: &str, extent: Span) -> Span {
  let line_start = src[..extent.start].rfind('\n').map_or(0, |i| i + 1);
  let indent = &src[line_start..extent.start];
  let own_line = indent.trim().is_empty();

  let trailing_ws = skip_blanks(&src[extent.end..]);
  let mut end = extent.end + trailing_ws;
  if src[end..].starts_with("//") {
    end += src[end..].find('\n').unwrap_or(src.len() - end);
  }
  let rest = &src[end..];
  let line_ends = rest.is_empty() || rest.starts_with('\n') || rest.starts_with("\r\n");

  if !own_line || !line_ends {
    // Something else shares the line; only cut the node itself.
    if src[extent.end + trailing_ws..].starts_with(['\n', '\r']) || extent.end + trailing_ws == src.len() {
      let leading = indent.len() - indent.trim_end_matches([' ', '\t']).len();
      return Span::new(extent.start - leading, extent.end);
    }
    return Span::new(extent.start, extent.end + trailing_ws);
  }

  if rest.starts_with("\r\n") {
    end += 2;
  } else if rest.starts_with('\n') {
    end += 1;
  }

  Span::new(line_start, end)
}

/// Length of the blank line `s` starts with, line break included.
fn blank_line(s: &str) -> Option<usize> {
  let blank = skip_blanks(s);
  if s[blank..].starts_with('\n') {
    Some(blank + 1)
  } else if s[blank..].starts_with("\r\n") {
    Some(blank + 2)
  } else {
    None
  }
}

fn skip_blanks(s: &str) -> usize {
  s.len() - s.trim_start_matches([' ', '\t']).len()
}
