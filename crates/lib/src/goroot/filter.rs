//! Symbol-level pruning of vanilla sources.
//!
//! Overlay files declare replacements for vanilla symbols. A [`SymbolFilter`]
//! records the top-level names an overlay package declares and removes the
//! same names from the vanilla files of that package, so the merged package
//! has exactly one declaration per name.

use std::collections::HashSet;

use crate::syntax::{Decl, SourceFile, Spec};

/// Qualified top-level names declared by the overlay for one package.
///
/// Functions, types, constants and variables are keyed by their identifier;
/// methods by `Type.Method`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolFilter {
  names: HashSet<String>,
}

impl SymbolFilter {
  pub fn new() -> Self {
    Self::default()
  }

  /// Record every top-level name declared by `file`.
  ///
  /// Never modifies the file, so it always returns `false`.
  pub fn collect(&mut self, file: &mut SourceFile) -> bool {
    traverse(file, |name| {
      self.names.insert(name.to_string());
      true
    })
  }

  /// Remove the declarations of `file` whose names were collected.
  ///
  /// Functions, methods and types are deleted. Constants and variables are
  /// renamed to `_` one name at a time, since a spec can bind several names.
  /// Imports are left alone. Returns whether the file was modified.
  pub fn prune(&self, file: &mut SourceFile) -> bool {
    if self.names.is_empty() {
      return false;
    }
    traverse(file, |name| !self.names.contains(name))
  }

  pub fn contains(&self, name: &str) -> bool {
    self.names.contains(name)
  }

  pub fn len(&self) -> usize {
    self.names.len()
  }

  pub fn is_empty(&self) -> bool {
    self.names.is_empty()
  }

  pub fn names(&self) -> impl Iterator<Item = &str> {
    self.names.iter().map(String::as_str)
  }
}

impl<S: Into<String>> FromIterator<S> for SymbolFilter {
  fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
    Self {
      names: iter.into_iter().map(Into::into).collect(),
    }
  }
}

/// Visit every top-level name of `file`, dropping the ones `keep` rejects.
/// Blank identifiers are never visited.
fn traverse(file: &mut SourceFile, mut keep: impl FnMut(&str) -> bool) -> bool {
  let mut modified = false;

  for decl in &mut file.decls {
    match decl {
      Decl::Func(func) => {
        if func.name.is_blank() {
          continue;
        }
        if !keep(&func.qualified_name()) {
          func.delete();
          modified = true;
        }
      }
      Decl::Gen(gen_decl) => {
        for spec in &mut gen_decl.specs {
          match spec {
            Spec::Import(_) => {}
            Spec::Type(ty) => {
              if !ty.name.is_blank() && !keep(&ty.name.name) {
                ty.delete();
                modified = true;
              }
            }
            Spec::Value(value) => {
              for name in &mut value.names {
                if !name.is_blank() && !keep(&name.name) {
                  name.rename("_");
                  modified = true;
                }
              }
            }
          }
        }
      }
    }
  }

  modified
}
