//! Top-level declaration tree.

use super::Span;

/// An identifier occurrence.
///
/// `name` starts out equal to the source text at `span`; renaming changes
/// `name` only, and the printer substitutes it at `span`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
  pub name: String,
  pub span: Span,
}

impl Ident {
  pub fn rename(&mut self, name: &str) {
    self.name = name.to_string();
  }

  pub fn is_blank(&self) -> bool {
    self.name == "_"
  }
}

/// A parsed Go file.
#[derive(Debug, Clone)]
pub struct SourceFile {
  pub(crate) src: String,
  pub package: Ident,
  pub decls: Vec<Decl>,
}

impl SourceFile {
  /// Original text the file was parsed from.
  pub fn source(&self) -> &str {
    &self.src
  }

  /// Text of `span` in the original source.
  pub fn text(&self, span: Span) -> &str {
    &self.src[span.start..span.end]
  }
}

#[derive(Debug, Clone)]
pub enum Decl {
  Func(FuncDecl),
  Gen(GenDecl),
}

impl Decl {
  /// Byte range of the declaration including its doc comment.
  pub fn extent(&self) -> Span {
    match self {
      Decl::Func(f) => f.extent(),
      Decl::Gen(g) => g.extent(),
    }
  }
}

#[derive(Debug, Clone)]
pub struct Receiver {
  /// Base type name with pointer indirection and type arguments stripped.
  pub type_name: Ident,
  pub pointer: bool,
}

#[derive(Debug, Clone)]
pub struct FuncDecl {
  pub recv: Option<Receiver>,
  pub name: Ident,
  pub span: Span,
  pub doc: Option<Span>,
  pub(crate) deleted: bool,
}

impl FuncDecl {
  /// `Type.Method` for methods, the bare name for functions.
  pub fn qualified_name(&self) -> String {
    match &self.recv {
      Some(recv) => format!("{}.{}", recv.type_name.name, self.name.name),
      None => self.name.name.clone(),
    }
  }

  pub fn delete(&mut self) {
    self.deleted = true;
  }

  pub fn is_deleted(&self) -> bool {
    self.deleted
  }

  pub fn extent(&self) -> Span {
    Span::new(self.doc.map_or(self.span.start, |d| d.start), self.span.end)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
  Import,
  Const,
  Type,
  Var,
}

/// An `import`, `const`, `type` or `var` declaration.
#[derive(Debug, Clone)]
pub struct GenDecl {
  pub kind: DeclKind,
  /// Whether the specs are wrapped in parentheses.
  pub grouped: bool,
  pub specs: Vec<Spec>,
  pub span: Span,
  pub doc: Option<Span>,
}

impl GenDecl {
  pub fn extent(&self) -> Span {
    Span::new(self.doc.map_or(self.span.start, |d| d.start), self.span.end)
  }

  /// True when the declaration had specs and every one of them is deleted.
  pub fn is_emptied(&self) -> bool {
    !self.specs.is_empty() && self.specs.iter().all(Spec::is_deleted)
  }
}

#[derive(Debug, Clone)]
pub enum Spec {
  Import(ImportSpec),
  Type(TypeSpec),
  Value(ValueSpec),
}

impl Spec {
  pub fn span(&self) -> Span {
    match self {
      Spec::Import(s) => s.span,
      Spec::Type(s) => s.span,
      Spec::Value(s) => s.span,
    }
  }

  pub fn is_deleted(&self) -> bool {
    match self {
      Spec::Type(s) => s.deleted,
      Spec::Import(_) | Spec::Value(_) => false,
    }
  }
}

#[derive(Debug, Clone)]
pub struct ImportSpec {
  pub span: Span,
}

#[derive(Debug, Clone)]
pub struct TypeSpec {
  pub name: Ident,
  pub span: Span,
  pub doc: Option<Span>,
  pub(crate) deleted: bool,
}

impl TypeSpec {
  pub fn delete(&mut self) {
    self.deleted = true;
  }

  pub fn is_deleted(&self) -> bool {
    self.deleted
  }

  pub fn extent(&self) -> Span {
    Span::new(self.doc.map_or(self.span.start, |d| d.start), self.span.end)
  }
}

/// A `const` or `var` spec, possibly binding several names.
///
/// Value specs are never deleted; individual names are renamed instead.
#[derive(Debug, Clone)]
pub struct ValueSpec {
  pub names: Vec<Ident>,
  pub span: Span,
}
