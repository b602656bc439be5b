//! Top-level Go parser.
//!
//! Recognizes the package clause and the shape of every top-level
//! declaration. Anything below the top level (function bodies, type
//! definitions, initializer expressions) is only checked for balanced
//! brackets and otherwise skipped.

use super::ast::{Decl, DeclKind, FuncDecl, GenDecl, Ident, ImportSpec, Receiver, SourceFile, Spec, TypeSpec, ValueSpec};
use super::lexer::{Keyword, Lexer, Token, TokenKind};
use super::{LineIndex, ParseError, Span};

/// Parse `src` as a Go source file. `file` is only used in error messages.
pub fn parse_file(file: &str, src: impl Into<String>) -> Result<SourceFile, ParseError> {
  let src = src.into();
  let lines = LineIndex::new(&src);

  let (tokens, comments) = Lexer::new(&src).tokenize().map_err(|e| {
    let (line, column) = lines.position(&src, e.offset);
    ParseError {
      file: file.to_string(),
      line,
      column,
      message: e.message,
    }
  })?;

  let mut parser = Parser {
    file,
    src: &src,
    lines: &lines,
    tokens,
    comments,
    pos: 0,
  };
  let (package, decls) = parser.parse()?;

  Ok(SourceFile { src, package, decls })
}

struct Parser<'a> {
  file: &'a str,
  src: &'a str,
  lines: &'a LineIndex,
  tokens: Vec<Token>,
  comments: Vec<Span>,
  pos: usize,
}

impl<'a> Parser<'a> {
  fn parse(&mut self) -> Result<(Ident, Vec<Decl>), ParseError> {
    self.expect_keyword(Keyword::Package, "package clause")?;
    let package = self.expect_ident()?;
    self.expect_terminator()?;

    let mut decls = Vec::new();
    loop {
      let token = self.peek();
      match token.kind {
        TokenKind::Eof => break,
        TokenKind::Semi => {
          self.bump();
        }
        TokenKind::Keyword(Keyword::Func) => decls.push(Decl::Func(self.parse_func()?)),
        TokenKind::Keyword(kw @ (Keyword::Import | Keyword::Const | Keyword::Type | Keyword::Var)) => {
          let kind = match kw {
            Keyword::Import => DeclKind::Import,
            Keyword::Const => DeclKind::Const,
            Keyword::Type => DeclKind::Type,
            _ => DeclKind::Var,
          };
          decls.push(Decl::Gen(self.parse_gen(kind)?));
        }
        _ => return Err(self.error_at(token, "expected declaration")),
      }
    }

    Ok((package, decls))
  }

  fn parse_func(&mut self) -> Result<FuncDecl, ParseError> {
    let start = self.bump().span.start;
    let doc = self.doc_comment(start);

    let recv = if self.peek().kind == TokenKind::LParen {
      let open = self.pos;
      self.skip_group()?;
      Some(self.receiver(open + 1, self.pos - 1)?)
    } else {
      None
    };

    let name = self.expect_ident()?;
    self.skip_until(false)?;
    let end = self.finish_decl()?;

    Ok(FuncDecl {
      recv,
      name,
      span: Span::new(start, end),
      doc,
      deleted: false,
    })
  }

  /// Extract the receiver base type from tokens `[from, to)`.
  fn receiver(&self, from: usize, to: usize) -> Result<Receiver, ParseError> {
    let toks = &self.tokens[from..to];
    let mut i = 0;

    // Skip the receiver name, if present.
    if toks.len() >= 2
      && toks[0].kind == TokenKind::Ident
      && matches!(toks[1].kind, TokenKind::Ident | TokenKind::Star | TokenKind::LParen)
    {
      i = 1;
    }

    let mut pointer = false;
    while let Some(tok) = toks.get(i) {
      match tok.kind {
        TokenKind::LParen => i += 1,
        TokenKind::Star if !pointer => {
          pointer = true;
          i += 1;
        }
        TokenKind::Ident => {
          return Ok(Receiver {
            type_name: self.ident(*tok),
            pointer,
          });
        }
        _ => break,
      }
    }

    let at = toks.get(i).copied().unwrap_or(self.tokens[to]);
    Err(self.error_at(at, "invalid receiver"))
  }

  fn parse_gen(&mut self, kind: DeclKind) -> Result<GenDecl, ParseError> {
    let start = self.bump().span.start;
    let doc = self.doc_comment(start);

    let mut specs = Vec::new();
    let grouped = self.peek().kind == TokenKind::LParen;
    if grouped {
      self.bump();
      loop {
        let token = self.peek();
        match token.kind {
          TokenKind::RParen => {
            self.bump();
            break;
          }
          TokenKind::Semi => {
            self.bump();
          }
          TokenKind::Eof => return Err(self.error_at(token, "expected ')'")),
          _ => specs.push(self.parse_spec(kind, true)?),
        }
      }
    } else {
      specs.push(self.parse_spec(kind, false)?);
    }

    let end = self.finish_decl()?;
    Ok(GenDecl {
      kind,
      grouped,
      specs,
      span: Span::new(start, end),
      doc,
    })
  }

  fn parse_spec(&mut self, kind: DeclKind, in_group: bool) -> Result<Spec, ParseError> {
    let start = self.peek().span.start;

    let spec = match kind {
      DeclKind::Import => {
        self.skip_until(in_group)?;
        Spec::Import(ImportSpec {
          span: Span::new(start, self.prev_end()),
        })
      }
      DeclKind::Type => {
        let name = self.expect_ident()?;
        self.skip_until(in_group)?;
        Spec::Type(TypeSpec {
          name,
          span: Span::new(start, self.prev_end()),
          doc: if in_group { self.doc_comment(start) } else { None },
          deleted: false,
        })
      }
      DeclKind::Const | DeclKind::Var => {
        let mut names = vec![self.expect_ident()?];
        while self.peek().kind == TokenKind::Comma {
          self.bump();
          names.push(self.expect_ident()?);
        }
        self.skip_until(in_group)?;
        Spec::Value(ValueSpec {
          names,
          span: Span::new(start, self.prev_end()),
        })
      }
    };

    if !in_group {
      return Ok(spec);
    }

    // Specs inside a group own their explicit terminator.
    let token = self.peek();
    match token.kind {
      TokenKind::Semi if !token.is_implicit() => {
        self.bump();
        Ok(extend_spec(spec, token.span.end))
      }
      TokenKind::Semi => {
        self.bump();
        Ok(spec)
      }
      TokenKind::RParen => Ok(spec),
      _ => Err(self.error_at(token, "expected ';' or ')'")),
    }
  }

  /// Consume the declaration terminator; returns the end of the declaration.
  fn finish_decl(&mut self) -> Result<usize, ParseError> {
    let end = self.prev_end();
    let token = self.peek();
    match token.kind {
      TokenKind::Semi => {
        self.bump();
        Ok(if token.is_implicit() { end } else { token.span.end })
      }
      TokenKind::Eof => Ok(end),
      _ => Err(self.error_at(token, "expected ';' after top level declaration")),
    }
  }

  /// Skip tokens until a top-level `;` (or `)` when `in_group`), keeping
  /// brackets balanced. The terminator is not consumed.
  fn skip_until(&mut self, in_group: bool) -> Result<(), ParseError> {
    let mut stack: Vec<TokenKind> = Vec::new();
    loop {
      let token = self.peek();
      match token.kind {
        TokenKind::Eof if stack.is_empty() => return Ok(()),
        TokenKind::Eof => return Err(self.error_at(token, "unexpected end of file")),
        TokenKind::Semi if stack.is_empty() => return Ok(()),
        TokenKind::RParen if stack.is_empty() && in_group => return Ok(()),
        TokenKind::LParen => stack.push(TokenKind::RParen),
        TokenKind::LBrack => stack.push(TokenKind::RBrack),
        TokenKind::LBrace => stack.push(TokenKind::RBrace),
        TokenKind::RParen | TokenKind::RBrack | TokenKind::RBrace => {
          if stack.pop() != Some(token.kind) {
            return Err(self.error_at(token, "unbalanced brackets"));
          }
        }
        _ => {}
      }
      self.bump();
    }
  }

  /// Skip a parenthesized group starting at the current `(`.
  fn skip_group(&mut self) -> Result<(), ParseError> {
    let mut depth = 0usize;
    loop {
      let token = self.bump();
      match token.kind {
        TokenKind::LParen | TokenKind::LBrack | TokenKind::LBrace => depth += 1,
        TokenKind::RParen | TokenKind::RBrack | TokenKind::RBrace => {
          depth = depth
            .checked_sub(1)
            .ok_or_else(|| self.error_at(token, "unbalanced brackets"))?;
          if depth == 0 {
            return Ok(());
          }
        }
        TokenKind::Eof => return Err(self.error_at(token, "unexpected end of file")),
        _ => {}
      }
    }
  }

  /// Start of the comment block directly above the line containing `start`.
  fn doc_comment(&self, start: usize) -> Option<Span> {
    let mut line = self.lines.line(start);
    let mut doc: Option<Span> = None;
    let idx = self.comments.partition_point(|c| c.end <= start);

    for comment in self.comments[..idx].iter().rev() {
      let end_line = self.lines.line(comment.end);
      let start_line = self.lines.line(comment.start);
      let leading = &self.src[self.lines.line_start(start_line)..comment.start];
      if end_line + 1 != line || !leading.trim().is_empty() {
        break;
      }
      doc = Some(Span::new(comment.start, doc.map_or(comment.end, |d| d.end)));
      line = start_line;
    }
    doc
  }

  fn peek(&self) -> Token {
    self.tokens[self.pos]
  }

  fn bump(&mut self) -> Token {
    let token = self.tokens[self.pos];
    if token.kind != TokenKind::Eof {
      self.pos += 1;
    }
    token
  }

  fn prev_end(&self) -> usize {
    // Implicit semicolons are never consumed as part of a node.
    self.tokens[..self.pos]
      .iter()
      .rev()
      .find(|t| !t.is_implicit())
      .map_or(0, |t| t.span.end)
  }

  fn ident(&self, token: Token) -> Ident {
    Ident {
      name: self.src[token.span.start..token.span.end].to_string(),
      span: token.span,
    }
  }

  fn expect_ident(&mut self) -> Result<Ident, ParseError> {
    let token = self.peek();
    if token.kind != TokenKind::Ident {
      return Err(self.error_at(token, "expected identifier"));
    }
    self.bump();
    Ok(self.ident(token))
  }

  fn expect_keyword(&mut self, kw: Keyword, what: &str) -> Result<(), ParseError> {
    let token = self.peek();
    if token.kind != TokenKind::Keyword(kw) {
      return Err(self.error_at(token, &format!("expected {}", what)));
    }
    self.bump();
    Ok(())
  }

  fn expect_terminator(&mut self) -> Result<(), ParseError> {
    let token = self.peek();
    match token.kind {
      TokenKind::Semi => {
        self.bump();
        Ok(())
      }
      TokenKind::Eof => Ok(()),
      _ => Err(self.error_at(token, "expected ';'")),
    }
  }

  fn error_at(&self, token: Token, message: &str) -> ParseError {
    let (line, column) = self.lines.position(self.src, token.span.start);
    let found = match token.kind {
      TokenKind::Eof => "EOF".to_string(),
      _ if token.is_implicit() => "newline".to_string(),
      _ => format!("{:?}", &self.src[token.span.start..token.span.end]),
    };
    ParseError {
      file: self.file.to_string(),
      line,
      column,
      message: format!("{}, found {}", message, found),
    }
  }
}

fn extend_spec(spec: Spec, end: usize) -> Spec {
  match spec {
    Spec::Import(mut s) => {
      s.span.end = end;
      Spec::Import(s)
    }
    Spec::Type(mut s) => {
      s.span.end = end;
      Spec::Type(s)
    }
    Spec::Value(mut s) => {
      s.span.end = end;
      Spec::Value(s)
    }
  }
}
