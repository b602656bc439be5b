//! Go source lexer.
//!
//! Produces the token stream needed to recover the top-level structure of a
//! Go file. Automatic semicolons are inserted following the Go specification:
//! a newline (or end of file) after an identifier, literal, one of the
//! keywords `break`, `continue`, `fallthrough`, `return`, or one of the
//! operators `++ -- ) ] }` terminates the statement. Inserted semicolons carry
//! an empty span.
//!
//! Comments are not part of the token stream; their spans are collected
//! separately so the parser can attach doc comments to declarations.

use std::fmt;

use super::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
  Break,
  Case,
  Chan,
  Const,
  Continue,
  Default,
  Defer,
  Else,
  Fallthrough,
  For,
  Func,
  Go,
  Goto,
  If,
  Import,
  Interface,
  Map,
  Package,
  Range,
  Return,
  Select,
  Struct,
  Switch,
  Type,
  Var,
}

impl Keyword {
  fn lookup(ident: &str) -> Option<Self> {
    let kw = match ident {
      "break" => Keyword::Break,
      "case" => Keyword::Case,
      "chan" => Keyword::Chan,
      "const" => Keyword::Const,
      "continue" => Keyword::Continue,
      "default" => Keyword::Default,
      "defer" => Keyword::Defer,
      "else" => Keyword::Else,
      "fallthrough" => Keyword::Fallthrough,
      "for" => Keyword::For,
      "func" => Keyword::Func,
      "go" => Keyword::Go,
      "goto" => Keyword::Goto,
      "if" => Keyword::If,
      "import" => Keyword::Import,
      "interface" => Keyword::Interface,
      "map" => Keyword::Map,
      "package" => Keyword::Package,
      "range" => Keyword::Range,
      "return" => Keyword::Return,
      "select" => Keyword::Select,
      "struct" => Keyword::Struct,
      "switch" => Keyword::Switch,
      "type" => Keyword::Type,
      "var" => Keyword::Var,
      _ => return None,
    };
    Some(kw)
  }

  fn ends_statement(self) -> bool {
    matches!(
      self,
      Keyword::Break | Keyword::Continue | Keyword::Fallthrough | Keyword::Return
    )
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
  Ident,
  Keyword(Keyword),
  Number,
  Char,
  String,
  LParen,
  RParen,
  LBrack,
  RBrack,
  LBrace,
  RBrace,
  Comma,
  Semi,
  Star,
  Assign,
  Dot,
  /// Any other operator or delimiter.
  Op,
  Eof,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
  pub kind: TokenKind,
  pub span: Span,
}

impl Token {
  /// Whether this is a semicolon inserted at a newline or end of file.
  pub fn is_implicit(&self) -> bool {
    self.kind == TokenKind::Semi && self.span.is_empty()
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
  pub message: String,
  pub offset: usize,
}

impl fmt::Display for LexError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} (at byte {})", self.message, self.offset)
  }
}

impl std::error::Error for LexError {}

/// Byte order mark, skipped when it starts the input.
const BOM: char = '\u{feff}';

/// Operators ordered longest first so the first prefix match wins.
const OPERATORS: &[&str] = &[
  "<<=", ">>=", "&^=", "...", "&&", "||", "<-", "++", "--", "==", "!=", "<=", ">=", ":=", "+=", "-=", "*=", "/=",
  "%=", "&=", "|=", "^=", "<<", ">>", "&^", "+", "-", "*", "/", "%", "&", "|", "^", "<", ">", "=", "!", "(", ")", "[",
  "]", "{", "}", ",", ";", ".", ":", "~",
];

/// Pull-based lexer over a Go source file.
pub struct Lexer<'a> {
  src: &'a str,
  pos: usize,
  insert_semi: bool,
  comments: Vec<Span>,
  finished: bool,
}

impl<'a> Lexer<'a> {
  pub fn new(src: &'a str) -> Self {
    Self {
      src,
      pos: if src.starts_with(BOM) { BOM.len_utf8() } else { 0 },
      insert_semi: false,
      comments: Vec::new(),
      finished: false,
    }
  }

  /// Lex the whole input. Returns the tokens (ending with `Eof`) and comment spans.
  pub fn tokenize(mut self) -> Result<(Vec<Token>, Vec<Span>), LexError> {
    let mut tokens = Vec::new();
    loop {
      let token = self.next_token()?;
      tokens.push(token);
      if token.kind == TokenKind::Eof {
        break;
      }
    }
    Ok((tokens, self.comments))
  }

  pub fn next_token(&mut self) -> Result<Token, LexError> {
    if self.finished {
      return Ok(self.token(TokenKind::Eof, self.pos, self.pos));
    }

    if let Some(semi) = self.skip_trivia()? {
      return Ok(semi);
    }

    let start = self.pos;
    let Some(ch) = self.peek() else {
      self.finished = true;
      return Ok(self.token(TokenKind::Eof, start, start));
    };

    let kind = if is_letter(ch) {
      self.lex_ident()
    } else if ch.is_ascii_digit() || (ch == '.' && self.peek_nth(1).is_some_and(|c| c.is_ascii_digit())) {
      self.lex_number();
      TokenKind::Number
    } else if ch == '"' {
      self.lex_quoted('"', "string literal not terminated")?;
      TokenKind::String
    } else if ch == '\'' {
      self.lex_quoted('\'', "rune literal not terminated")?;
      TokenKind::Char
    } else if ch == '`' {
      self.lex_raw_string()?;
      TokenKind::String
    } else {
      self.lex_operator()?
    };

    self.insert_semi = match kind {
      TokenKind::Ident | TokenKind::Number | TokenKind::Char | TokenKind::String => true,
      TokenKind::RParen | TokenKind::RBrack | TokenKind::RBrace => true,
      TokenKind::Keyword(kw) => kw.ends_statement(),
      TokenKind::Op => matches!(&self.src[start..self.pos], "++" | "--"),
      _ => false,
    };

    Ok(self.token(kind, start, self.pos))
  }

  fn token(&self, kind: TokenKind, start: usize, end: usize) -> Token {
    Token {
      kind,
      span: Span { start, end },
    }
  }

  fn peek(&self) -> Option<char> {
    self.src[self.pos..].chars().next()
  }

  fn peek_nth(&self, n: usize) -> Option<char> {
    self.src[self.pos..].chars().nth(n)
  }

  fn bump(&mut self) -> Option<char> {
    let ch = self.peek()?;
    self.pos += ch.len_utf8();
    Some(ch)
  }

  /// Skip whitespace and comments, returning an inserted semicolon if one is due.
  fn skip_trivia(&mut self) -> Result<Option<Token>, LexError> {
    loop {
      match self.peek() {
        Some(' ' | '\t' | '\r') => {
          self.bump();
        }
        Some('\n') => {
          if self.insert_semi {
            self.insert_semi = false;
            let semi = self.token(TokenKind::Semi, self.pos, self.pos);
            self.bump();
            return Ok(Some(semi));
          }
          self.bump();
        }
        Some('/') if self.peek_nth(1) == Some('/') => {
          let start = self.pos;
          while let Some(ch) = self.peek() {
            if ch == '\n' {
              break;
            }
            self.bump();
          }
          self.comments.push(Span { start, end: self.pos });
        }
        Some('/') if self.peek_nth(1) == Some('*') => {
          let start = self.pos;
          let Some(len) = self.src[start + 2..].find("*/") else {
            return Err(LexError {
              message: "comment not terminated".to_string(),
              offset: start,
            });
          };
          self.pos = start + 2 + len + 2;
          self.comments.push(Span { start, end: self.pos });
          // A multi-line comment acts like a newline.
          if self.insert_semi && self.src[start..self.pos].contains('\n') {
            self.insert_semi = false;
            return Ok(Some(self.token(TokenKind::Semi, start, start)));
          }
        }
        None => {
          if self.insert_semi {
            self.insert_semi = false;
            return Ok(Some(self.token(TokenKind::Semi, self.pos, self.pos)));
          }
          return Ok(None);
        }
        Some(_) => return Ok(None),
      }
    }
  }

  fn lex_ident(&mut self) -> TokenKind {
    let start = self.pos;
    while let Some(ch) = self.peek() {
      if !(is_letter(ch) || ch.is_numeric()) {
        break;
      }
      self.bump();
    }
    match Keyword::lookup(&self.src[start..self.pos]) {
      Some(kw) => TokenKind::Keyword(kw),
      None => TokenKind::Ident,
    }
  }

  fn lex_number(&mut self) {
    let start = self.pos;
    let hex = self.src[start..].starts_with("0x") || self.src[start..].starts_with("0X");
    let mut prev = '\0';
    while let Some(ch) = self.peek() {
      let exponent_sign = (ch == '+' || ch == '-')
        && if hex {
          matches!(prev, 'p' | 'P')
        } else {
          matches!(prev, 'e' | 'E')
        };
      if !(ch.is_ascii_alphanumeric() || ch == '_' || ch == '.' || exponent_sign) {
        break;
      }
      prev = ch;
      self.bump();
    }
  }

  fn lex_quoted(&mut self, quote: char, unterminated: &str) -> Result<(), LexError> {
    let start = self.pos;
    self.bump();
    loop {
      match self.bump() {
        Some('\\') => {
          self.bump();
        }
        Some(ch) if ch == quote => return Ok(()),
        Some('\n') | None => {
          return Err(LexError {
            message: unterminated.to_string(),
            offset: start,
          });
        }
        Some(_) => {}
      }
    }
  }

  fn lex_raw_string(&mut self) -> Result<(), LexError> {
    let start = self.pos;
    match self.src[start + 1..].find('`') {
      Some(len) => {
        self.pos = start + 1 + len + 1;
        Ok(())
      }
      None => Err(LexError {
        message: "raw string literal not terminated".to_string(),
        offset: start,
      }),
    }
  }

  fn lex_operator(&mut self) -> Result<TokenKind, LexError> {
    let rest = &self.src[self.pos..];
    let Some(op) = OPERATORS.iter().find(|op| rest.starts_with(**op)) else {
      return Err(LexError {
        message: format!("invalid character {:?}", self.peek().unwrap_or_default()),
        offset: self.pos,
      });
    };
    self.pos += op.len();
    Ok(match *op {
      "(" => TokenKind::LParen,
      ")" => TokenKind::RParen,
      "[" => TokenKind::LBrack,
      "]" => TokenKind::RBrack,
      "{" => TokenKind::LBrace,
      "}" => TokenKind::RBrace,
      "," => TokenKind::Comma,
      ";" => TokenKind::Semi,
      "*" => TokenKind::Star,
      "=" => TokenKind::Assign,
      "." => TokenKind::Dot,
      _ => TokenKind::Op,
    })
  }
}

fn is_letter(ch: char) -> bool {
  ch == '_' || ch.is_alphabetic()
}
