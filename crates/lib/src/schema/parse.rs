//! A small scanner for schema sources.
//!
//! Only the top-level `package` and `import` statements matter to rule
//! generation, so the scanner tokenizes just enough to find them: comments
//! and string literals are handled, everything else is skipped.

use std::fs;
use std::path::Path;

use thiserror::Error;

use super::types::{File, Import};

#[derive(Debug, Error)]
pub enum SchemaError {
  #[error("failed to read {path}: {source}")]
  Read {
    path: String,
    #[source]
    source: std::io::Error,
  },

  #[error("{file}:{line}: unterminated {what}")]
  Unterminated { file: String, line: usize, what: &'static str },

  #[error("{file}:{line}: {message}")]
  Syntax { file: String, line: usize, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
  Ident(String),
  Str(String),
  Punct(char),
}

/// Read and parse the schema file `basename` in directory `dir`.
///
/// `rel` is the package-relative directory recorded on the returned [`File`].
pub fn parse(rel: &str, dir: &Path, basename: &str) -> Result<File, SchemaError> {
  let path = dir.join(basename);
  let content = fs::read_to_string(&path).map_err(|source| SchemaError::Read {
    path: path.display().to_string(),
    source,
  })?;
  parse_str(rel, basename, &content)
}

/// Parse schema source text.
pub fn parse_str(rel: &str, basename: &str, content: &str) -> Result<File, SchemaError> {
  let tokens = tokenize(basename, content)?;

  let mut file = File::new(rel, basename, Vec::new());
  let mut depth = 0usize;
  let mut i = 0;
  while i < tokens.len() {
    let (line, token) = &tokens[i];
    match token {
      Token::Punct('{') => depth += 1,
      Token::Punct('}') => depth = depth.saturating_sub(1),
      Token::Ident(word) if depth == 0 && word == "import" => {
        let mut j = i + 1;
        if matches!(tokens.get(j), Some((_, Token::Ident(q))) if q == "public" || q == "weak") {
          j += 1;
        }
        match tokens.get(j) {
          Some((_, Token::Str(filename))) => {
            file.imports.push(Import::new(filename.clone()));
            i = j;
          }
          _ => {
            return Err(SchemaError::Syntax {
              file: basename.to_string(),
              line: *line,
              message: "expected string literal after 'import'".to_string(),
            });
          }
        }
      }
      Token::Ident(word) if depth == 0 && word == "package" => {
        let mut name = String::new();
        let mut j = i + 1;
        while let Some((_, tok)) = tokens.get(j) {
          match tok {
            Token::Ident(part) => name.push_str(part),
            Token::Punct('.') => name.push('.'),
            _ => break,
          }
          j += 1;
        }
        if name.is_empty() {
          return Err(SchemaError::Syntax {
            file: basename.to_string(),
            line: *line,
            message: "expected name after 'package'".to_string(),
          });
        }
        file.package = Some(name);
        i = j.saturating_sub(1);
      }
      _ => {}
    }
    i += 1;
  }

  Ok(file)
}

fn tokenize(file: &str, content: &str) -> Result<Vec<(usize, Token)>, SchemaError> {
  let mut tokens = Vec::new();
  let mut chars = content.chars().peekable();
  let mut line = 1;

  while let Some(c) = chars.next() {
    match c {
      '\n' => line += 1,
      c if c.is_whitespace() => {}
      '/' if chars.peek() == Some(&'/') => {
        for c in chars.by_ref() {
          if c == '\n' {
            line += 1;
            break;
          }
        }
      }
      '/' if chars.peek() == Some(&'*') => {
        chars.next();
        let start = line;
        let mut prev = '\0';
        let mut closed = false;
        for c in chars.by_ref() {
          if c == '\n' {
            line += 1;
          }
          if prev == '*' && c == '/' {
            closed = true;
            break;
          }
          prev = c;
        }
        if !closed {
          return Err(SchemaError::Unterminated {
            file: file.to_string(),
            line: start,
            what: "block comment",
          });
        }
      }
      '"' | '\'' => {
        let quote = c;
        let mut value = String::new();
        let mut closed = false;
        while let Some(c) = chars.next() {
          match c {
            '\\' => {
              if let Some(escaped) = chars.next() {
                value.push(escaped);
              }
            }
            '\n' => break,
            c if c == quote => {
              closed = true;
              break;
            }
            c => value.push(c),
          }
        }
        if !closed {
          return Err(SchemaError::Unterminated {
            file: file.to_string(),
            line,
            what: "string literal",
          });
        }
        tokens.push((line, Token::Str(value)));
      }
      c if c.is_alphanumeric() || c == '_' => {
        let mut ident = String::from(c);
        while let Some(&next) = chars.peek() {
          if next.is_alphanumeric() || next == '_' {
            ident.push(next);
            chars.next();
          } else {
            break;
          }
        }
        tokens.push((line, Token::Ident(ident)));
      }
      c => tokens.push((line, Token::Punct(c))),
    }
  }

  Ok(tokens)
}
