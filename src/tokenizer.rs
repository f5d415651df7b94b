//! Lexical analysis: turns the raw input string into a vector of tokens.
//!
//! The tokenizer knows nothing about semantics beyond classifying
//! identifiers, numbers, relational operators, the `while` keyword and
//! punctuation. Multi-character operators are matched before single-character
//! ones. Characters that start no token become `Invalid` tokens so the parser
//! can report them and recover instead of abandoning the whole input.

/// Kinds of tokens recognised by the front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
  Ident,
  Num,
  RelOp,
  While,
  Punctuator,
  Invalid,
  Eof,
}

/// Lexical information needed by later stages. The text is recovered from
/// the source with [`token_text`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
  pub kind: TokenKind,
  pub loc: usize,
  pub len: usize,
}

impl Token {
  pub fn new(kind: TokenKind, loc: usize, len: usize) -> Self {
    Self { kind, loc, len }
  }
}

const REL_OPS: [&str; 6] = ["<=", ">=", "==", "!=", "<", ">"];

/// Lex the input into a flat vector of tokens terminated by an `Eof` marker.
pub fn tokenize(input: &str) -> Vec<Token> {
  let mut tokens = Vec::new();
  let bytes = input.as_bytes();
  let mut i = 0;

  while i < bytes.len() {
    let c = bytes[i];
    if c.is_ascii_whitespace() {
      i += 1;
      continue;
    }

    if c.is_ascii_digit() {
      let start = i;
      i = scan_digits(bytes, i);
      if i + 1 < bytes.len() && bytes[i] == b'.' && bytes[i + 1].is_ascii_digit() {
        i = scan_digits(bytes, i + 1);
      }
      tokens.push(Token::new(TokenKind::Num, start, i - start));
      continue;
    }

    if c.is_ascii_alphabetic() || c == b'_' {
      let start = i;
      while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
        i += 1;
      }
      let kind = if &input[start..i] == "while" {
        TokenKind::While
      } else {
        TokenKind::Ident
      };
      tokens.push(Token::new(kind, start, i - start));
      continue;
    }

    if let Some(op) = REL_OPS.into_iter().find(|op| input[i..].starts_with(op)) {
      tokens.push(Token::new(TokenKind::RelOp, i, op.len()));
      i += op.len();
      continue;
    }

    if matches!(
      c,
      b'+' | b'-' | b'*' | b'/' | b'(' | b')' | b'{' | b'}' | b';' | b'='
    ) {
      tokens.push(Token::new(TokenKind::Punctuator, i, 1));
      i += 1;
      continue;
    }

    let len = input[i..].chars().next().map_or(1, char::len_utf8);
    tokens.push(Token::new(TokenKind::Invalid, i, len));
    i += len;
  }

  tokens.push(Token::new(TokenKind::Eof, input.len(), 0));
  tokens
}

fn scan_digits(bytes: &[u8], mut i: usize) -> usize {
  while i < bytes.len() && bytes[i].is_ascii_digit() {
    i += 1;
  }
  i
}

/// Return the slice from the source that produced this token.
pub fn token_text<'a>(token: &Token, source: &'a str) -> &'a str {
  let end = token.loc + token.len;
  &source[token.loc..end]
}

/// Human-friendly description used in diagnostics.
pub fn describe_token(token: Option<&Token>, source: &str) -> String {
  match token {
    Some(t) => match t.kind {
      TokenKind::Eof => "EOF".to_string(),
      _ => token_text(t, source).to_string(),
    },
    None => "EOF".to_string(),
  }
}
