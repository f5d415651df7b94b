//! Recursive-descent front end driving the translator.
//!
//! There is no syntax tree. Each helper returns the [`Name`] holding the
//! value of what it parsed, and calls into the [`TranslatorContext`] as soon
//! as a construct is complete, so instructions come out in source order while
//! the parse is still running. Precedence climbing follows the classic
//! layering: assignment, then additive, then multiplicative, then primaries.
//!
//! Syntax errors are recovered at statement granularity: the error is handed
//! to the caller's reporter, tokens are skipped up to the end of the broken
//! statement, and parsing resumes with the next one. A loop body recovers
//! inside its own block, so a broken statement never swallows the `}` that
//! closes the loop.
//!
//! Loops and parentheses each cost a few native stack frames, so they may nest
//! at most [`MAX_NESTING`] levels deep. Anything deeper is a syntax error on
//! the offending `while` or `(` and is recovered like any other.

use std::io::Write;

use crate::error::{CompileError, CompileResult};
use crate::tac::{Name, Op};
use crate::tokenizer::{Token, TokenKind, describe_token, token_text};
use crate::translator::TranslatorContext;

/// Deepest combined nesting of `while` loops and parentheses.
pub const MAX_NESTING: usize = 256;

/// Parse and translate a whole program.
///
/// Every recovered syntax error is passed to `report` when it is detected.
/// Returns the number of errors recovered. Internal errors and failures of
/// `report` end the parse.
pub fn parse<W, F>(
  tokens: Vec<Token>,
  source: &str,
  ctx: &mut TranslatorContext<W>,
  report: F,
) -> CompileResult<usize>
where
  W: Write,
  F: FnMut(CompileError) -> CompileResult<()>,
{
  let mut parser = Parser {
    stream: TokenStream::new(tokens, source),
    ctx,
    report,
    errors: 0,
    nesting: 0,
  };

  while !parser.stream.is_eof() {
    if let Err(err) = parser.parse_stmt() {
      parser.recover(err, false)?;
    }
  }

  Ok(parser.errors)
}

struct Parser<'a, W: Write, F> {
  stream: TokenStream<'a>,
  ctx: &'a mut TranslatorContext<W>,
  report: F,
  errors: usize,
  nesting: usize,
}

impl<W, F> Parser<'_, W, F>
where
  W: Write,
  F: FnMut(CompileError) -> CompileResult<()>,
{
  fn parse_stmt(&mut self) -> CompileResult<()> {
    if self.stream.peek_kind() == Some(TokenKind::While) {
      return self.parse_while();
    }
    self.parse_expr_stmt()
  }

  /// Nothing the statement itself produces (assignments or the print) is
  /// emitted until its `;` has been seen.
  fn parse_expr_stmt(&mut self) -> CompileResult<()> {
    let (targets, value) = self.parse_assign()?;
    self.stream.skip(";")?;
    if targets.is_empty() {
      return self.ctx.print(value);
    }
    targets
      .into_iter()
      .rev()
      .try_fold(value, |value, target| self.ctx.assign(target, value))
      .map(drop)
  }

  fn parse_while(&mut self) -> CompileResult<()> {
    self.enter()?;
    self.stream.pos += 1;
    let result = self.parse_loop();
    self.nesting -= 1;
    result
  }

  /// `while ( cond ) { stmt* }`, with the three loop checkpoints.
  fn parse_loop(&mut self) -> CompileResult<()> {
    self.ctx.while_begin()?;

    let cond = match self.parse_while_header() {
      Ok(cond) => cond,
      Err(err) => {
        self.ctx.while_abandon()?;
        return Err(err);
      }
    };
    self.ctx.while_condition(cond)?;

    // The loop is closed even when the body runs off the end of the input.
    let body = self.parse_block();
    self.ctx.while_end()?;
    body
  }

  fn parse_while_header(&mut self) -> CompileResult<Name> {
    self.stream.skip("(")?;
    let cond = self.parse_cond()?;
    self.stream.skip(")")?;
    self.stream.skip("{")?;
    Ok(cond)
  }

  /// Statements up to and including the closing `}`.
  fn parse_block(&mut self) -> CompileResult<()> {
    loop {
      if self.stream.equal("}") {
        return Ok(());
      }
      if self.stream.is_eof() {
        return Err(self.stream.unexpected("\"}\""));
      }
      if let Err(err) = self.parse_stmt() {
        self.recover(err, true)?;
      }
    }
  }

  fn parse_cond(&mut self) -> CompileResult<Name> {
    let lhs = self.parse_arith()?;
    let relop = self.stream.get_relop()?;
    let rhs = self.parse_arith()?;
    self.ctx.condition(lhs, relop, rhs)
  }

  /// `target = ... = expr`: the targets, leftmost first, and the value.
  fn parse_assign(&mut self) -> CompileResult<(Vec<Name>, Name)> {
    let mut targets = Vec::new();
    while self.stream.peek_kind() == Some(TokenKind::Ident) && self.stream.is_punct_at(1, "=") {
      targets.push(Name::new(self.stream.get_ident()?));
      self.stream.skip("=")?;
    }

    Ok((targets, self.parse_arith()?))
  }

  fn parse_arith(&mut self) -> CompileResult<Name> {
    let mut lhs = self.parse_term()?;

    while let Some(op) = self.stream.take_op(&["+", "-"]) {
      let rhs = self.parse_term()?;
      lhs = self.ctx.binary(op, lhs, rhs)?;
    }

    Ok(lhs)
  }

  fn parse_term(&mut self) -> CompileResult<Name> {
    let mut lhs = self.parse_primary()?;

    while let Some(op) = self.stream.take_op(&["*", "/"]) {
      let rhs = self.parse_primary()?;
      lhs = self.ctx.binary(op, lhs, rhs)?;
    }

    Ok(lhs)
  }

  fn parse_primary(&mut self) -> CompileResult<Name> {
    if self.stream.is_punct_at(0, "(") {
      self.enter()?;
      self.stream.pos += 1;
      let inner = self.parse_arith();
      let closed = inner.and_then(|inner| self.stream.skip(")").map(|()| inner));
      self.nesting -= 1;
      return closed;
    }

    match self.stream.peek_kind() {
      Some(TokenKind::Ident | TokenKind::Num) => {
        let text = self.stream.advance_text();
        Ok(self.ctx.atom(text))
      }
      _ => Err(self.stream.unexpected("an expression")),
    }
  }

  /// Open one nesting level at the current token.
  fn enter(&mut self) -> CompileResult<()> {
    if self.nesting >= MAX_NESTING {
      return Err(CompileError::at(
        self.stream.source,
        self.stream.loc(),
        format!("nesting too deep (at most {MAX_NESTING} loops and parentheses)"),
      ));
    }
    self.nesting += 1;
    Ok(())
  }

  /// Report a syntax error and skip to the start of the next statement.
  /// Anything else is passed back up.
  fn recover(&mut self, err: CompileError, in_block: bool) -> CompileResult<()> {
    if !err.is_recoverable() {
      return Err(err);
    }
    self.errors += 1;
    (self.report)(err)?;
    self.stream.synchronize(in_block);
    Ok(())
  }
}

/// Lightweight cursor over the token vector.
struct TokenStream<'a> {
  tokens: Vec<Token>,
  source: &'a str,
  pos: usize,
}

impl<'a> TokenStream<'a> {
  fn new(tokens: Vec<Token>, source: &'a str) -> Self {
    Self {
      tokens,
      source,
      pos: 0,
    }
  }

  fn peek(&self) -> Option<&Token> {
    self.tokens.get(self.pos)
  }

  /// Byte offset of the current token.
  fn loc(&self) -> usize {
    self.peek().map_or(self.source.len(), |token| token.loc)
  }

  fn peek_kind(&self) -> Option<TokenKind> {
    self.peek().map(|token| token.kind)
  }

  fn is_punct_at(&self, offset: usize, op: &str) -> bool {
    self
      .tokens
      .get(self.pos + offset)
      .is_some_and(|token| token.kind == TokenKind::Punctuator && token_text(token, self.source) == op)
  }

  /// Consume the current token if it matches the provided punctuator.
  fn equal(&mut self, op: &str) -> bool {
    if self.is_punct_at(0, op) {
      self.pos += 1;
      return true;
    }
    false
  }

  fn skip(&mut self, s: &str) -> CompileResult<()> {
    if self.equal(s) {
      Ok(())
    } else {
      Err(self.unexpected(&format!("\"{s}\"")))
    }
  }

  /// Consume an arithmetic operator from `ops` if one is next.
  fn take_op(&mut self, ops: &[&str]) -> Option<Op> {
    let op = ops.iter().find(|op| self.is_punct_at(0, op))?;
    self.pos += 1;
    Op::arith(op)
  }

  /// Consume the current token and return its text.
  fn advance_text(&mut self) -> &'a str {
    let source = self.source;
    match self.tokens.get(self.pos) {
      Some(token) => {
        self.pos += 1;
        token_text(token, source)
      }
      None => "",
    }
  }

  fn get_ident(&mut self) -> CompileResult<&'a str> {
    if self.peek_kind() == Some(TokenKind::Ident) {
      return Ok(self.advance_text());
    }
    Err(self.unexpected("an identifier"))
  }

  fn get_relop(&mut self) -> CompileResult<&'a str> {
    if self.peek_kind() == Some(TokenKind::RelOp) {
      return Ok(self.advance_text());
    }
    Err(self.unexpected("a relational operator"))
  }

  /// Syntax error at the current token.
  fn unexpected(&self, expected: &str) -> CompileError {
    let Some(token) = self.peek() else {
      return CompileError::at(
        self.source,
        self.source.len(),
        format!("expected {expected}, but reached end of input"),
      );
    };
    let got = describe_token(Some(token), self.source);
    let message = if token.kind == TokenKind::Invalid {
      format!("invalid token \"{got}\"")
    } else {
      format!("expected {expected}, but got \"{got}\"")
    };
    CompileError::at(self.source, token.loc, message)
  }

  /// Skip the rest of a broken statement.
  ///
  /// Stops after a `;` outside any braces, after a brace-delimited group that
  /// the statement opened, or at end of input. Inside a block, a `}` that
  /// would close the block is left for the block to consume; at top level a
  /// stray `}` is skipped.
  fn synchronize(&mut self, in_block: bool) {
    let mut depth = 0usize;
    while let Some(token) = self.peek() {
      if token.kind == TokenKind::Eof {
        return;
      }
      let text = token_text(token, self.source);
      let is_punct = token.kind == TokenKind::Punctuator;
      match text {
        ";" if is_punct && depth == 0 => {
          self.pos += 1;
          return;
        }
        "{" if is_punct => depth += 1,
        "}" if is_punct && depth == 0 => {
          if !in_block {
            self.pos += 1;
          }
          return;
        }
        "}" if is_punct => {
          depth -= 1;
          if depth == 0 {
            self.pos += 1;
            return;
          }
        }
        _ => {}
      }
      self.pos += 1;
    }
  }

  fn is_eof(&self) -> bool {
    matches!(self.peek_kind(), Some(TokenKind::Eof) | None)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::tokenizer::tokenize;

  fn run(source: &str) -> (String, Vec<String>) {
    let mut ctx = TranslatorContext::new(Vec::new());
    let mut errors = Vec::new();
    parse(tokenize(source), source, &mut ctx, |err| {
      errors.push(err.to_string());
      Ok(())
    })
    .unwrap();
    let code = String::from_utf8(ctx.finish().unwrap()).unwrap();
    (code, errors)
  }

  #[test]
  fn multiplication_binds_tighter_than_addition() {
    let (code, errors) = run("x = a + b * c - d;");
    assert!(errors.is_empty());
    assert_eq!(code, "t0 = b * c\nt1 = a + t0\nt2 = t1 - d\nx = t2\n");
  }

  #[test]
  fn subtraction_and_division_are_left_associative() {
    let (code, _) = run("y = a - b - c / d / e;");
    assert_eq!(
      code,
      "t0 = a - b\nt1 = c / d\nt2 = t1 / e\nt3 = t0 - t2\ny = t3\n"
    );
  }

  #[test]
  fn chained_assignment_is_right_associative() {
    let (code, _) = run("a = b = 3;");
    assert_eq!(code, "b = 3\na = b\n");
  }

  #[test]
  fn bare_expression_is_printed() {
    let (code, _) = run("a * 2;\n7;");
    assert_eq!(code, "t0 = a * 2\nprint t0\nprint 7\n");
  }

  #[test]
  fn relational_operator_text_passes_through() {
    for relop in ["<", "<=", ">", ">=", "==", "!="] {
      let source = format!("while (i {relop} 10) {{ i = i + 1; }}");
      let (code, errors) = run(&source);
      assert!(errors.is_empty(), "{relop}: {errors:?}");
      assert!(code.contains(&format!("t0 = i {relop} 10\n")), "{code}");
    }
  }

  #[test]
  fn empty_loop_body_still_loops() {
    let (code, _) = run("while (x > 0) { }");
    assert_eq!(
      code,
      "L0:\nt0 = x > 0\nif (t0) goto L1\ngoto L2\nL1:\ngoto L0\nL2:\n"
    );
  }

  #[test]
  fn error_inside_loop_body_keeps_the_loop() {
    let (code, errors) = run("while (a < b) { a = ; a = a + 1; }\nz = 1;");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("line 1, column 21: expected an expression"));
    assert_eq!(
      code,
      "L0:\nt0 = a < b\nif (t0) goto L1\ngoto L2\nL1:\nt1 = a + 1\na = t1\ngoto L0\nL2:\nz = 1\n"
    );
  }

  #[test]
  fn error_before_closing_brace_does_not_swallow_it() {
    let (code, errors) = run("while (a < b) { a = a + }\nc = 2;");
    assert_eq!(errors.len(), 1);
    assert!(code.ends_with("goto L0\nL2:\nc = 2\n"), "{code}");
  }

  #[test]
  fn broken_header_skips_the_whole_loop() {
    let (code, errors) = run("while (a <) { a = 1; }\nb = 2;");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("expected an expression, but got \")\""));
    assert_eq!(code, "L0:\nb = 2\n");
  }

  #[test]
  fn missing_relational_operator_is_reported() {
    let (_, errors) = run("while (a) { }");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("expected a relational operator, but got \")\""));
  }

  #[test]
  fn unterminated_body_is_closed_at_end_of_input() {
    let (code, errors) = run("while (a < b) { a = a + 1;");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("expected \"}\", but got \"EOF\""));
    assert!(code.ends_with("goto L0\nL2:\n"));
  }

  #[test]
  fn stray_closing_brace_at_top_level_is_skipped() {
    let (code, errors) = run("} a = 1;");
    assert_eq!(errors.len(), 1);
    assert_eq!(code, "a = 1\n");
  }

  #[test]
  fn invalid_character_is_reported_as_such() {
    let (code, errors) = run("a = 1 + $;\nb = 3;");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("invalid token \"$\""), "{}", errors[0]);
    assert_eq!(code, "b = 3\n");
  }

  #[test]
  fn broken_assignment_emits_nothing_of_its_own() {
    let (code, errors) = run("a = 1 + b = 3; c = 4;");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("expected \";\", but got \"=\""));
    assert_eq!(code, "t0 = 1 + b\nc = 4\n");

    let (code, errors) = run("x = y = 1\nz = 2;");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("line 2, column 1:"), "{}", errors[0]);
    assert!(code.is_empty(), "{code}");
  }

  #[test]
  fn parentheses_at_the_nesting_limit_are_accepted() {
    let source = format!(
      "x = {}a{};",
      "(".repeat(MAX_NESTING),
      ")".repeat(MAX_NESTING)
    );
    let (code, errors) = run(&source);
    assert!(errors.is_empty(), "{errors:?}");
    assert_eq!(code, "x = a\n");
  }

  #[test]
  fn reporter_failure_stops_the_parse() {
    let source = "a = ;";
    let mut ctx = TranslatorContext::new(Vec::new());
    let err = parse(tokenize(source), source, &mut ctx, |_| {
      Err(CompileError::UnbalancedLabels { depth: 0 })
    })
    .unwrap_err();
    assert!(!err.is_recoverable());
  }
}
