//! Crate root: wires together the translation pipeline.
//!
//! - `tokenizer` performs lexical analysis and produces a flat token stream.
//! - `parser` walks the tokens by recursive descent and fires the translator
//!   actions as each construct completes.
//! - `translator` owns the per-run state and turns each action into output.
//! - `names`, `labels` and `tac` are the pieces the translator is built from.
//! - `error` centralises the error type shared by the other modules.

pub mod error;
pub mod labels;
pub mod names;
pub mod parser;
pub mod tac;
pub mod tokenizer;
pub mod translator;

use std::io::Write;

use snafu::ResultExt;

pub use error::{CompileError, CompileResult};
pub use translator::TranslatorContext;

use error::WriteOutputSnafu;

/// Outcome of a run that reached the end of its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
  /// Lines of three-address code written.
  pub lines: usize,
  /// Syntax errors reported and recovered from.
  pub errors: usize,
}

/// Translate `source`, streaming code to `out` and each recovered syntax
/// error to `diagnostics` as soon as it is found.
pub fn translate_into<W, D>(source: &str, out: W, diagnostics: &mut D) -> CompileResult<Summary>
where
  W: Write,
  D: Write,
{
  let tokens = tokenizer::tokenize(source);
  let mut ctx = TranslatorContext::new(out);
  let errors = parser::parse(tokens, source, &mut ctx, |err| {
    writeln!(diagnostics, "{err}").context(WriteOutputSnafu)
  })?;
  let lines = ctx.lines();
  ctx.finish()?;
  Ok(Summary { lines, errors })
}

/// Buffered result of [`translate`].
#[derive(Debug)]
pub struct Translation {
  pub code: String,
  pub errors: Vec<CompileError>,
}

/// Translate `source` into a string, collecting recovered syntax errors.
pub fn translate(source: &str) -> CompileResult<Translation> {
  let tokens = tokenizer::tokenize(source);
  let mut ctx = TranslatorContext::new(Vec::new());
  let mut errors = Vec::new();
  parser::parse(tokens, source, &mut ctx, |err| {
    errors.push(err);
    Ok(())
  })?;
  let code = ctx.finish()?;
  Ok(Translation {
    code: String::from_utf8_lossy(&code).into_owned(),
    errors,
  })
}
