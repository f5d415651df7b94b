//! Shared error utilities used across the translation pipeline.
//!
//! Syntax errors are the only recoverable class: the parser reports them and
//! resynchronizes at the next statement. Everything else means the run can
//! no longer produce correct code and is propagated to the caller.

use snafu::Snafu;
use std::io;

pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum CompileError {
  #[snafu(display("line {line}, column {column}: {message}\n{source_line}\n{marker}"))]
  Syntax {
    line: usize,
    column: usize,
    source_line: String,
    marker: String,
    message: String,
  },

  #[snafu(display("internal error: label stack is empty in {action}"))]
  LabelStackUnderflow { action: &'static str },

  #[snafu(display("internal error: {depth} loop label(s) still pending at end of input"))]
  UnbalancedLabels { depth: usize },

  #[snafu(display("failed to write output: {source}"))]
  WriteOutput { source: io::Error },

  #[snafu(display("failed to read '{path}': {source}"))]
  ReadInput { path: String, source: io::Error },
}

impl CompileError {
  /// Construct a syntax error anchored at a specific byte offset in the source.
  pub fn at(source: &str, loc: usize, message: impl Into<String>) -> Self {
    let safe_loc = floor_char_boundary(source, loc.min(source.len()));
    let line_start = source[..safe_loc].rfind('\n').map_or(0, |idx| idx + 1);
    let line_end = source[safe_loc..]
      .find('\n')
      .map_or(source.len(), |idx| safe_loc + idx);
    let line = source[..line_start].matches('\n').count() + 1;
    let column = source[line_start..safe_loc].chars().count() + 1;
    let source_line = source[line_start..line_end].trim_end_matches('\r');
    let marker = format!("{}^", " ".repeat(column - 1));
    Self::Syntax {
      line,
      column,
      source_line: source_line.to_string(),
      marker,
      message: message.into(),
    }
  }

  /// Syntax errors can be skipped past; internal and I/O errors end the run.
  pub fn is_recoverable(&self) -> bool {
    matches!(self, Self::Syntax { .. })
  }
}

fn floor_char_boundary(source: &str, mut loc: usize) -> usize {
  while !source.is_char_boundary(loc) {
    loc -= 1;
  }
  loc
}
