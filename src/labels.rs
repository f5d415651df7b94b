//! Pending jump targets of the loops currently being translated.
//!
//! Each open loop owns the top two entries between its condition and the end
//! of its body, so the depth at the start of a body always equals the depth
//! at its end.

use crate::error::{CompileError, CompileResult};
use crate::tac::Name;

#[derive(Debug, Default)]
pub struct LabelStack {
  labels: Vec<Name>,
}

impl LabelStack {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn push(&mut self, label: Name) {
    self.labels.push(label);
  }

  /// Pop the most recently pushed label. `action` names the translator step
  /// that asked, for the internal error raised when nothing is pending.
  pub fn pop(&mut self, action: &'static str) -> CompileResult<Name> {
    self
      .labels
      .pop()
      .ok_or(CompileError::LabelStackUnderflow { action })
  }

  pub fn depth(&self) -> usize {
    self.labels.len()
  }

  pub fn is_empty(&self) -> bool {
    self.labels.is_empty()
  }

  pub fn clear(&mut self) {
    self.labels.clear();
  }
}
