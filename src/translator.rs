//! Semantic actions of the translator.
//!
//! The parser calls into a [`TranslatorContext`] at every point where the
//! grammar has something to say about the generated code: when an operand is
//! reduced, when a binary operation or condition is complete, when an
//! assignment or bare expression statement ends, and at the three points of a
//! `while` loop. Each call emits its output immediately. The loop checkpoints
//! mint every forward label before the jump that targets it, so nothing has
//! to be patched after the fact.

use std::io::Write;

use crate::error::{CompileError, CompileResult};
use crate::labels::LabelStack;
use crate::names::NameGenerator;
use crate::tac::{Emitter, Instruction, Name, Op};

/// All state of a single translation run.
pub struct TranslatorContext<W: Write> {
  names: NameGenerator,
  labels: LabelStack,
  emitter: Emitter<W>,
}

impl<W: Write> TranslatorContext<W> {
  pub fn new(out: W) -> Self {
    Self {
      names: NameGenerator::new(),
      labels: LabelStack::new(),
      emitter: Emitter::new(out),
    }
  }

  /// Identifiers and literals stand for themselves.
  pub fn atom(&self, text: &str) -> Name {
    Name::new(text)
  }

  pub fn binary(&mut self, op: Op, lhs: Name, rhs: Name) -> CompileResult<Name> {
    let temp = self.names.new_temp();
    self
      .emitter
      .instruction(Instruction::binary(temp.clone(), lhs, rhs, op))?;
    Ok(temp)
  }

  pub fn condition(&mut self, lhs: Name, relop: &str, rhs: Name) -> CompileResult<Name> {
    self.binary(Op::Rel(relop.to_string()), lhs, rhs)
  }

  /// Returns `target` so a chained assignment can use it as its value.
  pub fn assign(&mut self, target: Name, value: Name) -> CompileResult<Name> {
    self
      .emitter
      .instruction(Instruction::assign(target.clone(), value))?;
    Ok(target)
  }

  pub fn print(&mut self, value: Name) -> CompileResult<()> {
    self.emitter.instruction(Instruction::print(value))
  }

  /// Checkpoint 1, on `while`: define the re-entry label ahead of the condition.
  pub fn while_begin(&mut self) -> CompileResult<()> {
    let begin = self.names.new_label();
    self.emitter.label(&begin)?;
    self.labels.push(begin);
    Ok(())
  }

  /// Checkpoint 2, after the condition's `)`: branch into the body or past it.
  pub fn while_condition(&mut self, cond: Name) -> CompileResult<()> {
    let body = self.names.new_label();
    let end = self.names.new_label();
    self.emitter.if_goto(&cond, &body)?;
    self.emitter.goto(&end)?;
    self.emitter.label(&body)?;
    self.labels.push(end);
    Ok(())
  }

  /// Checkpoint 3, after the body's `}`: jump back and define the exit.
  pub fn while_end(&mut self) -> CompileResult<()> {
    let end = self.labels.pop("while_end")?;
    let begin = self.labels.pop("while_end")?;
    self.emitter.goto(&begin)?;
    self.emitter.label(&end)
  }

  /// Drop the re-entry label of a loop whose header failed to parse.
  pub fn while_abandon(&mut self) -> CompileResult<()> {
    self.labels.pop("while_abandon").map(drop)
  }

  /// Labels currently pending, two per open loop.
  #[cfg(test)]
  fn depth(&self) -> usize {
    self.labels.depth()
  }

  /// Number of lines emitted so far.
  pub fn lines(&self) -> usize {
    self.emitter.lines()
  }

  /// Restart name numbering and forget pending labels.
  pub fn reset(&mut self) {
    self.names.reset();
    self.labels.clear();
  }

  /// Check that every loop was closed, flush, and hand the writer back.
  pub fn finish(mut self) -> CompileResult<W> {
    if !self.labels.is_empty() {
      return Err(CompileError::UnbalancedLabels {
        depth: self.labels.depth(),
      });
    }
    self.emitter.flush()?;
    Ok(self.emitter.into_inner())
  }
}
