//! Three-address code: names, operators, instructions and the emitter that
//! writes them out.
//!
//! Nothing here is buffered for later inspection. The translator hands each
//! line to the [`Emitter`] the moment it is complete and the emitter writes it
//! straight to the output stream, so an emitted jump can never be rewritten.

use std::fmt;
use std::io::Write;

use snafu::ResultExt;

use crate::error::{CompileResult, WriteOutputSnafu};

/// Opaque identifier for a source variable, a literal, a temporary or a label.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Name(String);

impl Name {
  pub fn new(text: impl Into<String>) -> Self {
    Self(text.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for Name {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for Name {
  fn from(text: &str) -> Self {
    Self::new(text)
  }
}

/// Instruction operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
  Add,
  Sub,
  Mul,
  Div,
  Assign,
  /// Relational operator, rendered with the exact text it was written with.
  Rel(String),
  /// Marks the `print <value>` pseudo-instruction.
  Print,
}

impl Op {
  /// Map an arithmetic punctuator to its operator.
  pub fn arith(symbol: &str) -> Option<Self> {
    match symbol {
      "+" => Some(Self::Add),
      "-" => Some(Self::Sub),
      "*" => Some(Self::Mul),
      "/" => Some(Self::Div),
      _ => None,
    }
  }

  pub fn symbol(&self) -> &str {
    match self {
      Self::Add => "+",
      Self::Sub => "-",
      Self::Mul => "*",
      Self::Div => "/",
      Self::Assign => "=",
      Self::Rel(text) => text,
      Self::Print => "",
    }
  }
}

/// A `(result, arg1, arg2?, op)` quadruple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
  pub result: Name,
  pub arg1: Name,
  pub arg2: Option<Name>,
  pub op: Op,
}

impl Instruction {
  pub fn binary(result: Name, lhs: Name, rhs: Name, op: Op) -> Self {
    Self {
      result,
      arg1: lhs,
      arg2: Some(rhs),
      op,
    }
  }

  pub fn assign(target: Name, value: Name) -> Self {
    Self {
      result: target,
      arg1: value,
      arg2: None,
      op: Op::Assign,
    }
  }

  pub fn print(value: Name) -> Self {
    Self {
      result: Name::from("print"),
      arg1: value,
      arg2: None,
      op: Op::Print,
    }
  }
}

impl fmt::Display for Instruction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match (&self.op, &self.arg2) {
      (op, Some(arg2)) => write!(
        f,
        "{} = {} {} {}",
        self.result,
        self.arg1,
        op.symbol(),
        arg2
      ),
      (Op::Assign, None) => write!(f, "{} = {}", self.result, self.arg1),
      (Op::Print, None) => write!(f, "{} {}", self.result, self.arg1),
      (op, None) => write!(f, "{} {} {}", self.result, op.symbol(), self.arg1),
    }
  }
}

/// One line of emitted output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TacLine {
  Instr(Instruction),
  Label(Name),
  Goto(Name),
  IfGoto { cond: Name, target: Name },
}

impl fmt::Display for TacLine {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Instr(instr) => write!(f, "{instr}"),
      Self::Label(name) => write!(f, "{name}:"),
      Self::Goto(target) => write!(f, "goto {target}"),
      Self::IfGoto { cond, target } => write!(f, "if ({cond}) goto {target}"),
    }
  }
}

/// Append-only writer of TAC lines.
pub struct Emitter<W: Write> {
  out: W,
  lines: usize,
}

impl<W: Write> Emitter<W> {
  pub fn new(out: W) -> Self {
    Self { out, lines: 0 }
  }

  pub fn emit(&mut self, line: TacLine) -> CompileResult<()> {
    writeln!(self.out, "{line}").context(WriteOutputSnafu)?;
    self.lines += 1;
    Ok(())
  }

  pub fn instruction(&mut self, instr: Instruction) -> CompileResult<()> {
    self.emit(TacLine::Instr(instr))
  }

  pub fn label(&mut self, name: &Name) -> CompileResult<()> {
    self.emit(TacLine::Label(name.clone()))
  }

  pub fn goto(&mut self, target: &Name) -> CompileResult<()> {
    self.emit(TacLine::Goto(target.clone()))
  }

  pub fn if_goto(&mut self, cond: &Name, target: &Name) -> CompileResult<()> {
    self.emit(TacLine::IfGoto {
      cond: cond.clone(),
      target: target.clone(),
    })
  }

  /// Number of lines written so far.
  pub fn lines(&self) -> usize {
    self.lines
  }

  pub fn flush(&mut self) -> CompileResult<()> {
    self.out.flush().context(WriteOutputSnafu)
  }

  pub fn into_inner(self) -> W {
    self.out
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn renders_each_instruction_form() {
    let add = Instruction::binary("t0".into(), "a".into(), "1".into(), Op::Add);
    assert_eq!(add.to_string(), "t0 = a + 1");

    let lt = Instruction::binary("t1".into(), "a".into(), "b".into(), Op::Rel("<".into()));
    assert_eq!(lt.to_string(), "t1 = a < b");

    assert_eq!(Instruction::assign("x".into(), "t0".into()).to_string(), "x = t0");
    assert_eq!(Instruction::print("t2".into()).to_string(), "print t2");

    let unary = Instruction {
      result: "t3".into(),
      arg1: "b".into(),
      arg2: None,
      op: Op::Sub,
    };
    assert_eq!(unary.to_string(), "t3 - b");
  }

  #[test]
  fn renders_control_lines() {
    assert_eq!(TacLine::Label("L0".into()).to_string(), "L0:");
    assert_eq!(TacLine::Goto("L2".into()).to_string(), "goto L2");
    let branch = TacLine::IfGoto {
      cond: "t0".into(),
      target: "L1".into(),
    };
    assert_eq!(branch.to_string(), "if (t0) goto L1");
  }

  #[test]
  fn emitter_writes_newline_terminated_lines_in_order() {
    let mut emitter = Emitter::new(Vec::new());
    emitter.label(&"L0".into()).unwrap();
    emitter
      .instruction(Instruction::assign("a".into(), "0".into()))
      .unwrap();
    emitter.goto(&"L0".into()).unwrap();
    assert_eq!(emitter.lines(), 3);
    let text = String::from_utf8(emitter.into_inner()).unwrap();
    assert_eq!(text, "L0:\na = 0\ngoto L0\n");
  }

  #[test]
  fn arith_symbols_round_trip_through_op() {
    for symbol in ["+", "-", "*", "/"] {
      assert_eq!(Op::arith(symbol).map(|op| op.symbol().to_string()), Some(symbol.to_string()));
    }
    assert_eq!(Op::arith("<"), None);
  }
}
