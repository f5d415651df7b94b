//! Fresh temporary and label names.

use crate::tac::Name;

/// Mints `t0, t1, …` and `L0, L1, …` from two independent counters.
#[derive(Debug, Default)]
pub struct NameGenerator {
  temps: usize,
  labels: usize,
}

impl NameGenerator {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn new_temp(&mut self) -> Name {
    let name = Name::new(format!("t{}", self.temps));
    self.temps += 1;
    name
  }

  pub fn new_label(&mut self) -> Name {
    let name = Name::new(format!("L{}", self.labels));
    self.labels += 1;
    name
  }

  pub fn reset(&mut self) {
    self.temps = 0;
    self.labels = 0;
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn counters_are_independent() {
    let mut names = NameGenerator::new();
    assert_eq!(names.new_temp().as_str(), "t0");
    assert_eq!(names.new_temp().as_str(), "t1");
    assert_eq!(names.new_label().as_str(), "L0");
    assert_eq!(names.new_temp().as_str(), "t2");
    assert_eq!(names.new_label().as_str(), "L1");
    assert_eq!(names.new_label().as_str(), "L2");
  }

  #[test]
  fn reset_starts_numbering_over() {
    let mut names = NameGenerator::new();
    names.new_temp();
    names.new_label();
    names.reset();
    assert_eq!(names.new_temp().as_str(), "t0");
    assert_eq!(names.new_label().as_str(), "L0");
  }
}
