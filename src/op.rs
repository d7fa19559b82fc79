use std::fmt;

use smallvec::{smallvec, SmallVec};

/// Operation tag recorded on every node at construction time.
///
/// The tag alone selects the local derivative rule applied during the backward
/// pass, so the full rule set lives in [`Op::local_grads`] and nowhere else.
/// Subtraction, negation and division have no tag of their own; they are built
/// out of these primitives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Op {
  /// User supplied constant or parameter, no operands
  Leaf,
  Add,
  Mul,
  /// Power by a fixed exponent
  Pow(f64),
  Tanh,
  Exp,
}

impl Op {
  /// Number of operands a node with this tag carries
  #[inline]
  pub fn arity(&self) -> usize {
    match self {
      Op::Leaf => 0,
      Op::Add | Op::Mul => 2,
      Op::Pow(_) | Op::Tanh | Op::Exp => 1,
    }
  }

  /// Partial derivatives of a node's output with respect to each of its
  /// operands, evaluated at the forward values already on the tape...
  ///
  /// `operands` holds the data of each operand in order, `out` the node's own
  /// data; the result is aligned with `operands`
  #[inline]
  pub(crate) fn local_grads(&self, operands: &[f64], out: f64) -> SmallVec<[f64; 2]> {
    debug_assert_eq!(operands.len(), self.arity());
    match *self {
      Op::Leaf => SmallVec::new(),
      Op::Add => smallvec![1.0, 1.0],
      Op::Mul => smallvec![operands[1], operands[0]],
      Op::Pow(k) => smallvec![k * operands[0].powf(k - 1.0)],
      Op::Tanh => smallvec![1.0 - out * out],
      Op::Exp => smallvec![out],
    }
  }
}

impl fmt::Display for Op {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Op::Leaf => Ok(()),
      Op::Add => write!(f, "+"),
      Op::Mul => write!(f, "*"),
      Op::Pow(k) => write!(f, "**{k}"),
      Op::Tanh => write!(f, "tanh"),
      Op::Exp => write!(f, "exp"),
    }
  }
}
