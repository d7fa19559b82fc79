use std::fmt;
use std::ptr;

use smallvec::{smallvec, SmallVec};

use crate::error::{Error, Result};
use crate::op::Op;
use crate::tape::{NodeId, Tape};

/// A value in the computational graph.
///
/// A `Var` is a cheap handle: the node itself (data, gradient slot, operands)
/// lives on the tape. Copying a `Var` copies the handle, not the vertex, so
/// using one `Var` twice in an expression shares a single node.
#[derive(Clone, Copy)]
pub struct Var<'tape> {
  value: f64,
  id: NodeId,
  tape: &'tape Tape,
}

/// Either side of an operation constructor: an existing node, or a raw scalar
/// that gets lifted into a fresh leaf on the same tape
#[derive(Debug, Clone, Copy)]
pub enum Operand<'tape> {
  Var(Var<'tape>),
  Scalar(f64),
}

impl<'tape> From<Var<'tape>> for Operand<'tape> {
  fn from(var: Var<'tape>) -> Self {
    Operand::Var(var)
  }
}

impl<'tape> From<&Var<'tape>> for Operand<'tape> {
  fn from(var: &Var<'tape>) -> Self {
    Operand::Var(*var)
  }
}

impl From<f64> for Operand<'_> {
  fn from(value: f64) -> Self {
    Operand::Scalar(value)
  }
}

impl<'tape> Var<'tape> {
  #[inline(always)]
  pub(crate) fn new(value: f64, id: NodeId, tape: &'tape Tape) -> Self {
    Self { value, id, tape }
  }

  /// Forward value of this node
  #[inline(always)]
  pub fn data(&self) -> f64 {
    self.value
  }

  /// Alias of [`Var::data`]
  #[inline(always)]
  pub fn value(&self) -> f64 {
    self.value
  }

  #[inline(always)]
  pub fn id(&self) -> NodeId {
    self.id
  }

  #[inline(always)]
  pub(crate) fn tape(&self) -> &'tape Tape {
    self.tape
  }

  /// Accumulated derivative of the last backward root with respect to this node
  pub fn grad(&self) -> f64 {
    self.tape.map_nodes(|nodes| nodes[self.id.index()].grad)
  }

  pub fn op(&self) -> Op {
    self.tape.map_nodes(|nodes| nodes[self.id.index()].op)
  }

  pub fn label(&self) -> String {
    self.tape.map_nodes(|nodes| nodes[self.id.index()].label.clone())
  }

  /// Attach a display label; has no effect on values or gradients
  pub fn with_label(self, label: impl Into<String>) -> Self {
    let label = label.into();
    self
      .tape
      .map_nodes_mut(|nodes| nodes[self.id.index()].label = label);
    self
  }

  /// The nodes consumed to produce this one, in operand order
  pub fn operands(&self) -> SmallVec<[Var<'tape>; 2]> {
    self.tape.map_nodes(|nodes| {
      nodes[self.id.index()]
        .operands
        .iter()
        .map(|&id| Var::new(nodes[id.index()].data, id, self.tape))
        .collect()
    })
  }

  #[inline]
  pub fn is_leaf(&self) -> bool {
    self.op() == Op::Leaf
  }

  /// Bring an operand onto this tape; every constructor starts here
  #[inline]
  fn lift(&self, operand: impl Into<Operand<'tape>>) -> Var<'tape> {
    match operand.into() {
      Operand::Var(var) => {
        assert!(
          ptr::eq(self.tape, var.tape),
          "operands must live on the same tape"
        );
        var
      }
      Operand::Scalar(value) => self.tape.var(value),
    }
  }

  #[inline]
  fn binary(&self, other: &Var<'tape>, op: Op, value: f64) -> Var<'tape> {
    let id = self.tape.push_op(value, op, smallvec![self.id, other.id]);
    Var::new(value, id, self.tape)
  }

  #[inline]
  fn unary(&self, op: Op, value: f64) -> Var<'tape> {
    let id = self.tape.push_op(value, op, smallvec![self.id]);
    Var::new(value, id, self.tape)
  }

  pub fn add(&self, other: impl Into<Operand<'tape>>) -> Var<'tape> {
    let other = self.lift(other);
    self.binary(&other, Op::Add, self.value + other.value)
  }

  pub fn mul(&self, other: impl Into<Operand<'tape>>) -> Var<'tape> {
    let other = self.lift(other);
    self.binary(&other, Op::Mul, self.value * other.value)
  }

  /// Raise to a constant power; a node valued exponent is rejected
  pub fn pow(&self, exponent: impl Into<Operand<'tape>>) -> Result<Var<'tape>> {
    match exponent.into() {
      Operand::Scalar(k) => Ok(self.powf(k)),
      Operand::Var(_) => Err(Error::invalid_operand(
        "pow",
        "exponent must be a constant, not a node",
      )),
    }
  }

  pub fn powf(&self, exponent: f64) -> Var<'tape> {
    self.unary(Op::Pow(exponent), self.value.powf(exponent))
  }

  pub fn tanh(&self) -> Var<'tape> {
    self.unary(Op::Tanh, self.value.tanh())
  }

  pub fn exp(&self) -> Var<'tape> {
    self.unary(Op::Exp, self.value.exp())
  }

  // everything below is composed from the primitives above and must stay that
  // way: no derivative rule of its own

  pub fn neg(&self) -> Var<'tape> {
    self.mul(-1.0)
  }

  pub fn sub(&self, other: impl Into<Operand<'tape>>) -> Var<'tape> {
    let other = self.lift(other);
    self.add(other.neg())
  }

  pub fn div(&self, other: impl Into<Operand<'tape>>) -> Var<'tape> {
    let other = self.lift(other);
    self.mul(other.powf(-1.0))
  }

  /// `other + self`
  pub fn radd(&self, other: impl Into<Operand<'tape>>) -> Var<'tape> {
    self.add(other)
  }

  /// `other - self`
  pub fn rsub(&self, other: impl Into<Operand<'tape>>) -> Var<'tape> {
    self.neg().add(other)
  }

  /// `other * self`
  pub fn rmul(&self, other: impl Into<Operand<'tape>>) -> Var<'tape> {
    self.mul(other)
  }

  /// `other / self`
  pub fn rdiv(&self, other: impl Into<Operand<'tape>>) -> Var<'tape> {
    self.powf(-1.0).mul(other)
  }
}

impl fmt::Display for Var<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Value(data = {})", self.value)
  }
}

impl fmt::Debug for Var<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Var")
      .field("value", &self.value)
      .field("grad", &self.grad())
      .field("op", &self.op())
      .field("index", &self.id.index())
      .finish()
  }
}
