use std::cell::RefCell;

use smallvec::SmallVec;

use crate::op::Op;
use crate::var::Var;

/// Identity of a node on its tape; operands always carry a smaller id than
/// any node consuming them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
  #[inline(always)]
  pub fn index(&self) -> usize {
    self.0
  }
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
  pub(crate) data: f64,
  pub(crate) grad: f64,
  pub(crate) op: Op,
  pub(crate) operands: SmallVec<[NodeId; 2]>,
  pub(crate) label: String,
}

/// What `backward` does with gradient slots left over from an earlier pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GradPolicy {
  /// Zero every node reachable from the root before seeding it, so repeated
  /// passes over the same root agree
  #[default]
  Reset,
  /// Add onto whatever the slots already hold; reset with [`Tape::zero_grad`]
  Accumulate,
}

/// A `Tape` is a Wengert list: an append only arena of nodes, each pointing
/// back at the operands it was computed from...
///
/// Variables borrow the tape they live on, so the arena can only be cleared
/// once every outstanding `Var` is gone.
#[derive(Debug, Default)]
pub struct Tape {
  nodes: RefCell<Vec<Node>>,
  policy: GradPolicy,
}

impl Tape {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_policy(policy: GradPolicy) -> Self {
    Self {
      nodes: RefCell::new(Vec::new()),
      policy,
    }
  }

  #[inline]
  pub fn policy(&self) -> GradPolicy {
    self.policy
  }

  /// Lift a raw scalar into a leaf node
  #[inline]
  pub fn var(&self, value: f64) -> Var<'_> {
    self.node(value, String::new())
  }

  /// Leaf node carrying a display label
  #[inline]
  pub fn node(&self, value: f64, label: impl Into<String>) -> Var<'_> {
    let id = self.push(Node {
      data: value,
      grad: 0.0,
      op: Op::Leaf,
      operands: SmallVec::new(),
      label: label.into(),
    });
    Var::new(value, id, self)
  }

  pub fn len(&self) -> usize {
    self.nodes.borrow().len()
  }

  pub fn is_empty(&self) -> bool {
    self.nodes.borrow().is_empty()
  }

  /// Reset every gradient slot on the tape to zero
  pub fn zero_grad(&self) {
    for node in self.nodes.borrow_mut().iter_mut() {
      node.grad = 0.0;
    }
  }

  /// Drop every node; requires that no `Var` borrowing this tape is alive
  pub fn clear(&mut self) {
    self.nodes.get_mut().clear();
  }

  #[inline]
  pub(crate) fn push_op(&self, data: f64, op: Op, operands: SmallVec<[NodeId; 2]>) -> NodeId {
    debug_assert_eq!(operands.len(), op.arity());
    self.push(Node {
      data,
      grad: 0.0,
      op,
      operands,
      label: String::new(),
    })
  }

  #[inline]
  fn push(&self, node: Node) -> NodeId {
    let mut nodes = self.nodes.borrow_mut();
    let id = NodeId(nodes.len());
    nodes.push(node);
    id
  }

  #[inline]
  pub(crate) fn map_nodes<R, G>(&self, f: G) -> R
  where
    G: FnOnce(&[Node]) -> R,
  {
    f(&self.nodes.borrow())
  }

  #[inline]
  pub(crate) fn map_nodes_mut<R, G>(&self, f: G) -> R
  where
    G: FnOnce(&mut [Node]) -> R,
  {
    f(&mut self.nodes.borrow_mut())
  }
}
