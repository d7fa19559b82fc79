//! Reverse-mode accumulation over the sub-DAG reachable from a root.

use log::{debug, trace};
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::tape::{GradPolicy, Node, NodeId, Tape};
use crate::var::Var;

impl<'tape> Var<'tape> {
  /// Populate the gradient of every node reachable from `self` with the
  /// derivative of `self` with respect to that node.
  ///
  /// How slots left over from a previous pass are treated depends on the
  /// tape's [`GradPolicy`]; nodes unreachable from `self` are never touched.
  pub fn backward(&self) {
    self.backward_with_seed(1.0);
  }

  /// Like [`Var::backward`], but seeds `self` with `seed` instead of 1
  pub fn backward_with_seed(&self, seed: f64) {
    backward(self.tape(), self.id(), seed, |_| {});
  }

  /// Operands before consumers, `self` last; every reachable node exactly once
  pub fn topological_order(&self) -> Vec<Var<'tape>> {
    let tape = self.tape();
    tape.map_nodes(|nodes| {
      topological_order(nodes, self.id())
        .into_iter()
        .map(|id| Var::new(nodes[id.index()].data, id, tape))
        .collect()
    })
  }
}

pub(crate) fn backward<V>(tape: &Tape, root: NodeId, seed: f64, visit: V)
where
  V: FnMut(NodeId),
{
  let policy = tape.policy();
  tape.map_nodes_mut(|nodes| {
    let order = topological_order(nodes, root);
    debug!(
      "backward from node {} over {} nodes ({:?})",
      root.index(),
      order.len(),
      policy
    );

    if policy == GradPolicy::Reset {
      for id in &order {
        nodes[id.index()].grad = 0.0;
      }
    }
    // d(root)/d(root)
    nodes[root.index()].grad = seed;

    propagate(nodes, &order, visit);
  })
}

/// Post-order dfs along operand edges...
///
/// Each node is pushed once with its children unprocessed, and once more as a
/// marker that is emitted after all of its operands have been emitted; the
/// visited set keeps shared nodes from being expanded twice.
pub(crate) fn topological_order(nodes: &[Node], root: NodeId) -> Vec<NodeId> {
  let mut stack = Vec::with_capacity(64);
  let mut result = Vec::with_capacity(64);
  let mut visited = FxHashSet::default();

  stack.push((root, false));

  while let Some((id, children_processed)) = stack.pop() {
    if children_processed {
      result.push(id);
    } else if visited.insert(id) {
      stack.push((id, true));
      // reversed so the first operand is expanded first
      for &operand in nodes[id.index()].operands.iter().rev() {
        if !visited.contains(&operand) {
          stack.push((operand, false));
        }
      }
    }
  }

  result
}

/// Replay local derivative rules in reverse topological order, adding each
/// contribution into the operand slots
pub(crate) fn propagate<V>(nodes: &mut [Node], order: &[NodeId], mut visit: V)
where
  V: FnMut(NodeId),
{
  for &id in order.iter().rev() {
    visit(id);

    // read phase, everything consuming this node has already contributed
    let node = &nodes[id.index()];
    if node.operands.is_empty() {
      continue;
    }
    let upstream = node.grad;
    let operands = node.operands.clone();
    let inputs: SmallVec<[f64; 2]> = operands.iter().map(|o| nodes[o.index()].data).collect();

    // compute phase
    let locals = node.op.local_grads(&inputs, node.data);
    trace!("pullback node {} ({}) upstream {}", id.index(), node.op, upstream);

    // write phase, accumulate, never overwrite
    for (operand, local) in operands.into_iter().zip(locals) {
      nodes[operand.index()].grad += local * upstream;
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  mod order {
    use super::*;

    #[test]
    fn operands_first() {
      let tape = Tape::new();
      let x = tape.var(1.0);
      let y = tape.var(2.0);
      let z = x + y;
      let order: Vec<NodeId> = z.topological_order().iter().map(|v| v.id()).collect();
      assert_eq!(order, vec![x.id(), y.id(), z.id()]);
    }

    #[test]
    fn shared_node_once() {
      let tape = Tape::new();
      let x = tape.var(1.0);
      let z = x * x;
      assert_eq!(z.topological_order().len(), 2);
    }

    #[test]
    fn diamond() {
      let tape = Tape::new();
      let a = tape.var(2.0);
      let b = a.exp();
      let c = a.tanh();
      let d = b * c;
      let order: Vec<NodeId> = d.topological_order().iter().map(|v| v.id()).collect();
      assert_eq!(order.len(), 4);
      let pos = |id: NodeId| order.iter().position(|&o| o == id).unwrap();
      assert!(pos(a.id()) < pos(b.id()));
      assert!(pos(a.id()) < pos(c.id()));
      assert!(pos(b.id()) < pos(d.id()));
      assert!(pos(c.id()) < pos(d.id()));
      assert_eq!(*order.last().unwrap(), d.id());
    }

    #[test]
    fn excludes_unreachable() {
      let tape = Tape::new();
      let a = tape.var(1.0);
      let unrelated = tape.var(5.0);
      let _other = unrelated * 2.0;
      let b = a.exp();
      let order = b.topological_order();
      assert!(order.iter().all(|v| v.id() != unrelated.id()));
      assert_eq!(order.len(), 2);
    }
  }

  mod pass {
    use super::*;

    #[test]
    fn each_reachable_node_visited_once() {
      let tape = Tape::new();
      let a = tape.var(1.5);
      let b = tape.var(-0.5);
      let c = a * b;
      let d = c + a;
      let e = (d * c).tanh() + b.exp();
      // built on the same tape but never consumed by e
      let stray = tape.var(9.0);
      let _stray_out = stray * a;

      let mut counts = vec![0usize; tape.len()];
      backward(&tape, e.id(), 1.0, |id| counts[id.index()] += 1);

      let reachable: FxHashSet<NodeId> = e.topological_order().iter().map(|v| v.id()).collect();
      for (index, count) in counts.iter().enumerate() {
        let reached = reachable.iter().any(|id| id.index() == index);
        assert_eq!(*count, usize::from(reached), "node {index}");
      }
    }

    #[test]
    fn seed() {
      let tape = Tape::new();
      let a = tape.var(3.0);
      let b = a * 2.0;
      b.backward_with_seed(0.5);
      assert_eq!(b.grad(), 0.5);
      assert_eq!(a.grad(), 1.0);
    }

    #[test]
    fn leaves_unreachable_untouched() {
      let tape = Tape::with_policy(GradPolicy::Accumulate);
      let a = tape.var(3.0);
      let other = tape.var(1.0);
      let o = other * 4.0;
      o.backward();
      let b = a * 2.0;
      b.backward();
      // a second root never resets the first graph's slots
      assert_eq!(other.grad(), 4.0);
      assert_eq!(a.grad(), 2.0);
    }
  }
}
