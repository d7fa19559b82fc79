//! Read-only view of a graph for display.
//!
//! Everything here copies node attributes out of the tape; nothing handed out
//! can reach back in and change values or gradients.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::backward::topological_order;
use crate::op::Op;
use crate::tape::NodeId;
use crate::var::Var;

/// Types that can render themselves as a Graphviz DOT digraph
pub trait ToDot {
  fn to_dot(&self) -> String;
}

/// Snapshot of one node's attributes at the time of the trace
#[derive(Debug, Clone, PartialEq)]
pub struct NodeView {
  pub id: NodeId,
  pub data: f64,
  pub grad: f64,
  pub op: Op,
  pub label: String,
}

/// Nodes and edges reachable from a root; edges run operand -> consumer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trace {
  pub nodes: Vec<NodeView>,
  pub edges: Vec<(NodeId, NodeId)>,
}

pub fn trace(root: &Var<'_>) -> Trace {
  root.tape().map_nodes(|nodes| {
    let order = topological_order(nodes, root.id());
    let mut seen = FxHashSet::default();
    let mut trace = Trace::default();
    for id in order {
      let node = &nodes[id.index()];
      trace.nodes.push(NodeView {
        id,
        data: node.data,
        grad: node.grad,
        op: node.op,
        label: node.label.clone(),
      });
      // `a + a` is one edge, not two
      for &operand in &node.operands {
        if seen.insert((operand, id)) {
          trace.edges.push((operand, id));
        }
      }
    }
    trace
  })
}

/// Characters that carry structure inside a record label
fn escape(label: &str) -> String {
  let mut out = String::with_capacity(label.len());
  for c in label.chars() {
    if matches!(c, '{' | '}' | '|' | '<' | '>' | '"' | '\\') {
      out.push('\\');
    }
    out.push(c);
  }
  out
}

impl ToDot for Trace {
  fn to_dot(&self) -> String {
    let mut dot = String::from("digraph {\n  rankdir=LR;\n");
    let mut ops = FxHashMap::default();
    for node in &self.nodes {
      let name = node.id.index();
      ops.insert(node.id, node.op);
      dot.push_str(&format!(
        "  \"{name}\" [label=\"{{ {} | data {:.4} | grad {:.4} }}\", shape=record];\n",
        escape(&node.label),
        node.data,
        node.grad
      ));
      if node.op != Op::Leaf {
        dot.push_str(&format!("  \"{name}{}\" [label=\"{}\"];\n", node.op, node.op));
        dot.push_str(&format!("  \"{name}{}\" -> \"{name}\";\n", node.op));
      }
    }
    for (from, to) in &self.edges {
      let op = ops.get(to).copied().unwrap_or(Op::Leaf);
      dot.push_str(&format!("  \"{}\" -> \"{}{}\";\n", from.index(), to.index(), op));
    }
    dot.push_str("}\n");
    dot
  }
}

impl ToDot for Var<'_> {
  fn to_dot(&self) -> String {
    trace(self).to_dot()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::Tape;

  #[test]
  fn nodes_and_edges() {
    let tape = Tape::new();
    let a = tape.node(2.0, "a");
    let b = tape.node(-3.0, "b");
    let c = (a * b).with_label("c");
    let t = trace(&c);
    assert_eq!(t.nodes.len(), 3);
    assert_eq!(t.edges, vec![(a.id(), c.id()), (b.id(), c.id())]);
    assert_eq!(t.nodes[2].label, "c");
    assert_eq!(t.nodes[2].op, Op::Mul);
    assert_eq!(t.nodes[2].data, -6.0);
  }

  #[test]
  fn shared_operand_single_edge() {
    let tape = Tape::new();
    let a = tape.var(1.0);
    let b = a + a;
    let t = trace(&b);
    assert_eq!(t.nodes.len(), 2);
    assert_eq!(t.edges, vec![(a.id(), b.id())]);
  }

  #[test]
  fn snapshot_reflects_gradients() {
    let tape = Tape::new();
    let a = tape.var(3.0);
    let b = a * 2.0;
    let before = trace(&b);
    assert!(before.nodes.iter().all(|n| n.grad == 0.0));
    b.backward();
    let after = trace(&b);
    let a_view = after.nodes.iter().find(|n| n.id == a.id()).unwrap();
    assert_eq!(a_view.grad, 2.0);
    // the earlier snapshot is a copy, not a live view
    assert!(before.nodes.iter().all(|n| n.grad == 0.0));
  }

  #[test]
  fn dot() {
    let tape = Tape::new();
    let a = tape.node(2.0, "a");
    let b = a.tanh().with_label("b");
    b.backward();
    let dot = b.to_dot();
    assert!(dot.starts_with("digraph {\n  rankdir=LR;\n"));
    assert!(dot.contains("\"0\" [label=\"{ a | data 2.0000 | grad "));
    assert!(dot.contains("\"1tanh\" [label=\"tanh\"];"));
    assert!(dot.contains("\"1tanh\" -> \"1\";"));
    assert!(dot.contains("\"0\" -> \"1tanh\";"));
    assert!(dot.ends_with("}\n"));
  }

  #[test]
  fn dot_edges_target_their_op_node() {
    let tape = Tape::new();
    let a = tape.node(2.0, "a");
    let b = tape.node(-3.0, "b");
    let c = (a * b).with_label("c");
    let d = (c + a).with_label("d");
    let e = d.exp().with_label("e");
    let dot = e.to_dot();
    assert!(dot.contains("\"0\" -> \"2*\";"));
    assert!(dot.contains("\"1\" -> \"2*\";"));
    assert!(dot.contains("\"2\" -> \"3+\";"));
    assert!(dot.contains("\"0\" -> \"3+\";"));
    assert!(dot.contains("\"3\" -> \"4exp\";"));
    assert_eq!(dot.matches(" -> ").count(), 5 + 3);
  }

  #[test]
  fn escape_record_characters() {
    assert_eq!(escape("a|b"), "a\\|b");
    assert_eq!(escape("{x}"), "\\{x\\}");
    assert_eq!(escape("plain"), "plain");
  }
}
