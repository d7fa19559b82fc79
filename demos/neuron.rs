use auto_scalar::{Tape, ToDot};

/// A single tanh neuron with two inputs; prints the graph as DOT so it can be
/// piped straight into `dot -Tsvg`
fn main() {
  let tape = Tape::new();
  // inputs
  let x1 = tape.node(2.0, "x1");
  let x2 = tape.node(0.0, "x2");
  // weights
  let w1 = tape.node(-3.0, "w1");
  let w2 = tape.node(1.0, "w2");
  // bias, picked so the output lands on a round number
  let b = tape.node(6.8813735870195432, "b");

  let x1w1 = (x1 * w1).with_label("x1*w1");
  let x2w2 = (x2 * w2).with_label("x2*w2");
  let x1w1x2w2 = (x1w1 + x2w2).with_label("x1*w1 + x2*w2");
  let n = (x1w1x2w2 + b).with_label("n");
  let o = n.tanh().with_label("o");
  o.backward();

  eprintln!("o = {o}");
  for var in [x1, x2, w1, w2] {
    eprintln!("do/d{} = {:.4}", var.label(), var.grad());
  }
  print!("{}", o.to_dot());
}
