use auto_scalar::{Tape, Var};

const LEARNING_RATE: f64 = 0.5;
const EPOCHS: usize = 5_000;

const X1: [f64; 4] = [0.0, 0.0, 1.0, 1.0];
const X2: [f64; 4] = [0.0, 1.0, 0.0, 1.0];
const Y: [f64; 4] = [0.0, 1.0, 1.0, 0.0];

fn sigmoid<'a>(x: Var<'a>) -> Var<'a> {
  // sigmoid(x) = 1 / (1 + exp(-x))
  1.0 / ((-x).exp() + 1.0)
}

/// Feedforward network for an XOR gate
///
/// Architecture:
/// - 2 inputs
/// - 1 hidden layer with 2 tanh neurons
/// - 1 sigmoid output neuron
///
/// Parameters are kept as plain floats between epochs; each epoch lifts them
/// onto a fresh tape, runs the forward and backward passes, and reads the
/// gradients back out.
struct XorNet {
  // hidden params
  w11: f64,
  w12: f64,
  b1: f64,
  w21: f64,
  w22: f64,
  b2: f64,
  // output params
  v1: f64,
  v2: f64,
  b_out: f64,
}

/// The parameters of an `XorNet` as nodes on one tape
struct Params<'a> {
  w11: Var<'a>,
  w12: Var<'a>,
  b1: Var<'a>,
  w21: Var<'a>,
  w22: Var<'a>,
  b2: Var<'a>,
  v1: Var<'a>,
  v2: Var<'a>,
  b_out: Var<'a>,
}

impl XorNet {
  fn new() -> Self {
    // fixed initial weights so runs are reproducible
    XorNet {
      w11: 1.2,
      w12: 0.5,
      b1: 0.6,
      w21: 1.5,
      w22: -0.4,
      b2: 0.4,
      v1: -2.3,
      v2: -0.3,
      b_out: 0.63,
    }
  }

  fn lift<'a>(&self, tape: &'a Tape) -> Params<'a> {
    Params {
      w11: tape.node(self.w11, "w11"),
      w12: tape.node(self.w12, "w12"),
      b1: tape.node(self.b1, "b1"),
      w21: tape.node(self.w21, "w21"),
      w22: tape.node(self.w22, "w22"),
      b2: tape.node(self.b2, "b2"),
      v1: tape.node(self.v1, "v1"),
      v2: tape.node(self.v2, "v2"),
      b_out: tape.node(self.b_out, "b_out"),
    }
  }

  fn step(&mut self, p: &Params<'_>) {
    self.w11 -= LEARNING_RATE * p.w11.grad();
    self.w12 -= LEARNING_RATE * p.w12.grad();
    self.b1 -= LEARNING_RATE * p.b1.grad();
    self.w21 -= LEARNING_RATE * p.w21.grad();
    self.w22 -= LEARNING_RATE * p.w22.grad();
    self.b2 -= LEARNING_RATE * p.b2.grad();
    self.v1 -= LEARNING_RATE * p.v1.grad();
    self.v2 -= LEARNING_RATE * p.v2.grad();
    self.b_out -= LEARNING_RATE * p.b_out.grad();
  }
}

impl<'a> Params<'a> {
  fn forward(&self, x1: f64, x2: f64) -> Var<'a> {
    let h1 = (self.w11 * x1 + self.w12 * x2 + self.b1).tanh();
    let h2 = (self.w21 * x1 + self.w22 * x2 + self.b2).tanh();
    sigmoid(self.v1 * h1 + self.v2 * h2 + self.b_out)
  }
}

fn main() {
  let mut net = XorNet::new();
  let mut tape = Tape::new();
  let mut loss = 0.0;

  for epoch in 0..EPOCHS {
    {
      let params = net.lift(&tape);
      // mean squared error over the truth table
      let mut total = tape.var(0.0);
      for i in 0..Y.len() {
        let err = params.forward(X1[i], X2[i]) - Y[i];
        total = total + err * err;
      }
      let mse = total / Y.len() as f64;
      mse.backward();
      net.step(&params);
      loss = mse.data();
    }
    // every node from this epoch is dead, reuse the arena
    tape.clear();

    if epoch % 500 == 0 {
      println!("Epoch {epoch} | Loss = {loss:.6}");
    }
  }

  println!("final loss = {loss:.6}\n");
  println!("testing network predictions:");
  let params = net.lift(&tape);
  for i in 0..Y.len() {
    let output = params.forward(X1[i], X2[i]);
    println!("input: ({}, {}), output: {:.6}", X1[i], X2[i], output.data());
  }
}
