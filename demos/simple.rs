use auto_scalar::Tape;

fn main() {
  // Create a new tape (Wengert list) to store the nodes of our computation
  let tape = Tape::new();
  let x = tape.var(1.0);
  let y = x * x;
  y.backward();
  println!("Value: {}, dy/dx: {}", y.data(), x.grad());
}
