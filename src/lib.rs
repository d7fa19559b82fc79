//!
//! # auto-scalar
//!
//! Scalar reverse-mode automatic differentiation.
//!
//! Values are recorded on a [`Tape`] as they are computed; each node remembers
//! the operands it came from and an [`Op`] tag naming its local derivative.
//! Calling [`Var::backward`] on a result walks the graph back in topological
//! order and accumulates into every reachable node's gradient, summing the
//! contributions of nodes that are used more than once.
//!
//! ```
//! use auto_scalar::Tape;
//!
//! let tape = Tape::new();
//! let a = tape.var(3.0);
//! let b = tape.var(4.0);
//! let c = a * b + a;
//! c.backward();
//! assert_eq!(c.data(), 15.0);
//! assert_eq!(a.grad(), 5.0);
//! assert_eq!(b.grad(), 3.0);
//! ```
//!
//! ## Gradient reuse
//!
//! By default ([`GradPolicy::Reset`]) `backward` zeroes the slots of every
//! node it is about to visit, so calling it twice gives the same answer. A
//! tape built with [`GradPolicy::Accumulate`] keeps adding onto old slots
//! instead, and [`Tape::zero_grad`] is the caller's reset.
//!

mod backward;
mod error;
mod op;
mod ops;
mod tape;
mod trace;
mod var;

pub use error::{Error, Result};
pub use op::Op;
pub use tape::{GradPolicy, NodeId, Tape};
pub use trace::{trace, NodeView, ToDot, Trace};
pub use var::{Operand, Var};
