//! Operator overloads for `Var`, covering every `Var`/`&Var`/`f64` pairing.
//!
//! Scalar-on-the-left forms route to the `r*` constructors so the lift always
//! happens on the tape of the node involved.

use std::ops::{Add, BitXor, Div, Mul, Neg, Sub};

use crate::var::Var;

macro_rules! binary_op {
  ($trait:ident, $method:ident, $rmethod:ident) => {
    impl<'tape> $trait<Var<'tape>> for Var<'tape> {
      type Output = Var<'tape>;

      #[inline(always)]
      fn $method(self, other: Var<'tape>) -> Self::Output {
        Var::$method(&self, other)
      }
    }

    impl<'tape> $trait<&Var<'tape>> for Var<'tape> {
      type Output = Var<'tape>;

      #[inline(always)]
      fn $method(self, other: &Var<'tape>) -> Self::Output {
        Var::$method(&self, other)
      }
    }

    impl<'tape> $trait<Var<'tape>> for &Var<'tape> {
      type Output = Var<'tape>;

      #[inline(always)]
      fn $method(self, other: Var<'tape>) -> Self::Output {
        Var::$method(self, other)
      }
    }

    impl<'tape> $trait<&Var<'tape>> for &Var<'tape> {
      type Output = Var<'tape>;

      #[inline(always)]
      fn $method(self, other: &Var<'tape>) -> Self::Output {
        Var::$method(self, other)
      }
    }

    impl<'tape> $trait<f64> for Var<'tape> {
      type Output = Var<'tape>;

      #[inline(always)]
      fn $method(self, other: f64) -> Self::Output {
        Var::$method(&self, other)
      }
    }

    impl<'tape> $trait<f64> for &Var<'tape> {
      type Output = Var<'tape>;

      #[inline(always)]
      fn $method(self, other: f64) -> Self::Output {
        Var::$method(self, other)
      }
    }

    impl<'tape> $trait<Var<'tape>> for f64 {
      type Output = Var<'tape>;

      #[inline(always)]
      fn $method(self, other: Var<'tape>) -> Self::Output {
        other.$rmethod(self)
      }
    }

    impl<'tape> $trait<&Var<'tape>> for f64 {
      type Output = Var<'tape>;

      #[inline(always)]
      fn $method(self, other: &Var<'tape>) -> Self::Output {
        other.$rmethod(self)
      }
    }
  };
}

binary_op!(Add, add, radd);
binary_op!(Sub, sub, rsub);
binary_op!(Mul, mul, rmul);
binary_op!(Div, div, rdiv);

impl<'tape> Neg for Var<'tape> {
  type Output = Var<'tape>;

  #[inline(always)]
  fn neg(self) -> Self::Output {
    Var::neg(&self)
  }
}

impl<'tape> Neg for &Var<'tape> {
  type Output = Var<'tape>;

  #[inline(always)]
  fn neg(self) -> Self::Output {
    Var::neg(self)
  }
}

// `^` only takes a constant exponent; node exponents go through `Var::pow`
// which reports them as an error
impl<'tape> BitXor<f64> for Var<'tape> {
  type Output = Var<'tape>;

  #[inline(always)]
  fn bitxor(self, exponent: f64) -> Self::Output {
    self.powf(exponent)
  }
}

impl<'tape> BitXor<f64> for &Var<'tape> {
  type Output = Var<'tape>;

  #[inline(always)]
  fn bitxor(self, exponent: f64) -> Self::Output {
    self.powf(exponent)
  }
}

#[cfg(test)]
mod tests {
  use crate::op::Op;
  use crate::Tape;

  #[test]
  fn add() {
    let tape = Tape::new();
    let a = tape.var(3.0);
    let b = tape.var(4.0);
    assert_eq!((a + b).data(), 7.0);
    assert_eq!((&a + &b).data(), 7.0);
    assert_eq!((a + &b).data(), 7.0);
    assert_eq!((&a + b).data(), 7.0);
    assert_eq!((a + 1.0).data(), 4.0);
    assert_eq!((&a + 1.0).data(), 4.0);
    assert_eq!((1.0 + a).data(), 4.0);
    assert_eq!((1.0 + &a).data(), 4.0);
  }

  #[test]
  fn sub() {
    let tape = Tape::new();
    let a = tape.var(7.0);
    let b = tape.var(4.0);
    assert_eq!((a - b).data(), 3.0);
    assert_eq!((&a - &b).data(), 3.0);
    assert_eq!((a - 2.0).data(), 5.0);
    assert_eq!((10.0 - a).data(), 3.0);
    assert_eq!((10.0 - &a).data(), 3.0);
  }

  #[test]
  fn mul() {
    let tape = Tape::new();
    let a = tape.var(3.0);
    let b = tape.var(4.0);
    assert_eq!((a * b).data(), 12.0);
    assert_eq!((&a * &b).data(), 12.0);
    assert_eq!((a * 2.0).data(), 6.0);
    assert_eq!((2.0 * a).data(), 6.0);
    assert_eq!((2.0 * &a).data(), 6.0);
  }

  #[test]
  fn div() {
    let tape = Tape::new();
    let a = tape.var(6.0);
    let b = tape.var(4.0);
    assert_eq!((a / b).data(), 1.5);
    assert_eq!((&a / &b).data(), 1.5);
    assert_eq!((a / 2.0).data(), 3.0);
    assert_eq!((3.0 / b).data(), 0.75);
    assert_eq!((3.0 / &b).data(), 0.75);
  }

  #[test]
  fn neg() {
    let tape = Tape::new();
    let a = tape.var(2.0);
    assert_eq!((-a).data(), -2.0);
    assert_eq!((-&a).data(), -2.0);
  }

  #[test]
  fn bitxor() {
    let tape = Tape::new();
    let a = tape.var(2.0);
    let b = a ^ 3.0;
    assert_eq!(b.data(), 8.0);
    assert_eq!(b.op(), Op::Pow(3.0));
    assert_eq!((&a ^ -1.0).data(), 0.5);
  }
}
