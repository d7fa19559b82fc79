use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
  /// An operand of a kind the constructor cannot differentiate through
  #[error("invalid operand for {op}: {reason}")]
  InvalidOperand {
    op: &'static str,
    reason: &'static str,
  },
}

impl Error {
  pub fn invalid_operand(op: &'static str, reason: &'static str) -> Self {
    Error::InvalidOperand { op, reason }
  }
}
