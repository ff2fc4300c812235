use std::fmt;

/// Errors surfaced by the signal-processing and hashing core.
///
/// `EmptyInput` and `TooShort` are not failure conditions in the sense of an
/// aborted operation — a caller that receives them should treat the result
/// as an empty constellation/token list, per the core's contract.
#[derive(Debug)]
pub enum FpError {
    Decode(String),
    EmptyInput,
    TooShort,
}

impl fmt::Display for FpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FpError::Decode(msg) => write!(f, "decode error: {msg}"),
            FpError::EmptyInput => write!(f, "empty input: zero samples decoded"),
            FpError::TooShort => write!(f, "signal too short for this operation"),
        }
    }
}

impl std::error::Error for FpError {}

impl From<hound::Error> for FpError {
    fn from(err: hound::Error) -> Self {
        FpError::Decode(err.to_string())
    }
}

impl From<claxon::Error> for FpError {
    fn from(err: claxon::Error) -> Self {
        FpError::Decode(err.to_string())
    }
}

impl From<symphonia::core::errors::Error> for FpError {
    fn from(err: symphonia::core::errors::Error) -> Self {
        FpError::Decode(err.to_string())
    }
}
