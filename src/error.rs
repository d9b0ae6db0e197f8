//! Crate-level error type

use crate::interpreter::errors::RuntimeError;
use crate::parser::ParseError;
use thiserror::Error;

/// Any failure while loading or running a program
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A runtime failure with the call stack at the point it happened,
    /// innermost frame first
    #[error("{source}")]
    Runtime {
        source: RuntimeError,
        backtrace: Vec<String>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Process exit status for this failure
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Parse(_) => 2,
            Error::Runtime { .. } | Error::Io(_) => 1,
        }
    }
}

impl From<RuntimeError> for Error {
    fn from(source: RuntimeError) -> Self {
        Error::Runtime {
            source,
            backtrace: Vec::new(),
        }
    }
}
