//! Load errors for stackvm programs.

use thiserror::Error;

/// Errors that occur while decoding opcodes or loading a program from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// Integer does not name an instruction in the catalog.
    #[error("unknown opcode: {0}")]
    UnknownOpcode(i64),

    /// Token in a program listing is not a decimal integer.
    #[error("line {line}: invalid integer '{token}'")]
    InvalidInteger { line: usize, token: String },
}
