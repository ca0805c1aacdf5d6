//! Runtime errors for the stackvm virtual machine.
//!
//! Every fault is fatal: execution stops at the faulting instruction and
//! cannot be resumed. Each variant carries the address of the faulting
//! instruction's opcode (`at`).

use thiserror::Error;

/// Errors that abort program execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// Opcode value not present in the instruction catalog.
    #[error("unrecognized opcode {opcode} at instruction {at}")]
    InvalidOpcode { at: usize, opcode: i64 },

    /// Push beyond the configured stack capacity.
    #[error("stack overflow (capacity {capacity}) at instruction {at}")]
    StackOverflow { at: usize, capacity: usize },

    /// Pop from an empty stack.
    #[error("stack underflow at instruction {at}")]
    StackUnderflow { at: usize },

    /// Fetch past the end of the program.
    #[error("unexpected end of program at instruction {at}")]
    UnexpectedEndOfProgram { at: usize },

    /// Frame-relative or saved-frame index outside the stack.
    #[error("stack index {index} out of range at instruction {at}")]
    StackAddressOutOfRange { at: usize, index: i64 },

    /// Global address outside the data segment.
    #[error("data address {address} out of range (size {size}) at instruction {at}")]
    DataAddressOutOfRange { at: usize, address: i64, size: usize },

    /// Branch, call or return target outside the program.
    #[error("code address {address} out of range at instruction {at}")]
    CodeAddressOutOfRange { at: usize, address: i64 },

    /// Writing PRINT or trace output failed.
    #[error("output error at instruction {at}: {message}")]
    Output { at: usize, message: String },

    /// `execute` called on a machine that already halted or faulted.
    #[error("machine is not runnable (already halted or faulted)")]
    NotRunnable,
}
