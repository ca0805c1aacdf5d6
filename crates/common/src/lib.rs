//! stackvm common types.
//!
//! This crate provides the data structures shared by the virtual machine,
//! the disassembler and the command-line front end:
//!
//! - [`Opcode`] and the static instruction [`CATALOG`]
//! - [`Program`] — a flat sequence of integers
//! - [`LoadError`] — errors from opcode decoding and program loading

pub mod error;
pub mod opcode;
pub mod program;

// Re-export commonly used types at the crate root.
pub use error::LoadError;
pub use opcode::{lookup, InstructionInfo, Opcode, ALL_OPCODES, CATALOG};
pub use program::Program;
