//! stackvm virtual machine — executes flat integer bytecode.
//!
//! The VM is a stack-based machine with:
//! - An operand stack of fixed capacity, shared with call frames
//! - A zero-initialised global data segment
//! - Instruction, stack and frame pointers
//!
//! # Usage
//!
//! ```
//! use stackvm_common::{Opcode, Program};
//! use stackvm_vm::VM;
//!
//! let program = Program::new(vec![
//!     Opcode::IConst as i64, 10,
//!     Opcode::IConst as i64, 3,
//!     Opcode::ISub as i64,
//!     Opcode::Print as i64,
//! ]);
//!
//! let mut vm = VM::with_output(&program, 0, 0, Vec::new());
//! vm.execute().unwrap();
//! assert_eq!(vm.into_output(), b"7\n");
//! ```
//!
//! When only the final globals matter, [`run`] executes on standard output:
//!
//! ```
//! use stackvm_common::{Opcode, Program};
//!
//! let program = Program::new(vec![Opcode::IConst as i64, 5, Opcode::GStore as i64, 0]);
//! assert_eq!(stackvm_vm::run(&program, 0, 1), Ok(vec![5]));
//! ```

mod call;
pub mod error;
mod execute;
pub mod machine;
pub mod trace;

pub use error::RuntimeError;
pub use machine::{Status, DEFAULT_STACK_SIZE, FP_NONE, VM};

use stackvm_common::Program;

/// Execute a program on standard output and return the final data segment.
///
/// # Errors
///
/// Returns [`RuntimeError`] if execution faults (unknown opcode, stack
/// overflow or underflow, out-of-range address, etc.).
pub fn run(program: &Program, entry: usize, data_size: usize) -> Result<Vec<i64>, RuntimeError> {
    let mut vm = VM::new(program, entry, data_size);
    vm.execute()?;
    Ok(vm.data().to_vec())
}
