//! Execution trace and end-of-run memory dump.
//!
//! Trace lines are written before the instruction executes:
//!
//! ```text
//! 0000: iconst 99 []
//! 0002: print [99]
//! ```

use crate::error::RuntimeError;
use crate::machine::VM;
use stackvm_common::Opcode;
use std::io::Write;

/// Render stack contents as `[v1 v2 ..]`, bottom first.
pub fn format_stack(values: &[i64]) -> String {
    let items: Vec<String> = values.iter().map(i64::to_string).collect();
    format!("[{}]", items.join(" "))
}

impl<'a, W: Write> VM<'a, W> {
    /// Emit the trace line for the instruction at `self.at`. The opcode has
    /// already been fetched, so its operands start at `self.ip`.
    pub(crate) fn trace_instruction(&mut self, opcode: Opcode) -> Result<(), RuntimeError> {
        let mut line = format!("{:04}: {}", self.at, opcode.mnemonic());
        // Missing operands are left out; the fetch that follows faults.
        for operand in (0..opcode.operand_count()).filter_map(|i| self.program.get(self.ip + i)) {
            line.push(' ');
            line.push_str(&operand.to_string());
        }
        let stack = format_stack(self.stack());
        self.emit(format_args!("{line} {stack}"))
    }

    /// Emit the trace line for a value that is not an opcode: the raw value
    /// in place of a mnemonic, no operands.
    pub(crate) fn trace_unknown(&mut self, value: i64) -> Result<(), RuntimeError> {
        let stack = format_stack(self.stack());
        let at = self.at;
        self.emit(format_args!("{at:04}: {value} {stack}"))
    }

    /// Dump every data-segment slot. Nothing is written for an empty segment.
    pub(crate) fn dump_memory(&mut self) -> Result<(), RuntimeError> {
        if self.data.is_empty() {
            return Ok(());
        }
        self.emit(format_args!("Memory:"))?;
        for index in 0..self.data.len() {
            let value = self.data[index];
            self.emit(format_args!("{index:04}: {value}"))?;
        }
        Ok(())
    }
}
