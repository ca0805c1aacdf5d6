//! VM state management: program, data segment, stack and cursors.

use crate::error::RuntimeError;
use stackvm_common::Program;
use std::fmt;
use std::io::{self, Stdout, Write};

/// Default operand/call stack capacity in slots.
pub const DEFAULT_STACK_SIZE: usize = 1000;

/// Frame pointer value meaning "no enclosing call" (top-level code).
///
/// At top level `LOAD i` / `STORE i` address stack slot `i - 1`.
pub const FP_NONE: i64 = -1;

/// Stack pointer value of an empty stack.
pub(crate) const EMPTY_STACK: i64 = -1;

/// Lifecycle of a machine. Only a `Ready` machine can execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Constructed, not yet executed.
    Ready,
    /// Ran off the end of the program or executed HALT.
    Halted,
    /// Stopped by a fatal runtime error.
    Faulted,
}

/// The stackvm virtual machine.
///
/// PRINT output and trace lines are written to `W`, in execution order.
pub struct VM<'a, W: Write = Stdout> {
    /// The program being executed.
    pub(crate) program: &'a Program,
    /// Global data segment, zero-initialised.
    pub(crate) data: Vec<i64>,
    /// Fixed-capacity operand/call stack.
    pub(crate) stack: Vec<i64>,
    /// Index of the top occupied stack slot, `EMPTY_STACK` when empty.
    pub(crate) sp: i64,
    /// Base of the current activation, `FP_NONE` at top level.
    pub(crate) fp: i64,
    /// Address of the next value to fetch.
    pub(crate) ip: usize,
    /// Address of the opcode currently executing.
    pub(crate) at: usize,
    pub(crate) trace: bool,
    pub(crate) status: Status,
    pub(crate) out: W,
}

impl<'a> VM<'a, Stdout> {
    /// Create a VM that writes to standard output.
    ///
    /// `entry` is the initial instruction pointer and `data_size` the
    /// number of global slots.
    pub fn new(program: &'a Program, entry: usize, data_size: usize) -> Self {
        Self::with_output(program, entry, data_size, io::stdout())
    }
}

impl<'a, W: Write> VM<'a, W> {
    /// Create a VM that writes PRINT and trace output to `out`.
    pub fn with_output(program: &'a Program, entry: usize, data_size: usize, out: W) -> Self {
        Self {
            program,
            data: vec![0; data_size],
            stack: vec![0; DEFAULT_STACK_SIZE],
            sp: EMPTY_STACK,
            fp: FP_NONE,
            ip: entry,
            at: entry,
            trace: false,
            status: Status::Ready,
            out,
        }
    }

    /// Replace the stack with one of `size` slots.
    pub fn with_stack_size(mut self, size: usize) -> Self {
        self.stack = vec![0; size];
        self.sp = EMPTY_STACK;
        self
    }

    /// Switch per-instruction tracing and the final memory dump on or off.
    pub fn set_trace(&mut self, on: bool) {
        self.trace = on;
    }

    /// The global data segment.
    pub fn data(&self) -> &[i64] {
        &self.data
    }

    /// Occupied stack slots, bottom first.
    pub fn stack(&self) -> &[i64] {
        let len = usize::try_from(self.sp + 1).unwrap_or(0);
        &self.stack[..len]
    }

    /// Address of the next value to fetch.
    pub fn ip(&self) -> usize {
        self.ip
    }

    /// Index of the top stack slot; `-1` when the stack is empty.
    pub fn sp(&self) -> i64 {
        self.sp
    }

    /// Frame pointer of the active call, or [`FP_NONE`] at top level.
    pub fn fp(&self) -> i64 {
        self.fp
    }

    /// Whether the machine is ready, halted, or faulted.
    pub fn status(&self) -> Status {
        self.status
    }

    /// Consume the VM and return its output sink.
    pub fn into_output(self) -> W {
        self.out
    }

    /// Read the value at `ip` and advance past it.
    pub(crate) fn fetch(&mut self) -> Result<i64, RuntimeError> {
        let value = self
            .program
            .get(self.ip)
            .ok_or(RuntimeError::UnexpectedEndOfProgram { at: self.at })?;
        self.ip += 1;
        Ok(value)
    }

    /// Push a value onto the stack, checking for overflow.
    pub(crate) fn push(&mut self, value: i64) -> Result<(), RuntimeError> {
        let next = self.sp + 1;
        let index = usize::try_from(next)
            .ok()
            .filter(|&i| i < self.stack.len())
            .ok_or(RuntimeError::StackOverflow {
                at: self.at,
                capacity: self.stack.len(),
            })?;
        self.stack[index] = value;
        self.sp = next;
        Ok(())
    }

    /// Pop a value from the stack.
    pub(crate) fn pop(&mut self) -> Result<i64, RuntimeError> {
        let index = usize::try_from(self.sp)
            .map_err(|_| RuntimeError::StackUnderflow { at: self.at })?;
        let value = self.stack[index];
        self.sp -= 1;
        Ok(value)
    }

    /// Checked conversion of an absolute stack index.
    pub(crate) fn slot(&self, index: i64) -> Result<usize, RuntimeError> {
        usize::try_from(index)
            .ok()
            .filter(|&i| i < self.stack.len())
            .ok_or(RuntimeError::StackAddressOutOfRange { at: self.at, index })
    }

    /// Checked stack index of `fp + offset`.
    pub(crate) fn frame_slot(&self, offset: i64) -> Result<usize, RuntimeError> {
        self.slot(self.fp.saturating_add(offset))
    }

    /// Checked data-segment index.
    pub(crate) fn data_address(&self, address: i64) -> Result<usize, RuntimeError> {
        usize::try_from(address)
            .ok()
            .filter(|&a| a < self.data.len())
            .ok_or(RuntimeError::DataAddressOutOfRange {
                at: self.at,
                address,
                size: self.data.len(),
            })
    }

    /// Checked control-transfer target. The program length itself is a
    /// valid target and ends execution normally.
    pub(crate) fn code_address(&self, address: i64) -> Result<usize, RuntimeError> {
        usize::try_from(address)
            .ok()
            .filter(|&a| a <= self.program.len())
            .ok_or(RuntimeError::CodeAddressOutOfRange { at: self.at, address })
    }

    /// Write one line to the output sink.
    pub(crate) fn emit(&mut self, line: fmt::Arguments<'_>) -> Result<(), RuntimeError> {
        writeln!(self.out, "{line}").map_err(|e| RuntimeError::Output {
            at: self.at,
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine(program: &Program) -> VM<'_, Vec<u8>> {
        VM::with_output(program, 0, 2, Vec::new())
    }

    #[test]
    fn initial_state() {
        let program = Program::new(vec![18]);
        let vm = VM::with_output(&program, 0, 3, Vec::new());
        assert_eq!(vm.data(), &[0, 0, 0]);
        assert!(vm.stack().is_empty());
        assert_eq!(vm.sp(), -1);
        assert_eq!(vm.fp(), FP_NONE);
        assert_eq!(vm.ip(), 0);
        assert_eq!(vm.status(), Status::Ready);
    }

    #[test]
    fn push_pop_order() {
        let program = Program::default();
        let mut vm = machine(&program);
        vm.push(1).unwrap();
        vm.push(2).unwrap();
        assert_eq!(vm.stack(), &[1, 2]);
        assert_eq!(vm.pop(), Ok(2));
        assert_eq!(vm.pop(), Ok(1));
        assert_eq!(vm.pop(), Err(RuntimeError::StackUnderflow { at: 0 }));
    }

    #[test]
    fn push_beyond_capacity() {
        let program = Program::default();
        let mut vm = machine(&program).with_stack_size(2);
        vm.push(1).unwrap();
        vm.push(2).unwrap();
        assert_eq!(
            vm.push(3),
            Err(RuntimeError::StackOverflow { at: 0, capacity: 2 })
        );
        assert_eq!(vm.stack(), &[1, 2]);
    }

    #[test]
    fn zero_capacity_stack_overflows_immediately() {
        let program = Program::default();
        let mut vm = machine(&program).with_stack_size(0);
        assert!(matches!(vm.push(1), Err(RuntimeError::StackOverflow { .. })));
    }

    #[test]
    fn fetch_advances_and_stops_at_end() {
        let program = Program::new(vec![9, 42]);
        let mut vm = machine(&program);
        assert_eq!(vm.fetch(), Ok(9));
        assert_eq!(vm.fetch(), Ok(42));
        assert_eq!(vm.ip(), 2);
        assert_eq!(
            vm.fetch(),
            Err(RuntimeError::UnexpectedEndOfProgram { at: 0 })
        );
    }

    #[test]
    fn address_checks() {
        let program = Program::new(vec![18, 18]);
        let vm = machine(&program).with_stack_size(4);
        assert_eq!(vm.slot(3), Ok(3));
        assert!(vm.slot(4).is_err());
        assert!(vm.slot(-1).is_err());
        assert_eq!(vm.frame_slot(1), Ok(0));
        assert!(vm.frame_slot(i64::MAX).is_err());
        assert_eq!(vm.data_address(1), Ok(1));
        assert!(vm.data_address(2).is_err());
        assert_eq!(vm.code_address(2), Ok(2));
        assert!(vm.code_address(3).is_err());
        assert!(vm.code_address(-1).is_err());
    }
}
