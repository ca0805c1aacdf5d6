//! CALL/RET calling convention.
//!
//! Activation frames live on the operand stack. For a call with `k`
//! arguments the layout, lowest slot first, is:
//!
//! ```text
//! arg1 .. argk  nargs  saved_fp  saved_ip  local1  local2 ..
//!                                   ^ fp
//! ```
//!
//! so `arg1` is at `fp - (k + 2)`, `nargs` at `fp - 2`, the saved frame
//! pointer at `fp - 1` and the return address at `fp`. `local1` (`fp + 1`)
//! holds the return value when RET executes.

use crate::error::RuntimeError;
use crate::machine::{EMPTY_STACK, FP_NONE, VM};
use std::io::Write;

impl<'a, W: Write> VM<'a, W> {
    /// CALL addr: expects `arg1 .. argk, k` on the stack.
    pub(crate) fn exec_call(&mut self) -> Result<(), RuntimeError> {
        let target = self.fetch()?;
        let target = self.code_address(target)?;

        self.push(self.fp)?;
        self.push(self.ip as i64)?;
        self.fp = self.sp;
        self.ip = target;
        Ok(())
    }

    /// RET: unwind the current frame and push its `local1` for the caller.
    pub(crate) fn exec_ret(&mut self) -> Result<(), RuntimeError> {
        let frame = self.fp;

        let saved_ip = self.stack[self.slot(frame)?];
        let saved_fp = self.stack[self.slot(frame - 1)?];
        let nargs = self.stack[self.slot(frame - 2)?];
        let result = self.stack[self.slot(frame + 1)?];

        let return_to = self.code_address(saved_ip)?;
        if saved_fp != FP_NONE {
            self.slot(saved_fp)?;
        }

        // Rewind to just below arg1.
        let sp = (frame - 3).saturating_sub(nargs);
        if sp < EMPTY_STACK || sp >= self.stack.len() as i64 {
            return Err(RuntimeError::StackAddressOutOfRange { at: self.at, index: sp });
        }

        self.ip = return_to;
        self.fp = saved_fp;
        self.sp = sp;
        self.push(result)
    }
}

#[cfg(test)]
mod tests {
    use crate::machine::FP_NONE;
    use crate::{RuntimeError, VM};
    use stackvm_common::{Opcode, Program};

    const ICONST: i64 = Opcode::IConst as i64;
    const CALL: i64 = Opcode::Call as i64;
    const RET: i64 = Opcode::Ret as i64;
    const HALT: i64 = Opcode::Halt as i64;
    const LOAD: i64 = Opcode::Load as i64;

    #[test]
    fn call_builds_frame() {
        // 0: iconst 7; 2: iconst 1; 4: call 7; 6: halt; 7: halt
        let program = Program::new(vec![ICONST, 7, ICONST, 1, CALL, 7, HALT, HALT]);
        let mut vm = VM::with_output(&program, 0, 0, Vec::new());
        vm.execute().unwrap();

        // arg, nargs, saved fp, return address
        assert_eq!(vm.stack(), &[7, 1, FP_NONE, 6]);
        assert_eq!(vm.fp(), 3);
    }

    #[test]
    fn ret_restores_caller_and_pushes_local1() {
        // main: push 2 args, call f, halt
        // f (9): reserve local1 = arg1 + arg2 via loads, ret
        let program = Program::new(vec![
            ICONST, 4, // 0
            ICONST, 5, // 2
            ICONST, 2, // 4
            CALL, 9, // 6
            HALT, // 8
            LOAD, -4, // 9
            LOAD, -3, // 11
            Opcode::IAdd as i64, // 13
            RET, // 14
        ]);
        let mut vm = VM::with_output(&program, 0, 0, Vec::new());
        vm.execute().unwrap();

        assert_eq!(vm.stack(), &[9]);
        assert_eq!(vm.fp(), FP_NONE);
        assert_eq!(vm.ip(), 9);
    }

    #[test]
    fn ret_at_top_level_faults() {
        let program = Program::new(vec![ICONST, 1, RET]);
        let mut vm = VM::with_output(&program, 0, 0, Vec::new());
        assert_eq!(
            vm.execute(),
            Err(RuntimeError::StackAddressOutOfRange { at: 2, index: -1 })
        );
    }

    #[test]
    fn call_to_invalid_address_faults() {
        let program = Program::new(vec![ICONST, 0, CALL, -3]);
        let mut vm = VM::with_output(&program, 0, 0, Vec::new());
        assert_eq!(
            vm.execute(),
            Err(RuntimeError::CodeAddressOutOfRange { at: 2, address: -3 })
        );
    }

    #[test]
    fn ret_with_corrupt_argument_count_faults() {
        // nargs of 50 rewinds below the bottom of the stack.
        let program = Program::new(vec![ICONST, 50, CALL, 5, HALT, ICONST, 0, RET]);
        let mut vm = VM::with_output(&program, 0, 0, Vec::new());
        assert!(matches!(
            vm.execute(),
            Err(RuntimeError::StackAddressOutOfRange { at: 7, .. })
        ));
    }
}
