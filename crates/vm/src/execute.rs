//! Main execution loop and opcode dispatch.

use crate::error::RuntimeError;
use crate::machine::{Status, VM};
use stackvm_common::Opcode;
use std::io::Write;

impl<'a, W: Write> VM<'a, W> {
    /// Execute the loaded program until it runs off the end, executes
    /// HALT, or faults.
    ///
    /// A machine executes at most once; calling this again returns
    /// [`RuntimeError::NotRunnable`].
    pub fn execute(&mut self) -> Result<(), RuntimeError> {
        if self.status != Status::Ready {
            return Err(RuntimeError::NotRunnable);
        }

        let result = self.run_loop();
        self.status = match result {
            Ok(()) => Status::Halted,
            Err(_) => Status::Faulted,
        };
        result
    }

    fn run_loop(&mut self) -> Result<(), RuntimeError> {
        while self.ip < self.program.len() {
            self.at = self.ip;
            let value = self.fetch()?;
            let Ok(opcode) = Opcode::try_from(value) else {
                if self.trace {
                    self.trace_unknown(value)?;
                }
                return Err(RuntimeError::InvalidOpcode {
                    at: self.at,
                    opcode: value,
                });
            };

            if self.trace {
                self.trace_instruction(opcode)?;
            }

            match opcode {
                Opcode::Halt => break,

                // Arithmetic
                Opcode::IAdd => self.exec_binary(i64::wrapping_add)?,
                Opcode::ISub => self.exec_binary(i64::wrapping_sub)?,
                Opcode::IMul => self.exec_binary(i64::wrapping_mul)?,

                // Comparison
                Opcode::ILt => self.exec_comparison(|l, r| l < r)?,
                Opcode::IEq => self.exec_comparison(|l, r| l == r)?,

                // Control flow
                Opcode::Br => {
                    let target = self.fetch()?;
                    self.ip = self.code_address(target)?;
                }
                Opcode::Brt => self.exec_branch_if(|cond| cond != 0)?,
                Opcode::Brf => self.exec_branch_if(|cond| cond == 0)?,

                // Stack and memory
                Opcode::IConst => {
                    let value = self.fetch()?;
                    self.push(value)?;
                }
                Opcode::Load => self.exec_load()?,
                Opcode::Store => self.exec_store()?,
                Opcode::GLoad => self.exec_gload()?,
                Opcode::GStore => self.exec_gstore()?,
                Opcode::Pop => {
                    self.pop()?;
                }
                Opcode::Print => {
                    let value = self.pop()?;
                    self.emit(format_args!("{value}"))?;
                }

                // Subroutines
                Opcode::Call => self.exec_call()?,
                Opcode::Ret => self.exec_ret()?,
            }
        }

        if self.trace {
            self.dump_memory()?;
        }
        Ok(())
    }

    /// Pop r, pop l, push `op(l, r)`.
    fn exec_binary(&mut self, op: fn(i64, i64) -> i64) -> Result<(), RuntimeError> {
        let r = self.pop()?;
        let l = self.pop()?;
        self.push(op(l, r))
    }

    /// Pop r, pop l, push 1 if `op(l, r)` holds, else 0.
    fn exec_comparison(&mut self, op: fn(i64, i64) -> bool) -> Result<(), RuntimeError> {
        let r = self.pop()?;
        let l = self.pop()?;
        self.push(i64::from(op(l, r)))
    }

    fn exec_branch_if(&mut self, taken: fn(i64) -> bool) -> Result<(), RuntimeError> {
        let target = self.fetch()?;
        let cond = self.pop()?;
        if taken(cond) {
            self.ip = self.code_address(target)?;
        }
        Ok(())
    }

    fn exec_load(&mut self) -> Result<(), RuntimeError> {
        let offset = self.fetch()?;
        let index = self.frame_slot(offset)?;
        self.push(self.stack[index])
    }

    fn exec_store(&mut self) -> Result<(), RuntimeError> {
        let offset = self.fetch()?;
        let index = self.frame_slot(offset)?;
        let value = self.pop()?;
        self.stack[index] = value;
        Ok(())
    }

    fn exec_gload(&mut self) -> Result<(), RuntimeError> {
        let address = self.fetch()?;
        let index = self.data_address(address)?;
        self.push(self.data[index])
    }

    fn exec_gstore(&mut self) -> Result<(), RuntimeError> {
        let address = self.fetch()?;
        let index = self.data_address(address)?;
        let value = self.pop()?;
        self.data[index] = value;
        Ok(())
    }
}
