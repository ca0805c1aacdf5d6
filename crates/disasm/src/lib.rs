//! stackvm disassembler: bytecode → address-annotated listing.
//!
//! Output is flat text, one instruction per line:
//!
//! ```text
//! 0000: iconst 99
//! 0002: print
//! 0003: halt
//! ```
//!
//! Values that do not name an opcode are emitted as `.word` lines and
//! consume a single slot. An instruction whose operands run past the end
//! of the program is emitted with the operands that exist, followed by
//! `<truncated>`.
//!
//! # Usage
//!
//! ```
//! use stackvm_common::Program;
//! use stackvm_disasm::disassemble;
//!
//! let program = Program::new(vec![9, 99, 14, 18]);
//! assert_eq!(
//!     disassemble(&program),
//!     "0000: iconst 99\n0002: print\n0003: halt\n"
//! );
//! ```

use stackvm_common::{Opcode, Program};

/// Disassemble a whole program into a listing.
pub fn disassemble(program: &Program) -> String {
    let code = program.code();
    let mut out = String::new();
    let mut addr = 0;

    while addr < code.len() {
        let (line, width) = disassemble_at(code, addr);
        out.push_str(&line);
        out.push('\n');
        addr += width;
    }

    out
}

/// Disassemble the instruction at `addr` (which must be in bounds), returning
/// the line and the number of slots it occupies.
fn disassemble_at(code: &[i64], addr: usize) -> (String, usize) {
    let value = code[addr];

    let opcode = match Opcode::try_from(value) {
        Ok(opcode) => opcode,
        Err(_) => return (format!("{addr:04}: .word {value}"), 1),
    };

    let mut line = format!("{addr:04}: {}", opcode.mnemonic());
    let wanted = opcode.operand_count();
    let operands = &code[addr + 1..code.len().min(addr + 1 + wanted)];
    for operand in operands {
        line.push(' ');
        line.push_str(&operand.to_string());
    }
    if operands.len() < wanted {
        line.push_str(" <truncated>");
    }

    (line, 1 + operands.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ICONST: i64 = Opcode::IConst as i64;
    const CALL: i64 = Opcode::Call as i64;
    const RET: i64 = Opcode::Ret as i64;
    const PRINT: i64 = Opcode::Print as i64;
    const HALT: i64 = Opcode::Halt as i64;

    #[test]
    fn empty_program() {
        assert_eq!(disassemble(&Program::default()), "");
    }

    #[test]
    fn operands_follow_mnemonic() {
        let program = Program::new(vec![ICONST, -5, ICONST, 1, CALL, 8, PRINT, HALT, RET]);
        let expected = "\
0000: iconst -5
0002: iconst 1
0004: call 8
0006: print
0007: halt
0008: ret
";
        assert_eq!(disassemble(&program), expected);
    }

    #[test]
    fn unknown_values_are_words() {
        let program = Program::new(vec![0, 99, HALT]);
        assert_eq!(
            disassemble(&program),
            "0000: .word 0\n0001: .word 99\n0002: halt\n"
        );
    }

    #[test]
    fn truncated_trailing_instruction() {
        let program = Program::new(vec![PRINT, ICONST]);
        assert_eq!(
            disassemble(&program),
            "0000: print\n0001: iconst <truncated>\n"
        );
    }

    #[test]
    fn disassemble_at_reports_width() {
        let code = [ICONST, 7, PRINT];
        assert_eq!(disassemble_at(&code, 0), ("0000: iconst 7".to_string(), 2));
        assert_eq!(disassemble_at(&code, 2), ("0002: print".to_string(), 1));
    }

    #[test]
    fn every_opcode_has_a_listing() {
        for &opcode in &stackvm_common::ALL_OPCODES {
            let mut code = vec![opcode as i64];
            code.extend(std::iter::repeat(0).take(opcode.operand_count()));
            let text = disassemble(&Program::new(code));
            assert!(text.starts_with(&format!("0000: {}", opcode.mnemonic())));
            assert_eq!(text.lines().count(), 1, "{opcode:?}");
        }
    }
}
