//! Instruction catalog for the stackvm bytecode.
//!
//! Every opcode maps to a lowercase mnemonic and a fixed number of inline
//! operands. The execution engine does not consult the operand count at
//! dispatch time; it is used by the trace printer and the disassembler.

use crate::error::LoadError;

/// Identifies the operation to perform.
///
/// The `#[repr(i64)]` attribute pins each variant to its bytecode value.
#[repr(i64)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// Pop r, pop l, push l + r.
    IAdd = 1,
    /// Pop r, pop l, push l - r.
    ISub = 2,
    /// Pop r, pop l, push l * r.
    IMul = 3,
    /// Pop r, pop l, push 1 if l < r else 0.
    ILt = 4,
    /// Pop r, pop l, push 1 if l == r else 0.
    IEq = 5,
    /// Jump to the absolute address operand.
    Br = 6,
    /// Pop a condition, jump if it is non-zero.
    Brt = 7,
    /// Pop a condition, jump if it is zero.
    Brf = 8,
    /// Push the literal operand.
    IConst = 9,
    /// Push the stack slot at `fp + operand`.
    Load = 10,
    /// Push the global at the address operand.
    GLoad = 11,
    /// Pop a value into the stack slot at `fp + operand`.
    Store = 12,
    /// Pop a value into the global at the address operand.
    GStore = 13,
    /// Pop a value and write it to the output stream.
    Print = 14,
    /// Discard the top of the stack.
    Pop = 15,
    /// Call the subroutine at the address operand.
    Call = 16,
    /// Return from the current subroutine.
    Ret = 17,
    /// Stop execution.
    Halt = 18,
}

/// Catalog entry for one opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstructionInfo {
    /// The opcode this entry describes.
    pub opcode: Opcode,
    /// Lowercase assembly mnemonic.
    pub name: &'static str,
    /// Number of inline operands following the opcode (0, 1 or 2).
    pub operands: usize,
}

const fn entry(opcode: Opcode, name: &'static str, operands: usize) -> InstructionInfo {
    InstructionInfo {
        opcode,
        name,
        operands,
    }
}

/// The instruction catalog, indexed by `opcode value - 1`.
pub static CATALOG: [InstructionInfo; 18] = [
    entry(Opcode::IAdd, "iadd", 0),
    entry(Opcode::ISub, "isub", 0),
    entry(Opcode::IMul, "imul", 0),
    entry(Opcode::ILt, "ilt", 0),
    entry(Opcode::IEq, "ieq", 0),
    entry(Opcode::Br, "br", 1),
    entry(Opcode::Brt, "brt", 1),
    entry(Opcode::Brf, "brf", 1),
    entry(Opcode::IConst, "iconst", 1),
    entry(Opcode::Load, "load", 1),
    entry(Opcode::GLoad, "gload", 1),
    entry(Opcode::Store, "store", 1),
    entry(Opcode::GStore, "gstore", 1),
    entry(Opcode::Print, "print", 0),
    entry(Opcode::Pop, "pop", 0),
    entry(Opcode::Call, "call", 1),
    entry(Opcode::Ret, "ret", 0),
    entry(Opcode::Halt, "halt", 0),
];

/// All valid opcodes, in value order.
pub const ALL_OPCODES: [Opcode; 18] = [
    Opcode::IAdd,
    Opcode::ISub,
    Opcode::IMul,
    Opcode::ILt,
    Opcode::IEq,
    Opcode::Br,
    Opcode::Brt,
    Opcode::Brf,
    Opcode::IConst,
    Opcode::Load,
    Opcode::GLoad,
    Opcode::Store,
    Opcode::GStore,
    Opcode::Print,
    Opcode::Pop,
    Opcode::Call,
    Opcode::Ret,
    Opcode::Halt,
];

/// Bounds-checked catalog lookup by raw opcode value.
pub fn lookup(value: i64) -> Option<&'static InstructionInfo> {
    let index = usize::try_from(value).ok()?.checked_sub(1)?;
    CATALOG.get(index)
}

impl TryFrom<i64> for Opcode {
    type Error = LoadError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        lookup(value)
            .map(|info| info.opcode)
            .ok_or(LoadError::UnknownOpcode(value))
    }
}

impl From<Opcode> for i64 {
    fn from(opcode: Opcode) -> Self {
        opcode as i64
    }
}

impl Opcode {
    /// Returns this opcode's catalog entry.
    pub fn info(self) -> &'static InstructionInfo {
        &CATALOG[self as usize - 1]
    }

    /// Returns the assembly mnemonic for this opcode.
    pub fn mnemonic(self) -> &'static str {
        self.info().name
    }

    /// Number of inline operands this opcode consumes.
    pub fn operand_count(self) -> usize {
        self.info().operands
    }
}
