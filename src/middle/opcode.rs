//! Opcode definitions for Sluice bytecode

use std::fmt;

use crate::frontend::parser::ast::{BinOp, CmpOp};

/// Bytecode operation code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    // =====================
    // Stack (0x00-0x0F)
    // =====================
    /// Push a constant from the pool
    LoadConst = 0x01,
    /// Push the value bound to a name
    LoadName = 0x02,
    /// Pop into a name in the innermost scope
    StoreName = 0x03,
    /// Drop the top of stack
    Pop = 0x04,

    // =====================
    // Operations (0x10-0x1F)
    // =====================
    /// Call a value looked up by name
    Call = 0x10,
    Binary = 0x11,
    Compare = 0x12,

    // =====================
    // Control Flow (0x20-0x2F)
    // =====================
    Jump = 0x20,
    JumpIfFalse = 0x21,
}

impl Opcode {
    pub fn name(&self) -> &'static str {
        match self {
            Opcode::LoadConst => "LoadConst",
            Opcode::LoadName => "LoadName",
            Opcode::StoreName => "StoreName",
            Opcode::Pop => "Pop",
            Opcode::Call => "Call",
            Opcode::Binary => "Binary",
            Opcode::Compare => "Compare",
            Opcode::Jump => "Jump",
            Opcode::JumpIfFalse => "JumpIfFalse",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for Opcode {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(Opcode::LoadConst),
            0x02 => Ok(Opcode::LoadName),
            0x03 => Ok(Opcode::StoreName),
            0x04 => Ok(Opcode::Pop),
            0x10 => Ok(Opcode::Call),
            0x11 => Ok(Opcode::Binary),
            0x12 => Ok(Opcode::Compare),
            0x20 => Ok(Opcode::Jump),
            0x21 => Ok(Opcode::JumpIfFalse),
            other => Err(other),
        }
    }
}

/// Decoded instruction
///
/// Operands index the artifact's constant pool, name table, or code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    LoadConst(u32),
    LoadName(u32),
    StoreName(u32),
    Pop,
    Call { name: u32, argc: u32 },
    Binary(BinOp),
    Compare(CmpOp),
    Jump(u32),
    JumpIfFalse(u32),
}

impl Instruction {
    pub fn opcode(&self) -> Opcode {
        match self {
            Instruction::LoadConst(_) => Opcode::LoadConst,
            Instruction::LoadName(_) => Opcode::LoadName,
            Instruction::StoreName(_) => Opcode::StoreName,
            Instruction::Pop => Opcode::Pop,
            Instruction::Call { .. } => Opcode::Call,
            Instruction::Binary(_) => Opcode::Binary,
            Instruction::Compare(_) => Opcode::Compare,
            Instruction::Jump(_) => Opcode::Jump,
            Instruction::JumpIfFalse(_) => Opcode::JumpIfFalse,
        }
    }
}

/// Operator byte encoding
pub fn binop_code(op: BinOp) -> u8 {
    match op {
        BinOp::Add => 0,
        BinOp::Sub => 1,
        BinOp::Mul => 2,
        BinOp::Div => 3,
        BinOp::Pow => 4,
    }
}

pub fn binop_from_code(code: u8) -> Option<BinOp> {
    BinOp::ALL.into_iter().find(|&op| binop_code(op) == code)
}

pub fn cmpop_code(op: CmpOp) -> u8 {
    match op {
        CmpOp::Eq => 0,
        CmpOp::Ne => 1,
        CmpOp::Lt => 2,
        CmpOp::Gt => 3,
        CmpOp::Le => 4,
        CmpOp::Ge => 5,
    }
}

pub fn cmpop_from_code(code: u8) -> Option<CmpOp> {
    CmpOp::ALL.into_iter().find(|&op| cmpop_code(op) == code)
}
