//! IR → bytecode generation
//!
//! Lowers an [`Ir`] tree to the flat, stack-based instruction list of an
//! [`Artifact`]. Constants and names are interned; every emitted
//! instruction records the line of the IR node that produced it.

use indexmap::IndexSet;
use tracing::debug;

use super::bytecode::{Artifact, FileHeader};
use super::ir::{ConstValue, Ir, IrKind};
use super::opcode::Instruction;
use super::CompileError;

/// Generate an artifact from a line-complete IR tree
pub fn generate(
    ir: &Ir,
    source_name: &str,
) -> Result<Artifact, CompileError> {
    let mut generator = CodeGenerator::default();
    generator.emit_node(ir, 1)?;

    let artifact = Artifact {
        header: FileHeader::default(),
        source_name: source_name.to_string(),
        constants: generator.constants,
        names: generator.names.into_iter().collect(),
        code: generator.code,
        lines: generator.lines,
    };
    debug!(
        "Generated {} instructions, {} constants, {} names",
        artifact.code.len(),
        artifact.constants.len(),
        artifact.names.len()
    );
    Ok(artifact)
}

#[derive(Default)]
struct CodeGenerator {
    constants: Vec<ConstValue>,
    names: IndexSet<String>,
    code: Vec<Instruction>,
    lines: Vec<u32>,
}

impl CodeGenerator {
    fn emit(
        &mut self,
        instr: Instruction,
        line: usize,
    ) -> Result<usize, CompileError> {
        let line = u32::try_from(line).map_err(|_| CompileError::TooLarge("line number"))?;
        self.code.push(instr);
        self.lines.push(line);
        Ok(self.code.len() - 1)
    }

    fn here(&self) -> Result<u32, CompileError> {
        u32::try_from(self.code.len()).map_err(|_| CompileError::TooLarge("code"))
    }

    /// Point the jump at `at` to the current end of code
    fn patch(
        &mut self,
        at: usize,
    ) -> Result<(), CompileError> {
        let target = self.here()?;
        match &mut self.code[at] {
            Instruction::Jump(t) | Instruction::JumpIfFalse(t) => *t = target,
            _ => unreachable!("patched instruction is always a jump"),
        }
        Ok(())
    }

    fn constant(
        &mut self,
        value: &ConstValue,
    ) -> Result<u32, CompileError> {
        let index = match self.constants.iter().position(|c| c == value) {
            Some(index) => index,
            None => {
                self.constants.push(value.clone());
                self.constants.len() - 1
            }
        };
        u32::try_from(index).map_err(|_| CompileError::TooLarge("constant pool"))
    }

    fn name(
        &mut self,
        name: &str,
    ) -> Result<u32, CompileError> {
        let (index, _) = self.names.insert_full(name.to_string());
        u32::try_from(index).map_err(|_| CompileError::TooLarge("name table"))
    }

    fn emit_block(
        &mut self,
        items: &[Ir],
        line: usize,
    ) -> Result<(), CompileError> {
        for item in items {
            self.emit_node(item, line)?;
        }
        Ok(())
    }

    fn emit_node(
        &mut self,
        ir: &Ir,
        inherited: usize,
    ) -> Result<(), CompileError> {
        let line = ir.line.unwrap_or(inherited);
        match &ir.kind {
            IrKind::Module(items) => self.emit_block(items, line)?,
            IrKind::Assign { name, value } => {
                self.emit_node(value, line)?;
                let index = self.name(name)?;
                self.emit(Instruction::StoreName(index), line)?;
            }
            IrKind::Discard(value) => {
                self.emit_node(value, line)?;
                self.emit(Instruction::Pop, line)?;
            }
            IrKind::Loop { test, body } => {
                let start = self.here()?;
                self.emit_node(test, line)?;
                let exit = self.emit(Instruction::JumpIfFalse(0), line)?;
                self.emit_block(body, line)?;
                self.emit(Instruction::Jump(start), line)?;
                self.patch(exit)?;
            }
            IrKind::Branch { test, body, orelse } => {
                self.emit_node(test, line)?;
                let skip_body = self.emit(Instruction::JumpIfFalse(0), line)?;
                self.emit_block(body, line)?;
                if orelse.is_empty() {
                    self.patch(skip_body)?;
                } else {
                    let skip_else = self.emit(Instruction::Jump(0), line)?;
                    self.patch(skip_body)?;
                    self.emit_block(orelse, line)?;
                    self.patch(skip_else)?;
                }
            }
            IrKind::Call { callee, args } => {
                for arg in args {
                    self.emit_node(arg, line)?;
                }
                let name = self.name(callee)?;
                let argc = u32::try_from(args.len()).map_err(|_| CompileError::TooLarge("argument list"))?;
                self.emit(Instruction::Call { name, argc }, line)?;
            }
            IrKind::Binary { lhs, op, rhs } => {
                self.emit_node(lhs, line)?;
                self.emit_node(rhs, line)?;
                self.emit(Instruction::Binary(*op), line)?;
            }
            IrKind::Compare { lhs, op, rhs } => {
                self.emit_node(lhs, line)?;
                self.emit_node(rhs, line)?;
                self.emit(Instruction::Compare(*op), line)?;
            }
            IrKind::Name(name) => {
                let index = self.name(name)?;
                self.emit(Instruction::LoadName(index), line)?;
            }
            IrKind::Const(value) => {
                let index = self.constant(value)?;
                self.emit(Instruction::LoadConst(index), line)?;
            }
        }
        Ok(())
    }
}
