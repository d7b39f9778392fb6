//! Bytecode executor
//!
//! A stack machine over an [`Artifact`]. Names are resolved dynamically
//! against the [`Environment`] the VM was handed.

use tracing::trace;

use super::errors::{RuntimeError, RuntimeErrorKind, VMResult};
use crate::middle::bytecode::Artifact;
use crate::middle::opcode::Instruction;
use crate::runtime::operations;
use crate::runtime::{Environment, Value};

/// VM 配置
#[derive(Debug, Clone)]
pub struct VMConfig {
    /// 初始栈大小
    pub stack_size: usize,
    /// 是否启用跟踪
    pub trace_execution: bool,
}

impl Default for VMConfig {
    fn default() -> Self {
        Self {
            stack_size: 256,
            trace_execution: false,
        }
    }
}

/// Virtual machine bound to an environment
pub struct VM<'e> {
    env: &'e mut Environment,
    stack: Vec<Value>,
    config: VMConfig,
}

impl<'e> VM<'e> {
    pub fn new(env: &'e mut Environment) -> Self {
        Self::with_config(env, VMConfig::default())
    }

    pub fn with_config(
        env: &'e mut Environment,
        config: VMConfig,
    ) -> Self {
        Self {
            env,
            stack: Vec::with_capacity(config.stack_size),
            config,
        }
    }

    /// Run every instruction of `artifact`
    pub fn run(
        &mut self,
        artifact: &Artifact,
    ) -> VMResult<()> {
        let mut pc = 0;
        while pc < artifact.code.len() {
            let instr = artifact.code[pc];
            if self.config.trace_execution {
                trace!("{:>4} {:?} stack={}", pc, instr, self.stack.len());
            }
            pc = self
                .step(artifact, instr, pc)
                .map_err(|kind| RuntimeError::new(kind, artifact.line_at(pc)))?;
        }
        self.stack.clear();
        Ok(())
    }

    /// Execute one instruction, returning the next program counter
    fn step(
        &mut self,
        artifact: &Artifact,
        instr: Instruction,
        pc: usize,
    ) -> Result<usize, RuntimeErrorKind> {
        match instr {
            Instruction::LoadConst(i) => {
                let constant = artifact
                    .constants
                    .get(i as usize)
                    .ok_or(RuntimeErrorKind::InvalidOperand(i))?;
                self.stack.push(Value::from(constant));
            }
            Instruction::LoadName(i) => {
                let name = Self::name(artifact, i)?;
                let value = self
                    .env
                    .get(name)
                    .cloned()
                    .ok_or_else(|| RuntimeErrorKind::UnresolvedName(name.to_string()))?;
                self.stack.push(value);
            }
            Instruction::StoreName(i) => {
                let name = Self::name(artifact, i)?;
                let value = self.pop()?;
                self.env.define(name, value);
            }
            Instruction::Pop => {
                self.pop()?;
            }
            Instruction::Call { name, argc } => {
                let name = Self::name(artifact, name)?;
                let argc = argc as usize;
                if self.stack.len() < argc {
                    return Err(RuntimeErrorKind::StackUnderflow);
                }
                let args = self.stack.split_off(self.stack.len() - argc);
                let callee = self
                    .env
                    .get(name)
                    .ok_or_else(|| RuntimeErrorKind::UnresolvedName(name.to_string()))?;
                let result = call_value(name, callee, &args)?;
                self.stack.push(result);
            }
            Instruction::Binary(op) => {
                let rhs = self.pop()?;
                let lhs = self.pop()?;
                self.stack.push(operations::binary(op, &lhs, &rhs)?);
            }
            Instruction::Compare(op) => {
                let rhs = self.pop()?;
                let lhs = self.pop()?;
                self.stack.push(operations::compare(op, &lhs, &rhs)?);
            }
            Instruction::Jump(target) => return Ok(target as usize),
            Instruction::JumpIfFalse(target) => {
                if !self.pop()?.is_truthy() {
                    return Ok(target as usize);
                }
            }
        }
        Ok(pc + 1)
    }

    fn pop(&mut self) -> Result<Value, RuntimeErrorKind> {
        self.stack.pop().ok_or(RuntimeErrorKind::StackUnderflow)
    }

    fn name(
        artifact: &Artifact,
        index: u32,
    ) -> Result<&str, RuntimeErrorKind> {
        artifact
            .names
            .get(index as usize)
            .map(String::as_str)
            .ok_or(RuntimeErrorKind::InvalidOperand(index))
    }
}

/// Invoke `callee` (bound to `name`) with `args`
pub fn call_value(
    name: &str,
    callee: &Value,
    args: &[Value],
) -> Result<Value, RuntimeErrorKind> {
    match callee {
        Value::Builtin(builtin) => builtin.call(args),
        other => Err(RuntimeErrorKind::NotCallable {
            name: name.to_string(),
            type_name: other.type_name(),
        }),
    }
}
