//! 字节码序列化
//!
//! Defines the `.sluc` artifact format. The magic number is stored
//! big-endian so it reads as `SLUC` in a hex dump; every other field is
//! little-endian with `u32` lengths.
//!
//! ```text
//! magic u32be | version u32 | flags u32
//! source name
//! constants:    count, then (tag u8, payload)*
//! names:        count, then string*
//! instructions: count, then (opcode u8, operands)*
//! lines:        count, then u32*
//! ```

use std::fmt::Write as _;
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use super::ir::ConstValue;
use super::opcode::{binop_code, binop_from_code, cmpop_code, cmpop_from_code, Instruction, Opcode};

/// Artifact magic (Sluice Compiled: SLUC)
pub const MAGIC: u32 = 0x534C5543;
/// Format version
pub const VERSION: u32 = 1;
/// File extension for artifacts
pub const EXTENSION: &str = "sluc";

const TAG_INT: u8 = 1;
const TAG_FLOAT: u8 = 2;
const TAG_CHAR: u8 = 3;
const TAG_STRING: u8 = 4;

/// Artifact (de)serialization errors
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("not a sluice artifact (magic {0:#010x})")]
    BadMagic(u32),
    #[error("unsupported artifact version {0} (expected {expected})", expected = VERSION)]
    UnsupportedVersion(u32),
    #[error("unknown constant tag {0}")]
    UnknownConstantTag(u8),
    #[error("unknown opcode {0:#04x}")]
    UnknownOpcode(u8),
    #[error("unknown operator code {0} for {1}")]
    UnknownOperator(u8, Opcode),
    #[error("invalid UTF-8 in string data")]
    InvalidUtf8,
    #[error("invalid char code point {0:#x}")]
    InvalidChar(u32),
    #[error("instruction {index} ({opcode}) refers to {operand}, out of range")]
    OperandOutOfRange {
        index: usize,
        opcode: Opcode,
        operand: u32,
    },
    #[error("line table has {lines} entries for {code} instructions")]
    LineTableMismatch { lines: usize, code: usize },
    #[error("{0} does not fit the artifact format")]
    TooLarge(&'static str),
}

/// 文件头
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    pub magic: u32,
    pub version: u32,
    pub flags: u32,
}

impl Default for FileHeader {
    fn default() -> Self {
        Self {
            magic: MAGIC,
            version: VERSION,
            flags: 0,
        }
    }
}

/// Executable artifact
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Artifact {
    pub header: FileHeader,
    /// Name used in diagnostics (file path or `<stdin>`)
    pub source_name: String,
    /// 常量池
    pub constants: Vec<ConstValue>,
    /// Names referenced by `LoadName`/`StoreName`/`Call`
    pub names: Vec<String>,
    pub code: Vec<Instruction>,
    /// Source line of each instruction
    pub lines: Vec<u32>,
}

impl Artifact {
    /// Source line of instruction `pc`
    pub fn line_at(
        &self,
        pc: usize,
    ) -> Option<usize> {
        self.lines.get(pc).map(|&l| l as usize)
    }

    /// Check that every operand points inside its table
    pub fn validate(&self) -> Result<(), ArtifactError> {
        if self.lines.len() != self.code.len() {
            return Err(ArtifactError::LineTableMismatch {
                lines: self.lines.len(),
                code: self.code.len(),
            });
        }

        for (index, instr) in self.code.iter().enumerate() {
            let (operand, limit) = match *instr {
                Instruction::LoadConst(i) => (i, self.constants.len()),
                Instruction::LoadName(i) | Instruction::StoreName(i) => (i, self.names.len()),
                Instruction::Call { name, .. } => (name, self.names.len()),
                // a jump may land one past the end
                Instruction::Jump(t) | Instruction::JumpIfFalse(t) => (t, self.code.len() + 1),
                Instruction::Pop | Instruction::Binary(_) | Instruction::Compare(_) => continue,
            };
            if operand as usize >= limit {
                return Err(ArtifactError::OperandOutOfRange {
                    index,
                    opcode: instr.opcode(),
                    operand,
                });
            }
        }
        Ok(())
    }

    /// 序列化到 Writer
    pub fn write_to<W: Write>(
        &self,
        writer: &mut W,
    ) -> Result<(), ArtifactError> {
        // 文件头：魔数大端序，其他小端序
        writer.write_all(&self.header.magic.to_be_bytes())?;
        writer.write_all(&self.header.version.to_le_bytes())?;
        writer.write_all(&self.header.flags.to_le_bytes())?;

        write_str(writer, &self.source_name)?;

        // 常量池
        write_len(writer, self.constants.len(), "constant pool")?;
        for constant in &self.constants {
            match constant {
                ConstValue::Int(n) => {
                    writer.write_all(&[TAG_INT])?;
                    writer.write_all(&n.to_le_bytes())?;
                }
                ConstValue::Float(f) => {
                    writer.write_all(&[TAG_FLOAT])?;
                    writer.write_all(&f.to_le_bytes())?;
                }
                ConstValue::Char(c) => {
                    writer.write_all(&[TAG_CHAR])?;
                    writer.write_all(&(*c as u32).to_le_bytes())?;
                }
                ConstValue::String(s) => {
                    writer.write_all(&[TAG_STRING])?;
                    write_str(writer, s)?;
                }
            }
        }

        write_len(writer, self.names.len(), "name table")?;
        for name in &self.names {
            write_str(writer, name)?;
        }

        // 代码段
        write_len(writer, self.code.len(), "code")?;
        for instr in &self.code {
            writer.write_all(&[instr.opcode() as u8])?;
            match *instr {
                Instruction::LoadConst(i)
                | Instruction::LoadName(i)
                | Instruction::StoreName(i)
                | Instruction::Jump(i)
                | Instruction::JumpIfFalse(i) => writer.write_all(&i.to_le_bytes())?,
                Instruction::Call { name, argc } => {
                    writer.write_all(&name.to_le_bytes())?;
                    writer.write_all(&argc.to_le_bytes())?;
                }
                Instruction::Binary(op) => writer.write_all(&[binop_code(op)])?,
                Instruction::Compare(op) => writer.write_all(&[cmpop_code(op)])?,
                Instruction::Pop => {}
            }
        }

        write_len(writer, self.lines.len(), "line table")?;
        for line in &self.lines {
            writer.write_all(&line.to_le_bytes())?;
        }
        Ok(())
    }

    /// 从 Reader 反序列化
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self, ArtifactError> {
        let mut r = ByteReader { inner: reader };

        let magic = u32::from_be_bytes(r.array()?);
        if magic != MAGIC {
            return Err(ArtifactError::BadMagic(magic));
        }
        let version = r.u32()?;
        if version != VERSION {
            return Err(ArtifactError::UnsupportedVersion(version));
        }
        let flags = r.u32()?;
        let source_name = r.string()?;

        let count = r.u32()?;
        let mut constants = Vec::new();
        for _ in 0..count {
            let constant = match r.u8()? {
                TAG_INT => ConstValue::Int(i64::from_le_bytes(r.array()?)),
                TAG_FLOAT => ConstValue::Float(f64::from_le_bytes(r.array()?)),
                TAG_CHAR => {
                    let code = r.u32()?;
                    ConstValue::Char(char::from_u32(code).ok_or(ArtifactError::InvalidChar(code))?)
                }
                TAG_STRING => ConstValue::String(r.string()?),
                tag => return Err(ArtifactError::UnknownConstantTag(tag)),
            };
            constants.push(constant);
        }

        let count = r.u32()?;
        let mut names = Vec::new();
        for _ in 0..count {
            names.push(r.string()?);
        }

        let count = r.u32()?;
        let mut code = Vec::new();
        for _ in 0..count {
            let byte = r.u8()?;
            let opcode = Opcode::try_from(byte).map_err(ArtifactError::UnknownOpcode)?;
            let instr = match opcode {
                Opcode::LoadConst => Instruction::LoadConst(r.u32()?),
                Opcode::LoadName => Instruction::LoadName(r.u32()?),
                Opcode::StoreName => Instruction::StoreName(r.u32()?),
                Opcode::Pop => Instruction::Pop,
                Opcode::Call => Instruction::Call {
                    name: r.u32()?,
                    argc: r.u32()?,
                },
                Opcode::Binary => {
                    let code = r.u8()?;
                    Instruction::Binary(
                        binop_from_code(code).ok_or(ArtifactError::UnknownOperator(code, opcode))?,
                    )
                }
                Opcode::Compare => {
                    let code = r.u8()?;
                    Instruction::Compare(
                        cmpop_from_code(code).ok_or(ArtifactError::UnknownOperator(code, opcode))?,
                    )
                }
                Opcode::Jump => Instruction::Jump(r.u32()?),
                Opcode::JumpIfFalse => Instruction::JumpIfFalse(r.u32()?),
            };
            code.push(instr);
        }

        let count = r.u32()?;
        let mut lines = Vec::new();
        for _ in 0..count {
            lines.push(r.u32()?);
        }

        let artifact = Artifact {
            header: FileHeader {
                magic,
                version,
                flags,
            },
            source_name,
            constants,
            names,
            code,
            lines,
        };
        artifact.validate()?;
        Ok(artifact)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, ArtifactError> {
        let mut bytes = Vec::new();
        self.write_to(&mut bytes)?;
        Ok(bytes)
    }

    pub fn from_bytes(mut bytes: &[u8]) -> Result<Self, ArtifactError> {
        Self::read_from(&mut bytes)
    }

    /// Write the artifact to `path`
    pub fn save(
        &self,
        path: &Path,
    ) -> Result<(), ArtifactError> {
        fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    /// Read an artifact from `path`
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let bytes = fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Human readable listing
    pub fn disassemble(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "; {} (version {})", self.source_name, self.header.version);
        for (pc, instr) in self.code.iter().enumerate() {
            let line = self.lines.get(pc).copied().unwrap_or(0);
            let detail = match *instr {
                Instruction::LoadConst(i) => format!("{:?}", self.constants.get(i as usize)),
                Instruction::LoadName(i) | Instruction::StoreName(i) => {
                    self.names.get(i as usize).cloned().unwrap_or_default()
                }
                Instruction::Call { name, argc } => format!(
                    "{}/{}",
                    self.names.get(name as usize).map(String::as_str).unwrap_or("?"),
                    argc
                ),
                Instruction::Binary(op) => op.to_string(),
                Instruction::Compare(op) => op.to_string(),
                Instruction::Jump(t) | Instruction::JumpIfFalse(t) => format!("-> {}", t),
                Instruction::Pop => String::new(),
            };
            let _ = writeln!(out, "{:>4} {:>4}  {:<12} {}", line, pc, instr.opcode(), detail);
        }
        out
    }
}

fn write_len<W: Write>(
    writer: &mut W,
    len: usize,
    what: &'static str,
) -> Result<(), ArtifactError> {
    let len = u32::try_from(len).map_err(|_| ArtifactError::TooLarge(what))?;
    writer.write_all(&len.to_le_bytes())?;
    Ok(())
}

fn write_str<W: Write>(
    writer: &mut W,
    s: &str,
) -> Result<(), ArtifactError> {
    write_len(writer, s.len(), "string")?;
    writer.write_all(s.as_bytes())?;
    Ok(())
}

struct ByteReader<'a, R> {
    inner: &'a mut R,
}

impl<R: Read> ByteReader<'_, R> {
    fn array<const N: usize>(&mut self) -> Result<[u8; N], ArtifactError> {
        let mut buf = [0u8; N];
        self.inner.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn u8(&mut self) -> Result<u8, ArtifactError> {
        Ok(self.array::<1>()?[0])
    }

    fn u32(&mut self) -> Result<u32, ArtifactError> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    fn string(&mut self) -> Result<String, ArtifactError> {
        let len = self.u32()? as usize;
        let mut buf = Vec::new();
        self.inner.by_ref().take(len as u64).read_to_end(&mut buf)?;
        if buf.len() != len {
            return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
        }
        String::from_utf8(buf).map_err(|_| ArtifactError::InvalidUtf8)
    }
}
