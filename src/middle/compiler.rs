//! Compilation driver
//!
//! Owns a parsed [`Program`] and turns it into an [`Artifact`], a file on
//! disk, or a run against an environment.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::bytecode::{Artifact, ArtifactError, EXTENSION};
use super::codegen;
use super::ir::Ir;
use super::translate::Translator;
use super::CompileError;
use crate::frontend::parse_program;
use crate::frontend::parser::ast::Program;
use crate::runtime::Environment;
use crate::vm::{self, EnvMode};
use crate::Error;

/// Name used for programs that did not come from a file
pub const STDIN_NAME: &str = "<stdin>";

/// Compiler for one program
pub struct Compiler<'t> {
    program: Program,
    translator: &'t Translator,
}

impl Compiler<'static> {
    /// Compile with the standard lowerings
    pub fn new(program: Program) -> Self {
        Self::with_translator(program, Translator::standard())
    }

    /// Parse `code` into a compiler
    pub fn from_source(
        code: &str,
        path: Option<&Path>,
    ) -> Result<Self, Error> {
        Ok(Self::new(parse_program(code, path)?))
    }

    /// Read and parse a source file
    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let code = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_source(&code, Some(path))
    }
}

impl<'t> Compiler<'t> {
    pub fn with_translator(
        program: Program,
        translator: &'t Translator,
    ) -> Self {
        Self {
            program,
            translator,
        }
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn path(&self) -> Option<&Path> {
        self.program.path.as_deref()
    }

    /// Name shown in diagnostics and stored in artifacts
    pub fn source_name(&self) -> String {
        self.path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| STDIN_NAME.to_string())
    }

    /// Lower the program to IR with complete line information
    pub fn translate(&self) -> Result<Ir, CompileError> {
        let mut ir = self.translator.translate_program(&self.program)?;
        ir.fill_lines(1);
        Ok(ir)
    }

    /// Produce the executable artifact
    pub fn compile(&self) -> Result<Artifact, CompileError> {
        debug!("Compiling {}", self.source_name());
        let ir = self.translate()?;
        codegen::generate(&ir, &self.source_name())
    }

    /// Write the artifact to `target`, or next to the source file
    pub fn dump(
        &self,
        target: Option<&Path>,
    ) -> Result<PathBuf, Error> {
        let target = match (target, self.path()) {
            (Some(target), _) => target.to_path_buf(),
            (None, Some(source)) => source.with_extension(EXTENSION),
            (None, None) => return Err(Error::NoDumpTarget),
        };
        let artifact = self.compile()?;
        artifact.save(&target)?;
        debug!("Wrote {}", target.display());
        Ok(target)
    }

    /// Read an artifact back from disk
    pub fn load(path: &Path) -> Result<Artifact, ArtifactError> {
        Artifact::load(path)
    }

    /// Compile and run against `env`
    pub fn execute(
        &self,
        env: &mut Environment,
        mode: EnvMode,
    ) -> Result<(), Error> {
        let artifact = self.compile()?;
        vm::execute(&artifact, env, mode)?;
        Ok(())
    }

    /// Run on a copy of `base` and hand back the resulting environment
    pub fn evaluate(
        &self,
        base: &Environment,
    ) -> Result<Environment, Error> {
        let mut env = base.clone();
        self.execute(&mut env, EnvMode::Alias)?;
        Ok(env)
    }
}
