//! REPL Module
//!
//! Interactive evaluation. A [`Repl`] keeps two environments: the base one
//! the prelude produced and a live one every input runs against. Loading a
//! file resets the live environment to a copy of the base first.
//!
//! This module contains:
//! - [`syntax::parse_line`] - Line classifier
//! - [`commands`] - `:command` registry
//! - [`line::LineEditor`] - rustyline front end

pub mod commands;
pub mod line;
pub mod syntax;

pub use commands::{CommandHandler, CommandResult};
pub use line::LineEditor;
pub use syntax::{parse_line, ReplLine};

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::rc::Rc;

use owo_colors::OwoColorize;
use thiserror::Error;
use tracing::debug;

use crate::frontend::parser::ast::{Expr, Program, Stmt, StmtKind};
use crate::middle::compiler::{Compiler, STDIN_NAME};
use crate::prelude::{Output, Prelude};
use crate::runtime::{Environment, Value};
use crate::vm::EnvMode;

/// Binding that receives the value of a standalone expression
pub const RESULT_NAME: &str = "_";

/// Default prompt
pub const DEFAULT_PROMPT: &str = "> ";

/// Why one shell input failed
#[derive(Debug, Error)]
pub enum ReplError {
    #[error(transparent)]
    Sluice(#[from] crate::Error),

    #[error("{source}")]
    Load {
        path: PathBuf,
        #[source]
        source: crate::Error,
    },

    #[error("unknown command `{0}`, type :help to see the list of commands")]
    UnknownCommand(String),

    #[error("usage: {0}")]
    Usage(String),

    #[error("no file loaded, type `:load <path>` to load one")]
    NothingLoaded,

    #[error("cannot run `{command}`: {source}")]
    Shell {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("cannot write output: {0}")]
    Output(#[from] io::Error),
}

impl ReplError {
    /// Terminal form; syntax errors get a snippet named after their source
    pub fn render(&self) -> String {
        let rendered = match self {
            ReplError::Sluice(e) => e.render(STDIN_NAME),
            ReplError::Load { path, source } => source.render(&path.display().to_string()),
            other => other.to_string(),
        };
        rendered.trim_end().to_string()
    }
}

impl From<crate::frontend::SyntaxError> for ReplError {
    fn from(e: crate::frontend::SyntaxError) -> Self {
        ReplError::Sluice(e.into())
    }
}

/// Interactive session state
pub struct Repl {
    base: Environment,
    env: Environment,
    path: Option<PathBuf>,
    count: usize,
    prompt: String,
    running: bool,
    colors: bool,
    output: Output,
}

impl Repl {
    /// Session over the process streams
    pub fn new() -> Self {
        Self::with_output(Rc::new(std::cell::RefCell::new(io::stdout())))
    }

    /// Session whose prelude and messages share `output`
    pub fn with_output(output: Output) -> Self {
        let base = Prelude::new().with_sink(Rc::clone(&output)).environment();
        Self::with_environment(base, output)
    }

    /// Session over an explicit base environment
    pub fn with_environment(
        base: Environment,
        output: Output,
    ) -> Self {
        Self {
            env: base.clone(),
            base,
            path: None,
            count: 0,
            prompt: DEFAULT_PROMPT.to_string(),
            running: true,
            colors: false,
            output,
        }
    }

    pub fn with_prompt(
        mut self,
        prompt: &str,
    ) -> Self {
        self.prompt = prompt.to_string();
        self
    }

    /// Colour error headers
    pub fn with_colors(
        mut self,
        colors: bool,
    ) -> Self {
        self.colors = colors;
        self
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn base_environment(&self) -> &Environment {
        &self.base
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of inputs that completed without error
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn set_prompt(
        &mut self,
        prompt: &str,
    ) {
        self.prompt = prompt.to_string();
    }

    /// Prompt with `{count}` expanded
    pub fn prompt(&self) -> String {
        self.prompt.replace("{count}", &self.count.to_string())
    }

    /// Greeting shown when an interactive session starts
    pub fn header() -> String {
        format!("{} - v{}\nType :help for assistance", crate::NAME, crate::VERSION)
    }

    /// Where the current input came from, for error reports
    pub fn location(&self) -> String {
        match &self.path {
            Some(path) => format!("File \"{}\", input #{}", path.display(), self.count),
            None => format!("File {}, input #{}", STDIN_NAME, self.count),
        }
    }

    /// Reset the live environment and run `path` in it
    pub fn load(
        &mut self,
        path: &Path,
    ) -> Result<(), ReplError> {
        self.write_line(&format!("Loading file \"{}\"", path.display()))?;
        self.env = self.base.clone();
        let failed = |source| ReplError::Load {
            path: path.to_path_buf(),
            source,
        };
        let compiler = Compiler::from_file(path).map_err(failed)?;
        compiler
            .execute(&mut self.env, EnvMode::Alias)
            .map_err(failed)?;
        self.path = Some(path.to_path_buf());
        Ok(())
    }

    pub fn reload(&mut self) -> Result<(), ReplError> {
        match self.path.clone() {
            Some(path) => self.load(&path),
            None => Err(ReplError::NothingLoaded),
        }
    }

    /// Run one line against the live environment
    ///
    /// Returns what should be shown to the user, if anything.
    pub fn execute_line(
        &mut self,
        line: &str,
    ) -> Result<Option<String>, ReplError> {
        match parse_line(line)? {
            ReplLine::Blank => Ok(None),
            ReplLine::Shell(command) => {
                self.run_shell(&command)?;
                Ok(None)
            }
            ReplLine::Command { name, args } => self.run_command(&name, args),
            ReplLine::Expression(expr) => {
                let value = self.evaluate(expr)?;
                Ok((!value.is_nil()).then(|| value.repr()))
            }
            ReplLine::Statement(stmt) => {
                self.run_statements(vec![stmt])?;
                Ok(None)
            }
        }
    }

    /// Execute a line and report the outcome on the output sink
    ///
    /// Failures are reported, never propagated; the session keeps going.
    pub fn handle(
        &mut self,
        line: &str,
    ) -> bool {
        match self.execute_line(line) {
            Ok(shown) => {
                self.count += 1;
                if let Some(text) = shown {
                    self.report(&text);
                }
            }
            Err(err) => {
                debug!("input #{} failed: {:?}", self.count, err);
                let header = if self.colors {
                    "An error has occurred:".red().to_string()
                } else {
                    "An error has occurred:".to_string()
                };
                self.report(&format!("{}\n{}\n{}", self.location(), header, err.render()));
            }
        }
        self.running
    }

    /// Bind `expr` to `_` and return its value
    pub fn evaluate(
        &mut self,
        expr: Expr,
    ) -> Result<Value, ReplError> {
        let declaration = Stmt::synthetic(StmtKind::Declaration {
            name: RESULT_NAME.to_string(),
            value: expr,
        });
        self.run_statements(vec![declaration])?;
        Ok(self.env.get(RESULT_NAME).cloned().unwrap_or_default())
    }

    fn run_statements(
        &mut self,
        statements: Vec<Stmt>,
    ) -> Result<(), ReplError> {
        let compiler = Compiler::new(Program::synthetic(statements));
        compiler.execute(&mut self.env, EnvMode::Alias)?;
        Ok(())
    }

    fn run_command(
        &mut self,
        name: &str,
        args: Vec<Expr>,
    ) -> Result<Option<String>, ReplError> {
        let command = commands::find(name).ok_or_else(|| ReplError::UnknownCommand(name.to_string()))?;
        let values = args
            .into_iter()
            .map(|arg| self.evaluate(arg))
            .collect::<Result<Vec<_>, _>>()?;

        match command.run(self, &values)? {
            CommandResult::Continue => Ok(None),
            CommandResult::Output(text) => Ok(Some(text)),
            CommandResult::Exit => {
                self.stop();
                Ok(Some("Goodbye.".to_string()))
            }
        }
    }

    fn run_shell(
        &mut self,
        command: &str,
    ) -> Result<(), ReplError> {
        // flush anything printed so far before the child writes
        self.output.borrow_mut().flush()?;
        let status = if cfg!(windows) {
            process::Command::new("cmd").args(["/C", command]).status()
        } else {
            process::Command::new("sh").args(["-c", command]).status()
        };
        let status = status.map_err(|source| ReplError::Shell {
            command: command.to_string(),
            source,
        })?;
        debug!("`{}` exited with {}", command, status);
        Ok(())
    }

    fn write_line(
        &self,
        text: &str,
    ) -> io::Result<()> {
        let mut out = self.output.borrow_mut();
        writeln!(out, "{}", text)?;
        out.flush()
    }

    /// Write without failing the input being reported on
    fn report(
        &self,
        text: &str,
    ) {
        if let Err(e) = self.write_line(text) {
            debug!("cannot write shell output: {}", e);
        }
    }
}

impl Default for Repl {
    fn default() -> Self {
        Self::new()
    }
}
