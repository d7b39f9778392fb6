//! Prelude
//!
//! The builtin bindings every program starts with. Each submodule exports
//! a handful of [`NativeExport`]s; [`Prelude`] wires them to an output
//! sink, an input source and a random generator, then collects them into
//! the base [`Environment`].

pub mod convert;
pub mod io;
pub mod math;

use std::cell::RefCell;
use std::io::{BufRead, Write};
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use crate::runtime::{Builtin, Environment};

/// Shared output sink
pub type Output = Rc<RefCell<dyn Write>>;

/// Shared input source
pub type Input = Rc<RefCell<dyn BufRead>>;

/// A function exported by a prelude module
#[derive(Debug, Clone)]
pub struct NativeExport {
    /// Binding name (e.g. "print")
    pub name: &'static str,
    /// Human readable signature, shown by `:help`
    pub signature: &'static str,
    pub builtin: Builtin,
}

impl NativeExport {
    pub fn new(
        signature: &'static str,
        builtin: Builtin,
    ) -> Self {
        let name = signature.split('(').next().unwrap_or(signature);
        Self {
            name,
            signature,
            builtin,
        }
    }
}

/// Handles a module's builtins may capture
#[derive(Clone)]
pub struct NativeContext {
    pub output: Output,
    pub input: Input,
    pub rng: Rc<RefCell<StdRng>>,
}

/// A group of related builtins
pub trait StdModule {
    fn module_path(&self) -> &str;

    fn exports(
        &self,
        ctx: &NativeContext,
    ) -> Vec<NativeExport>;
}

/// Builder for the base environment
pub struct Prelude {
    output: Output,
    input: Input,
    seed: Option<u64>,
}

impl Default for Prelude {
    fn default() -> Self {
        Self::new()
    }
}

impl Prelude {
    /// Process stdout and stdin, random seed from the OS
    pub fn new() -> Self {
        Self {
            output: Rc::new(RefCell::new(std::io::stdout())),
            input: Rc::new(RefCell::new(std::io::BufReader::new(std::io::stdin()))),
            seed: None,
        }
    }

    pub fn with_output(
        mut self,
        output: impl Write + 'static,
    ) -> Self {
        self.output = Rc::new(RefCell::new(output));
        self
    }

    /// Write through an already shared sink
    pub fn with_sink(
        mut self,
        output: Output,
    ) -> Self {
        self.output = output;
        self
    }

    pub fn with_input(
        mut self,
        input: impl BufRead + 'static,
    ) -> Self {
        self.input = Rc::new(RefCell::new(input));
        self
    }

    /// Make `random` reproducible
    pub fn with_seed(
        mut self,
        seed: u64,
    ) -> Self {
        self.seed = Some(seed);
        self
    }

    fn context(&self) -> NativeContext {
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        NativeContext {
            output: Rc::clone(&self.output),
            input: Rc::clone(&self.input),
            rng: Rc::new(RefCell::new(rng)),
        }
    }

    /// Every export of every module, in module order
    pub fn exports(&self) -> Vec<NativeExport> {
        let ctx = self.context();
        modules()
            .iter()
            .flat_map(|module| module.exports(&ctx))
            .collect()
    }

    /// Build the base environment
    pub fn environment(&self) -> Environment {
        let mut env = Environment::new();
        for export in self.exports() {
            env.define(export.name, export.builtin.into());
        }
        debug!("Prelude defines {} builtins", env.bindings().len());
        env
    }
}

fn modules() -> [&'static dyn StdModule; 3] {
    [&io::IoModule, &math::MathModule, &convert::ConvertModule]
}

/// Base environment over the process streams
pub fn environment() -> Environment {
    Prelude::new().environment()
}

/// In-memory output sink; clones share one buffer
#[derive(Debug, Clone, Default)]
pub struct Capture(Rc<RefCell<Vec<u8>>>);

impl Capture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

impl Write for Capture {
    fn write(
        &mut self,
        buf: &[u8],
    ) -> std::io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests;
