//! Virtual Machine and bytecode execution
//!
//! This module contains the bytecode interpreter and the entry points that
//! run an [`Artifact`] against an [`Environment`].

pub mod errors;
mod executor;

pub use errors::{RuntimeError, RuntimeErrorKind, VMResult};
pub use executor::{call_value, VMConfig, VM};

use std::path::Path;

use tracing::debug;

use crate::middle::bytecode::Artifact;
use crate::runtime::Environment;
use crate::Error;

/// Name of the entry point invoked after an artifact file runs
pub const ENTRY_POINT: &str = "main";

/// How execution treats the caller's environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnvMode {
    /// Run against a clone; the caller's environment is left untouched
    #[default]
    Copy,
    /// Run directly against the caller's environment
    Alias,
}

/// Run `artifact` against `env`
pub fn execute(
    artifact: &Artifact,
    env: &mut Environment,
    mode: EnvMode,
) -> VMResult<()> {
    match mode {
        EnvMode::Alias => VM::new(env).run(artifact),
        EnvMode::Copy => {
            let mut private = env.clone();
            VM::new(&mut private).run(artifact)
        }
    }
}

/// Load an artifact from `path`, run it, then call `main` if it is bound
pub fn execute_artifact_file(
    path: &Path,
    env: &mut Environment,
    mode: EnvMode,
) -> Result<(), Error> {
    let artifact = Artifact::load(path)?;
    debug!("Loaded artifact {} ({} instructions)", path.display(), artifact.code.len());

    let mut private;
    let target = match mode {
        EnvMode::Alias => env,
        EnvMode::Copy => {
            private = env.clone();
            &mut private
        }
    };

    VM::new(target).run(&artifact)?;
    call_entry_point(target)?;
    Ok(())
}

/// Invoke `main` with no arguments when it is bound to something callable
pub fn call_entry_point(env: &Environment) -> VMResult<bool> {
    match env.get(ENTRY_POINT) {
        Some(main) if main.is_callable() => {
            debug!("Calling {}()", ENTRY_POINT);
            call_value(ENTRY_POINT, main, &[])?;
            Ok(true)
        }
        _ => Ok(false),
    }
}

#[cfg(test)]
mod tests;
