//! Sluice Programming Language
//!
//! A tiny line-oriented language. Source text is tokenized, parsed by a
//! backtracking rule engine, lowered to a stack bytecode artifact and run
//! by a VM against an environment of named values.
//!
//! # Example
//!
//! ```text
//! open sluice
//! declare x is 3 litres
//! while (x > 0 litres)
//!     print(x)
//!     declare x is (x - 1 litre)
//! done
//! close sluice
//! ```

#![warn(rust_2018_idioms)]

// Public modules
pub mod error;
pub mod frontend;
pub mod middle;
pub mod prelude;
pub mod repl;
pub mod runtime;
pub mod vm;

// Utility modules
pub mod util;

// Re-exports
pub use error::Error;
pub use middle::bytecode::Artifact;
pub use middle::compiler::Compiler;
pub use runtime::{Environment, Value};
pub use vm::EnvMode;

use std::path::{Path, PathBuf};

use tracing::debug;

/// Language version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Language name
pub const NAME: &str = "Sluice";

/// Run a complete program against a fresh prelude environment
///
/// # Example
///
/// ```no_run
/// fn main() -> Result<(), sluice::Error> {
///     sluice::run("open sluice\nprint(\"hello\")\nclose sluice\n")
/// }
/// ```
pub fn run(code: &str) -> Result<(), Error> {
    debug!("Running {} bytes of source", code.len());
    let mut env = prelude::environment();
    Compiler::from_source(code, None)?.execute(&mut env, EnvMode::Alias)
}

/// Run a source file or a compiled `.sluc` artifact
pub fn run_file(path: &Path) -> Result<(), Error> {
    let mut env = prelude::environment();
    run_file_in(path, &mut env, EnvMode::Copy)
}

/// Run a file against `env`
///
/// Artifacts go through the `main` convention: after the top level runs,
/// a callable `main` binding is invoked with no arguments.
pub fn run_file_in(
    path: &Path,
    env: &mut Environment,
    mode: EnvMode,
) -> Result<(), Error> {
    debug!("Running file {}", path.display());
    if is_artifact(path) {
        vm::execute_artifact_file(path, env, mode)
    } else {
        Compiler::from_file(path)?.execute(env, mode)
    }
}

/// Compile `source` and write its artifact
///
/// Without `output` the artifact lands next to the source file.
pub fn build_artifact(
    source: &Path,
    output: Option<&Path>,
) -> Result<PathBuf, Error> {
    Compiler::from_file(source)?.dump(output)
}

/// Whether `path` names a compiled artifact
pub fn is_artifact(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext == middle::bytecode::EXTENSION)
}
