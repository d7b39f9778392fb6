//! Sluice Programming Language - CLI

use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use owo_colors::{OwoColorize, Stream::Stderr};
use tracing::debug;

use sluice::frontend::{lexer, parse_program};
use sluice::repl::{LineEditor, Repl};
use sluice::util::config::{load_config_from, load_user_config, UserConfig};
use sluice::util::logger::{self, LogLevel};
use sluice::{build_artifact, prelude, run, run_file_in, Compiler, EnvMode, Error, NAME, VERSION};

/// A tiny line-oriented language with a bytecode VM
#[derive(Parser, Debug)]
#[command(name = "sluice")]
#[command(author = "Sluice Team")]
#[command(version = VERSION)]
#[command(about = NAME, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Read configuration from FILE instead of the user config
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a source file or a compiled .sluc artifact
    Run {
        /// File to run
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Print the tokens of a source file
    Lex {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Print the syntax tree of a source file
    Parse {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Compile a source file to a .sluc artifact
    Compile {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output path (default: next to the source)
        #[arg(short, long, value_name = "OUT")]
        output: Option<PathBuf>,

        /// Also print the generated instructions
        #[arg(short, long)]
        disassemble: bool,
    },

    /// Start the interactive shell, optionally loading a file first
    Repl {
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Run a whole program given on the command line
    Eval {
        /// Code to evaluate
        #[arg(value_name = "CODE")]
        code: String,
    },

    /// Print version information
    Version,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    let level = if args.verbose {
        LogLevel::Debug
    } else {
        config.log_level()
    };
    logger::init_with_level(level);

    if args.verbose {
        eprintln!("{} version: {}", NAME, VERSION);
        eprintln!("Host: {}", std::env::consts::OS);
    }

    let status = match args.command {
        Commands::Run { file } => {
            let mode = if config.run.alias_env {
                EnvMode::Alias
            } else {
                EnvMode::Copy
            };
            let mut env = prelude::environment();
            report(run_file_in(&file, &mut env, mode), &file.display().to_string())
        }
        Commands::Lex { file } => {
            let code = read_source(&file)?;
            for token in lexer::tokenize(&code) {
                match token {
                    Ok(token) => println!("{}", token),
                    Err(err) => {
                        return Ok(report(Err(err.into()), &file.display().to_string()));
                    }
                }
            }
            ExitCode::SUCCESS
        }
        Commands::Parse { file } => {
            let code = read_source(&file)?;
            match parse_program(&code, Some(&file)) {
                Ok(program) => {
                    println!("{:#?}", program);
                    ExitCode::SUCCESS
                }
                Err(err) => report(Err(err.into()), &file.display().to_string()),
            }
        }
        Commands::Compile {
            file,
            output,
            disassemble,
        } => {
            let name = file.display().to_string();
            match build_artifact(&file, output.as_deref()) {
                Ok(target) => {
                    println!("Wrote {}", target.display());
                    if disassemble {
                        let artifact = Compiler::load(&target)
                            .with_context(|| format!("Failed to read back {}", target.display()))?;
                        print!("{}", artifact.disassemble());
                    }
                    ExitCode::SUCCESS
                }
                Err(err) => report(Err(err), &name),
            }
        }
        Commands::Repl { file } => {
            let mut repl = Repl::new()
                .with_prompt(&config.repl.prompt)
                .with_colors(std::io::stdout().is_terminal());
            if let Some(file) = file {
                if let Err(err) = repl.load(&file) {
                    eprintln!("{}", err.render());
                }
            }
            let mut editor = LineEditor::new(&config.repl).context("Failed to start line editor")?;
            editor.run(&mut repl).context("Line editor failed")?;
            ExitCode::SUCCESS
        }
        Commands::Eval { code } => report(run(&code), "<eval>"),
        Commands::Version => {
            println!("{} {}", NAME, VERSION);
            ExitCode::SUCCESS
        }
    };

    Ok(status)
}

/// Explicit `--config` must load; the user config falls back to defaults
fn load_config(path: Option<&Path>) -> Result<UserConfig> {
    match path {
        Some(path) => load_config_from(path)
            .with_context(|| format!("Failed to load config: {}", path.display())),
        None => Ok(load_user_config().unwrap_or_else(|e| {
            eprintln!("warning: ignoring user config: {}", e);
            UserConfig::default()
        })),
    }
}

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path.display()))
}

/// Print a failure with its source snippet and pick the exit code
fn report(
    outcome: Result<(), Error>,
    source_name: &str,
) -> ExitCode {
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            debug!("{:?}", err);
            let rendered = err.render(source_name);
            let rendered = match rendered.strip_prefix("error") {
                Some(rest) => format!(
                    "{}{}",
                    "error".if_supports_color(Stderr, |text| text.red()),
                    rest
                ),
                None => rendered,
            };
            eprint!("{}", rendered);
            ExitCode::FAILURE
        }
    }
}
