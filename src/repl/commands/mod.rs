//! REPL Command Handler
//!
//! Handles special commands starting with ':'. Arguments arrive already
//! evaluated, in order.

use std::path::Path;

use super::{Repl, ReplError};
use crate::runtime::Value;

/// Command result
#[derive(Debug, Clone, PartialEq)]
pub enum CommandResult {
    /// Exit the REPL
    Exit,
    /// Continue to next input
    Continue,
    /// Output a message
    Output(String),
}

/// Command body
pub type CommandFn = fn(&mut Repl, &[Value]) -> Result<CommandResult, ReplError>;

/// A registered shell command
#[derive(Clone, Copy)]
pub struct CommandHandler {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub usage: &'static str,
    pub description: &'static str,
    run: CommandFn,
}

impl CommandHandler {
    pub fn matches(
        &self,
        name: &str,
    ) -> bool {
        self.name == name || self.aliases.contains(&name)
    }

    pub fn run(
        &self,
        repl: &mut Repl,
        args: &[Value],
    ) -> Result<CommandResult, ReplError> {
        (self.run)(repl, args)
    }

    /// One line for the `:help` listing
    pub fn summary(&self) -> String {
        format!("{:<24}{}", self.usage, self.description)
    }
}

impl std::fmt::Debug for CommandHandler {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, ":{}", self.name)
    }
}

static COMMANDS: [CommandHandler; 6] = [
    CommandHandler {
        name: "load",
        aliases: &["l"],
        usage: ":load <path>",
        description: "Reset the environment, then run a file in it",
        run: load,
    },
    CommandHandler {
        name: "reload",
        aliases: &["r"],
        usage: ":reload",
        description: "Load the current file again",
        run: reload,
    },
    CommandHandler {
        name: "quit",
        aliases: &["q"],
        usage: ":quit",
        description: "Leave the shell",
        run: quit,
    },
    CommandHandler {
        name: "prompt",
        aliases: &[],
        usage: ":prompt <string>",
        description: "Set the prompt; `{count}` expands to the input number",
        run: prompt,
    },
    CommandHandler {
        name: "clear",
        aliases: &["cls"],
        usage: ":clear",
        description: "Clear the screen",
        run: clear,
    },
    CommandHandler {
        name: "help",
        aliases: &["h"],
        usage: ":help [command]",
        description: "List commands, or describe one",
        run: help,
    },
];

/// Every command, in listing order
pub fn commands() -> &'static [CommandHandler] {
    &COMMANDS
}

/// Look a command up by name or alias
pub fn find(name: &str) -> Option<&'static CommandHandler> {
    COMMANDS.iter().find(|command| command.matches(name))
}

fn usage(name: &str) -> ReplError {
    let usage = find(name).map(|c| c.usage).unwrap_or(name);
    ReplError::Usage(usage.to_string())
}

fn no_args(
    name: &str,
    args: &[Value],
) -> Result<(), ReplError> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(usage(name))
    }
}

fn string_arg<'a>(
    name: &str,
    args: &'a [Value],
) -> Result<&'a str, ReplError> {
    match args {
        [Value::Str(s)] => Ok(&**s),
        _ => Err(usage(name)),
    }
}

fn load(
    repl: &mut Repl,
    args: &[Value],
) -> Result<CommandResult, ReplError> {
    let path = string_arg("load", args)?;
    repl.load(Path::new(path))?;
    Ok(CommandResult::Continue)
}

fn reload(
    repl: &mut Repl,
    args: &[Value],
) -> Result<CommandResult, ReplError> {
    no_args("reload", args)?;
    repl.reload()?;
    Ok(CommandResult::Continue)
}

fn quit(
    _repl: &mut Repl,
    args: &[Value],
) -> Result<CommandResult, ReplError> {
    no_args("quit", args)?;
    Ok(CommandResult::Exit)
}

fn prompt(
    repl: &mut Repl,
    args: &[Value],
) -> Result<CommandResult, ReplError> {
    let prompt = string_arg("prompt", args)?;
    repl.set_prompt(prompt);
    Ok(CommandResult::Continue)
}

fn clear(
    _repl: &mut Repl,
    args: &[Value],
) -> Result<CommandResult, ReplError> {
    no_args("clear", args)?;
    // ANSI: erase display, cursor home
    Ok(CommandResult::Output("\x1b[2J\x1b[1;1H".to_string()))
}

fn help(
    _repl: &mut Repl,
    args: &[Value],
) -> Result<CommandResult, ReplError> {
    match args {
        [] => {
            let mut text = String::from("Commands available from the prompt:\n");
            for command in commands() {
                text.push('\n');
                text.push_str(&command.summary());
            }
            Ok(CommandResult::Output(text))
        }
        [Value::Str(name)] => {
            let command = find(name).ok_or_else(|| ReplError::UnknownCommand(name.to_string()))?;
            let mut text = format!("Showing help for command '{}'\n{}", command.name, command.summary());
            match command.aliases {
                [] => {}
                [alias] => text.push_str(&format!("\nAlias: '{}'", alias)),
                aliases => {
                    let quoted: Vec<String> = aliases.iter().map(|a| format!("'{}'", a)).collect();
                    text.push_str(&format!("\nAliases: {}", quoted.join(", ")));
                }
            }
            Ok(CommandResult::Output(text))
        }
        _ => Err(usage("help")),
    }
}
