//! Line-based REPL with rustyline
//!
//! Provides line editing and history for an interactive [`Repl`].

use std::path::PathBuf;

use rustyline::config::Config;
use rustyline::error::ReadlineError;
use rustyline::history::FileHistory;
use rustyline::{EditMode, Editor};
use tracing::debug;

use super::Repl;
use crate::util::config::ReplConfig;

/// rustyline front end
pub struct LineEditor {
    editor: Editor<(), FileHistory>,
    history_file: Option<PathBuf>,
}

impl LineEditor {
    pub fn new(config: &ReplConfig) -> rustyline::Result<Self> {
        let rl_config = Config::builder()
            .history_ignore_space(true)
            .max_history_size(config.history_size)?
            .edit_mode(EditMode::Emacs)
            .build();

        let mut editor = Editor::with_config(rl_config)?;

        // Load history if file exists
        if let Some(ref history_file) = config.history_file {
            if history_file.exists() {
                if let Err(e) = editor.load_history(history_file) {
                    debug!("cannot load history from {}: {}", history_file.display(), e);
                }
            }
        }

        Ok(Self {
            editor,
            history_file: config.history_file.clone(),
        })
    }

    /// Read and handle lines until the session stops
    ///
    /// Ctrl-C and Ctrl-D both end the session.
    pub fn run(
        &mut self,
        repl: &mut Repl,
    ) -> rustyline::Result<()> {
        println!("{}", Repl::header());

        while repl.is_running() {
            match self.editor.readline(&repl.prompt()) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        self.editor.add_history_entry(line.as_str())?;
                    }
                    repl.handle(&line);
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                    repl.stop();
                    println!("Goodbye.");
                }
                Err(e) => return Err(e),
            }
        }

        // Save history
        if let Some(ref history_file) = self.history_file {
            if let Err(e) = self.editor.save_history(history_file) {
                debug!("cannot save history to {}: {}", history_file.display(), e);
            }
        }
        Ok(())
    }
}
