//! REPL (Read-Eval-Print Loop) for interactive chat

use super::command::ReplCommand;
use crate::ConsoleFormatter;
use colored::Colorize;
use gemchat_application::{RejectReason, SubmitOutcome, SubmitPromptUseCase};
use reedline::{DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

/// Entries kept in the history file
const HISTORY_CAPACITY: usize = 1000;

/// Interactive chat REPL
///
/// Rendering of responses is done by whatever observers are subscribed to
/// the use case's store; the REPL only reads lines and dispatches them.
pub struct ChatRepl {
    use_case: Arc<SubmitPromptUseCase>,
    history_path: Option<PathBuf>,
}

impl ChatRepl {
    pub fn new(use_case: Arc<SubmitPromptUseCase>) -> Self {
        Self {
            use_case,
            history_path: None,
        }
    }

    /// Persist input history to this file
    pub fn with_history_file(mut self, path: Option<PathBuf>) -> Self {
        self.history_path = path;
        self
    }

    fn line_editor(&self) -> Reedline {
        let editor = Reedline::create();
        let Some(path) = &self.history_path else {
            return editor;
        };

        if let Some(parent) = path.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!("Could not create history directory {}: {}", parent.display(), e);
            return editor;
        }

        match FileBackedHistory::with_file(HISTORY_CAPACITY, path.clone()) {
            Ok(history) => {
                debug!("Using history file {}", path.display());
                editor.with_history(Box::new(history))
            }
            Err(e) => {
                warn!("Could not open history file {}: {}", path.display(), e);
                editor
            }
        }
    }

    /// Run the interactive REPL until the user quits
    pub async fn run(&self) -> io::Result<()> {
        let mut editor = self.line_editor();
        let prompt = DefaultPrompt::new(
            DefaultPromptSegment::Basic("gemchat".to_string()),
            DefaultPromptSegment::Empty,
        );

        print!(
            "{}",
            ConsoleFormatter::welcome(self.use_case.gateway().model(), self.use_case.mode())
        );

        loop {
            match editor.read_line(&prompt)? {
                Signal::Success(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }

                    if let Some(command) = ReplCommand::parse(line) {
                        if self.handle_command(command) {
                            break;
                        }
                        continue;
                    }

                    self.process_prompt(line).await;
                }
                Signal::CtrlC => {
                    println!("^C");
                }
                Signal::CtrlD => {
                    println!("Bye!");
                    break;
                }
            }
        }

        Ok(())
    }

    /// Handle slash commands. Returns true if should exit.
    fn handle_command(&self, command: ReplCommand) -> bool {
        match command {
            ReplCommand::Quit => {
                println!("Bye!");
                return true;
            }
            ReplCommand::Help => print!("{}", ConsoleFormatter::help()),
            ReplCommand::Model => {
                println!(
                    "{} {} ({})",
                    "Model:".bold(),
                    self.use_case.gateway().model(),
                    self.use_case.mode()
                );
            }
            ReplCommand::History => {
                let snapshot = self.use_case.store().snapshot();
                print!("{}", ConsoleFormatter::transcript(&snapshot.messages));
            }
            ReplCommand::Unknown(input) => {
                println!("Unknown command: {}", input);
                println!("Type /help for available commands");
            }
        }
        false
    }

    async fn process_prompt(&self, prompt: &str) {
        match self.use_case.submit(prompt).await {
            SubmitOutcome::Rejected(RejectReason::Busy) => {
                println!("{}", "Still waiting for the previous response.".yellow());
            }
            SubmitOutcome::Rejected(RejectReason::EmptyPrompt) => {}
            SubmitOutcome::Completed { text } => {
                debug!("Response complete ({} bytes)", text.len());
            }
            SubmitOutcome::Failed { error } => {
                debug!("Response failed: {}", error);
            }
        }
    }
}
