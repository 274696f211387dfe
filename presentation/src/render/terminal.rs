//! Terminal renderer for the chat store.
//!
//! [`TerminalRenderer`] is registered as a [`ConversationObserver`]. Each
//! notification is diffed against what has already been written so only
//! the newly arrived suffix of the assistant's reply is printed, giving
//! live output while the response streams in.

use colored::Colorize;
use gemchat_application::{ChatSnapshot, ConversationObserver};
use gemchat_domain::{RESPONSE_FAILURE_TEXT, Role};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// One thing to draw, derived from a snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RenderOp {
    /// A new user turn
    UserTurn(String),
    /// Assistant turn is pending with no text yet
    StartPending,
    StopPending,
    /// Text appended to the assistant turn
    Append(String),
    /// The assistant turn was overwritten with the failure text.
    /// `line_break` is set when partial text is already on screen.
    Replace { text: String, line_break: bool },
    /// The submission settled
    EndTurn,
    SessionError(String),
}

/// Tracks what has been drawn so far.
#[derive(Debug, Default)]
pub(crate) struct RenderState {
    seen: usize,
    active: Option<usize>,
    printed: String,
    pending: bool,
    error_shown: Option<String>,
}

impl RenderState {
    pub(crate) fn diff(&mut self, snapshot: &ChatSnapshot) -> Vec<RenderOp> {
        let mut ops = Vec::new();

        for (index, message) in snapshot.messages.iter().enumerate().skip(self.seen) {
            match message.role {
                Role::User => ops.push(RenderOp::UserTurn(message.text.clone())),
                Role::Assistant => {
                    self.active = Some(index);
                    self.printed.clear();
                }
            }
        }
        self.seen = snapshot.len();

        if snapshot.loading && snapshot.error.is_none() {
            self.error_shown = None;
        }

        if let Some(index) = self.active
            && let Some(message) = snapshot.messages.get(index)
        {
            if snapshot.shows_pending_indicator(index) {
                if !self.pending {
                    self.pending = true;
                    ops.push(RenderOp::StartPending);
                }
            } else {
                if self.pending {
                    self.pending = false;
                    ops.push(RenderOp::StopPending);
                }
                let overwritten = message.text == RESPONSE_FAILURE_TEXT
                    || !message.text.starts_with(self.printed.as_str());
                if overwritten {
                    if message.text != self.printed {
                        ops.push(RenderOp::Replace {
                            text: message.text.clone(),
                            line_break: !self.printed.is_empty(),
                        });
                    }
                } else if let Some(suffix) = message.text.strip_prefix(self.printed.as_str())
                    && !suffix.is_empty()
                {
                    ops.push(RenderOp::Append(suffix.to_string()));
                }
                self.printed.clone_from(&message.text);
            }

            if !snapshot.loading {
                if self.pending {
                    self.pending = false;
                    ops.push(RenderOp::StopPending);
                }
                self.active = None;
                ops.push(RenderOp::EndTurn);
            }
        }

        if !snapshot.loading
            && let Some(error) = &snapshot.error
            && self.error_shown.as_ref() != Some(error)
        {
            self.error_shown = Some(error.clone());
            ops.push(RenderOp::SessionError(error.clone()));
        }

        ops
    }
}

/// Draws conversation changes to stdout, with a spinner on stderr while
/// the reply has not started.
pub struct TerminalRenderer {
    state: Mutex<RenderState>,
    spinner: Mutex<Option<ProgressBar>>,
    echo_user: bool,
    show_progress: bool,
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RenderState::default()),
            spinner: Mutex::new(None),
            echo_user: true,
            show_progress: true,
        }
    }

    /// Whether user turns are printed (the REPL already shows them)
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo_user = echo;
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn spinner(&self) -> MutexGuard<'_, Option<ProgressBar>> {
        self.spinner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn draw(&self, op: RenderOp, out: &mut impl Write) -> io::Result<()> {
        match op {
            RenderOp::UserTurn(text) => {
                if self.echo_user {
                    writeln!(out, "{} {}", "You:".cyan().bold(), text)?;
                }
            }
            RenderOp::StartPending => {
                if self.show_progress {
                    let spinner = ProgressBar::new_spinner();
                    spinner.set_style(Self::spinner_style());
                    spinner.set_message("Waiting for response...");
                    spinner.enable_steady_tick(Duration::from_millis(100));
                    *self.spinner() = Some(spinner);
                }
            }
            RenderOp::StopPending => {
                if let Some(spinner) = self.spinner().take() {
                    spinner.finish_and_clear();
                }
            }
            RenderOp::Append(text) => write!(out, "{}", text)?,
            RenderOp::Replace { text, line_break } => {
                if line_break {
                    writeln!(out)?;
                }
                write!(out, "{}", text.red())?;
            }
            RenderOp::EndTurn => writeln!(out, "\n")?,
            RenderOp::SessionError(message) => {
                writeln!(out, "{}", message.red().bold())?;
            }
        }
        out.flush()
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationObserver for TerminalRenderer {
    fn on_change(&self, snapshot: &ChatSnapshot) {
        let ops = self
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .diff(snapshot);

        let stdout = io::stdout();
        let mut out = stdout.lock();
        for op in ops {
            if let Err(e) = self.draw(op, &mut out) {
                tracing::debug!("Failed to write to terminal: {}", e);
                return;
            }
        }
    }
}
