//! CLI command definitions

use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for gemchat
#[derive(Parser, Debug)]
#[command(name = "gemchat")]
#[command(author, version, about = "Chat with Gemini from the terminal")]
#[command(long_about = r#"
gemchat sends prompts to a Gemini model and prints the response as it
streams in.

With a prompt argument it answers once and exits; without one it starts an
interactive chat session.

The API key is read from the GEMINI_API_KEY environment variable unless
the configuration names another variable or sets the key directly.

Configuration files are loaded from (in priority order):
1. --config <path>     Explicit config file
2. ./gemchat.toml      Project-level config
3. ~/.config/gemchat/config.toml   Global config

Environment variables prefixed with GEMCHAT_ override file values, using
double underscores between section and key (e.g. GEMCHAT_GEMINI__MODEL).

Example:
  gemchat "Explain ownership in Rust in two sentences"
  gemchat -m gemini-1.5-pro --single-shot "Write a haiku about borrow checking"
  gemchat
"#)]
pub struct Cli {
    /// Prompt to send (starts interactive chat when omitted)
    pub prompt: Option<String>,

    /// Model to talk to
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Wait for the whole response instead of streaming it
    #[arg(long)]
    pub single_shot: bool,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Append conversation events as JSON lines to this file
    #[arg(long, value_name = "PATH")]
    pub log_conversation: Option<PathBuf>,
}

impl Cli {
    pub fn is_interactive(&self) -> bool {
        self.prompt.is_none()
    }
}
