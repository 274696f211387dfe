//! Console formatting for banners and transcripts

use colored::Colorize;
use gemchat_domain::{Message, Model, ResponseMode, Role, core::string::preview};

/// Width of transcript previews in `/history`
const HISTORY_PREVIEW_LEN: usize = 120;

/// Formats static console output (banner, help, transcript)
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Banner shown when interactive chat starts
    pub fn welcome(model: &Model, mode: ResponseMode) -> String {
        let mut output = String::new();
        output.push('\n');
        output.push_str(&format!("{}\n", "gemchat".cyan().bold()));
        output.push_str(&format!("{} {}\n", "Model:".bold(), model));
        output.push_str(&format!("{} {}\n\n", "Mode:".bold(), mode));
        output.push_str(&Self::help());
        output
    }

    pub fn help() -> String {
        let mut output = String::new();
        output.push_str(&format!("{}\n", "Commands:".bold()));
        output.push_str("  /help, /h, /?     - Show this help\n");
        output.push_str("  /model            - Show the current model and mode\n");
        output.push_str("  /history          - Show the conversation so far\n");
        output.push_str("  /quit, /exit, /q  - Exit chat\n");
        output.push('\n');
        output
    }

    /// One line per message, long texts shortened
    pub fn transcript(messages: &[Message]) -> String {
        if messages.is_empty() {
            return format!("{}\n", "(no messages yet)".dimmed());
        }

        let mut output = String::new();
        for (index, message) in messages.iter().enumerate() {
            let label = match message.role {
                Role::User => "You".cyan().bold(),
                Role::Assistant => "Model".green().bold(),
            };
            let text = if message.text.is_empty() {
                "...".dimmed().to_string()
            } else {
                preview(&message.text, HISTORY_PREVIEW_LEN)
            };
            output.push_str(&format!("{:>3}. {}: {}\n", index + 1, label, text));
        }
        output
    }
}
