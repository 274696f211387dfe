//! Slash commands understood by the REPL

/// A parsed `/command` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Help,
    Model,
    History,
    Quit,
    Unknown(String),
}

impl ReplCommand {
    /// Parse a trimmed input line. Returns `None` for ordinary prompts.
    pub fn parse(line: &str) -> Option<Self> {
        let command = line.strip_prefix('/')?;
        let name = command.split_whitespace().next().unwrap_or_default();
        Some(match name {
            "help" | "h" | "?" => ReplCommand::Help,
            "model" | "models" => ReplCommand::Model,
            "history" => ReplCommand::History,
            "quit" | "exit" | "q" => ReplCommand::Quit,
            _ => ReplCommand::Unknown(line.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompts_are_not_commands() {
        assert_eq!(ReplCommand::parse("hello"), None);
        assert_eq!(ReplCommand::parse("a /path in text"), None);
    }

    #[test]
    fn test_aliases() {
        assert_eq!(ReplCommand::parse("/q"), Some(ReplCommand::Quit));
        assert_eq!(ReplCommand::parse("/exit"), Some(ReplCommand::Quit));
        assert_eq!(ReplCommand::parse("/?"), Some(ReplCommand::Help));
        assert_eq!(ReplCommand::parse("/history"), Some(ReplCommand::History));
        assert_eq!(ReplCommand::parse("/model extra"), Some(ReplCommand::Model));
    }

    #[test]
    fn test_unknown_keeps_input() {
        assert_eq!(
            ReplCommand::parse("/frobnicate now"),
            Some(ReplCommand::Unknown("/frobnicate now".into()))
        );
        assert_eq!(ReplCommand::parse("/"), Some(ReplCommand::Unknown("/".into())));
    }
}
