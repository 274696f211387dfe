//! CLI entrypoint for gemchat
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use gemchat_application::{
    ChatStore, ConversationLogger, LlmGateway, NoConversationLogger, RejectReason, SubmitOutcome,
    SubmitPromptUseCase,
};
use gemchat_domain::{Model, ResponseMode};
use gemchat_infrastructure::{
    ConfigLoader, FileConfig, GeminiGateway, GeminiSettings, JsonlConversationLogger, Severity,
};
use gemchat_presentation::{ChatRepl, Cli, TerminalRenderer};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level; stdout carries the chat
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting gemchat");

    let config = load_config(&cli)?;

    if cli.show_config {
        ConfigLoader::print_config_sources();
        println!();
        print!("{}", config.to_redacted_toml()?);
        return Ok(());
    }

    if cli.no_color || !config.output.color {
        colored::control::set_override(false);
    }

    // CLI flags override configuration
    let (config_model, _) = config.gemini.parse_model();
    let model = match &cli.model {
        Some(name) => name
            .parse::<Model>()
            .with_context(|| format!("Invalid model name '{name}'"))?,
        None => config_model,
    };
    let (config_mode, _) = config.chat.parse_mode();
    let mode = if cli.single_shot {
        ResponseMode::SingleShot
    } else {
        config_mode
    };

    // === Dependency Injection ===
    let settings = GeminiSettings::from_config(&config.gemini, model)
        .context("Cannot start without a Gemini API key")?;
    let gateway: Arc<dyn LlmGateway> = Arc::new(GeminiGateway::new(settings)?);

    let store = Arc::new(ChatStore::new());
    let show_progress = !cli.quiet && config.repl.show_progress;
    store.subscribe(Arc::new(
        TerminalRenderer::new()
            .with_echo(!cli.is_interactive() && !cli.quiet)
            .with_progress(show_progress),
    ));

    let use_case = SubmitPromptUseCase::new(gateway, Arc::clone(&store))
        .with_mode(mode)
        .with_conversation_logger(conversation_logger(&cli, &config)?);

    match cli.prompt {
        Some(prompt) => run_once(&use_case, &prompt).await,
        None => {
            let history_path = config
                .repl
                .history_file
                .map(PathBuf::from)
                .or_else(ConfigLoader::default_history_path);

            ChatRepl::new(Arc::new(use_case))
                .with_history_file(history_path)
                .run()
                .await?;
            Ok(())
        }
    }
}

fn load_config(cli: &Cli) -> Result<FileConfig> {
    if cli.no_config {
        return Ok(ConfigLoader::load_defaults());
    }

    if let Some(path) = &cli.config
        && !path.exists()
    {
        bail!("Config file not found: {}", path.display());
    }

    let config = ConfigLoader::load(cli.config.as_ref())
        .map_err(|e| anyhow!("Failed to load configuration: {e}"))?;

    let mut fatal = false;
    for issue in config.validate() {
        match issue.severity {
            Severity::Error => {
                error!("{}: {}", issue.field, issue.message);
                fatal = true;
            }
            Severity::Warning => warn!("{}: {}", issue.field, issue.message),
        }
    }
    if fatal {
        bail!("Invalid configuration");
    }

    Ok(config)
}

fn conversation_logger(cli: &Cli, config: &FileConfig) -> Result<Arc<dyn ConversationLogger>> {
    let path = cli
        .log_conversation
        .clone()
        .or_else(|| config.logging.conversation_log.as_ref().map(PathBuf::from));

    match path {
        Some(path) => {
            let logger = JsonlConversationLogger::open(&path).with_context(|| {
                format!("Could not open conversation log {}", path.display())
            })?;
            info!("Logging conversation to {}", path.display());
            Ok(Arc::new(logger))
        }
        None => Ok(Arc::new(NoConversationLogger)),
    }
}

async fn run_once(use_case: &SubmitPromptUseCase, prompt: &str) -> Result<()> {
    match use_case.submit(prompt).await {
        SubmitOutcome::Completed { .. } => Ok(()),
        SubmitOutcome::Failed { error } => bail!("{error}"),
        SubmitOutcome::Rejected(RejectReason::EmptyPrompt) => bail!("Prompt is empty"),
        SubmitOutcome::Rejected(RejectReason::Busy) => {
            bail!("Another request is already in flight")
        }
    }
}
