//! Medchat CLI entry point.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;

mod cli;

use cli::{Cli, Command};
use medchat::config::Config;
use medchat::dispatch::DispatchLoop;
use medchat::gemini::GeminiClient;
use medchat::persona::PersonaId;
use medchat::repl::Repl;
use medchat::safety::EmergencyScreen;
use medchat::session::SessionManager;

fn setup_logging(verbose: bool) -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("medchat")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("medchat.log");

    // Log to a file so output never interleaves with the chat prompt
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    let mut builder = env_logger::Builder::from_default_env();
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Pipe(target)).init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async_main(cli))
}

async fn async_main(cli: Cli) -> Result<()> {
    setup_logging(cli.verbose).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    match cli.command {
        Some(Command::Personas) => {
            list_personas();
            Ok(())
        }
        None => run_chat(&config, cli.persona.as_deref()).await,
    }
}

fn list_personas() {
    println!();
    for persona in PersonaId::ALL {
        println!(
            "  {:18} {}",
            persona.id().yellow(),
            persona.description()
        );
    }
    println!();
}

async fn run_chat(config: &Config, persona_arg: Option<&str>) -> Result<()> {
    let persona = match persona_arg {
        Some(id) => id
            .parse::<PersonaId>()
            .context("Unknown persona (see `medchat personas`)")?,
        None => config.default_persona,
    };

    // Fail fast before any remote call
    let api_key = config.api.resolve_key().context("Missing Gemini API key")?;

    let client = GeminiClient::new(
        api_key,
        config.api.model.clone(),
        config.api.base_url.clone(),
        config.api.request_timeout(),
        config.api.max_output_tokens,
        config.api.temperature,
    )
    .context("Failed to create Gemini client")?;

    let manager = SessionManager::new(Arc::new(client), config.default_persona);
    let dispatch = DispatchLoop::new(manager, EmergencyScreen::default());

    info!("Starting chat with persona: {}", persona.id());
    Repl::new(dispatch, persona).run().await?;
    Ok(())
}
