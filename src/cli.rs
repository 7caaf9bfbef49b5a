//! CLI argument parsing for Medchat.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "medchat",
    about = "Persona-driven medical assistant chatbot",
    version,
    after_help = "Set GEMINI_API_KEY (or api.gemini_key in the config file) before chatting.\n\
                  Logs are written to the platform data dir under medchat/logs/."
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Persona to start the conversation with
    #[arg(short, long)]
    pub persona: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// List available personas
    Personas,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_chat_default() {
        let cli = Cli::try_parse_from(["medchat"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.persona.is_none());
    }

    #[test]
    fn test_cli_parses_persona_flag() {
        let cli = Cli::try_parse_from(["medchat", "--persona", "first-aid"]).unwrap();
        assert_eq!(cli.persona.as_deref(), Some("first-aid"));
    }

    #[test]
    fn test_cli_parses_personas_subcommand() {
        let cli = Cli::try_parse_from(["medchat", "personas"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Personas)));
    }
}
