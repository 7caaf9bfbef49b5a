//! Interactive chat loop.
//!
//! The terminal front-end: reads one line at a time, feeds it through the
//! dispatch loop, and renders replies, emergency banners, and non-fatal
//! upstream errors. Concurrent submission is blocked by construction — each
//! turn is awaited before the next prompt.

use std::io::{BufRead, Write};

use colored::*;

use crate::dispatch::{DispatchLoop, TurnOutcome};
use crate::error::Result;
use crate::persona::PersonaId;
use crate::session::MessageRole;

/// Parsed REPL input.
pub enum ReplInput {
    /// Regular message to send.
    Message(String),
    /// Slash command.
    Command { name: String, args: Vec<String> },
    /// End of input.
    Eof,
    /// Empty input.
    Empty,
}

impl ReplInput {
    /// Parse input string.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Self::Empty;
        }
        if let Some(cmd) = trimmed.strip_prefix('/') {
            let parts: Vec<&str> = cmd.split_whitespace().collect();
            if parts.is_empty() {
                return Self::Empty;
            }
            Self::Command {
                name: parts[0].to_string(),
                args: parts[1..].iter().map(|s| s.to_string()).collect(),
            }
        } else {
            Self::Message(trimmed.to_string())
        }
    }
}

/// REPL state and operations.
pub struct Repl {
    dispatch: DispatchLoop,
}

impl Repl {
    /// Create a new REPL with a session bound to `persona`.
    pub fn new(mut dispatch: DispatchLoop, persona: PersonaId) -> Self {
        dispatch.ensure_session(persona);
        Self { dispatch }
    }

    /// Run the REPL loop.
    pub async fn run(&mut self) -> Result<()> {
        self.print_welcome();

        loop {
            print!("{} ", ">".cyan());
            std::io::stdout().flush().ok();

            let stdin = std::io::stdin();
            let mut input = String::new();
            match stdin.lock().read_line(&mut input) {
                Ok(0) => break, // EOF
                Ok(_) => {}
                Err(_) => break,
            }

            match ReplInput::parse(&input) {
                ReplInput::Eof => break,
                ReplInput::Empty => continue,
                ReplInput::Command { name, args } => {
                    if !self.handle_command(&name, &args) {
                        break;
                    }
                }
                ReplInput::Message(msg) => {
                    self.send_message(&msg).await;
                }
            }
        }

        println!();
        Ok(())
    }

    fn print_welcome(&self) {
        let persona = self
            .dispatch
            .active_persona()
            .unwrap_or_default();
        println!();
        println!("{}", "Medchat".cyan().bold());
        println!(
            "{}",
            "Not a substitute for professional medical advice. \
             For emergencies, call your local emergency number immediately."
                .dimmed()
        );
        println!();
        println!(
            "Persona: {}  ({} to switch, {} for help)",
            persona.name().green(),
            "/persona".yellow(),
            "/help".yellow()
        );
        println!();
    }

    /// Handle a slash command. Returns false if the REPL should exit.
    fn handle_command(&mut self, name: &str, args: &[String]) -> bool {
        match name {
            "quit" | "exit" | "q" => {
                return false;
            }
            "help" | "h" | "?" => {
                self.show_help();
            }
            "personas" => {
                self.show_personas();
            }
            "persona" => {
                self.switch_persona(args);
            }
            "history" => {
                self.show_history();
            }
            "clear" => {
                self.dispatch.reset();
                println!("{} Conversation cleared", "✓".green());
            }
            _ => {
                println!("{} Unknown command: /{}", "!".yellow(), name);
                println!("Type {} for available commands", "/help".yellow());
            }
        }
        true
    }

    fn show_help(&self) {
        println!();
        println!("{}", "Available Commands".cyan().bold());
        println!();
        println!("  {}          Show this help", "/help".yellow());
        println!("  {}      List available personas", "/personas".yellow());
        println!("  {}  Switch persona (history is kept)", "/persona <id>".yellow());
        println!("  {}       Show the conversation so far", "/history".yellow());
        println!("  {}         Start a fresh conversation", "/clear".yellow());
        println!("  {}          Exit", "/quit".yellow());
        println!();
    }

    fn show_personas(&self) {
        let active = self.dispatch.active_persona();
        println!();
        for persona in PersonaId::ALL {
            let marker = if Some(persona) == active { "*" } else { " " };
            println!(
                "  {} {:18} {}",
                marker.green(),
                persona.id().yellow(),
                persona.description().dimmed()
            );
        }
        println!();
    }

    fn switch_persona(&mut self, args: &[String]) {
        let Some(id) = args.first() else {
            println!("{} Usage: /persona <id>  (see /personas)", "!".yellow());
            return;
        };
        match self.dispatch.switch_persona(id) {
            Ok(persona) => {
                println!(
                    "{} Switched to {} — history carried over",
                    "✓".green(),
                    persona.name().green()
                );
            }
            Err(e) => {
                println!("{} {}", "✗".red(), e);
            }
        }
    }

    fn show_history(&self) {
        let transcript = self.dispatch.transcript();
        if transcript.is_empty() {
            println!("{} No messages yet", "!".yellow());
            return;
        }
        if let Some(session) = self.dispatch.session().session() {
            println!();
            println!(
                "Session {} started {}",
                session.id.dimmed(),
                session.started_at.format("%Y-%m-%d %H:%M UTC").to_string().dimmed()
            );
        }
        println!();
        for msg in transcript {
            match msg.role {
                MessageRole::User => println!("{} {}", "you:".cyan(), msg.content),
                MessageRole::Assistant => println!("{} {}", "bot:".green(), msg.content),
            }
        }
        println!();
    }

    async fn send_message(&mut self, message: &str) {
        match self.dispatch.submit(message).await {
            Ok(TurnOutcome::Ignored) => {}
            Ok(TurnOutcome::Emergency(banner)) => {
                println!();
                println!("{} {}", "⚠".red().bold(), banner.red());
                println!();
            }
            Ok(TurnOutcome::Reply(text)) => {
                println!();
                println!("{}", text);
                println!();
            }
            Err(e) => {
                // Turn-level failure: the user message stays in the
                // transcript and the loop keeps running.
                println!("{} {}", "✗".red(), e);
            }
        }
    }
}
