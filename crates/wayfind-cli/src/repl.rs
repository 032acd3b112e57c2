//! REPL – Read-Eval-Print Loop for the Wayfind shell.
//!
//! Supported slash-commands:
//!   /help              – show this list
//!   /settings          – show the active `~/.wayfind/config.toml` values
//!   /set <key> <value> – change one setting and save it
//!   /replay <file>     – replay a recorded JSON session
//!   /schema            – print the JSON Schema of scenario files
//!   /quit | /exit      – exit the CLI

use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::{self, Config};
use crate::scenario::{self, ReplayEvent};

/// Entry point for the interactive REPL.
///
/// `shutdown` is polled each iteration; when set the REPL exits cleanly.
pub fn run(shutdown: Arc<AtomicBool>) {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }

        print!("{} ", "wayfind>".bold().cyan());
        stdout.flush().ok();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break, // EOF
            Ok(_) => {}
            Err(e) => {
                eprintln!("{}: {}", "Read error".red(), e);
                break;
            }
        }

        let cmd = line.trim();
        if cmd.is_empty() {
            continue;
        }

        let mut words = cmd.split_whitespace();
        match (words.next().unwrap_or_default(), words.next(), words.next()) {
            ("/help", _, _) => cmd_help(),
            ("/settings", _, _) => cmd_settings(),
            ("/set", Some(key), Some(value)) => cmd_set(key, value),
            ("/set", _, _) => println!("  Usage: {}", "/set <key> <value>".bold()),
            ("/replay", Some(path), _) => cmd_replay(Path::new(path)),
            ("/replay", None, _) => println!("  Usage: {}", "/replay <file>".bold()),
            ("/schema", _, _) => cmd_schema(),
            ("/quit" | "/exit", _, _) => {
                println!("{}", "Goodbye.".green());
                shutdown.store(true, Ordering::SeqCst);
                break;
            }
            _ => {
                println!(
                    "{} '{}'. Type {} for available commands.",
                    "Unknown command:".red(),
                    cmd.yellow(),
                    "/help".bold()
                );
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Command handlers
// ─────────────────────────────────────────────────────────────────────────────

fn cmd_help() {
    println!();
    println!("{}", "Wayfind Commands".bold().underline());
    println!("  {}          – show ~/.wayfind/config.toml settings", "/settings".bold().cyan());
    println!("  {} – change and save one setting", "/set <key> <value>".bold().cyan());
    println!("  {}     – replay a recorded JSON session", "/replay <file>".bold().cyan());
    println!("  {}            – print the scenario JSON Schema", "/schema".bold().cyan());
    println!("  {}       – exit the CLI", "/quit  /exit".bold().cyan());
    println!();
}

fn cmd_settings() {
    let cfg = load_config_or_default();
    println!("{}", "Settings".bold().underline());
    match toml::to_string_pretty(&cfg) {
        Ok(text) => {
            for line in text.lines() {
                if let Some((key, value)) = line.split_once(" = ") {
                    println!("  {:<26} {}", key, value.yellow());
                }
            }
        }
        Err(e) => println!("{}: {}", "Error".red(), e),
    }
    println!(
        "  Stored in {}",
        config::config_path().display().to_string().dimmed()
    );
}

fn cmd_set(key: &str, value: &str) {
    let mut cfg = load_config_or_default();
    if let Err(e) = cfg.set(key, value) {
        println!("{}: {}", "Error".red(), e);
        return;
    }
    match config::save(&cfg) {
        Ok(()) => println!("{} {} = {}", "✓".green(), key.bold(), value.yellow()),
        Err(e) => println!("{}: {}", "Error saving config".red(), e),
    }
}

fn cmd_replay(path: &Path) {
    let cfg = load_config_or_default();
    let events = match scenario::load(path).and_then(|s| scenario::replay(s, &cfg)) {
        Ok(events) => events,
        Err(e) => {
            println!("{}: {}", "Replay failed".red(), e);
            return;
        }
    };

    println!(
        "{} {}",
        "Replaying".bold(),
        path.display().to_string().bold()
    );
    for (i, event) in events.iter().enumerate() {
        print_event(i + 1, event);
    }
}

pub(crate) fn print_event(step: usize, event: &ReplayEvent) {
    let text = event.to_string();
    let styled = match event {
        ReplayEvent::Placed { .. } | ReplayEvent::Triangulated { .. } => text.green(),
        ReplayEvent::Announced(_) => text.bold(),
        ReplayEvent::NotFound { .. } | ReplayEvent::NothingPlaced => text.yellow(),
        ReplayEvent::Failed { .. } => text.red(),
        _ => text.normal(),
    };
    println!("  {:>3}  {}", step.to_string().dimmed(), styled);
}

fn cmd_schema() {
    match scenario::schema_json() {
        Ok(schema) => println!("{schema}"),
        Err(e) => println!("{}: {}", "Error".red(), e),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

pub(crate) fn load_config_or_default() -> Config {
    match config::load() {
        Ok(Some(c)) => c,
        Ok(None) => Config::default(),
        Err(e) => {
            println!("{}: {} – using defaults", "Config error".red(), e);
            Config::default()
        }
    }
}
