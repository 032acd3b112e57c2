//! `wayfind` – Wayfind Command Line Interface
//!
//! Front end for the localization engine.  It:
//!
//! 1. Checks for `~/.wayfind/config.toml` and writes the defaults on first
//!    run.
//! 2. With `wayfind replay <file>`, replays a recorded session once and
//!    exits (non-zero when the file cannot be replayed).
//! 3. Otherwise drops the user into an **interactive REPL** with
//!    slash-commands (`/settings`, `/set`, `/replay`, `/schema`, `/help`).
//! 4. Intercepts **Ctrl-C** and exits at the next prompt.

mod config;
mod repl;
mod scenario;

use colored::Colorize;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

fn main() -> ExitCode {
    // Hold the guard for the whole process so pending spans are flushed.
    let _telemetry = wayfind_runtime::init_tracing("wayfind-cli");

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let [cmd, path] = args.as_slice()
        && cmd == "replay"
    {
        return replay_once(Path::new(path));
    }

    print_banner();

    // ── Shared shutdown flag ──────────────────────────────────────────────
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!("{}", "⚠  Ctrl-C received – exiting Wayfind.".yellow().bold());
        shutdown_clone.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler");
    }

    // ── First run ─────────────────────────────────────────────────────────
    match config::load() {
        Ok(None) => write_default_config(),
        Ok(Some(_)) => {
            println!(
                "  Config loaded from {}",
                config::config_path().display().to_string().bold()
            );
        }
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            println!("  Using default configuration.");
        }
    }

    println!();
    println!(
        "  Type {} for a list of commands.\n",
        "/help".bold().cyan()
    );

    repl::run(shutdown);
    ExitCode::SUCCESS
}

fn replay_once(path: &Path) -> ExitCode {
    let cfg = repl::load_config_or_default();
    match scenario::load(path).and_then(|s| scenario::replay(s, &cfg)) {
        Ok(events) => {
            for (i, event) in events.iter().enumerate() {
                repl::print_event(i + 1, event);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}: {}", "Replay failed".red(), e);
            ExitCode::FAILURE
        }
    }
}

fn write_default_config() {
    println!("  No configuration found; writing defaults.");
    let mut cfg = config::Config::default();
    config::apply_env_overrides(&mut cfg);
    match config::save(&cfg) {
        Ok(()) => println!(
            "  {} Config saved to {}",
            "✓".green().bold(),
            config::config_path().display().to_string().bold()
        ),
        Err(e) => println!("{}: {}", "Error saving config".red(), e),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Banner
// ─────────────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("{}", r#" _      __             _____         __"#.bold().cyan());
    println!("{}", r#"| | /| / /__ ___ __ __/ __(_)__  ___/ /"#.bold().cyan());
    println!("{}", r#"| |/ |/ / _ `/ // / _/ _// / _ \/ _  / "#.bold().cyan());
    println!("{}", r#"|__/|__/\_,_/\_, /_//_/ /_/_//_/\_,_/  "#.bold().cyan());
    println!("{}", r#"            /___/                      "#.bold().cyan());
    println!();
    println!(
        "  {} {}",
        "Wayfind".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Spatial object localization");
    println!();
}
