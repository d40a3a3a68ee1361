use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use rustyline::Editor;
use rustyline::error::ReadlineError;
use tokio::sync::watch;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use casebuddy_application::{ConversationEngine, ConversationSnapshot, TurnOutcome};
use casebuddy_infrastructure::{CaseBuddyPaths, ConfigService, TomlClientStateRepository};
use casebuddy_interaction::HttpChatBackend;

mod helper;
mod view;

use helper::{CliHelper, ReplCommand};
use view::TerminalView;

#[derive(Parser, Debug)]
#[command(name = "casebuddy")]
#[command(about = "CaseBuddy - ask about a court case from the terminal", long_about = None)]
struct Cli {
    /// Backend base URL; overrides config.toml and CASEBUDDY_BACKEND_URL
    #[arg(long)]
    backend_url: Option<String>,

    /// Directory holding config.toml, client_state.toml and logs/
    #[arg(long)]
    config_dir: Option<PathBuf>,
}

/// Logs go to a daily file so the REPL output stays clean.
fn init_logging(paths: &CaseBuddyPaths, default_level: &str) -> Result<WorkerGuard> {
    let logs_dir = paths.logs_dir()?;
    std::fs::create_dir_all(&logs_dir)?;

    let appender = tracing_appender::rolling::daily(&logs_dir, "casebuddy.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false),
        )
        .init();

    Ok(guard)
}

/// Runs one bind or send, printing every intermediate snapshot until the
/// exchange finishes.
async fn run_turn(
    engine: &Arc<ConversationEngine>,
    updates: &mut watch::Receiver<ConversationSnapshot>,
    view: &mut TerminalView,
    input: String,
) -> Result<TurnOutcome> {
    let bound = engine.snapshot().await.active_case_id.is_some();
    let worker = Arc::clone(engine);
    let mut task = tokio::spawn(async move {
        if bound {
            worker.send_message(&input).await
        } else {
            worker.bind_case(&input).await
        }
    });

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                view.render(&snapshot);
            }
            joined = &mut task => {
                let snapshot = updates.borrow_and_update().clone();
                view.render(&snapshot);
                return Ok(joined?);
            }
        }
    }

    Ok(task.await?)
}

fn prompt(snapshot: &ConversationSnapshot) -> String {
    match &snapshot.active_case_id {
        Some(case_id) => format!("[{}] >> ", case_id),
        None => "case id >> ".to_string(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ===== Configuration =====
    let paths = CaseBuddyPaths::new(cli.config_dir);
    let mut config = ConfigService::new(&paths)?.load()?;
    if let Some(url) = cli.backend_url {
        config.backend_url = url;
    }
    let _log_guard = init_logging(&paths, &config.log_level)?;
    tracing::info!("Starting casebuddy against {}", config.chat_endpoint());

    // ===== Engine =====
    let backend = Arc::new(HttpChatBackend::from_config(&config)?);
    let repository = Arc::new(TomlClientStateRepository::open(&paths).await?);
    let engine = Arc::new(ConversationEngine::start(backend, repository).await);
    let mut updates = engine.subscribe();
    let mut view = TerminalView::new();

    // ===== REPL Setup =====
    let mut rl = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));

    println!("{}", "=== CaseBuddy ===".bright_magenta().bold());
    println!("{}", "Ask me about your case.".bright_black());
    println!(
        "{}",
        "Enter a case id to start. '/sim <n>' picks a simulator choice, '/back' steps back, '/quit' exits."
            .bright_black()
    );
    println!(
        "{}",
        "Simulator and stats are educational, not a prediction.".bright_black()
    );
    println!();

    // ===== Main REPL Loop =====
    loop {
        let snapshot = engine.snapshot().await;
        if let Some(stage) = snapshot
            .stage_label
            .as_deref()
            .filter(|_| snapshot.active_case_id.is_some())
        {
            println!("{}", format!("Stage: {}", stage).bright_black());
        }

        match rl.readline(&prompt(&snapshot)) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line.trim());

                match ReplCommand::parse(&line) {
                    ReplCommand::Quit => {
                        println!("{}", "Goodbye!".bright_green());
                        break;
                    }
                    ReplCommand::Simulate(n) => view.activate_simulator(n),
                    ReplCommand::Back => view.simulator_back(),
                    ReplCommand::Unknown(command) => {
                        println!("{}", format!("Unknown command: {}", command).bright_black());
                    }
                    ReplCommand::Input(input) => {
                        let outcome = run_turn(&engine, &mut updates, &mut view, input).await?;
                        if let TurnOutcome::Rejected(reason) = outcome {
                            tracing::debug!("Input rejected: {:?}", reason);
                        }
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type '/quit' to exit.".yellow());
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    Ok(())
}
