//! Rewind - action recording and semantic replay engine.
//!
//! CLI entry point: loads configuration, opens the session store, and
//! drives the session management and replay subcommands.

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rewind_capture::SessionController;
use rewind_config::{ConfigLoader, ConfigValidator, RewindConfig};
use rewind_engine::task_from_session;
use rewind_store::{SessionExport, SessionStore};

mod cli;
use cli::{Cli, Commands, SessionAction};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("rewind=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<RewindConfig> {
    let config = match path {
        Some(path) => ConfigLoader::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => RewindConfig::default(),
    };
    ConfigValidator::validate(&config).context("invalid configuration")?;
    Ok(config)
}

/// Resolve the store path: configured value (with `~`/env expansion), or a
/// per-user default.
fn store_path(config: &RewindConfig) -> anyhow::Result<PathBuf> {
    if !config.store_path.is_empty() {
        return Ok(PathBuf::from(ConfigLoader::expand_path(&config.store_path)));
    }
    let base = dirs::data_dir().context("no data directory available, set store_path")?;
    let dir = base.join("rewind");
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("creating {}", dir.display()))?;
    Ok(dir.join("sessions.db"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;
    let path = store_path(&config)?;
    let store = SessionStore::open(&path)
        .await
        .with_context(|| format!("opening session store at {}", path.display()))?;

    match cli.command {
        Commands::Record { session_id } => run_record(session_id, config, &store).await,
        Commands::Sessions { action } => run_sessions(action, &store).await,
        Commands::Replay {
            session_id,
            no_abort,
        } => run_replay(&session_id, no_abort, &store).await,
    }
}

/// Run a recording session until Ctrl-C, then persist it. Frames attach
/// through the embedding shell's `SessionManager` handle; a bare CLI run
/// has none registered and records an empty session.
async fn run_record(
    session_id: Option<String>,
    config: RewindConfig,
    store: &SessionStore,
) -> anyhow::Result<()> {
    let session_id = session_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let (manager, controller) = SessionController::new(config);
    let controller_task = tokio::spawn(controller.run());

    manager
        .start_recording(session_id.clone())
        .await
        .context("starting recording")?;
    println!("Recording session {session_id}; press Ctrl-C to stop.");

    tokio::signal::ctrl_c().await.context("waiting for Ctrl-C")?;

    let session = manager.stop_recording().await.context("stopping recording")?;
    drop(manager);
    let _ = controller_task.await;

    store.save_session(&session).await?;
    println!(
        "Saved session {} ({} actions, {} pages).",
        session.id,
        session.action_count(),
        session.pages_visited().len()
    );
    Ok(())
}

async fn run_sessions(action: SessionAction, store: &SessionStore) -> anyhow::Result<()> {
    match action {
        SessionAction::List => {
            let sessions = store.list_sessions().await?;
            if sessions.is_empty() {
                println!("No recorded sessions.");
                return Ok(());
            }
            println!(
                "{:<38} {:<24} {:>8} {:>7} {:>11}",
                "ID", "STARTED", "ACTIONS", "PAGES", "DURATION"
            );
            for meta in sessions {
                println!(
                    "{:<38} {:<24} {:>8} {:>7} {:>9}ms",
                    meta.id,
                    meta.created_at.format("%Y-%m-%d %H:%M:%S"),
                    meta.action_count,
                    meta.pages_visited,
                    meta.duration_ms
                );
            }
        }
        SessionAction::Show { session_id } => {
            let session = store.get_session(&session_id).await?;
            println!(
                "Session {} ({} actions, started at {})",
                session.id, session.action_count(), session.starting_url
            );
            for (i, action) in session.actions().iter().enumerate() {
                println!("{:>4}. {}", i + 1, action.describe());
            }
        }
        SessionAction::Export {
            session_id,
            max_steps,
            format,
        } => {
            let session = store.get_session(&session_id).await?;
            let export = SessionExport::from_session(&session, max_steps);
            match format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&export)?),
                "text" => print!("{}", export.to_text()),
                other => bail!("unknown export format: {other}"),
            }
        }
        SessionAction::Delete { session_id } => {
            store.delete_session(&session_id).await?;
            info!(session = %session_id, "session deleted");
            println!("Deleted session {session_id}");
        }
    }
    Ok(())
}

/// Build the replay task for a stored session. Driving it needs a page
/// driver endpoint, which no built-in backend provides yet; the task is
/// printed so external drivers can consume it.
async fn run_replay(
    session_id: &str,
    no_abort: bool,
    store: &SessionStore,
) -> anyhow::Result<()> {
    let session = store.get_session(session_id).await?;
    let mut task = task_from_session(&session);
    if no_abort {
        task = task.continue_on_failure();
    }
    info!(session = %session_id, steps = task.steps.len(), "replay task prepared");
    println!(
        "No page driver is configured; emitting the prepared task for {} ({} steps):",
        session_id,
        task.steps.len()
    );
    println!("{}", serde_json::to_string_pretty(&task)?);
    Ok(())
}
