//! CLI definitions for Rewind.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Rewind CLI.
#[derive(Parser)]
#[command(name = "rewind")]
#[command(about = "Action recording and semantic replay engine")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Start a recording session, stop and persist on Ctrl-C
    Record {
        /// Session ID (defaults to a fresh UUID)
        #[arg(long)]
        session_id: Option<String>,
    },

    /// Recorded session management
    Sessions {
        #[command(subcommand)]
        action: SessionAction,
    },

    /// Replay a recorded session against a page driver
    Replay {
        /// Session ID
        session_id: String,

        /// Continue past failed steps and report a partial result
        #[arg(long)]
        no_abort: bool,
    },
}

#[derive(Subcommand)]
pub(crate) enum SessionAction {
    /// List recorded sessions
    List,

    /// Show a session's actions
    Show {
        /// Session ID
        session_id: String,
    },

    /// Export a session as AI-ready steps
    Export {
        /// Session ID
        session_id: String,

        /// Maximum number of steps in the export
        #[arg(long, default_value_t = 100)]
        max_steps: usize,

        /// Output format (text, json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Delete a session and its action log
    Delete {
        /// Session ID
        session_id: String,
    },
}
