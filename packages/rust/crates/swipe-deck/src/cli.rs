use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "swipe-deck")]
#[command(about = "Swipe deck engine: classify gestures and replay deck sessions.")]
pub(crate) struct Cli {
    /// Override config directory (default: `PRJ_CONFIG_HOME` or `<PRJ_ROOT>/.config`).
    #[arg(long, global = true)]
    pub(crate) conf: Option<PathBuf>,

    /// Debug-level deck logs on stderr (ignored when `RUST_LOG` is set).
    #[arg(long, short, global = true)]
    pub(crate) verbose: bool,

    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Replay a YAML script against an in-memory backend; prints events as JSON lines.
    Simulate {
        /// Path to the script.
        #[arg(long)]
        script: PathBuf,

        /// Session id stamped on events.
        #[arg(long, default_value = "simulate")]
        session_id: String,
    },
    /// Classify one released drag under the configured thresholds.
    Classify {
        /// Horizontal drag distance (positive = right).
        #[arg(long, allow_hyphen_values = true)]
        dx: f64,

        /// Vertical drag distance (negative = up).
        #[arg(long, allow_hyphen_values = true)]
        dy: f64,

        /// Horizontal release velocity.
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        vx: f64,

        /// Vertical release velocity.
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        vy: f64,
    },
    /// Print the JSON schema of a data-model type (omit the name to list them).
    Schema {
        /// Type name, e.g. `Candidate`.
        type_name: Option<String>,
    },
}
