//! swipe-deck CLI: replay deck sessions, classify gestures, print schemas.
//!
//! Settings come from `packages/conf/swipe.yaml` merged with
//! `<config home>/swipe-deck/settings.yaml`. Override the config home with `--conf <dir>`.
//!
//! Logging: set `RUST_LOG=swipe_deck=debug` (or pass `--verbose`) to see deck logs on stderr.

mod cli;
mod simulate;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use swipe_deck::{
    DragDelta, OrchestratorConfig, ReleaseVelocity, classify, load_swipe_settings,
    set_config_home_override,
};

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if let Some(conf_dir) = cli.conf.clone() {
        set_config_home_override(conf_dir);
    }

    // RUST_LOG overrides; --verbose => debug; else info
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose {
            "swipe_deck=debug"
        } else {
            "swipe_deck=info"
        })
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let settings = load_swipe_settings();

    match cli.command {
        Command::Simulate { script, session_id } => {
            let config = OrchestratorConfig::from_settings(session_id, &settings)
                .context("invalid swipe settings")?;
            simulate::run_script_file(&script, config).await
        }
        Command::Classify { dx, dy, vx, vy } => {
            let config = OrchestratorConfig::from_settings("classify", &settings)
                .context("invalid swipe settings")?;
            let outcome = classify(
                DragDelta::new(dx, dy),
                ReleaseVelocity::new(vx, vy),
                &config.thresholds,
            );
            println!("{}", outcome.as_str());
            Ok(())
        }
        Command::Schema { type_name } => {
            match type_name {
                Some(name) => {
                    let schema = swipe_types::get_schema_json(&name)
                        .with_context(|| format!("no schema for `{name}`"))?;
                    println!("{schema}");
                }
                None => {
                    for name in swipe_types::get_registered_types() {
                        println!("{name}");
                    }
                }
            }
            Ok(())
        }
    }
}
