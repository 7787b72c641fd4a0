//! `simulate` subcommand: replay a scripted deck session against the in-memory backend.

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::broadcast;

use swipe_deck::{
    Candidate, CandidateId, DecisionKind, DragDelta, GestureResponse, MemoryDecisionClient,
    OrchestratorConfig, ReleaseVelocity, RewindResponse, SwipeEvent, SwipeOrchestrator,
};

/// Scripted session.
///
/// ```yaml
/// candidates:
///   - { id: a, display_name: Ada }
///   - { id: b, display_name: Bo }
/// matches: [b]
/// failing_records: { c: 2 }
/// failing_deletes: [a]
/// steps:
///   - gesture: { dx: -180, dy: 4 }
///   - rewind
///   - superlike
/// ```
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Script {
    #[serde(default)]
    candidates: Vec<Candidate>,
    /// Candidates that like the user back.
    #[serde(default)]
    matches: Vec<CandidateId>,
    /// Candidate id → number of failing record attempts.
    #[serde(default)]
    failing_records: HashMap<CandidateId, u32>,
    #[serde(default)]
    failing_deletes: Vec<CandidateId>,
    #[serde(default)]
    latency_ms: u64,
    #[serde(default)]
    steps: Vec<ScriptStep>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum ScriptStep {
    Gesture {
        dx: f64,
        dy: f64,
        #[serde(default)]
        vx: f64,
        #[serde(default)]
        vy: f64,
    },
    Like,
    Pass,
    Superlike,
    Rewind,
    Details,
    Reset,
    LoadMore,
}

pub(crate) fn parse_script(raw: &str) -> Result<Script> {
    serde_yaml::from_str(raw).context("failed to parse simulation script")
}

pub(crate) async fn run_script_file(path: &Path, config: OrchestratorConfig) -> Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read script {}", path.display()))?;
    let script = parse_script(&raw)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_script(script, config, &mut out).await
}

/// Play `script` and write one JSON object per line: step outcomes, deck
/// events, and a closing snapshot with metrics.
pub(crate) async fn run_script(
    script: Script,
    config: OrchestratorConfig,
    out: &mut dyn Write,
) -> Result<()> {
    let mut client = MemoryDecisionClient::new(script.candidates)
        .with_likes_back(script.matches)
        .with_latency(Duration::from_millis(script.latency_ms));
    for (id, times) in script.failing_records {
        client = client.with_failing_record(id, times);
    }
    for id in script.failing_deletes {
        client = client.with_failing_delete(id);
    }

    let orchestrator = SwipeOrchestrator::new(Arc::new(client), config);
    let mut rx = orchestrator.subscribe();

    let loaded = orchestrator.load_more().await;
    let result = step_result(loaded.map(|added| json!({ "added": added })));
    write_line(out, &json!({ "step": "load_more", "result": result }))?;
    drain_events(&mut rx, out)?;

    for step in script.steps {
        let result = run_step(&orchestrator, &step).await;
        write_line(out, &json!({ "step": step, "result": result }))?;
        drain_events(&mut rx, out)?;
    }

    orchestrator.wait_for_prefetch().await;
    drain_events(&mut rx, out)?;

    write_line(
        out,
        &json!({
            "snapshot": orchestrator.snapshot(),
            "metrics": orchestrator.metrics(),
        }),
    )?;
    Ok(())
}

async fn run_step(orchestrator: &Arc<SwipeOrchestrator>, step: &ScriptStep) -> serde_json::Value {
    match step {
        ScriptStep::Gesture { dx, dy, vx, vy } => {
            let response = orchestrator
                .submit_gesture(DragDelta::new(*dx, *dy), ReleaseVelocity::new(*vx, *vy));
            settle_gesture(response).await
        }
        ScriptStep::Like => settle_gesture(orchestrator.submit_decision(DecisionKind::Like)).await,
        ScriptStep::Pass => settle_gesture(orchestrator.submit_decision(DecisionKind::Pass)).await,
        ScriptStep::Superlike => settle_gesture(orchestrator.submit_superlike()).await,
        ScriptStep::Rewind => match orchestrator.request_rewind() {
            RewindResponse::NothingToRewind => json!({ "nothing_to_rewind": true }),
            RewindResponse::Ignored(reason) => json!({ "ignored": reason }),
            RewindResponse::Accepted(pending) => {
                step_result(pending.settle().await.map(|id| json!({ "restored": id })))
            }
        },
        ScriptStep::Details => json!({ "details": orchestrator.request_details() }),
        ScriptStep::Reset => {
            orchestrator.reset();
            json!({ "reset": true })
        }
        ScriptStep::LoadMore => {
            step_result(orchestrator.load_more().await.map(|n| json!({ "added": n })))
        }
    }
}

async fn settle_gesture(response: GestureResponse) -> serde_json::Value {
    match response {
        GestureResponse::Cancelled => json!({ "cancelled": true }),
        GestureResponse::DetailsOpened(candidate_id) => json!({ "details": candidate_id }),
        GestureResponse::Ignored(reason) => json!({ "ignored": reason }),
        GestureResponse::Accepted(pending) => step_result(pending.settle().await.map(|committed| {
            json!({
                "committed": committed.decision,
                "match": committed.match_info,
            })
        })),
    }
}

fn step_result<E: std::fmt::Display>(
    result: std::result::Result<serde_json::Value, E>,
) -> serde_json::Value {
    match result {
        Ok(value) => value,
        Err(error) => json!({ "error": error.to_string() }),
    }
}

fn drain_events(rx: &mut broadcast::Receiver<SwipeEvent>, out: &mut dyn Write) -> Result<()> {
    loop {
        match rx.try_recv() {
            Ok(event) => write_line(
                out,
                &json!({ "topic": event.topic(), "event": event.event }),
            )?,
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "simulation output lagged behind the event bus");
            }
            Err(broadcast::error::TryRecvError::Empty | broadcast::error::TryRecvError::Closed) => {
                return Ok(());
            }
        }
    }
}

fn write_line(out: &mut dyn Write, value: &serde_json::Value) -> Result<()> {
    let line = serde_json::to_string(value).context("failed to encode output line")?;
    writeln!(out, "{line}").context("failed to write output")
}
