#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use swipe_deck::{
    Candidate, CandidateId, DecisionClient, DecisionKind, DecisionReceipt, FetchRequest,
    MemoryDecisionClient, OrchestratorConfig, SwipeEvent, SwipeOrchestrator,
};
use tokio::sync::{Notify, broadcast};

pub const WAIT: Duration = Duration::from_secs(2);

pub fn candidates(ids: &[&str]) -> Vec<Candidate> {
    ids.iter()
        .map(|id| Candidate::new(*id, id.to_uppercase()))
        .collect()
}

pub fn ids(visible: &[Candidate]) -> Vec<String> {
    visible.iter().map(|c| c.id.as_str().to_string()).collect()
}

/// No prefetch, no retry pause: every backend call is driven by the test.
pub fn test_config() -> OrchestratorConfig {
    OrchestratorConfig {
        session_id: "test-session".to_string(),
        prefetch_threshold: 0,
        decision_retries: 0,
        retry_backoff: Duration::ZERO,
        decision_timeout: Duration::from_secs(5),
        ..OrchestratorConfig::default()
    }
}

pub async fn loaded(
    client: Arc<dyn DecisionClient>,
    config: OrchestratorConfig,
) -> Arc<SwipeOrchestrator> {
    let orchestrator = SwipeOrchestrator::new(client, config);
    orchestrator
        .load_more()
        .await
        .expect("initial load should succeed");
    orchestrator
}

pub fn drain(rx: &mut broadcast::Receiver<SwipeEvent>) -> Vec<SwipeEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

pub fn topics(events: &[SwipeEvent]) -> Vec<&'static str> {
    events.iter().map(SwipeEvent::topic).collect()
}

/// Memory backend whose record/delete calls block until the test releases them.
pub struct GatedClient {
    pub inner: MemoryDecisionClient,
    gate_records: bool,
    gate_deletes: bool,
    release: Notify,
    pub started: AtomicUsize,
}

impl GatedClient {
    pub fn records(pool: Vec<Candidate>) -> Arc<Self> {
        Arc::new(Self::new(MemoryDecisionClient::new(pool), true, false))
    }

    pub fn deletes(pool: Vec<Candidate>) -> Arc<Self> {
        Arc::new(Self::new(MemoryDecisionClient::new(pool), false, true))
    }

    fn new(inner: MemoryDecisionClient, gate_records: bool, gate_deletes: bool) -> Self {
        Self {
            inner,
            gate_records,
            gate_deletes,
            release: Notify::new(),
            started: AtomicUsize::new(0),
        }
    }

    /// Let exactly one gated call through (now or when it arrives).
    pub fn release_one(&self) {
        self.release.notify_one();
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    async fn gate(&self, gated: bool) {
        if gated {
            self.started.fetch_add(1, Ordering::SeqCst);
            self.release.notified().await;
        }
    }
}

#[async_trait]
impl DecisionClient for GatedClient {
    async fn fetch_candidates(&self, request: FetchRequest) -> Result<Vec<Candidate>> {
        self.inner.fetch_candidates(request).await
    }

    async fn record_decision(
        &self,
        candidate_id: &CandidateId,
        kind: DecisionKind,
    ) -> Result<DecisionReceipt> {
        self.gate(self.gate_records).await;
        self.inner.record_decision(candidate_id, kind).await
    }

    async fn delete_decision(&self, candidate_id: &CandidateId) -> Result<()> {
        self.gate(self.gate_deletes).await;
        self.inner.delete_decision(candidate_id).await
    }
}
