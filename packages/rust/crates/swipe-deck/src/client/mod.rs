//! Decision client: the only way the engine talks to the backend.

mod memory;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use swipe_types::{Candidate, CandidateId, DecisionKind, DecisionReceipt};

pub use memory::MemoryDecisionClient;

/// Page request for the next candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRequest {
    /// Number of candidates the deck has received since its last reset.
    /// `0` starts a fresh deck: candidates decided before then are not served again.
    pub offset: usize,
    /// Page size.
    pub limit: usize,
}

/// Async backend boundary so the orchestrator can run against the hosted
/// service or test doubles.
///
/// `record_decision` must be idempotent per candidate: recording the same
/// candidate twice (timeout then retry) yields one persisted decision and at
/// most one match.
#[async_trait]
pub trait DecisionClient: Send + Sync {
    /// Fetch the next page of candidates. An empty page means nothing more for now.
    async fn fetch_candidates(&self, request: FetchRequest) -> Result<Vec<Candidate>>;

    /// Record a decision and report whether it produced a match.
    async fn record_decision(
        &self,
        candidate_id: &CandidateId,
        kind: DecisionKind,
    ) -> Result<DecisionReceipt>;

    /// Delete a previously recorded decision (rewind).
    async fn delete_decision(&self, candidate_id: &CandidateId) -> Result<()>;
}
