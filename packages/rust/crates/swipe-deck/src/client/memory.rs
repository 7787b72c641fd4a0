//! In-memory decision client used by the simulator and tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex as StdMutex;
use std::time::Duration;

use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::Utc;
use swipe_types::{Candidate, CandidateId, DecisionKind, DecisionReceipt, MatchInfo};

use super::{DecisionClient, FetchRequest};

#[derive(Debug, Default)]
struct MemoryBackend {
    pool: Vec<Candidate>,
    likes_back: HashSet<CandidateId>,
    failing_records: HashMap<CandidateId, u32>,
    failing_deletes: HashSet<CandidateId>,
    recorded: HashMap<CandidateId, (DecisionKind, DecisionReceipt)>,
    /// Ids already decided when the current deck started (offset 0).
    decided_before_deck: HashSet<CandidateId>,
    record_calls: Vec<(CandidateId, DecisionKind)>,
    next_match_seq: u64,
}

/// Backend double holding a fixed candidate pool.
///
/// Candidates listed with [`MemoryDecisionClient::with_likes_back`] match on
/// like/superlike. Failures can be scripted per candidate.
#[derive(Debug, Default)]
pub struct MemoryDecisionClient {
    inner: StdMutex<MemoryBackend>,
    latency: Duration,
}

impl MemoryDecisionClient {
    /// Client serving `pool` in order.
    #[must_use]
    pub fn new(pool: Vec<Candidate>) -> Self {
        Self {
            inner: StdMutex::new(MemoryBackend {
                pool,
                ..MemoryBackend::default()
            }),
            latency: Duration::ZERO,
        }
    }

    /// Candidates that already liked the user back.
    #[must_use]
    pub fn with_likes_back<I, T>(self, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<CandidateId>,
    {
        self.lock().likes_back.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Recording a decision on `id` fails `times` times before succeeding.
    #[must_use]
    pub fn with_failing_record(self, id: impl Into<CandidateId>, times: u32) -> Self {
        self.lock().failing_records.insert(id.into(), times);
        self
    }

    /// Deleting the decision on `id` always fails.
    #[must_use]
    pub fn with_failing_delete(self, id: impl Into<CandidateId>) -> Self {
        self.lock().failing_deletes.insert(id.into());
        self
    }

    /// Simulated network latency for every call.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Stop failing deletes for `id`.
    pub fn heal_delete(&self, id: &CandidateId) {
        self.lock().failing_deletes.remove(id);
    }

    /// Decisions currently persisted.
    #[must_use]
    pub fn recorded(&self) -> HashMap<CandidateId, DecisionKind> {
        self.lock()
            .recorded
            .iter()
            .map(|(id, (kind, _))| (id.clone(), *kind))
            .collect()
    }

    /// Every `record_decision` call in arrival order, failed attempts included.
    #[must_use]
    pub fn record_calls(&self) -> Vec<(CandidateId, DecisionKind)> {
        self.lock().record_calls.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryBackend> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl DecisionClient for MemoryDecisionClient {
    async fn fetch_candidates(&self, request: FetchRequest) -> Result<Vec<Candidate>> {
        self.simulate_latency().await;
        let mut backend = self.lock();
        if request.offset == 0 {
            backend.decided_before_deck = backend.recorded.keys().cloned().collect();
        }
        // Decisions made on this deck must not shift later pages.
        Ok(backend
            .pool
            .iter()
            .filter(|candidate| !backend.decided_before_deck.contains(&candidate.id))
            .skip(request.offset)
            .take(request.limit)
            .cloned()
            .collect())
    }

    async fn record_decision(
        &self,
        candidate_id: &CandidateId,
        kind: DecisionKind,
    ) -> Result<DecisionReceipt> {
        self.simulate_latency().await;
        let mut backend = self.lock();
        backend.record_calls.push((candidate_id.clone(), kind));

        if let Some(remaining) = backend.failing_records.get_mut(candidate_id)
            && *remaining > 0
        {
            *remaining -= 1;
            bail!("backend unavailable while recording {kind} for {candidate_id}");
        }

        if let Some((_, receipt)) = backend.recorded.get(candidate_id) {
            return Ok(receipt.clone());
        }

        let receipt = if kind != DecisionKind::Pass && backend.likes_back.contains(candidate_id) {
            backend.next_match_seq += 1;
            DecisionReceipt::matched(MatchInfo {
                candidate_id: candidate_id.clone(),
                match_id: format!("match-{}", backend.next_match_seq),
                matched_at: Utc::now(),
            })
        } else {
            DecisionReceipt::no_match()
        };
        backend
            .recorded
            .insert(candidate_id.clone(), (kind, receipt.clone()));
        Ok(receipt)
    }

    async fn delete_decision(&self, candidate_id: &CandidateId) -> Result<()> {
        self.simulate_latency().await;
        let mut backend = self.lock();
        if backend.failing_deletes.contains(candidate_id) {
            bail!("backend refused to delete decision for {candidate_id}");
        }
        backend.recorded.remove(candidate_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> Vec<Candidate> {
        ["a", "b", "c"]
            .into_iter()
            .map(|id| Candidate::new(id, id))
            .collect()
    }

    #[tokio::test]
    async fn test_fetch_pages_through_pool() {
        let client = MemoryDecisionClient::new(pool());
        let first = client
            .fetch_candidates(FetchRequest {
                offset: 0,
                limit: 2,
            })
            .await
            .unwrap();
        assert_eq!(first.len(), 2);
        let rest = client
            .fetch_candidates(FetchRequest {
                offset: 2,
                limit: 2,
            })
            .await
            .unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].id.as_str(), "c");
    }

    #[tokio::test]
    async fn test_fresh_deck_pages_past_earlier_decisions() {
        let client = MemoryDecisionClient::new(pool());
        let page = |offset| FetchRequest { offset, limit: 1 };
        let first = client.fetch_candidates(page(0)).await.unwrap();
        assert_eq!(first[0].id.as_str(), "a");
        client
            .record_decision(&CandidateId::from("a"), DecisionKind::Like)
            .await
            .unwrap();
        // Same deck: `a` still counts towards the offset.
        let second = client.fetch_candidates(page(1)).await.unwrap();
        assert_eq!(second[0].id.as_str(), "b");
        client
            .record_decision(&CandidateId::from("b"), DecisionKind::Pass)
            .await
            .unwrap();

        let restart = client.fetch_candidates(page(0)).await.unwrap();
        assert_eq!(restart[0].id.as_str(), "c");
        assert!(client.fetch_candidates(page(1)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_record_is_idempotent() {
        let client = MemoryDecisionClient::new(pool()).with_likes_back(["b"]);
        let id = CandidateId::from("b");
        let first = client.record_decision(&id, DecisionKind::Like).await.unwrap();
        let second = client.record_decision(&id, DecisionKind::Like).await.unwrap();
        assert!(first.matched);
        assert_eq!(first, second);
        assert_eq!(client.recorded().len(), 1);
    }

    #[tokio::test]
    async fn test_pass_never_matches() {
        let client = MemoryDecisionClient::new(pool()).with_likes_back(["a"]);
        let receipt = client
            .record_decision(&CandidateId::from("a"), DecisionKind::Pass)
            .await
            .unwrap();
        assert!(!receipt.matched);
    }

    #[tokio::test]
    async fn test_scripted_failures() {
        let client = MemoryDecisionClient::new(pool())
            .with_failing_record("a", 1)
            .with_failing_delete("a");
        let id = CandidateId::from("a");
        assert!(client.record_decision(&id, DecisionKind::Pass).await.is_err());
        assert!(client.record_decision(&id, DecisionKind::Pass).await.is_ok());
        assert!(client.delete_decision(&id).await.is_err());
        client.heal_delete(&id);
        assert!(client.delete_decision(&id).await.is_ok());
        assert!(client.recorded().is_empty());
        assert_eq!(client.record_calls().len(), 2);
    }
}
