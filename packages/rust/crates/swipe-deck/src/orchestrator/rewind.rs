use std::sync::Arc;

use swipe_events::DeckEvent;
use swipe_types::CandidateId;

use crate::error::SwipeError;
use crate::observability::DeckLogEvent;

use super::metrics::SwipeMetrics;
use super::types::{IgnoreReason, PendingRewind, RewindResponse};
use super::{Interaction, SwipeOrchestrator};

impl SwipeOrchestrator {
    /// Undo the most recent committed pass. Must be called from within a Tokio runtime.
    ///
    /// With nothing to undo this is a no-op. While the backend delete is in
    /// flight, swipes are ignored; on failure the deck is untouched and the
    /// pass stays rewindable. A rewind that lands after `reset` still undoes
    /// the decision on the backend but leaves the new deck alone.
    pub fn request_rewind(self: &Arc<Self>) -> RewindResponse {
        let (candidate_id, generation) = {
            let mut state = self.lock_state();
            if !matches!(state.interaction, Interaction::Idle) {
                return RewindResponse::Ignored(IgnoreReason::Busy);
            }
            let Some(slot) = state.deck.rewind_slot() else {
                return RewindResponse::NothingToRewind;
            };
            let candidate_id = slot.candidate.id.clone();
            state.interaction = Interaction::Rewinding;
            (candidate_id, state.generation)
        };

        tracing::info!(
            event = DeckLogEvent::RewindAccepted.as_str(),
            candidate_id = %candidate_id,
            "rewind accepted"
        );

        let orchestrator = Arc::clone(self);
        let task_candidate = candidate_id.clone();
        let handle =
            tokio::spawn(async move { orchestrator.run_rewind(task_candidate, generation).await });

        RewindResponse::Accepted(PendingRewind {
            candidate_id,
            handle,
        })
    }

    async fn run_rewind(
        self: Arc<Self>,
        candidate_id: CandidateId,
        generation: u64,
    ) -> Result<CandidateId, SwipeError> {
        let outcome = tokio::time::timeout(
            self.config.decision_timeout,
            self.client.delete_decision(&candidate_id),
        )
        .await;
        let failure = match outcome {
            Ok(Ok(())) => None,
            Ok(Err(error)) => Some(format!("{error:#}")),
            Err(_) => Some(format!(
                "timed out after {}ms",
                self.config.decision_timeout.as_millis()
            )),
        };

        if let Some(reason) = failure {
            self.lock_state().interaction = Interaction::Idle;
            SwipeMetrics::bump(&self.metrics.rewinds_failed);
            tracing::warn!(
                event = DeckLogEvent::RewindFailed.as_str(),
                candidate_id = %candidate_id,
                reason = %reason,
                "rewind failed; deck untouched"
            );
            self.bus.publish(DeckEvent::RewindError {
                candidate_id: candidate_id.clone(),
                reason: reason.clone(),
            });
            return Err(SwipeError::RewindFailed {
                candidate_id,
                reason,
            });
        }

        let applied = {
            let mut state = self.lock_state();
            state.interaction = Interaction::Idle;
            if state.generation == generation {
                state.deck.rewind().map(|restored| {
                    restored.map(|id| (id, state.deck.peek(self.config.visible_count)))
                })
            } else {
                Ok(None)
            }
        };
        debug_assert!(applied.is_ok(), "rewind slot must point at the vacated deck slot");

        match applied {
            Ok(Some((restored, visible))) => {
                SwipeMetrics::bump(&self.metrics.rewinds_applied);
                tracing::info!(
                    event = DeckLogEvent::RewindApplied.as_str(),
                    candidate_id = %restored,
                    "rewind applied"
                );
                self.bus.publish(DeckEvent::RewindApplied {
                    candidate_id: restored.clone(),
                });
                self.publish_visible(visible);
                Ok(restored)
            }
            Ok(None) => {
                // Undone on the backend, but the reset deck is left as it is.
                SwipeMetrics::bump(&self.metrics.rewinds_applied);
                tracing::info!(
                    event = DeckLogEvent::DecisionDetached.as_str(),
                    candidate_id = %candidate_id,
                    "rewind deleted on backend after deck reset"
                );
                self.bus.publish(DeckEvent::RewindApplied {
                    candidate_id: candidate_id.clone(),
                });
                Ok(candidate_id)
            }
            Err(error) => {
                tracing::error!(
                    event = DeckLogEvent::InvariantViolated.as_str(),
                    candidate_id = %candidate_id,
                    error = %error,
                    "failed to restore rewound candidate"
                );
                Err(SwipeError::Deck(error))
            }
        }
    }
}
