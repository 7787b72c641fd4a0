use std::sync::Arc;

use swipe_events::DeckEvent;
use swipe_types::{Candidate, CandidateId, Decision, DecisionKind, DecisionReceipt, DecisionState};

use crate::error::SwipeError;
use crate::observability::DeckLogEvent;

use super::metrics::SwipeMetrics;
use super::types::{CommittedDecision, GestureResponse, IgnoreReason, PendingDecision};
use super::{Interaction, SwipeOrchestrator};

struct Accepted {
    candidate: Candidate,
    pre_advance_index: usize,
    generation: u64,
    visible: Vec<Candidate>,
}

impl SwipeOrchestrator {
    pub(super) fn accept(self: &Arc<Self>, kind: DecisionKind) -> GestureResponse {
        let accepted = {
            let mut state = self.lock_state();
            if !matches!(state.interaction, Interaction::Idle) {
                drop(state);
                SwipeMetrics::bump(&self.metrics.ignored_busy);
                tracing::debug!(
                    event = DeckLogEvent::GestureIgnored.as_str(),
                    kind = kind.as_str(),
                    reason = "busy",
                    "decision ignored while another interaction is in flight"
                );
                return GestureResponse::Ignored(IgnoreReason::Busy);
            }

            let pre_advance_index = state.deck.cursor();
            match state.deck.advance() {
                Ok(candidate) => {
                    state.interaction = Interaction::Committing {
                        decision: Decision::pending(candidate.id.clone(), kind),
                    };
                    Some(Accepted {
                        candidate,
                        pre_advance_index,
                        generation: state.generation,
                        visible: state.deck.peek(self.config.visible_count),
                    })
                }
                Err(_) => None,
            }
        };

        let Some(accepted) = accepted else {
            SwipeMetrics::bump(&self.metrics.ignored_exhausted);
            tracing::debug!(
                event = DeckLogEvent::GestureIgnored.as_str(),
                kind = kind.as_str(),
                reason = "exhausted",
                "decision ignored on an empty deck"
            );
            self.maybe_prefetch();
            return GestureResponse::Ignored(IgnoreReason::Exhausted);
        };

        SwipeMetrics::bump(&self.metrics.accepted);
        tracing::info!(
            event = DeckLogEvent::DecisionAccepted.as_str(),
            candidate_id = %accepted.candidate.id,
            kind = kind.as_str(),
            index = accepted.pre_advance_index,
            "decision accepted"
        );

        let decision = Decision::pending(accepted.candidate.id.clone(), kind);
        self.publish_visible(accepted.visible);
        self.maybe_prefetch();

        let orchestrator = Arc::clone(self);
        let handle = tokio::spawn(async move {
            orchestrator
                .commit(
                    accepted.candidate,
                    kind,
                    accepted.pre_advance_index,
                    accepted.generation,
                )
                .await
        });

        GestureResponse::Accepted(PendingDecision { decision, handle })
    }

    async fn commit(
        self: Arc<Self>,
        candidate: Candidate,
        kind: DecisionKind,
        pre_advance_index: usize,
        generation: u64,
    ) -> Result<CommittedDecision, SwipeError> {
        let result = self.record_with_retry(&candidate.id, kind).await;
        let candidate_id = candidate.id.clone();
        let decision = Decision::pending(candidate_id.clone(), kind);

        match result {
            Ok(receipt) => {
                let match_info = receipt.into_match(&candidate_id);
                let detached = {
                    let mut state = self.lock_state();
                    state.interaction = Interaction::Idle;
                    let detached = state.generation != generation;
                    if !detached {
                        if match_info.is_none() && kind.is_recoverable() {
                            state.deck.set_rewind_slot(candidate, pre_advance_index);
                        } else {
                            state.deck.clear_rewind_slot();
                        }
                    }
                    detached
                };

                SwipeMetrics::bump(&self.metrics.committed);
                if detached {
                    tracing::info!(
                        event = DeckLogEvent::DecisionDetached.as_str(),
                        candidate_id = %candidate_id,
                        kind = kind.as_str(),
                        "decision committed after deck reset"
                    );
                } else {
                    tracing::info!(
                        event = DeckLogEvent::DecisionCommitted.as_str(),
                        candidate_id = %candidate_id,
                        kind = kind.as_str(),
                        matched = match_info.is_some(),
                        "decision committed"
                    );
                }

                if let Some(info) = &match_info {
                    SwipeMetrics::bump(&self.metrics.matches);
                    tracing::info!(
                        event = DeckLogEvent::MatchEmitted.as_str(),
                        candidate_id = %candidate_id,
                        match_id = %info.match_id,
                        "match"
                    );
                    self.bus.publish(DeckEvent::Match(info.clone()));
                }

                Ok(CommittedDecision {
                    decision: decision.with_state(DecisionState::Committed),
                    match_info,
                })
            }
            Err(reason) => {
                let visible = {
                    let mut state = self.lock_state();
                    state.interaction = Interaction::Idle;
                    if state.generation == generation {
                        let restored = state.deck.rewind_to(candidate, pre_advance_index);
                        if let Err(error) = &restored {
                            tracing::error!(
                                event = DeckLogEvent::InvariantViolated.as_str(),
                                candidate_id = %candidate_id,
                                error = %error,
                                "failed to undo optimistic advance"
                            );
                        }
                        debug_assert!(restored.is_ok(), "rollback must restore the vacated slot");
                        Some(state.deck.peek(self.config.visible_count))
                    } else {
                        None
                    }
                };

                SwipeMetrics::bump(&self.metrics.rolled_back);
                tracing::warn!(
                    event = DeckLogEvent::DecisionRolledBack.as_str(),
                    candidate_id = %candidate_id,
                    kind = kind.as_str(),
                    reason = %reason,
                    "decision failed; optimistic advance undone"
                );

                if let Some(visible) = visible {
                    self.publish_visible(visible);
                }
                self.bus.publish(DeckEvent::DecisionError {
                    candidate_id: candidate_id.clone(),
                    reason: reason.clone(),
                });

                Err(SwipeError::DecisionRecordFailed {
                    candidate_id,
                    kind,
                    reason,
                })
            }
        }
    }

    async fn record_with_retry(
        &self,
        candidate_id: &CandidateId,
        kind: DecisionKind,
    ) -> Result<DecisionReceipt, String> {
        let attempts = self.config.decision_retries.saturating_add(1);
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            if attempt > 1 {
                SwipeMetrics::bump(&self.metrics.retried_attempts);
                tokio::time::sleep(self.config.retry_backoff).await;
            }

            let outcome = tokio::time::timeout(
                self.config.decision_timeout,
                self.client.record_decision(candidate_id, kind),
            )
            .await;

            last_error = match outcome {
                Ok(Ok(receipt)) => return Ok(receipt),
                Ok(Err(error)) => format!("{error:#}"),
                Err(_) => format!(
                    "timed out after {}ms",
                    self.config.decision_timeout.as_millis()
                ),
            };
            tracing::warn!(
                event = DeckLogEvent::DecisionAttemptFailed.as_str(),
                candidate_id = %candidate_id,
                kind = kind.as_str(),
                attempt,
                attempts,
                error = %last_error,
                "record decision attempt failed"
            );
        }

        Err(last_error)
    }
}
