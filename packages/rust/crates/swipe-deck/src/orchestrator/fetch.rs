use std::sync::Arc;

use swipe_events::DeckEvent;
use swipe_types::Candidate;

use crate::client::FetchRequest;
use crate::error::SwipeError;
use crate::observability::DeckLogEvent;

use super::SwipeOrchestrator;
use super::metrics::SwipeMetrics;

enum FetchEffect {
    Stale,
    Extended(Vec<Candidate>),
    Exhausted,
    Nothing,
}

impl SwipeOrchestrator {
    /// Fetch the next page of candidates and append it behind the cursor.
    ///
    /// Returns how many new cards were appended. Returns `Ok(0)` without a
    /// backend call while another fetch is in flight. Candidates already on
    /// the deck are skipped.
    ///
    /// # Errors
    /// `SwipeError::FetchFailed` when the backend call fails or times out.
    pub async fn load_more(self: &Arc<Self>) -> Result<usize, SwipeError> {
        let (request, generation) = {
            let mut state = self.lock_state();
            if state.fetch_in_flight.is_some() {
                return Ok(0);
            }
            state.fetch_in_flight = Some(state.generation);
            (
                FetchRequest {
                    offset: state.deck.len(),
                    limit: self.config.page_size,
                },
                state.generation,
            )
        };

        tracing::debug!(
            event = DeckLogEvent::FetchStarted.as_str(),
            offset = request.offset,
            limit = request.limit,
            "fetching candidates"
        );

        let outcome = tokio::time::timeout(
            self.config.decision_timeout,
            self.client.fetch_candidates(request),
        )
        .await;

        let page = match outcome {
            Ok(Ok(page)) => Ok(page),
            Ok(Err(error)) => Err(format!("{error:#}")),
            Err(_) => Err(format!(
                "timed out after {}ms",
                self.config.decision_timeout.as_millis()
            )),
        };

        let page = match page {
            Ok(page) => page,
            Err(reason) => {
                {
                    let mut state = self.lock_state();
                    if state.fetch_in_flight == Some(generation) {
                        state.fetch_in_flight = None;
                    }
                }
                SwipeMetrics::bump(&self.metrics.fetch_failures);
                tracing::warn!(
                    event = DeckLogEvent::FetchFailed.as_str(),
                    reason = %reason,
                    "candidate fetch failed"
                );
                self.bus.publish(DeckEvent::FetchFailed {
                    reason: reason.clone(),
                });
                return Err(SwipeError::FetchFailed { reason });
            }
        };

        let fetched = page.len();
        let (added, effect) = {
            let mut state = self.lock_state();
            if state.fetch_in_flight == Some(generation) {
                state.fetch_in_flight = None;
            }
            if state.generation == generation {
                let added = state.deck.extend(page);
                let effect = if added > 0 {
                    state.exhausted_notified = false;
                    FetchEffect::Extended(state.deck.peek(self.config.visible_count))
                } else if state.deck.is_exhausted() && !state.exhausted_notified {
                    state.exhausted_notified = true;
                    FetchEffect::Exhausted
                } else {
                    FetchEffect::Nothing
                };
                (added, effect)
            } else {
                (0, FetchEffect::Stale)
            }
        };

        SwipeMetrics::bump(&self.metrics.fetches);
        tracing::debug!(
            event = DeckLogEvent::FetchCompleted.as_str(),
            fetched,
            added,
            stale = matches!(effect, FetchEffect::Stale),
            "candidates fetched"
        );

        match effect {
            FetchEffect::Extended(visible) => self.publish_visible(visible),
            FetchEffect::Exhausted => {
                tracing::info!(
                    event = DeckLogEvent::DeckExhausted.as_str(),
                    "no more candidates"
                );
                self.bus.publish(DeckEvent::Exhausted);
            }
            FetchEffect::Stale | FetchEffect::Nothing => {}
        }

        Ok(added)
    }

    /// Wait for the last background prefetch to finish, if one was started.
    pub async fn wait_for_prefetch(&self) {
        let handle = self.lock_state().prefetch.take();
        if let Some(handle) = handle
            && let Err(error) = handle.await
        {
            tracing::warn!(error = %error, "prefetch task ended unexpectedly");
        }
    }

    /// Start a background fetch when the deck runs low.
    pub(super) fn maybe_prefetch(self: &Arc<Self>) {
        let threshold = self.config.prefetch_threshold;
        if threshold == 0 {
            return;
        }
        let mut state = self.lock_state();
        if state.fetch_in_flight.is_some() || state.deck.remaining() >= threshold {
            return;
        }
        let orchestrator = Arc::clone(self);
        state.prefetch = Some(tokio::spawn(async move {
            // Failures are already logged and published as `FetchFailed`.
            let _ = orchestrator.load_more().await;
        }));
    }
}
