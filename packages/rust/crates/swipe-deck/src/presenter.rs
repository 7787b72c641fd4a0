//! Presentation bridge: drive a renderer from the deck event bus.

use std::sync::Arc;

use swipe_events::{DeckEvent, SwipeEvent};
use swipe_types::{Candidate, CandidateId, MatchInfo};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::observability::DeckLogEvent;

/// Callbacks a renderer implements. Only discrete events arrive here; the
/// renderer owns all continuous animation.
pub trait Presenter: Send + Sync {
    /// The cards at and after the cursor changed (current card first).
    fn on_deck_changed(&self, visible: &[Candidate]);

    /// A decision produced a mutual match.
    fn on_match(&self, info: &MatchInfo);

    /// A decision failed and was rolled back; show a retryable error.
    fn on_decision_error(&self, candidate_id: &CandidateId, reason: &str);

    /// The backend refused a rewind; the pass stays rewindable.
    fn on_rewind_error(&self, candidate_id: &CandidateId, reason: &str) {
        let _ = (candidate_id, reason);
    }

    /// The pass on `candidate_id` was undone.
    fn on_rewind_applied(&self, candidate_id: &CandidateId) {
        let _ = candidate_id;
    }

    /// Open the profile view for `candidate`.
    fn on_details(&self, candidate: &Candidate) {
        let _ = candidate;
    }

    /// Fetching more candidates failed.
    fn on_fetch_failed(&self, reason: &str) {
        let _ = reason;
    }

    /// No more candidates for now.
    fn on_exhausted(&self) {}
}

/// Route one event to the matching presenter callback.
pub fn dispatch(presenter: &dyn Presenter, event: &SwipeEvent) {
    match &event.event {
        DeckEvent::DeckChanged { visible } => presenter.on_deck_changed(visible),
        DeckEvent::Match(info) => presenter.on_match(info),
        DeckEvent::DecisionError {
            candidate_id,
            reason,
        } => presenter.on_decision_error(candidate_id, reason),
        DeckEvent::RewindApplied { candidate_id } => presenter.on_rewind_applied(candidate_id),
        DeckEvent::RewindError {
            candidate_id,
            reason,
        } => presenter.on_rewind_error(candidate_id, reason),
        DeckEvent::DetailsRequested { candidate } => presenter.on_details(candidate),
        DeckEvent::FetchFailed { reason } => presenter.on_fetch_failed(reason),
        DeckEvent::Exhausted => presenter.on_exhausted(),
    }
}

/// Forward bus events to `presenter` until the bus closes.
///
/// A receiver that falls behind skips the missed events with a warning; the
/// next `DeckChanged` brings the renderer back in sync.
pub fn spawn_presenter_loop(
    mut rx: broadcast::Receiver<SwipeEvent>,
    presenter: Arc<dyn Presenter>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => dispatch(presenter.as_ref(), &event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(
                        event = DeckLogEvent::PresenterLagged.as_str(),
                        skipped,
                        "presenter fell behind the event bus"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}
