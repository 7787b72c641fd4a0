//! Error types for the deck store and the swipe orchestrator.
//!
//! `DeckError` marks a broken invariant (a bug in the caller), `SwipeError`
//! is what the presentation layer gets to see.

use swipe_types::{CandidateId, DecisionKind};
use thiserror::Error;

/// Deck store invariant violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeckError {
    /// `advance()` with no card under the cursor.
    #[error("deck underflow: cannot advance cursor {cursor} past deck length {len}")]
    Underflow {
        /// Cursor at the time of the call.
        cursor: usize,
        /// Deck length at the time of the call.
        len: usize,
    },

    /// `rewind_to()` that would not restore the slot the last advance vacated.
    #[error("rewind conflict: cannot restore index {index} with cursor {cursor} (deck length {len})")]
    RewindConflict {
        /// Index the caller tried to restore.
        index: usize,
        /// Cursor at the time of the call.
        cursor: usize,
        /// Deck length at the time of the call.
        len: usize,
    },
}

/// Failures surfaced by the orchestrator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SwipeError {
    /// Backend did not record a decision; the optimistic advance was undone.
    #[error("failed to record {kind} for candidate {candidate_id}: {reason}")]
    DecisionRecordFailed {
        /// Candidate the decision was about.
        candidate_id: CandidateId,
        /// Decision that was not recorded.
        kind: DecisionKind,
        /// Last backend error.
        reason: String,
    },

    /// Backend refused to delete the last pass; deck untouched, rewind still available.
    #[error("failed to rewind candidate {candidate_id}: {reason}")]
    RewindFailed {
        /// Candidate whose pass could not be deleted.
        candidate_id: CandidateId,
        /// Backend error or timeout.
        reason: String,
    },

    /// Fetching the next page of candidates failed.
    #[error("failed to fetch candidates: {reason}")]
    FetchFailed {
        /// Backend error or timeout.
        reason: String,
    },

    /// A background decision or rewind task did not run to completion.
    #[error("background task ended unexpectedly: {0}")]
    Background(String),

    /// Broken deck invariant.
    #[error(transparent)]
    Deck(#[from] DeckError),
}

impl SwipeError {
    /// Whether the user can simply try again.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::DecisionRecordFailed { .. } | Self::RewindFailed { .. } | Self::FetchFailed { .. }
        )
    }
}
