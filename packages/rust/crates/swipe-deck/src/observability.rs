//! Stable `event` field values for structured deck logs.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DeckLogEvent {
    GestureCancelled,
    GestureIgnored,
    DetailsRequested,
    DecisionAccepted,
    DecisionAttemptFailed,
    DecisionCommitted,
    DecisionRolledBack,
    DecisionDetached,
    MatchEmitted,
    RewindAccepted,
    RewindApplied,
    RewindFailed,
    FetchStarted,
    FetchCompleted,
    FetchFailed,
    DeckExhausted,
    DeckReset,
    InvariantViolated,
    PresenterLagged,
}

impl DeckLogEvent {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::GestureCancelled => "deck.gesture.cancelled",
            Self::GestureIgnored => "deck.gesture.ignored",
            Self::DetailsRequested => "deck.details.requested",
            Self::DecisionAccepted => "deck.decision.accepted",
            Self::DecisionAttemptFailed => "deck.decision.attempt_failed",
            Self::DecisionCommitted => "deck.decision.committed",
            Self::DecisionRolledBack => "deck.decision.rolled_back",
            Self::DecisionDetached => "deck.decision.detached",
            Self::MatchEmitted => "deck.match.emitted",
            Self::RewindAccepted => "deck.rewind.accepted",
            Self::RewindApplied => "deck.rewind.applied",
            Self::RewindFailed => "deck.rewind.failed",
            Self::FetchStarted => "deck.fetch.started",
            Self::FetchCompleted => "deck.fetch.completed",
            Self::FetchFailed => "deck.fetch.failed",
            Self::DeckExhausted => "deck.exhausted",
            Self::DeckReset => "deck.reset",
            Self::InvariantViolated => "deck.invariant.violated",
            Self::PresenterLagged => "deck.presenter.lagged",
        }
    }
}
