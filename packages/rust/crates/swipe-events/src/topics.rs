//! Event topic constants for type-safe routing.

/// Visible window of the deck changed
pub const DECK_CHANGED: &str = "deck/changed";
/// Deck ran out of candidates and the backend returned nothing new
pub const DECK_EXHAUSTED: &str = "deck/exhausted";

/// A decision produced a mutual match
pub const DECK_MATCH: &str = "deck/match";
/// A decision failed and was rolled back
pub const DECISION_ERROR: &str = "decision/error";

/// The last pass was restored to the deck
pub const REWIND_APPLIED: &str = "rewind/applied";
/// The backend refused to delete the last pass
pub const REWIND_ERROR: &str = "rewind/error";

/// The user asked to open the current profile
pub const DETAILS_REQUESTED: &str = "details/requested";

/// Fetching the next page of candidates failed
pub const FETCH_FAILED: &str = "fetch/failed";
