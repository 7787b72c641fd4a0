//! swipe-types - Shared data model for the swipe deck engine
//!
//! This crate provides the records that flow between the deck store, the
//! orchestrator, the decision client boundary and the presentation layer.
//!
//! # Schema registry
//! Types derive `schemars::JsonSchema` so clients rendering the deck can fetch
//! the authoritative shape of a candidate or match payload at runtime.

#![allow(clippy::doc_markdown)]

use std::fmt;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Stable identifier of a candidate profile.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct CandidateId(String);

impl CandidateId {
    /// Wrap a raw identifier.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CandidateId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl From<String> for CandidateId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

/// A profile eligible for a swipe decision.
///
/// Immutable once fetched. The engine only ever looks at `id`; everything else
/// is carried through to the presentation layer untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Candidate {
    /// Stable identifier.
    pub id: CandidateId,
    /// Name shown on the card.
    #[serde(default)]
    pub display_name: String,
    /// Opaque profile payload (photos, bio, prompts...).
    #[serde(default)]
    pub attributes: serde_json::Value,
}

impl Candidate {
    /// Build a candidate with no attributes.
    pub fn new(id: impl Into<CandidateId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            attributes: serde_json::Value::Null,
        }
    }

    /// Attach an attribute payload.
    #[must_use]
    pub fn with_attributes(mut self, attributes: serde_json::Value) -> Self {
        self.attributes = attributes;
        self
    }
}

/// Kind of decision a user can make on a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum DecisionKind {
    /// Right swipe.
    Like,
    /// Left swipe.
    Pass,
    /// Explicit super-like action (never derived from a drag).
    Superlike,
}

impl DecisionKind {
    /// Stable lowercase name used in logs and wire payloads.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Pass => "pass",
            Self::Superlike => "superlike",
        }
    }

    /// Only a pass can be undone by a rewind.
    #[must_use]
    pub fn is_recoverable(self) -> bool {
        matches!(self, Self::Pass)
    }
}

impl fmt::Display for DecisionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a [`DecisionKind`] from text.
#[derive(Debug, thiserror::Error)]
#[error("unknown decision kind `{0}`; expected like|pass|superlike")]
pub struct UnknownDecisionKind(pub String);

impl std::str::FromStr for DecisionKind {
    type Err = UnknownDecisionKind;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "like" => Ok(Self::Like),
            "pass" => Ok(Self::Pass),
            "superlike" | "super-like" | "super_like" => Ok(Self::Superlike),
            other => Err(UnknownDecisionKind(other.to_string())),
        }
    }
}

/// Lifecycle of a decision from acceptance to backend confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum DecisionState {
    /// Accepted locally, backend call in flight.
    Pending,
    /// Backend confirmed.
    Committed,
    /// Backend refused or the call failed; the optimistic advance was undone.
    Failed,
}

/// A decision against one candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Decision {
    /// Candidate the decision targets.
    pub candidate_id: CandidateId,
    /// What the user decided.
    pub kind: DecisionKind,
    /// Where the decision is in its lifecycle.
    pub state: DecisionState,
}

impl Decision {
    /// New pending decision.
    #[must_use]
    pub fn pending(candidate_id: CandidateId, kind: DecisionKind) -> Self {
        Self {
            candidate_id,
            kind,
            state: DecisionState::Pending,
        }
    }

    /// Same decision moved to another lifecycle state.
    #[must_use]
    pub fn with_state(mut self, state: DecisionState) -> Self {
        self.state = state;
        self
    }
}

/// Details of a mutual match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MatchInfo {
    /// The candidate the user matched with.
    pub candidate_id: CandidateId,
    /// Backend identifier of the match (conversation handle).
    pub match_id: String,
    /// When the backend registered the match.
    pub matched_at: DateTime<Utc>,
}

/// Result of recording a decision.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct DecisionReceipt {
    /// Whether the decision produced a mutual match.
    pub matched: bool,
    /// Match details when `matched` is true.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_info: Option<MatchInfo>,
}

impl DecisionReceipt {
    /// Receipt for a decision that did not match.
    #[must_use]
    pub fn no_match() -> Self {
        Self::default()
    }

    /// Receipt for a decision that produced a match.
    #[must_use]
    pub fn matched(info: MatchInfo) -> Self {
        Self {
            matched: true,
            match_info: Some(info),
        }
    }

    /// Match to announce for `candidate_id`, if the decision matched.
    ///
    /// A backend that reports `matched` without details still yields a match,
    /// stamped now and with an empty `match_id`.
    #[must_use]
    pub fn into_match(self, candidate_id: &CandidateId) -> Option<MatchInfo> {
        if !self.matched {
            return None;
        }
        Some(self.match_info.unwrap_or_else(|| MatchInfo {
            candidate_id: candidate_id.clone(),
            match_id: String::new(),
            matched_at: Utc::now(),
        }))
    }
}

// =============================================================================
// Schema Registry
// =============================================================================

/// Schema generation error
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The type name is not in the registry.
    #[error("Unknown type: {0}")]
    UnknownType(String),
    /// The generated schema could not be rendered as JSON.
    #[error("Serialization failed: {0}")]
    Serialization(String),
}

/// Get JSON Schema for a registered type.
///
/// # Errors
/// Returns `SchemaError::UnknownType` if the type name is not registered.
pub fn get_schema_json(type_name: &str) -> Result<String, SchemaError> {
    let schema = match type_name {
        "Candidate" => schemars::schema_for!(Candidate),
        "CandidateId" => schemars::schema_for!(CandidateId),
        "Decision" => schemars::schema_for!(Decision),
        "DecisionKind" => schemars::schema_for!(DecisionKind),
        "DecisionReceipt" => schemars::schema_for!(DecisionReceipt),
        "MatchInfo" => schemars::schema_for!(MatchInfo),
        _ => return Err(SchemaError::UnknownType(type_name.to_string())),
    };
    serde_json::to_string_pretty(&schema).map_err(|e| SchemaError::Serialization(e.to_string()))
}

/// Get list of all registered type names.
#[must_use]
pub fn get_registered_types() -> Vec<&'static str> {
    vec![
        "Candidate",
        "CandidateId",
        "Decision",
        "DecisionKind",
        "DecisionReceipt",
        "MatchInfo",
    ]
}
