//! Gesture interpreter: raw drag + release velocity -> discrete outcome.

use serde::{Deserialize, Serialize};
use swipe_types::DecisionKind;

/// Drag displacement in points. Positive `dx` is right, positive `dy` is down.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DragDelta {
    /// Horizontal displacement.
    pub dx: f64,
    /// Vertical displacement.
    pub dy: f64,
}

impl DragDelta {
    /// Build a delta.
    #[must_use]
    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }
}

/// Release velocity in points per second.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ReleaseVelocity {
    /// Horizontal velocity.
    pub vx: f64,
    /// Vertical velocity.
    pub vy: f64,
}

impl ReleaseVelocity {
    /// Build a velocity.
    #[must_use]
    pub fn new(vx: f64, vy: f64) -> Self {
        Self { vx, vy }
    }
}

/// Distance and velocity thresholds supplied by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureThresholds {
    /// Horizontal distance a drag must exceed to count as like/pass.
    pub swipe_threshold: f64,
    /// Upward distance a drag must exceed to open details.
    pub details_threshold: f64,
    /// Vertical release speed that opens details regardless of distance.
    pub velocity_threshold: f64,
}

impl Default for GestureThresholds {
    fn default() -> Self {
        Self {
            swipe_threshold: 120.0,
            details_threshold: 80.0,
            velocity_threshold: 800.0,
        }
    }
}

/// Classified gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GestureOutcome {
    /// Right swipe.
    Like,
    /// Left swipe.
    Pass,
    /// Explicit super-like; never produced by [`classify`].
    Superlike,
    /// Upward flick or drag on the card.
    OpenDetails,
    /// Snap back, nothing happens.
    Cancel,
}

impl GestureOutcome {
    /// Decision this outcome stands for, if any.
    #[must_use]
    pub fn decision_kind(self) -> Option<DecisionKind> {
        match self {
            Self::Like => Some(DecisionKind::Like),
            Self::Pass => Some(DecisionKind::Pass),
            Self::Superlike => Some(DecisionKind::Superlike),
            Self::OpenDetails | Self::Cancel => None,
        }
    }

    /// Stable name used in logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Pass => "pass",
            Self::Superlike => "superlike",
            Self::OpenDetails => "open-details",
            Self::Cancel => "cancel",
        }
    }
}

/// Classify a released drag.
///
/// The axis with the strictly larger displacement is dominant. A horizontal
/// drag past `swipe_threshold` is a like (right) or pass (left). An upward
/// vertical drag past `details_threshold`, or released faster than
/// `velocity_threshold`, opens details. Everything else, including exact
/// diagonals and non-finite input, cancels.
#[must_use]
pub fn classify(
    delta: DragDelta,
    velocity: ReleaseVelocity,
    thresholds: &GestureThresholds,
) -> GestureOutcome {
    if !delta.dx.is_finite() || !delta.dy.is_finite() {
        return GestureOutcome::Cancel;
    }
    let abs_dx = delta.dx.abs();
    let abs_dy = delta.dy.abs();

    if abs_dx > abs_dy {
        if abs_dx > thresholds.swipe_threshold {
            return if delta.dx > 0.0 {
                GestureOutcome::Like
            } else {
                GestureOutcome::Pass
            };
        }
        return GestureOutcome::Cancel;
    }

    if abs_dy > abs_dx && delta.dy < 0.0 {
        let fast = velocity.vy.is_finite() && velocity.vy.abs() > thresholds.velocity_threshold;
        if abs_dy > thresholds.details_threshold || fast {
            return GestureOutcome::OpenDetails;
        }
    }

    GestureOutcome::Cancel
}
