use serde::{Deserialize, Serialize};

// ──────────────────── Cycle Types ────────────────────

/// One of the three mutually exclusive states of the hangar cycle.
///
/// A full cycle traverses Closed → Open → Restart and wraps back to
/// Closed, repeating indefinitely from a fixed reference instant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CyclePhase {
    /// Long wait; the hangar is shut.
    Closed,
    /// Short active window; the hangar is accessible.
    Open,
    /// Brief transition back to Closed.
    Restart,
}

impl CyclePhase {
    /// Human-readable status label shown in the message body.
    pub fn label(self) -> &'static str {
        match self {
            CyclePhase::Closed => "HANGAR CLOSED",
            CyclePhase::Open => "HANGAR OPEN",
            CyclePhase::Restart => "RESTART",
        }
    }
}

/// State of a single indicator light in the row.
///
/// Polarity is phase-dependent: during Closed, Filled marks elapsed
/// progress toward opening; during Open, Empty marks elapsed progress
/// toward closing; during Restart every light is Empty.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LightState {
    Filled,
    Empty,
}

// ──────────────────── Delivery Types ────────────────────

/// Opaque handle to a previously sent status message.
///
/// Returned by the messaging platform on send and required for edits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageHandle {
    /// Platform channel the message lives in.
    pub channel_id: String,
    /// Platform message identifier.
    pub message_id: String,
}

/// Result of attempting to edit an existing status message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// The message was updated in place.
    Edited(MessageHandle),
    /// The message no longer exists (e.g. deleted by a moderator);
    /// the caller must send a fresh one and adopt its handle.
    NotFound,
}
