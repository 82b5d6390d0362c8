//! hangarbot-updater: the periodic status update loop.
//!
//! Owns the delivery seam ([`channel::StatusChannel`]), the edit-or-send
//! publisher, the on-disk cycle history and snapshot, the tick loop
//! itself, and the liveness HTTP endpoint.

pub mod channel;
pub mod health;
pub mod store;
pub mod ticker;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hangarbot_types::{CyclePhase, LightState};

/// Facility status as written to the cycle history file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CycleStatus {
    /// The hangar became reachable (entered the Open phase).
    Online,
    /// The hangar shut again (entered the Closed phase).
    Offline,
}

/// One persisted phase transition.
///
/// An audit trail for crash diagnosis only. Phase is always re-derived
/// from the reference epoch and wall-clock time; this file is never
/// read back as an authority on the schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleRecord {
    /// Unique record ID.
    pub id: String,
    /// Status the facility transitioned to.
    pub status: CycleStatus,
    /// When the transition was observed (ISO-8601).
    pub timestamp: DateTime<Utc>,
}

/// Last computed state, overwritten on every tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub phase: CyclePhase,
    pub lights: Vec<LightState>,
    pub updated_at: DateTime<Utc>,
}
