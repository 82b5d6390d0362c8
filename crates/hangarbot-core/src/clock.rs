//! Phase and light-fill arithmetic.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use hangarbot_types::{CyclePhase, LightState};

/// Rejected cycle parameters.
///
/// Raised by [`CycleConfig::new`] so that a bad configuration fails at
/// load time instead of surfacing as a division error mid-loop.
#[derive(Debug, Error)]
pub enum CycleConfigError {
    #[error("{phase} phase duration must be positive")]
    NonPositiveDuration { phase: &'static str },
    #[error("light count must be at least 1")]
    ZeroLightCount,
}

/// Which end of the row goes dark first while the hangar is open.
///
/// The row drains during the Open phase; the direction is cosmetic and
/// therefore fixed explicitly here rather than inferred.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DrainDirection {
    /// Lights go dark starting at the last index.
    #[default]
    FromEnd,
    /// Lights go dark starting at index 0.
    FromStart,
}

/// The absolute bounds of the phase containing a queried instant.
///
/// Recomputed fresh on every query; never stored as an authority on
/// time. For any `now` used to produce it, `start <= now < end` and
/// `end - start` equals the configured duration of `phase` exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseWindow {
    pub phase: CyclePhase,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl PhaseWindow {
    /// Time left until the phase ends, clamped to zero.
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        (self.end - now).max(Duration::zero())
    }
}

/// Immutable cycle parameters: reference epoch, phase durations, and
/// the indicator row shape.
///
/// The cycle repeats Closed → Open → Restart from `reference_epoch`
/// indefinitely, in both directions: instants before the epoch resolve
/// to the same schedule, not to an error.
#[derive(Debug, Clone)]
pub struct CycleConfig {
    reference_epoch: DateTime<Utc>,
    closed: Duration,
    open: Duration,
    restart: Duration,
    light_count: usize,
    drain: DrainDirection,
}

impl CycleConfig {
    /// Validate and build a cycle configuration.
    pub fn new(
        reference_epoch: DateTime<Utc>,
        closed: Duration,
        open: Duration,
        restart: Duration,
        light_count: usize,
        drain: DrainDirection,
    ) -> Result<Self, CycleConfigError> {
        for (phase, duration) in [("closed", closed), ("open", open), ("restart", restart)] {
            if duration <= Duration::zero() {
                return Err(CycleConfigError::NonPositiveDuration { phase });
            }
        }
        if light_count == 0 {
            return Err(CycleConfigError::ZeroLightCount);
        }
        Ok(Self {
            reference_epoch,
            closed,
            open,
            restart,
            light_count,
            drain,
        })
    }

    /// Number of indicator lights in the row.
    pub fn light_count(&self) -> usize {
        self.light_count
    }

    /// Duration of one full Closed → Open → Restart traversal.
    pub fn total_cycle(&self) -> Duration {
        self.closed + self.open + self.restart
    }

    /// Configured duration of a single phase.
    pub fn phase_duration(&self, phase: CyclePhase) -> Duration {
        match phase {
            CyclePhase::Closed => self.closed,
            CyclePhase::Open => self.open,
            CyclePhase::Restart => self.restart,
        }
    }

    /// Locate the phase window containing `now`.
    ///
    /// Boundary instants belong to the phase they begin: at exactly
    /// `closed` milliseconds past the cycle start the window is Open
    /// with its full duration remaining.
    pub fn current_window(&self, now: DateTime<Utc>) -> PhaseWindow {
        let total_ms = self.total_cycle().num_milliseconds();
        let elapsed_ms = (now - self.reference_epoch).num_milliseconds();
        // rem_euclid keeps the position non-negative for instants
        // before the reference epoch.
        let position_ms = elapsed_ms.rem_euclid(total_ms);

        let closed_ms = self.closed.num_milliseconds();
        let open_ms = self.open.num_milliseconds();

        let (phase, offset_ms) = if position_ms < closed_ms {
            (CyclePhase::Closed, 0)
        } else if position_ms < closed_ms + open_ms {
            (CyclePhase::Open, closed_ms)
        } else {
            (CyclePhase::Restart, closed_ms + open_ms)
        };

        let cycle_start = now - Duration::milliseconds(position_ms);
        let start = cycle_start + Duration::milliseconds(offset_ms);
        PhaseWindow {
            phase,
            start,
            end: start + self.phase_duration(phase),
        }
    }

    /// Count of lights that have advanced within the window, clamped
    /// to `[0, light_count]`.
    pub fn fill_index(&self, now: DateTime<Utc>, window: &PhaseWindow) -> usize {
        let duration_ms = self.phase_duration(window.phase).num_milliseconds();
        let interval_ms = duration_ms / self.light_count as i64;
        if interval_ms == 0 {
            // Phase shorter than one light per interval: resolve as
            // fully advanced rather than dividing by zero.
            return self.light_count;
        }
        let elapsed_ms = (now - window.start).num_milliseconds().clamp(0, duration_ms);
        ((elapsed_ms / interval_ms) as usize).min(self.light_count)
    }

    /// Render the indicator row for `now` within `window`.
    ///
    /// Closed fills lights in index order as opening approaches; Open
    /// starts fully lit and drains per [`DrainDirection`]; Restart is
    /// unconditionally dark.
    pub fn light_row(&self, now: DateTime<Utc>, window: &PhaseWindow) -> Vec<LightState> {
        let n = self.light_count;
        match window.phase {
            CyclePhase::Closed => {
                let filled = self.fill_index(now, window);
                (0..n)
                    .map(|i| {
                        if i < filled {
                            LightState::Filled
                        } else {
                            LightState::Empty
                        }
                    })
                    .collect()
            }
            CyclePhase::Open => {
                let drained = self.fill_index(now, window);
                (0..n)
                    .map(|i| {
                        let dark = match self.drain {
                            DrainDirection::FromEnd => i >= n - drained,
                            DrainDirection::FromStart => i < drained,
                        };
                        if dark {
                            LightState::Empty
                        } else {
                            LightState::Filled
                        }
                    })
                    .collect()
            }
            CyclePhase::Restart => vec![LightState::Empty; n],
        }
    }
}
