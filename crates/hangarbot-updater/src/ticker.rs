//! The timer-driven update loop.
//!
//! Each tick derives a fresh immutable [`StatusMessage`] from
//! wall-clock time, records phase transitions, overwrites the snapshot
//! file, and delivers the rendered text. Ticks are serialized: the next
//! one fires only after the previous finished, so delivery latency can
//! never race a second tick into the same state.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use hangarbot_core::{render_status, CycleConfig, LightSymbols, StatusMessage};
use hangarbot_types::CyclePhase;

use crate::channel::StatusPublisher;
use crate::store::CycleStore;
use crate::{CycleStatus, StatusSnapshot};

/// Everything one tick decided: the rendered status and, when the
/// phase rolled over, the transition to record.
#[derive(Debug)]
pub struct TickReport {
    pub message: StatusMessage,
    pub transition: Option<CycleStatus>,
}

/// Pure tick computation.
///
/// A transition is recorded when the phase differs from the previous
/// tick's: entering Open logs `Online`, entering Closed logs `Offline`
/// (except on the very first tick, where a Closed start is the normal
/// case and not a transition). Entering Restart records nothing.
pub fn plan_tick(
    config: &CycleConfig,
    symbols: &LightSymbols,
    last_phase: Option<CyclePhase>,
    now: DateTime<Utc>,
) -> TickReport {
    let message = render_status(config, symbols, now);
    let phase = message.window.phase;

    let transition = if last_phase == Some(phase) {
        None
    } else {
        match phase {
            CyclePhase::Open => Some(CycleStatus::Online),
            CyclePhase::Closed if last_phase.is_some() => Some(CycleStatus::Offline),
            _ => None,
        }
    };

    TickReport {
        message,
        transition,
    }
}

/// Phase the previous run last observed, recovered from the snapshot
/// file so a restart mid-phase does not record its transition twice.
/// The snapshot never decides the phase itself; that is always derived
/// from the reference epoch and wall-clock time.
fn resume_phase(store: &CycleStore) -> Option<CyclePhase> {
    match store.read_snapshot() {
        Ok(Some(snapshot)) => Some(snapshot.phase),
        Ok(None) => None,
        Err(e) => {
            warn!("failed to read status snapshot: {e:#}");
            None
        }
    }
}

/// Run the update loop until `cancel` fires.
///
/// Starts from the persisted snapshot's phase, when one exists, so the
/// transition guard survives a restart. Persistence failures are logged
/// and never stop the loop. Delivery failures are logged and retried
/// with capped exponential backoff (1 s doubling to 30 s, reset on
/// success) on top of the regular tick cadence.
pub async fn run_update_loop(
    config: CycleConfig,
    symbols: LightSymbols,
    store: CycleStore,
    mut publisher: StatusPublisher,
    tick_interval: Duration,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(tick_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut last_phase = resume_phase(&store);
    if let Some(phase) = last_phase {
        info!(?phase, "resuming from persisted snapshot");
    }
    let mut backoff = Duration::from_secs(1);
    let max_backoff = Duration::from_secs(30);

    info!(
        tick_secs = tick_interval.as_secs(),
        "status update loop started"
    );

    loop {
        if cancel.is_cancelled() {
            break;
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {}
        }

        let now = Utc::now();
        let report = plan_tick(&config, &symbols, last_phase, now);
        let phase = report.message.window.phase;

        if let Some(status) = report.transition {
            match store.append_transition(status, now) {
                Ok(record) => info!(record_id = %record.id, ?status, "recorded phase transition"),
                Err(e) => warn!("failed to record phase transition: {e:#}"),
            }
        }
        last_phase = Some(phase);

        let snapshot = StatusSnapshot {
            phase,
            lights: report.message.lights.clone(),
            updated_at: now,
        };
        if let Err(e) = store.write_snapshot(&snapshot) {
            warn!("failed to write status snapshot: {e:#}");
        }

        match publisher.publish(&report.message.content).await {
            Ok(()) => {
                backoff = Duration::from_secs(1);
            }
            Err(e) => {
                warn!(
                    backoff_secs = backoff.as_secs(),
                    "status delivery failed: {e:#}"
                );

                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(backoff) => {}
                }

                backoff = (backoff * 2).min(max_backoff);
            }
        }
    }

    info!("status update loop stopped");
}
