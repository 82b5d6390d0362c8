//! Status message rendering.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use hangarbot_types::{CyclePhase, LightState};

use crate::clock::{CycleConfig, PhaseWindow};

/// Emoji set used to draw the light row and the status dot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LightSymbols {
    /// Elapsed-progress light while the hangar is closed.
    pub closed_filled: String,
    /// Pending light while the hangar is closed.
    pub closed_empty: String,
    /// Still-lit light while the hangar is open.
    pub open_filled: String,
    /// Drained light while the hangar is open.
    pub open_empty: String,
    /// Every light during restart.
    pub restart: String,
    /// Status dot per phase.
    pub dot_closed: String,
    pub dot_open: String,
    pub dot_restart: String,
}

impl Default for LightSymbols {
    fn default() -> Self {
        Self {
            closed_filled: "🟩".into(),
            closed_empty: "🟥".into(),
            open_filled: "🟩".into(),
            open_empty: "⬛".into(),
            restart: "⬛".into(),
            dot_closed: "🔴".into(),
            dot_open: "🟢".into(),
            dot_restart: "🟡".into(),
        }
    }
}

impl LightSymbols {
    fn light(&self, phase: CyclePhase, state: LightState) -> &str {
        match (phase, state) {
            (CyclePhase::Closed, LightState::Filled) => &self.closed_filled,
            (CyclePhase::Closed, LightState::Empty) => &self.closed_empty,
            (CyclePhase::Open, LightState::Filled) => &self.open_filled,
            (CyclePhase::Open, LightState::Empty) => &self.open_empty,
            (CyclePhase::Restart, _) => &self.restart,
        }
    }

    fn dot(&self, phase: CyclePhase) -> &str {
        match phase {
            CyclePhase::Closed => &self.dot_closed,
            CyclePhase::Open => &self.dot_open,
            CyclePhase::Restart => &self.dot_restart,
        }
    }
}

/// One fully rendered status update: the window it was computed from,
/// the light row, and the message body to deliver.
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub window: PhaseWindow,
    pub lights: Vec<LightState>,
    pub content: String,
}

/// Countdown text for the remaining time in a phase.
///
/// Closed uses hour granularity, the shorter phases minute:second.
/// Negative input clamps to zero; the result never implies negative
/// time.
pub fn format_remaining(remaining: Duration, phase: CyclePhase) -> String {
    let total_seconds = remaining.num_seconds().max(0);
    match phase {
        CyclePhase::Closed => {
            let hours = total_seconds / 3600;
            let minutes = (total_seconds % 3600) / 60;
            format!("{hours}h {minutes:02}m")
        }
        CyclePhase::Open | CyclePhase::Restart => {
            let minutes = total_seconds / 60;
            let seconds = total_seconds % 60;
            format!("{minutes}m {seconds:02}s")
        }
    }
}

fn countdown_label(phase: CyclePhase) -> &'static str {
    match phase {
        CyclePhase::Closed => "Opening in:",
        CyclePhase::Open => "Close in:",
        CyclePhase::Restart => "Restart in:",
    }
}

/// Compute the full status message for `now`.
pub fn render_status(
    config: &CycleConfig,
    symbols: &LightSymbols,
    now: DateTime<Utc>,
) -> StatusMessage {
    let window = config.current_window(now);
    let lights = config.light_row(now, &window);

    let row = lights
        .iter()
        .map(|state| symbols.light(window.phase, *state))
        .collect::<Vec<_>>()
        .join(" ");
    let countdown = format_remaining(window.remaining(now), window.phase);
    let content = format!(
        "{row}\n{dot} {label}\n{verb} {countdown}",
        dot = symbols.dot(window.phase),
        label = window.phase.label(),
        verb = countdown_label(window.phase),
    );

    StatusMessage {
        window,
        lights,
        content,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::DrainDirection;
    use chrono::TimeZone;

    fn epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn config() -> CycleConfig {
        CycleConfig::new(
            epoch(),
            Duration::hours(2),
            Duration::hours(1),
            Duration::minutes(5),
            5,
            DrainDirection::FromEnd,
        )
        .unwrap()
    }

    #[test]
    fn test_format_remaining_closed_uses_hours() {
        let text = format_remaining(Duration::minutes(119), CyclePhase::Closed);
        assert_eq!(text, "1h 59m");
    }

    #[test]
    fn test_format_remaining_closed_under_an_hour() {
        let text = format_remaining(Duration::minutes(7), CyclePhase::Closed);
        assert_eq!(text, "0h 07m");
    }

    #[test]
    fn test_format_remaining_open_uses_minutes() {
        let text = format_remaining(Duration::seconds(803), CyclePhase::Open);
        assert_eq!(text, "13m 23s");
    }

    #[test]
    fn test_format_remaining_zero() {
        assert_eq!(format_remaining(Duration::zero(), CyclePhase::Open), "0m 00s");
        assert_eq!(
            format_remaining(Duration::zero(), CyclePhase::Closed),
            "0h 00m"
        );
    }

    #[test]
    fn test_format_remaining_negative_clamps() {
        let text = format_remaining(Duration::seconds(-90), CyclePhase::Restart);
        assert_eq!(text, "0m 00s");
    }

    #[test]
    fn test_render_closed_message() {
        let msg = render_status(&config(), &LightSymbols::default(), epoch());
        let lines: Vec<&str> = msg.content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "🟥 🟥 🟥 🟥 🟥");
        assert_eq!(lines[1], "🔴 HANGAR CLOSED");
        assert_eq!(lines[2], "Opening in: 2h 00m");
    }

    #[test]
    fn test_render_open_message() {
        let now = epoch() + Duration::hours(2) + Duration::minutes(25);
        let msg = render_status(&config(), &LightSymbols::default(), now);
        let lines: Vec<&str> = msg.content.lines().collect();
        assert_eq!(lines[0], "🟩 🟩 🟩 ⬛ ⬛");
        assert_eq!(lines[1], "🟢 HANGAR OPEN");
        assert_eq!(lines[2], "Close in: 35m 00s");
    }

    #[test]
    fn test_render_restart_message() {
        let now = epoch() + Duration::hours(3) + Duration::minutes(2);
        let msg = render_status(&config(), &LightSymbols::default(), now);
        let lines: Vec<&str> = msg.content.lines().collect();
        assert_eq!(lines[0], "⬛ ⬛ ⬛ ⬛ ⬛");
        assert_eq!(lines[1], "🟡 RESTART");
        assert_eq!(lines[2], "Restart in: 3m 00s");
    }

    #[test]
    fn test_symbols_overridable() {
        let symbols: LightSymbols = serde_json::from_str(
            r#"{ "closed_empty": "x", "dot_closed": "!" }"#,
        )
        .unwrap();
        let msg = render_status(&config(), &symbols, epoch());
        assert!(msg.content.starts_with("x x x x x\n! HANGAR CLOSED"));
    }
}
