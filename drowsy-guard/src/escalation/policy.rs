use tokio::time::Instant;

use crate::alert::AlertSnapshot;
use crate::config::EscalationConfig;

bitflags::bitflags! {
    /// Alert actions decided for one detection cycle.
    ///
    /// The two alert tiers are independent: a single cycle may both beep
    /// and start the continuous alert.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AlertActions: u8 {
        /// Fire one fire-and-forget beep.
        const SINGLE_BEEP = 1 << 0;
        /// Launch the continuous alert task.
        const START_CONTINUOUS = 1 << 1;
        /// Drowsiness cleared while a continuous alert is running.
        const STOP_CONTINUOUS = 1 << 2;
    }
}

impl AlertActions {
    /// Lowercase action names, for logs and API responses.
    pub fn names(&self) -> Vec<String> {
        self.iter_names()
            .map(|(name, _)| name.to_ascii_lowercase())
            .collect()
    }
}

/// Decide the alert actions for one frame.
///
/// `window_count` must already include the current frame when it is drowsy.
/// The function is pure: applying the actions, including recording the
/// beep time, is the caller's job.
///
/// | drowsy | condition                                   | actions            |
/// |--------|---------------------------------------------|--------------------|
/// | false  | continuous alert active                     | `STOP_CONTINUOUS`  |
/// | false  | otherwise                                   | none               |
/// | true   | no beep yet, or last beep >= debounce ago   | `SINGLE_BEEP`      |
/// | true   | count >= threshold and no continuous alert  | `START_CONTINUOUS` |
pub fn decide(
    config: &EscalationConfig,
    drowsy: bool,
    window_count: usize,
    snapshot: &AlertSnapshot,
    now: Instant,
) -> AlertActions {
    let mut actions = AlertActions::empty();

    if !drowsy {
        if snapshot.continuous_active {
            actions |= AlertActions::STOP_CONTINUOUS;
        }
        return actions;
    }

    let debounced = snapshot
        .last_single_beep_at
        .map(|last| now.saturating_duration_since(last) >= config.debounce)
        .unwrap_or(true);
    if debounced {
        actions |= AlertActions::SINGLE_BEEP;
    }

    if window_count >= config.escalation_threshold && !snapshot.continuous_active {
        actions |= AlertActions::START_CONTINUOUS;
    }

    actions
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use test_case::test_case;

    use super::*;

    fn snapshot(last_beep_ago: Option<u64>, active: bool, now: Instant) -> AlertSnapshot {
        AlertSnapshot {
            last_single_beep_at: last_beep_ago.map(|ms| now - Duration::from_millis(ms)),
            continuous_active: active,
        }
    }

    #[test_case(false, 0, None, false => AlertActions::empty(); "clear_and_idle")]
    #[test_case(false, 9, Some(10), true => AlertActions::STOP_CONTINUOUS; "clear_stops_active")]
    #[test_case(true, 1, None, false => AlertActions::SINGLE_BEEP; "first_beep")]
    #[test_case(true, 2, Some(999), false => AlertActions::empty(); "inside_debounce")]
    #[test_case(true, 2, Some(1000), false => AlertActions::SINGLE_BEEP; "debounce_boundary")]
    #[test_case(true, 5, Some(5000), false => AlertActions::SINGLE_BEEP; "below_threshold")]
    #[test_case(true, 6, Some(5000), false => AlertActions::SINGLE_BEEP | AlertActions::START_CONTINUOUS; "threshold_reached")]
    #[test_case(true, 6, Some(500), false => AlertActions::START_CONTINUOUS; "escalate_without_beep")]
    #[test_case(true, 8, Some(5000), true => AlertActions::SINGLE_BEEP; "already_continuous")]
    fn decision_rules(
        drowsy: bool,
        count: usize,
        last_beep_ago_ms: Option<u64>,
        active: bool,
    ) -> AlertActions {
        let now = Instant::now() + Duration::from_secs(10);
        let config = EscalationConfig::default();
        decide(
            &config,
            drowsy,
            count,
            &snapshot(last_beep_ago_ms, active, now),
            now,
        )
    }

    #[test]
    fn names_are_lowercase() {
        let actions = AlertActions::SINGLE_BEEP | AlertActions::START_CONTINUOUS;
        assert_eq!(actions.names(), vec!["single_beep", "start_continuous"]);
    }
}
