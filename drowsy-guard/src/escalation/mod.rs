//! Escalation from isolated drowsy frames to a sustained alert.
//!
//! Brief misdetections earn at most a debounced single beep; a sustained run
//! of drowsy frames within the sliding window escalates to a continuous alert.

mod policy;
mod window;

pub use policy::{AlertActions, decide};
pub use window::EventWindow;

use tokio::time::Instant;

use crate::alert::AlertSnapshot;
use crate::config::EscalationConfig;
use crate::detection::DetectionFrame;

/// Outcome of evaluating one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Escalation {
    pub actions: AlertActions,
    pub window_count: usize,
}

/// Sliding window plus decision rules, owned by the driving cycle.
#[derive(Debug)]
pub struct EscalationPolicy {
    config: EscalationConfig,
    window: EventWindow,
}

impl EscalationPolicy {
    pub fn new(config: EscalationConfig) -> Self {
        let window = EventWindow::new(config.window);
        Self { config, window }
    }

    /// Record the frame into the window, then decide.
    pub fn evaluate(&mut self, frame: &DetectionFrame, snapshot: &AlertSnapshot) -> Escalation {
        if frame.drowsy {
            self.window.record(frame.timestamp);
        }
        let window_count = self.window.count(frame.timestamp);
        let actions = decide(
            &self.config,
            frame.drowsy,
            window_count,
            snapshot,
            frame.timestamp,
        );

        Escalation {
            actions,
            window_count,
        }
    }

    /// Drowsy events currently inside the window.
    pub fn window_count(&mut self, now: Instant) -> usize {
        self.window.count(now)
    }

    pub fn reset(&mut self) {
        self.window.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    /// Drive the policy the way the driver does, tracking the engine state
    /// the actions would produce.
    struct Harness {
        policy: EscalationPolicy,
        snapshot: AlertSnapshot,
        base: Instant,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                policy: EscalationPolicy::new(EscalationConfig::default()),
                snapshot: AlertSnapshot::default(),
                base: Instant::now(),
            }
        }

        fn frame_at(&mut self, offset: Duration, drowsy: bool) -> Escalation {
            let frame = DetectionFrame {
                timestamp: self.base + offset,
                drowsy,
            };
            let escalation = self.policy.evaluate(&frame, &self.snapshot);
            if escalation.actions.contains(AlertActions::SINGLE_BEEP) {
                self.snapshot.last_single_beep_at = Some(frame.timestamp);
            }
            if escalation.actions.contains(AlertActions::START_CONTINUOUS) {
                self.snapshot.continuous_active = true;
            }
            if escalation.actions.contains(AlertActions::STOP_CONTINUOUS) {
                self.snapshot.continuous_active = false;
            }
            escalation
        }
    }

    #[test]
    fn ten_second_spacing_escalates_on_sixth_frame() {
        let mut harness = Harness::new();

        for (i, secs) in [0u64, 10, 20, 30, 40, 50].into_iter().enumerate() {
            let escalation = harness.frame_at(Duration::from_secs(secs), true);

            assert!(
                escalation.actions.contains(AlertActions::SINGLE_BEEP),
                "expected beep at t={secs}"
            );
            assert_eq!(escalation.window_count, i + 1);
            assert_eq!(
                escalation.actions.contains(AlertActions::START_CONTINUOUS),
                secs == 50,
                "continuous alert at t={secs}"
            );
        }
    }

    #[test]
    fn rapid_frames_escalate_on_sixth_not_earlier() {
        let mut harness = Harness::new();

        for i in 0..6u64 {
            let escalation = harness.frame_at(Duration::from_millis(i * 100), true);
            assert_eq!(
                escalation.actions.contains(AlertActions::START_CONTINUOUS),
                i == 5
            );
        }
    }

    #[test]
    fn at_most_one_beep_per_debounce_interval() {
        let mut harness = Harness::new();
        let mut beeps = Vec::new();

        for i in 0..30u64 {
            let offset = Duration::from_millis(i * 100);
            if harness
                .frame_at(offset, true)
                .actions
                .contains(AlertActions::SINGLE_BEEP)
            {
                beeps.push(offset);
            }
        }

        assert_eq!(
            beeps,
            vec![
                Duration::ZERO,
                Duration::from_secs(1),
                Duration::from_secs(2)
            ]
        );
    }

    #[test]
    fn expired_events_do_not_escalate() {
        let mut harness = Harness::new();

        for secs in 0..5u64 {
            harness.frame_at(Duration::from_secs(secs), true);
        }
        let escalation = harness.frame_at(Duration::from_secs(70), true);

        assert_eq!(escalation.window_count, 1);
        assert!(!escalation.actions.contains(AlertActions::START_CONTINUOUS));
    }

    #[test]
    fn clear_frame_stops_active_continuous_alert() {
        let mut harness = Harness::new();

        for i in 0..6u64 {
            harness.frame_at(Duration::from_secs(i), true);
        }
        assert!(harness.snapshot.continuous_active);

        let escalation = harness.frame_at(Duration::from_secs(6), false);

        assert_eq!(escalation.actions, AlertActions::STOP_CONTINUOUS);
        assert_eq!(escalation.window_count, 6);
    }

    #[test]
    fn clear_frames_still_prune_window() {
        let mut harness = Harness::new();

        harness.frame_at(Duration::ZERO, true);
        let escalation = harness.frame_at(Duration::from_secs(61), false);

        assert_eq!(escalation.window_count, 0);
    }

    #[test]
    fn reset_empties_window() {
        let mut harness = Harness::new();

        for i in 0..4u64 {
            harness.frame_at(Duration::from_secs(i), true);
        }
        harness.policy.reset();

        assert_eq!(
            harness
                .policy
                .window_count(harness.base + Duration::from_secs(4)),
            0
        );
    }
}
