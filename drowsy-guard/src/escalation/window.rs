use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::Instant;

/// Sliding window of drowsy-event timestamps.
///
/// Keeps every recorded event whose age is at most `span`, oldest first.
/// Callers feed timestamps in non-decreasing order; the window does not
/// re-sort out-of-order input.
#[derive(Debug, Clone)]
pub struct EventWindow {
    events: VecDeque<Instant>,
    span: Duration,
}

impl EventWindow {
    pub fn new(span: Duration) -> Self {
        Self {
            events: VecDeque::new(),
            span,
        }
    }

    /// Append a drowsy event.
    pub fn record(&mut self, timestamp: Instant) {
        self.events.push_back(timestamp);
    }

    /// Drop every event older than `span` relative to `now`.
    pub fn prune(&mut self, now: Instant) {
        while let Some(&oldest) = self.events.front() {
            if now.saturating_duration_since(oldest) > self.span {
                self.events.pop_front();
            } else {
                break;
            }
        }
    }

    /// Number of events within the window ending at `now`.
    pub fn count(&mut self, now: Instant) -> usize {
        self.prune(now);
        self.events.len()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPAN: Duration = Duration::from_secs(60);

    fn at(base: Instant, secs: u64) -> Instant {
        base + Duration::from_secs(secs)
    }

    #[test]
    fn should_count_recorded_events() {
        let base = Instant::now();
        let mut window = EventWindow::new(SPAN);

        window.record(at(base, 0));
        window.record(at(base, 5));
        window.record(at(base, 10));

        assert_eq!(window.count(at(base, 10)), 3);
    }

    #[test]
    fn should_keep_event_exactly_at_window_edge() {
        let base = Instant::now();
        let mut window = EventWindow::new(SPAN);

        window.record(at(base, 0));

        assert_eq!(window.count(at(base, 60)), 1);
    }

    #[test]
    fn should_prune_event_older_than_window() {
        let base = Instant::now();
        let mut window = EventWindow::new(SPAN);

        window.record(at(base, 0));

        assert_eq!(window.count(at(base, 60) + Duration::from_millis(1)), 0);
    }

    #[test]
    fn should_prune_only_expired_prefix() {
        let base = Instant::now();
        let mut window = EventWindow::new(SPAN);

        for secs in [0, 20, 40, 70, 90] {
            window.record(at(base, secs));
        }

        // At t=100 the events at 0 and 20 are older than 60s.
        assert_eq!(window.count(at(base, 100)), 3);
        assert_eq!(window.events.front().copied(), Some(at(base, 40)));
    }

    #[test]
    fn should_match_brute_force_count_for_monotonic_sequence() {
        let base = Instant::now();
        let mut window = EventWindow::new(SPAN);
        let mut recorded = Vec::new();

        // Irregular but monotonic timestamps, checked after every step.
        let mut t = 0u64;
        for step in 0..200u64 {
            t += (step * 7919) % 13;
            let now = at(base, t);
            if step % 3 != 0 {
                window.record(now);
                recorded.push(now);
            }

            let expected = recorded
                .iter()
                .filter(|&&e| now.saturating_duration_since(e) <= SPAN)
                .count();
            assert_eq!(window.count(now), expected, "mismatch at t={t}");
        }
    }

    #[test]
    fn should_empty_on_clear() {
        let base = Instant::now();
        let mut window = EventWindow::new(SPAN);

        window.record(at(base, 0));
        window.record(at(base, 1));
        window.clear();

        assert_eq!(window.count(at(base, 1)), 0);
    }
}
