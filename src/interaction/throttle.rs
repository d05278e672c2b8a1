use std::time::Duration;

use tracing::trace;

/// Delay applied to brush-driven filter updates and deferred group redraws.
pub const EVENT_DELAY: Duration = Duration::from_millis(40);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Timer {
    due: Duration,
    token: u64,
}

/// Single-slot, last-write-wins debounce.
///
/// Every delayed `trigger` replaces the one pending action. Timers are kept
/// for every scheduled action, but when a timer fires it only yields the
/// action if that action is still the current one, so a burst of triggers
/// collapses to at most one execution. Time is an explicit `Duration` since
/// an arbitrary origin; the owner drives it through [`EventThrottle::poll`].
#[derive(Debug)]
pub struct EventThrottle<A> {
    current: Option<(u64, A)>,
    timers: Vec<Timer>,
    next_token: u64,
}

impl<A> Default for EventThrottle<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> EventThrottle<A> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: None,
            timers: Vec::new(),
            next_token: 0,
        }
    }

    /// Schedules `action` to run `delay` after `now`.
    ///
    /// A zero delay hands the action straight back so the caller runs it
    /// synchronously; the pending slot is left untouched in that case.
    #[must_use = "a returned action must be executed by the caller"]
    pub fn trigger(&mut self, action: A, delay: Duration, now: Duration) -> Option<A> {
        if delay.is_zero() {
            return Some(action);
        }

        let token = self.next_token;
        self.next_token += 1;
        if self.current.is_some() {
            trace!(token, "superseding pending throttled action");
        }
        self.current = Some((token, action));
        self.timers.push(Timer {
            due: now + delay,
            token,
        });
        trace!(token, delay_ms = delay.as_millis() as u64, "scheduled throttled action");
        None
    }

    /// Fires timers due at `now` in deadline order and returns the pending
    /// action if one of them still owns the slot.
    pub fn poll(&mut self, now: Duration) -> Option<A> {
        while let Some(index) = self.earliest_due(now) {
            let timer = self.timers.remove(index);
            if self
                .current
                .as_ref()
                .is_some_and(|(token, _)| *token == timer.token)
            {
                return self.current.take().map(|(_, action)| action);
            }
            trace!(token = timer.token, "dropping superseded throttled action");
        }
        None
    }

    fn earliest_due(&self, now: Duration) -> Option<usize> {
        self.timers
            .iter()
            .enumerate()
            .filter(|(_, timer)| timer.due <= now)
            .min_by_key(|(_, timer)| (timer.due, timer.token))
            .map(|(index, _)| index)
    }

    /// Deadline of the earliest outstanding timer.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.iter().map(|timer| timer.due).min()
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.current.is_some()
    }

    #[must_use]
    pub fn outstanding_timers(&self) -> usize {
        self.timers.len()
    }
}
