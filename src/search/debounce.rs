use std::time::{Duration, Instant};

/// Cancellable one-shot timer holding the latest scheduled value.
///
/// Driven by the caller's clock: nothing fires until [`Debouncer::fire`] is
/// called with an instant past the deadline.
#[derive(Debug)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    /// Replace any pending value and restart the timer from `now`.
    pub fn schedule(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.window));
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    #[cfg(test)]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    #[cfg(test)]
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, at)| *at)
    }

    /// Take the pending value once its deadline has passed.
    pub fn fire(&mut self, now: Instant) -> Option<T> {
        let due = matches!(&self.pending, Some((_, at)) if now >= *at);
        if due {
            self.pending.take().map(|(v, _)| v)
        } else {
            None
        }
    }
}
