//! Confirm-then-commit bookkeeping shared by the file and directory probes.
//!
//! A candidate observation is only accepted once a second observation, taken
//! at least `delay` later, carries equal evidence. Unequal evidence restarts
//! the window with the newer observation.

use std::time::{Duration, Instant};

/// Result of feeding one observation into a [`PendingConfirmation`]
#[derive(Debug, PartialEq, Eq)]
pub enum Confirmation<T> {
    /// First sighting, the window just opened
    Started,
    /// The window is open but the delay has not elapsed
    Waiting,
    /// The delay elapsed and the evidence differed; the window reopened
    Restarted,
    /// Evidence confirmed; the caller commits it
    Confirmed(T),
}

#[derive(Debug, Clone)]
pub struct PendingConfirmation<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> PendingConfirmation<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn candidate(&self) -> Option<&T> {
        self.pending.as_ref().map(|(candidate, _)| candidate)
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }

    /// Feed an observation made at `now`.
    ///
    /// With a zero delay every observation is confirmed immediately.
    pub fn observe<F>(&mut self, evidence: T, now: Instant, same: F) -> Confirmation<T>
    where
        F: Fn(&T, &T) -> bool,
    {
        if self.delay.is_zero() {
            self.pending = None;
            return Confirmation::Confirmed(evidence);
        }

        let Some((candidate, since)) = self.pending.as_ref() else {
            self.pending = Some((evidence, now));
            return Confirmation::Started;
        };

        if now.saturating_duration_since(*since) < self.delay {
            return Confirmation::Waiting;
        }

        if same(candidate, &evidence) {
            self.pending = None;
            Confirmation::Confirmed(evidence)
        } else {
            self.pending = Some((evidence, now));
            Confirmation::Restarted
        }
    }
}
