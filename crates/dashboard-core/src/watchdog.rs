//! Inactivity watchdog state machine

use dashboard_api::SessionTier;
use dashboard_util::MonotonicInstant;
use std::time::Duration;

/// Watchdog state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchdogState {
    /// No session, or the session is durable
    Disarmed,
    /// Counting down an ephemeral session
    Armed { deadline: MonotonicInstant },
}

/// Ends ephemeral sessions after a period without activity.
///
/// Driven entirely by the caller's monotonic clock; it never ends a session
/// itself, `tick` only reports that the deadline passed.
#[derive(Debug)]
pub struct InactivityWatchdog {
    timeout: Duration,
    state: WatchdogState,
}

impl InactivityWatchdog {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            state: WatchdogState::Disarmed,
        }
    }

    pub fn state(&self) -> WatchdogState {
        self.state
    }

    pub fn is_armed(&self) -> bool {
        matches!(self.state, WatchdogState::Armed { .. })
    }

    /// Follow the session's tier: arm for ephemeral, disarm otherwise.
    /// An already armed watchdog keeps its deadline.
    pub fn sync(&mut self, tier: Option<SessionTier>, now_mono: MonotonicInstant) {
        match tier {
            Some(SessionTier::Ephemeral) => {
                if !self.is_armed() {
                    self.state = WatchdogState::Armed {
                        deadline: now_mono + self.timeout,
                    };
                }
            }
            Some(SessionTier::Durable) | None => self.disarm(),
        }
    }

    /// Reset the countdown to the full timeout. Ignored while disarmed.
    pub fn on_activity(&mut self, now_mono: MonotonicInstant) {
        if self.is_armed() {
            self.state = WatchdogState::Armed {
                deadline: now_mono + self.timeout,
            };
        }
    }

    pub fn disarm(&mut self) {
        self.state = WatchdogState::Disarmed;
    }

    /// Time left before expiry, `None` while disarmed
    pub fn remaining(&self, now_mono: MonotonicInstant) -> Option<Duration> {
        match self.state {
            WatchdogState::Armed { deadline } => Some(deadline.saturating_duration_until(now_mono)),
            WatchdogState::Disarmed => None,
        }
    }

    /// Returns `true` exactly once when the deadline has passed, disarming
    /// the watchdog.
    pub fn tick(&mut self, now_mono: MonotonicInstant) -> bool {
        match self.state {
            WatchdogState::Armed { deadline } if now_mono >= deadline => {
                self.state = WatchdogState::Disarmed;
                true
            }
            _ => false,
        }
    }
}
