//! Consecutive-failure state machine for the control loop.

/// Link health as seen by the control loop
///
/// ```text
/// Connected --failure--> ErrorCounting(1) --failure--> ... --failure--> Disconnected
///     ^                         |
///     +--------success----------+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Last cycle succeeded
    #[default]
    Connected,
    /// `n` consecutive cycles failed, `1 <= n < threshold`
    ErrorCounting(u32),
    /// Terminal
    Disconnected,
}

impl SessionState {
    /// Consecutive failures counted so far
    #[must_use]
    pub fn failures(self) -> u32 {
        match self {
            SessionState::ErrorCounting(n) => n,
            _ => 0,
        }
    }

    #[must_use]
    pub fn is_disconnected(self) -> bool {
        self == SessionState::Disconnected
    }

    /// State after a successful cycle. Resets the counter.
    #[must_use]
    pub fn on_success(self) -> Self {
        match self {
            SessionState::Disconnected => SessionState::Disconnected,
            _ => SessionState::Connected,
        }
    }

    /// State after a failed cycle.
    ///
    /// Reaching `threshold` consecutive failures disconnects.
    #[must_use]
    pub fn on_failure(self, threshold: u32) -> Self {
        match self {
            SessionState::Disconnected => SessionState::Disconnected,
            _ => {
                let failures = self.failures().saturating_add(1);
                if failures >= threshold {
                    SessionState::Disconnected
                } else {
                    SessionState::ErrorCounting(failures)
                }
            }
        }
    }
}
