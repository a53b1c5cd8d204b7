//! Time base translation
//!
//! The scheduler works in monotonic milliseconds. Reports are stamped with
//! a print (session) time supplied by the host.

/// Translate monotonic time into print time
pub trait TimeBase {
    /// Convert a monotonic timestamp (ms) into print time (ms)
    fn print_time_ms(&self, monotonic_ms: u64) -> u64;
}

/// Print time measured from the start of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SessionClock {
    /// Monotonic time at which the session started
    pub session_start_ms: u64,
}

impl SessionClock {
    /// Create a clock for a session starting at the given monotonic time
    pub const fn starting_at(session_start_ms: u64) -> Self {
        Self { session_start_ms }
    }
}

impl TimeBase for SessionClock {
    fn print_time_ms(&self, monotonic_ms: u64) -> u64 {
        monotonic_ms.saturating_sub(self.session_start_ms)
    }
}
