//! Run-time configuration for [`TimerSubsystem`](crate::subsystem::TimerSubsystem).
//!
//! The remaining knobs are static: pool capacity is the const generic `N`,
//! hardware capability is the backend type, and logging is the `defmt` feature.
use embassy_time::Duration;

use crate::core::{DEFAULT_TICK_PERIOD, MIN_DELAY};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SubsystemConfig {
    /// Period registered with the platform tick source at init.
    pub tick_period: Duration,
}

impl SubsystemConfig {
    pub const fn new() -> Self {
        Self {
            tick_period: DEFAULT_TICK_PERIOD,
        }
    }

    /// Override the tick period; zero is coerced to one tick.
    pub fn with_tick_period(mut self, tick_period: Duration) -> Self {
        self.tick_period = tick_period.max(MIN_DELAY);
        self
    }
}

impl Default for SubsystemConfig {
    fn default() -> Self {
        Self::new()
    }
}
