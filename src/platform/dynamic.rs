//! Backend for platforms whose timer can be reprogrammed to any deadline.
use embassy_time::{Duration, Instant};

use super::{Clock, OneShotTimer, TimerBackend};
use crate::core::HandlerReturn;

/// Keeps a one-shot hardware timer aimed at the earliest pending deadline.
pub struct DynamicTimer<P> {
    platform: P,
}

impl<P> DynamicTimer<P> {
    pub const fn new(platform: P) -> Self {
        Self { platform }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    pub fn into_inner(self) -> P {
        self.platform
    }
}

impl<P: Clock + OneShotTimer> TimerBackend for DynamicTimer<P> {
    fn now(&self) -> Instant {
        self.platform.now()
    }

    fn start(&mut self, tick_period: Duration) {
        // Serves as the tick source until the first reprogram.
        self.platform.set_periodic_timer(tick_period);
    }

    fn head_changed(&mut self, earliest: Option<Instant>, now: Instant) {
        match earliest {
            Some(deadline) => {
                // A cancel can expose a deadline that is already overdue.
                let delay = deadline
                    .checked_duration_since(now)
                    .unwrap_or(Duration::from_ticks(0));

                #[cfg(feature = "defmt")]
                defmt::trace!("reprogramming hw timer for {} ticks", delay.as_ticks());

                self.platform.set_oneshot_timer(delay);
            }
            None => {
                #[cfg(feature = "defmt")]
                defmt::trace!("queue empty, stopping hw timer");

                self.platform.stop_timer();
            }
        }
    }

    fn dispatch_complete(&mut self, earliest: Option<Instant>, now: Instant) -> HandlerReturn {
        // Empty queue: stay disarmed until the next set re-arms the hardware.
        if let Some(deadline) = earliest {
            debug_assert!(deadline > now, "due timer left in queue after drain");
            let delay = deadline
                .checked_duration_since(now)
                .unwrap_or(Duration::from_ticks(0));

            #[cfg(feature = "defmt")]
            defmt::trace!("next timer event in {} ticks", delay.as_ticks());

            self.platform.set_oneshot_timer(delay);
        }
        HandlerReturn::NoReschedule
    }
}
