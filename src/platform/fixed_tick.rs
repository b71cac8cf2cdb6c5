//! Backend for platforms with a fixed periodic tick only.
use embassy_time::{Duration, Instant};

use super::{Clock, PeriodicTimer, SchedulerHook, TimerBackend};
use crate::core::HandlerReturn;

/// Fixed tick source; every dispatch pass also gives the scheduler its tick.
pub struct FixedTick<P, S> {
    platform: P,
    scheduler: S,
}

impl<P, S> FixedTick<P, S> {
    pub const fn new(platform: P, scheduler: S) -> Self {
        Self {
            platform,
            scheduler,
        }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }
}

impl<P: Clock + PeriodicTimer, S: SchedulerHook> TimerBackend for FixedTick<P, S> {
    fn now(&self) -> Instant {
        self.platform.now()
    }

    fn start(&mut self, tick_period: Duration) {
        self.platform.set_periodic_timer(tick_period);
    }

    fn head_changed(&mut self, _earliest: Option<Instant>, _now: Instant) {
        // The tick keeps running whatever the queue holds.
    }

    fn dispatch_complete(&mut self, _earliest: Option<Instant>, _now: Instant) -> HandlerReturn {
        self.scheduler.timer_tick()
    }
}
