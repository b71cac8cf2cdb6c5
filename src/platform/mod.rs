//! Platform seams consumed by the timer subsystem, and the strategy that
//! decides how the hardware timer follows the queue.
//!
//! The platform supplies a monotonic clock and either a reprogrammable
//! one-shot timer ([`DynamicTimer`]) or a fixed periodic tick paired with the
//! scheduler's quantum hook ([`FixedTick`]). In both cases the platform's
//! interrupt handler calls
//! [`TimerSubsystem::on_interrupt`](crate::subsystem::TimerSubsystem::on_interrupt).
use embassy_time::{Duration, Instant};

use crate::core::HandlerReturn;

pub mod dynamic;
pub mod fixed_tick;

pub use dynamic::DynamicTimer;
pub use fixed_tick::FixedTick;

/// Monotonic time source, in ticks.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Hardware able to raise the timer interrupt at a fixed period.
pub trait PeriodicTimer {
    /// Raise the timer interrupt every `period` until reprogrammed.
    fn set_periodic_timer(&mut self, period: Duration);
}

/// Hardware able to raise a single timer interrupt after an arbitrary delay.
pub trait OneShotTimer: PeriodicTimer {
    /// Raise the timer interrupt once, `delay` from now. Replaces any pending shot.
    fn set_oneshot_timer(&mut self, delay: Duration);
    /// Disarm the hardware timer.
    fn stop_timer(&mut self);
}

/// Scheduler hook invoked once per dispatch pass on fixed-tick platforms
/// (quantum expiration and similar bookkeeping).
pub trait SchedulerHook {
    fn timer_tick(&mut self) -> HandlerReturn;
}

/// How the hardware timer is driven from the state of the queue.
pub trait TimerBackend {
    /// Current time.
    fn now(&self) -> Instant;

    /// Register the periodic tick source once at subsystem start.
    fn start(&mut self, tick_period: Duration);

    /// The earliest pending deadline changed outside of a dispatch pass
    /// (`None`: the queue is now empty).
    fn head_changed(&mut self, earliest: Option<Instant>, now: Instant);

    /// A dispatch pass drained every due timer; re-arm for `earliest`.
    fn dispatch_complete(&mut self, earliest: Option<Instant>, now: Instant) -> HandlerReturn;
}
