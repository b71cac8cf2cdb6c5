//! Callback contract for expiring timers.
//!
//! A queue stores one concrete callback type `C`. Kernels with several kinds
//! of timers usually make `C` an enum of handler kinds; [`FnCallback`] covers
//! the classic "function pointer + argument" shape.
use embassy_time::{Duration, Instant};

use crate::core::{HandlerReturn, TimerId};
use crate::error::TimerError;

/// Operations available to a callback while it runs at interrupt time.
///
/// The critical section is already held by the dispatcher, so these calls go
/// straight to the queue. The firing timer is unlinked before its callback
/// runs: re-arming or cancelling it from here is always allowed.
pub trait TimerControl<C> {
    /// Current time as seen by the platform clock.
    fn now(&self) -> Instant;

    /// Arm `timer` to fire once after `delay`.
    fn set_oneshot(&mut self, timer: TimerId, delay: Duration, callback: C)
        -> Result<(), TimerError>;

    /// Arm `timer` to fire every `period`.
    fn set_periodic(
        &mut self,
        timer: TimerId,
        period: Duration,
        callback: C,
    ) -> Result<(), TimerError>;

    /// Cancel `timer`. Cancelling an unarmed timer is a no-op.
    fn cancel(&mut self, timer: TimerId) -> Result<(), TimerError>;

    /// Whether `timer` is currently linked into the queue.
    fn is_armed(&self, timer: TimerId) -> Result<bool, TimerError>;
}

/// Handler invoked when a timer expires.
pub trait TimerCallback: Sized {
    /// Called from interrupt context with the firing time.
    ///
    /// Must not block. Returning [`HandlerReturn::Reschedule`] asks the
    /// interrupt return path for a scheduling decision.
    fn on_expire(
        &mut self,
        timers: &mut dyn TimerControl<Self>,
        timer: TimerId,
        now: Instant,
    ) -> HandlerReturn;
}

/// Function pointer paired with the argument it receives on every firing.
pub struct FnCallback<A> {
    func: fn(&mut dyn TimerControl<FnCallback<A>>, TimerId, Instant, &mut A) -> HandlerReturn,
    arg: A,
}

impl<A> FnCallback<A> {
    pub const fn new(
        func: fn(&mut dyn TimerControl<FnCallback<A>>, TimerId, Instant, &mut A) -> HandlerReturn,
        arg: A,
    ) -> Self {
        Self { func, arg }
    }

    #[inline]
    pub fn arg(&self) -> &A {
        &self.arg
    }
}

impl<A: Clone> Clone for FnCallback<A> {
    fn clone(&self) -> Self {
        Self {
            func: self.func,
            arg: self.arg.clone(),
        }
    }
}

impl<A> TimerCallback for FnCallback<A> {
    fn on_expire(
        &mut self,
        timers: &mut dyn TimerControl<Self>,
        timer: TimerId,
        now: Instant,
    ) -> HandlerReturn {
        (self.func)(timers, timer, now, &mut self.arg)
    }
}
