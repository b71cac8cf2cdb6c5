//! Process-wide timer subsystem.
//!
//! Wraps [`Timers`] in an [`embassy_sync`] blocking mutex over
//! [`CriticalSectionRawMutex`], so every arm, cancel and dispatch runs with the
//! critical section held. The value is meant to live in a `static` (or a
//! `StaticCell`) initialised once at boot; nothing tears it down.
//!
//! Lifecycle errors are programming errors: this layer logs them and panics.
//! Use [`Timers`] directly when a `Result` is preferred.
use core::cell::{RefCell, RefMut};

use critical_section::CriticalSection;
use embassy_sync::blocking_mutex::{raw::CriticalSectionRawMutex, Mutex};
use embassy_time::{Duration, Instant};

use crate::callback::TimerCallback;
use crate::config::SubsystemConfig;
use crate::core::{HandlerReturn, TimerId, TimerStats};
use crate::error::TimerError;
use crate::lifecycle::Timers;
use crate::platform::TimerBackend;

/// Singleton owning the timer queue and the hardware backend.
pub struct TimerSubsystem<C, B, const N: usize> {
    timers: Mutex<CriticalSectionRawMutex, RefCell<Timers<C, B, N>>>,
    config: SubsystemConfig,
}

impl<C, B, const N: usize> TimerSubsystem<C, B, N> {
    pub const fn new(backend: B, config: SubsystemConfig) -> Self {
        Self {
            timers: Mutex::new(RefCell::new(Timers::new(backend))),
            config,
        }
    }

    pub fn config(&self) -> &SubsystemConfig {
        &self.config
    }
}

impl<C: TimerCallback, B: TimerBackend, const N: usize> TimerSubsystem<C, B, N> {
    /// One-time setup: registers the dispatcher's periodic tick source.
    pub fn init(&self) {
        let tick_period = self.config.tick_period;

        #[cfg(feature = "defmt")]
        defmt::info!("timer subsystem init, tick {} ticks", tick_period.as_ticks());

        self.with(|timers, _| timers.start(tick_period));
    }

    /// Claim a fresh timer. Panics when the pool is exhausted.
    pub fn initialize(&self) -> TimerId {
        self.with(|timers, _| timers.initialize().unwrap_or_else(|err| fatal(err)))
    }

    /// Reset an unarmed timer. Panics if the handle is invalid or the timer is armed.
    pub fn reinitialize(&self, timer: TimerId) {
        self.with(|timers, _| timers.reinitialize(timer).unwrap_or_else(|err| fatal(err)))
    }

    /// Fire `callback` once after `delay` (at least one tick).
    ///
    /// Panics if the timer is already armed or the handle is invalid.
    pub fn set_oneshot(&self, timer: TimerId, delay: Duration, callback: C) {
        self.with(|timers, _| {
            timers
                .set_oneshot(timer, delay, callback)
                .unwrap_or_else(|err| fatal(err))
        })
    }

    /// Fire `callback` every `period` (at least one tick) until cancelled.
    ///
    /// Panics if the timer is already armed or the handle is invalid.
    pub fn set_periodic(&self, timer: TimerId, period: Duration, callback: C) {
        self.with(|timers, _| {
            timers
                .set_periodic(timer, period, callback)
                .unwrap_or_else(|err| fatal(err))
        })
    }

    /// Cancel a timer; a no-op if it is not pending. Panics on an invalid handle.
    pub fn cancel(&self, timer: TimerId) {
        self.with(|timers, _| timers.cancel(timer).unwrap_or_else(|err| fatal(err)))
    }

    /// Return a cancelled or fired timer's storage to the pool.
    pub fn release(&self, timer: TimerId) {
        self.with(|timers, _| timers.release(timer).unwrap_or_else(|err| fatal(err)))
    }

    pub fn is_armed(&self, timer: TimerId) -> bool {
        self.with(|timers, _| timers.is_armed(timer).unwrap_or_else(|err| fatal(err)))
    }

    pub fn deadline(&self, timer: TimerId) -> Option<Instant> {
        self.with(|timers, _| timers.deadline(timer).unwrap_or_else(|err| fatal(err)))
    }

    pub fn stats(&self) -> TimerStats {
        self.with(|timers, _| timers.stats())
    }

    /// Timer interrupt entry point, called by the platform's handler with the
    /// interrupt's time stamp. Not for ordinary code.
    pub fn on_interrupt(&self, now: Instant) -> HandlerReturn {
        self.with(|timers, cs| {
            timers
                .dispatch(cs, now)
                .unwrap_or_else(|err| fatal(err))
        })
    }

    /// Run `f` on the timers with the critical section held.
    pub fn with<R>(&self, f: impl FnOnce(&mut Timers<C, B, N>, CriticalSection<'_>) -> R) -> R {
        critical_section::with(|cs| {
            let mut timers = self.borrow(cs);
            f(&mut *timers, cs)
        })
    }

    fn borrow<'cs>(&'cs self, cs: CriticalSection<'cs>) -> RefMut<'cs, Timers<C, B, N>> {
        self.timers
            .borrow(cs)
            .try_borrow_mut()
            .unwrap_or_else(|_| fatal(TimerError::Reentrant))
    }
}

/// Kernel panic on a lifecycle error.
#[cold]
fn fatal(err: TimerError) -> ! {
    #[cfg(feature = "defmt")]
    defmt::error!("timer subsystem fatal error: {}", err);

    panic!("timer subsystem fatal error: {}", err)
}
