//! Timer lifecycle: initialize, arm (one-shot or periodic), cancel, release.
//!
//! [`Timers`] owns the queue and the hardware backend. It performs no locking
//! itself; [`TimerSubsystem`](crate::subsystem::TimerSubsystem) wraps it in
//! the critical section, and callbacks reach it through [`TimerControl`] while
//! the dispatcher already holds that section.
use embassy_time::{Duration, Instant};

use crate::callback::{TimerCallback, TimerControl};
use crate::core::{TimerId, TimerStats, MIN_DELAY};
use crate::error::TimerError;
use crate::platform::TimerBackend;
use crate::queue::{Pending, TimerQueue};


/// Timer queue bound to a hardware backend.
pub struct Timers<C, B, const N: usize> {
    pub(crate) queue: TimerQueue<C, N>,
    pub(crate) backend: B,
    pub(crate) stats: TimerStats,
}

impl<C, B, const N: usize> Timers<C, B, N> {
    pub const fn new(backend: B) -> Self {
        Self {
            queue: TimerQueue::new(),
            backend,
            stats: TimerStats {
                interrupts: 0,
                fired: 0,
            },
        }
    }

    #[inline]
    pub fn queue(&self) -> &TimerQueue<C, N> {
        &self.queue
    }

    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[inline]
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    #[inline]
    pub fn stats(&self) -> TimerStats {
        self.stats
    }

    /// Number of pending timers.
    #[inline]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Pending timers with their deadlines, earliest first.
    pub fn pending(&self) -> Pending<'_, C, N> {
        self.queue.iter()
    }

    /// Claim a fresh, unarmed timer.
    pub fn initialize(&mut self) -> Result<TimerId, TimerError> {
        self.queue.allocate()
    }

    /// Reset an unarmed timer to its initial state.
    pub fn reinitialize(&mut self, timer: TimerId) -> Result<(), TimerError> {
        let slot = self.queue.get_mut(timer)?;
        if slot.is_linked() {
            return Err(TimerError::StillArmed { timer });
        }
        slot.clear();
        Ok(())
    }

    /// Give the timer's storage back. It must be cancelled (or have fired) first.
    pub fn release(&mut self, timer: TimerId) -> Result<(), TimerError> {
        self.queue.release(timer)
    }

    pub fn is_armed(&self, timer: TimerId) -> Result<bool, TimerError> {
        Ok(self.queue.get(timer)?.is_linked())
    }

    /// Deadline of a pending timer, `None` when unarmed.
    pub fn deadline(&self, timer: TimerId) -> Result<Option<Instant>, TimerError> {
        let slot = self.queue.get(timer)?;
        Ok(slot.is_linked().then_some(slot.scheduled_time()))
    }

    /// Repeat interval; zero for one-shot, cancelled or unarmed timers.
    pub fn period(&self, timer: TimerId) -> Result<Duration, TimerError> {
        Ok(self.queue.get(timer)?.period())
    }
}

impl<C: TimerCallback, B: TimerBackend, const N: usize> Timers<C, B, N> {
    /// Register the periodic tick source.
    pub fn start(&mut self, tick_period: Duration) {
        self.backend.start(tick_period.max(MIN_DELAY));
    }

    /// Fire `callback` once, `delay` from now. A zero delay means one tick.
    pub fn set_oneshot(
        &mut self,
        timer: TimerId,
        delay: Duration,
        callback: C,
    ) -> Result<(), TimerError> {
        self.arm(timer, delay.max(MIN_DELAY), Duration::from_ticks(0), callback)
    }

    /// Fire `callback` every `period`, first after one period. A zero period means one tick.
    pub fn set_periodic(
        &mut self,
        timer: TimerId,
        period: Duration,
        callback: C,
    ) -> Result<(), TimerError> {
        let period = period.max(MIN_DELAY);
        self.arm(timer, period, period, callback)
    }

    /// Unlink `timer` if pending and drop its period and callback.
    ///
    /// Cancelling an unarmed or already fired timer is not an error. Called
    /// from the timer's own callback, it prevents the periodic requeue.
    pub fn cancel(&mut self, timer: TimerId) -> Result<(), TimerError> {
        let old_head = self.queue.peek_earliest();
        let was_linked = self.queue.remove(timer)?;
        self.queue.get_mut(timer)?.disarm();

        #[cfg(feature = "defmt")]
        defmt::trace!("cancel timer {} (was linked: {})", timer, was_linked);

        if was_linked {
            let now = self.backend.now();
            self.reconcile(old_head, now);
        }
        Ok(())
    }

    fn arm(
        &mut self,
        timer: TimerId,
        delay: Duration,
        period: Duration,
        callback: C,
    ) -> Result<(), TimerError> {
        if self.queue.get(timer)?.is_linked() {
            #[cfg(feature = "defmt")]
            defmt::error!("timer {} already in queue", timer);
            return Err(TimerError::AlreadyArmed { timer });
        }

        let now = self.backend.now();
        let deadline = now
            .checked_add(delay)
            .ok_or(TimerError::DeadlineOverflow { timer })?;
        let old_head = self.queue.peek_earliest();

        let slot = self.queue.get_mut(timer)?;
        slot.scheduled_time = deadline;
        slot.period = period;
        slot.callback = Some(callback);
        slot.arm_seq = slot.arm_seq.wrapping_add(1);

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "timer {} scheduled at {}, now {}",
            timer,
            slot.scheduled_time.as_ticks(),
            now.as_ticks()
        );

        self.queue.insert(timer)?;
        self.reconcile(old_head, now);
        Ok(())
    }

    /// Tell the backend when the earliest pending timer changed.
    fn reconcile(&mut self, old_head: Option<TimerId>, now: Instant) {
        if self.queue.peek_earliest() != old_head {
            let earliest = self.queue.earliest_deadline();
            self.backend.head_changed(earliest, now);
        }
    }
}

impl<C: TimerCallback, B: TimerBackend, const N: usize> TimerControl<C> for Timers<C, B, N> {
    fn now(&self) -> Instant {
        self.backend.now()
    }

    fn set_oneshot(
        &mut self,
        timer: TimerId,
        delay: Duration,
        callback: C,
    ) -> Result<(), TimerError> {
        Timers::set_oneshot(self, timer, delay, callback)
    }

    fn set_periodic(
        &mut self,
        timer: TimerId,
        period: Duration,
        callback: C,
    ) -> Result<(), TimerError> {
        Timers::set_periodic(self, timer, period, callback)
    }

    fn cancel(&mut self, timer: TimerId) -> Result<(), TimerError> {
        Timers::cancel(self, timer)
    }

    fn is_armed(&self, timer: TimerId) -> Result<bool, TimerError> {
        Timers::is_armed(self, timer)
    }
}
