//! Interrupt-time processing of due timers.
//!
//! One pass per timer interrupt:
//!
//! 1. pop every timer whose deadline is at or before `now`;
//! 2. run its callback (the timer is already unlinked, so the callback may
//!    re-arm or cancel it) and fold the returned hint;
//! 3. requeue periodic timers the callback left alone, at `now + period`;
//! 4. hand the new earliest deadline to the backend (reprogram the one-shot
//!    hardware, or give the scheduler its tick).
use critical_section::CriticalSection;
use embassy_time::Instant;

use crate::callback::TimerCallback;
use crate::core::HandlerReturn;
use crate::error::TimerError;
use crate::lifecycle::Timers;
use crate::platform::TimerBackend;


impl<C: TimerCallback, B: TimerBackend, const N: usize> Timers<C, B, N> {
    /// Drain every due timer. `_cs` proves the caller holds the critical section.
    ///
    /// Returns [`HandlerReturn::Reschedule`] if any callback, or the scheduler
    /// hook on fixed-tick platforms, asked for it.
    ///
    /// # Errors
    ///
    /// [`TimerError::Corrupted`] when a due entry has no live slot or no
    /// callback, [`TimerError::DeadlineOverflow`] when a periodic requeue runs
    /// past the clock. Both leave the queue unusable and are fatal upstream.
    pub fn dispatch(
        &mut self,
        _cs: CriticalSection<'_>,
        now: Instant,
    ) -> Result<HandlerReturn, TimerError> {
        let mut ret = HandlerReturn::NoReschedule;
        self.stats.interrupts = self.stats.interrupts.wrapping_add(1);

        #[cfg(feature = "defmt")]
        defmt::trace!("timer dispatch at {}", now.as_ticks());

        while let Some(timer) = self.queue.pop_due(now) {
            let slot = self
                .queue
                .get_mut(timer)
                .map_err(|_| TimerError::Corrupted { timer })?;
            let periodic = slot.is_periodic();
            let seq = slot.arm_seq;
            let mut callback = slot
                .callback
                .take()
                .ok_or(TimerError::Corrupted { timer })?;

            self.stats.fired = self.stats.fired.wrapping_add(1);

            #[cfg(feature = "defmt")]
            defmt::trace!("timer {} firing (periodic: {})", timer, periodic);

            ret |= callback.on_expire(self, timer, now);

            // Callbacks cannot release timers, so the slot is still live.
            let slot = self
                .queue
                .get_mut(timer)
                .map_err(|_| TimerError::Corrupted { timer })?;
            if slot.arm_seq == seq {
                slot.callback = Some(callback);
            }

            // Requeue only if the callback neither re-armed nor cancelled it.
            if periodic && !slot.is_linked() && slot.is_periodic() {
                slot.scheduled_time = now
                    .checked_add(slot.period)
                    .ok_or(TimerError::DeadlineOverflow { timer })?;

                #[cfg(feature = "defmt")]
                defmt::trace!(
                    "periodic timer {} requeued for {}",
                    timer,
                    slot.scheduled_time.as_ticks()
                );

                self.queue.insert(timer)?;
            }
        }

        let earliest = self.queue.earliest_deadline();
        ret |= self.backend.dispatch_complete(earliest, now);
        Ok(ret)
    }
}
