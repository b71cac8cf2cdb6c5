//! Error definitions for the timer lifecycle.
//!
//! Every variant is a programming error on the caller's side: the core
//! [`Timers`](crate::lifecycle::Timers) API reports it, the process-wide
//! [`TimerSubsystem`](crate::subsystem::TimerSubsystem) turns it into a kernel panic.
use crate::core::TimerId;
use thiserror_no_std::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Failures raised while arming, cancelling or managing a timer.
pub enum TimerError {
    /// Handle does not name a live timer (never initialized, released, or corrupted).
    #[error("Invalid timer handle {timer:?}")]
    InvalidTimer { timer: TimerId },

    /// The timer is already linked into the queue.
    #[error("Timer {timer:?} already in queue")]
    AlreadyArmed { timer: TimerId },

    /// Operation requires an unarmed timer.
    #[error("Timer {timer:?} is still armed")]
    StillArmed { timer: TimerId },

    /// `now + delay` does not fit the clock.
    #[error("Deadline of timer {timer:?} overflows the clock")]
    DeadlineOverflow { timer: TimerId },

    /// A pending timer was found without a callback or a live slot.
    #[error("Timer {timer:?} queue entry corrupted")]
    Corrupted { timer: TimerId },

    /// Every slot of the pool is in use.
    #[error("No free timer slot (capacity {capacity})")]
    PoolExhausted { capacity: usize },

    /// The subsystem was entered while it was already borrowed, typically from
    /// inside a timer callback.
    #[error("Timer subsystem re-entered")]
    Reentrant,
}
