//! Value types shared between the queue, the lifecycle API and the dispatcher.
//!
//! Time is expressed with [`embassy_time::Instant`] (absolute deadline) and
//! [`embassy_time::Duration`] (delay or period), both counted in platform ticks.
use core::ops::{BitOr, BitOrAssign};

use embassy_time::Duration;

//==================================================================================Constants

/// Smallest delay the queue accepts. Zero delays and periods are coerced to it
/// so that a freshly armed timer is always at least one tick in the future.
pub const MIN_DELAY: Duration = Duration::from_ticks(1);

/// Period of the tick source registered by `subsystem_init` (10 ms).
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_millis(10);

//==================================================================================Handles

/// Handle to a timer living in the queue's slot pool.
///
/// The generation is bumped every time a slot is released, so a handle kept
/// past [`release`](crate::lifecycle::Timers::release) is rejected instead of
/// silently aliasing whatever timer reuses the slot. The counter wraps after
/// 2^32 releases of the same slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerId {
    pub(crate) slot: u16,
    pub(crate) generation: u32,
}

impl TimerId {
    /// Index of the slot backing this timer.
    #[inline]
    pub fn slot(&self) -> usize {
        self.slot as usize
    }

    /// Generation the handle was issued for.
    #[inline]
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

//==================================================================================Handler return

/// Hint returned by callbacks and by the dispatcher to the interrupt trampoline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HandlerReturn {
    /// Return from the interrupt to the interrupted thread.
    #[default]
    NoReschedule,
    /// A scheduling decision is needed before returning.
    Reschedule,
}

impl HandlerReturn {
    #[inline]
    pub fn is_reschedule(self) -> bool {
        self == HandlerReturn::Reschedule
    }
}

impl BitOr for HandlerReturn {
    type Output = HandlerReturn;

    fn bitor(self, rhs: Self) -> Self::Output {
        if self.is_reschedule() || rhs.is_reschedule() {
            HandlerReturn::Reschedule
        } else {
            HandlerReturn::NoReschedule
        }
    }
}

impl BitOrAssign for HandlerReturn {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = *self | rhs;
    }
}

//==================================================================================Statistics

/// Counters maintained by the dispatcher. Both wrap on overflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerStats {
    /// Number of dispatch passes (timer interrupts).
    pub interrupts: u32,
    /// Number of callbacks invoked.
    pub fired: u32,
}
