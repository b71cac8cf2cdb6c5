//! Timer queue: the ordered set of pending timers.
//!
//! Timers live in a fixed pool of slots owned by the queue; membership in the
//! pending set is an index-linked list threaded through those slots, kept
//! sorted by deadline. Ties keep insertion order (first armed, first fired).
//!
//! The queue performs no locking. Callers hold the subsystem's critical section.
use embassy_time::{Duration, Instant};

use crate::core::TimerId;
use crate::error::TimerError;


//==================================================================================Constants

const ZERO_TICKS: Duration = Duration::from_ticks(0);
const EPOCH: Instant = Instant::from_ticks(0);

//==================================================================================Enums and Structs

/// Position of a slot in the pending list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Link {
    Unlinked,
    Linked { prev: Option<u16>, next: Option<u16> },
}

/// Storage for one timer.
pub struct TimerSlot<C> {
    allocated: bool,
    generation: u32,
    link: Link,
    pub(crate) scheduled_time: Instant,
    pub(crate) period: Duration,
    pub(crate) callback: Option<C>,
    /// Bumped by every set, cancel and release; lets the dispatcher tell
    /// whether a callback touched its own timer.
    pub(crate) arm_seq: u32,
}

impl<C> TimerSlot<C> {
    const fn vacant() -> Self {
        Self {
            allocated: false,
            generation: 0,
            link: Link::Unlinked,
            scheduled_time: EPOCH,
            period: ZERO_TICKS,
            callback: None,
            arm_seq: 0,
        }
    }

    #[inline]
    pub fn is_linked(&self) -> bool {
        matches!(self.link, Link::Linked { .. })
    }

    #[inline]
    pub fn scheduled_time(&self) -> Instant {
        self.scheduled_time
    }

    /// Repeat interval; zero for one-shot and cancelled timers.
    #[inline]
    pub fn period(&self) -> Duration {
        self.period
    }

    #[inline]
    pub fn is_periodic(&self) -> bool {
        self.period > ZERO_TICKS
    }

    /// Drop period and callback (with its captured argument). Keeps the last deadline.
    pub(crate) fn disarm(&mut self) {
        self.period = ZERO_TICKS;
        self.callback = None;
        self.arm_seq = self.arm_seq.wrapping_add(1);
    }

    /// Zero the schedule as well.
    pub(crate) fn clear(&mut self) {
        self.scheduled_time = EPOCH;
        self.disarm();
    }

    fn prev(&self) -> Option<u16> {
        match self.link {
            Link::Linked { prev, .. } => prev,
            Link::Unlinked => None,
        }
    }

    fn next(&self) -> Option<u16> {
        match self.link {
            Link::Linked { next, .. } => next,
            Link::Unlinked => None,
        }
    }

    fn set_prev(&mut self, value: Option<u16>) {
        if let Link::Linked { prev, .. } = &mut self.link {
            *prev = value;
        }
    }

    fn set_next(&mut self, value: Option<u16>) {
        if let Link::Linked { next, .. } = &mut self.link {
            *next = value;
        }
    }
}

/// Sorted pending set over a pool of `N` timer slots.
pub struct TimerQueue<C, const N: usize> {
    slots: [TimerSlot<C>; N],
    head: Option<u16>,
    tail: Option<u16>,
    len: usize,
}

impl<C, const N: usize> Default for TimerQueue<C, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C, const N: usize> TimerQueue<C, N> {
    /// Empty queue with every slot free.
    pub const fn new() -> Self {
        assert!(N <= u16::MAX as usize, "timer pool capacity exceeds u16 indices");
        Self {
            slots: [const { TimerSlot::vacant() }; N],
            head: None,
            tail: None,
            len: 0,
        }
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of pending (linked) timers.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    //==================================================================================Slot pool

    /// Claim a free slot and return a handle to an unarmed, zeroed timer.
    pub fn allocate(&mut self) -> Result<TimerId, TimerError> {
        let index = self
            .slots
            .iter()
            .position(|s| !s.allocated)
            .ok_or(TimerError::PoolExhausted { capacity: N })?;

        let slot = &mut self.slots[index];
        slot.allocated = true;
        slot.link = Link::Unlinked;
        slot.clear();
        Ok(self.id_of(index))
    }

    /// Return an unarmed timer's slot to the pool; the handle becomes stale.
    pub fn release(&mut self, timer: TimerId) -> Result<(), TimerError> {
        let index = self.resolve(timer)?;
        let slot = &mut self.slots[index];
        if slot.is_linked() {
            return Err(TimerError::StillArmed { timer });
        }
        slot.clear();
        slot.allocated = false;
        slot.generation = slot.generation.wrapping_add(1);
        Ok(())
    }

    /// Map a handle to its slot index, rejecting stale or foreign handles.
    pub fn resolve(&self, timer: TimerId) -> Result<usize, TimerError> {
        match self.slots.get(timer.slot()) {
            Some(slot) if slot.allocated && slot.generation == timer.generation => {
                Ok(timer.slot())
            }
            _ => Err(TimerError::InvalidTimer { timer }),
        }
    }

    /// Read access to a live timer.
    pub fn get(&self, timer: TimerId) -> Result<&TimerSlot<C>, TimerError> {
        self.resolve(timer).map(|index| &self.slots[index])
    }

    pub(crate) fn get_mut(&mut self, timer: TimerId) -> Result<&mut TimerSlot<C>, TimerError> {
        let index = self.resolve(timer)?;
        Ok(&mut self.slots[index])
    }

    fn id_of(&self, index: usize) -> TimerId {
        TimerId {
            slot: index as u16,
            generation: self.slots[index].generation,
        }
    }

    //==================================================================================Queue operations

    /// Link `timer` into the pending list according to its deadline.
    ///
    /// Scans from the head and inserts before the first entry whose deadline
    /// is strictly later, appending at the tail otherwise. Entries with equal
    /// deadlines therefore stay in insertion order.
    pub fn insert(&mut self, timer: TimerId) -> Result<(), TimerError> {
        let index = self.resolve(timer)?;
        if self.slots[index].is_linked() {
            return Err(TimerError::AlreadyArmed { timer });
        }

        let deadline = self.slots[index].scheduled_time;

        #[cfg(feature = "defmt")]
        defmt::trace!(
            "queue insert slot {} at {} (period {})",
            index,
            deadline.as_ticks(),
            self.slots[index].period.as_ticks()
        );

        let mut cursor = self.head;
        while let Some(entry) = cursor {
            let entry_slot = &self.slots[entry as usize];
            if entry_slot.scheduled_time > deadline {
                self.link_before(index, entry);
                return Ok(());
            }
            cursor = entry_slot.next();
        }

        // Walked off the end of the list.
        self.link_tail(index);
        Ok(())
    }

    /// Unlink `timer` if it is pending. Returns whether it was linked.
    pub fn remove(&mut self, timer: TimerId) -> Result<bool, TimerError> {
        let index = self.resolve(timer)?;
        Ok(self.unlink(index))
    }

    /// Earliest pending timer, without removing it.
    pub fn peek_earliest(&self) -> Option<TimerId> {
        self.head.map(|index| self.id_of(index as usize))
    }

    /// Deadline of the earliest pending timer.
    pub fn earliest_deadline(&self) -> Option<Instant> {
        self.head
            .map(|index| self.slots[index as usize].scheduled_time)
    }

    /// Remove and return the head if its deadline is at or before `now`.
    pub fn pop_due(&mut self, now: Instant) -> Option<TimerId> {
        let head = self.head? as usize;
        if self.slots[head].scheduled_time > now {
            return None;
        }
        self.unlink(head);
        Some(self.id_of(head))
    }

    /// Pending timers in firing order.
    pub fn iter(&self) -> Pending<'_, C, N> {
        Pending {
            queue: self,
            cursor: self.head,
        }
    }

    //==================================================================================Link maintenance

    fn link_before(&mut self, index: usize, before: u16) {
        let prev = self.slots[before as usize].prev();
        self.slots[index].link = Link::Linked {
            prev,
            next: Some(before),
        };
        match prev {
            Some(p) => self.slots[p as usize].set_next(Some(index as u16)),
            None => self.head = Some(index as u16),
        }
        self.slots[before as usize].set_prev(Some(index as u16));
        self.len += 1;
    }

    fn link_tail(&mut self, index: usize) {
        let prev = self.tail;
        self.slots[index].link = Link::Linked { prev, next: None };
        match prev {
            Some(p) => self.slots[p as usize].set_next(Some(index as u16)),
            None => self.head = Some(index as u16),
        }
        self.tail = Some(index as u16);
        self.len += 1;
    }

    fn unlink(&mut self, index: usize) -> bool {
        let Link::Linked { prev, next } = self.slots[index].link else {
            return false;
        };
        match prev {
            Some(p) => self.slots[p as usize].set_next(next),
            None => self.head = next,
        }
        match next {
            Some(n) => self.slots[n as usize].set_prev(prev),
            None => self.tail = prev,
        }
        self.slots[index].link = Link::Unlinked;
        self.len -= 1;
        true
    }
}

/// Iterator over pending timers, earliest first.
pub struct Pending<'a, C, const N: usize> {
    queue: &'a TimerQueue<C, N>,
    cursor: Option<u16>,
}

impl<C, const N: usize> Iterator for Pending<'_, C, N> {
    type Item = (TimerId, Instant);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.cursor? as usize;
        let slot = &self.queue.slots[index];
        self.cursor = slot.next();
        Some((self.queue.id_of(index), slot.scheduled_time))
    }
}
