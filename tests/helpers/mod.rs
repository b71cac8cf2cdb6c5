/// Test doubles simulating the platform clock, hardware timer, and scheduler
/// during integration tests.
use embassy_time::{Duration, Instant};
use korri_timers::platform::{Clock, OneShotTimer, PeriodicTimer, SchedulerHook};
use korri_timers::{FnCallback, HandlerReturn, TimerControl, TimerId};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
#[allow(dead_code)]
/// Virtual monotonic clock shared by the test and the simulated hardware.
pub struct SimClock {
    ticks: Arc<AtomicU64>,
}

#[allow(dead_code)]
impl SimClock {
    pub fn set(&self, ticks: u64) {
        self.ticks.store(ticks, Ordering::SeqCst);
    }

    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Default)]
#[allow(dead_code)]
/// Programming state of the simulated timer device.
pub struct HwState {
    /// Absolute tick of the next interrupt, if armed.
    pub next_fire: Option<u64>,
    /// Reload value when running periodically.
    pub period: Option<u64>,
    pub oneshots: u32,
    pub stops: u32,
}

#[derive(Clone, Default)]
#[allow(dead_code)]
/// Timer device that can run periodically or as a one-shot.
pub struct SimHardware {
    pub clock: SimClock,
    pub state: Arc<Mutex<HwState>>,
}

#[allow(dead_code)]
impl SimHardware {
    pub fn new(clock: SimClock) -> Self {
        Self {
            clock,
            state: Arc::default(),
        }
    }

    /// Consume the pending interrupt if it is due at `now`, reloading periodic mode.
    pub fn take_expired(&self, now: u64) -> bool {
        let mut state = self.state.lock().unwrap();
        match state.next_fire {
            Some(at) if at <= now => {
                state.next_fire = state.period.map(|period| now + period);
                true
            }
            _ => false,
        }
    }

    pub fn next_fire(&self) -> Option<u64> {
        self.state.lock().unwrap().next_fire
    }
}

impl Clock for SimHardware {
    fn now(&self) -> Instant {
        Instant::from_ticks(self.clock.ticks())
    }
}

impl PeriodicTimer for SimHardware {
    fn set_periodic_timer(&mut self, period: Duration) {
        let mut state = self.state.lock().unwrap();
        state.period = Some(period.as_ticks());
        state.next_fire = Some(self.clock.ticks() + period.as_ticks());
    }
}

impl OneShotTimer for SimHardware {
    fn set_oneshot_timer(&mut self, delay: Duration) {
        let mut state = self.state.lock().unwrap();
        state.period = None;
        state.next_fire = Some(self.clock.ticks() + delay.as_ticks());
        state.oneshots += 1;
    }

    fn stop_timer(&mut self) {
        let mut state = self.state.lock().unwrap();
        state.period = None;
        state.next_fire = None;
        state.stops += 1;
    }
}

#[derive(Clone, Default)]
#[allow(dead_code)]
/// Scheduler hook counting quantum ticks.
pub struct SimScheduler {
    pub ticks: Arc<AtomicU32>,
    pub hint: HandlerReturn,
}

impl SchedulerHook for SimScheduler {
    fn timer_tick(&mut self) -> HandlerReturn {
        self.ticks.fetch_add(1, Ordering::SeqCst);
        self.hint
    }
}

#[derive(Default)]
#[allow(dead_code)]
/// Firing times collected by a callback.
pub struct Recorder {
    firings: Mutex<Vec<u64>>,
}

#[allow(dead_code)]
impl Recorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn firings(&self) -> Vec<u64> {
        self.firings.lock().unwrap().clone()
    }

    pub fn push(&self, now: Instant) -> usize {
        let mut firings = self.firings.lock().unwrap();
        firings.push(now.as_ticks());
        firings.len()
    }
}

/// Callback type used by the integration tests.
pub type Callback = FnCallback<Arc<Recorder>>;

#[allow(dead_code)]
fn record(
    _timers: &mut dyn TimerControl<Callback>,
    _timer: TimerId,
    now: Instant,
    recorder: &mut Arc<Recorder>,
) -> HandlerReturn {
    recorder.push(now);
    HandlerReturn::NoReschedule
}

#[allow(dead_code)]
fn record_then_cancel_at_three(
    timers: &mut dyn TimerControl<Callback>,
    timer: TimerId,
    now: Instant,
    recorder: &mut Arc<Recorder>,
) -> HandlerReturn {
    if recorder.push(now) >= 3 {
        timers.cancel(timer).expect("self cancel from callback");
    }
    HandlerReturn::NoReschedule
}

#[allow(dead_code)]
/// Callback recording each firing.
pub fn recording(recorder: &Arc<Recorder>) -> Callback {
    FnCallback::new(record, recorder.clone())
}

#[allow(dead_code)]
/// Callback recording each firing and cancelling its timer on the third.
pub fn cancel_after_three(recorder: &Arc<Recorder>) -> Callback {
    FnCallback::new(record_then_cancel_at_three, recorder.clone())
}

#[allow(dead_code)]
pub fn ticks(n: u64) -> Duration {
    Duration::from_ticks(n)
}

#[allow(dead_code)]
pub fn at(n: u64) -> Instant {
    Instant::from_ticks(n)
}
