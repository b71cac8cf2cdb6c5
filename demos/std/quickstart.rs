//! Host-side walkthrough: a virtual tick counter drives the timer interrupt of
//! a fixed-tick platform while a blink timer and a watchdog run.
//!
//! Run with `cargo run --example quickstart`.
use std::cell::Cell;

use embassy_time::{Duration, Instant};
use korri_timers::platform::{Clock, FixedTick, PeriodicTimer, SchedulerHook};
use korri_timers::{
    HandlerReturn, SubsystemConfig, TimerCallback, TimerControl, TimerId, TimerSubsystem,
};

struct VirtualTick {
    now: Cell<u64>,
}

impl Clock for &'static VirtualTick {
    fn now(&self) -> Instant {
        Instant::from_ticks(self.now.get())
    }
}

impl PeriodicTimer for &'static VirtualTick {
    fn set_periodic_timer(&mut self, period: Duration) {
        println!("tick source armed every {} ticks", period.as_ticks());
    }
}

/// Round-robin quantum of four ticks.
struct Quantum {
    remaining: u32,
}

impl SchedulerHook for Quantum {
    fn timer_tick(&mut self) -> HandlerReturn {
        self.remaining -= 1;
        if self.remaining == 0 {
            self.remaining = 4;
            HandlerReturn::Reschedule
        } else {
            HandlerReturn::NoReschedule
        }
    }
}

/// Every kind of timer the demo kernel uses.
enum KernelTimer {
    Blink { on: bool },
    Watchdog { blink: TimerId },
}

impl TimerCallback for KernelTimer {
    fn on_expire(
        &mut self,
        timers: &mut dyn TimerControl<Self>,
        _timer: TimerId,
        now: Instant,
    ) -> HandlerReturn {
        match self {
            KernelTimer::Blink { on } => {
                *on = !*on;
                println!("[{:>3}] led {}", now.as_ticks(), if *on { "on" } else { "off" });
                HandlerReturn::NoReschedule
            }
            KernelTimer::Watchdog { blink } => {
                println!("[{:>3}] watchdog: stopping blink", now.as_ticks());
                timers.cancel(*blink).ok();
                HandlerReturn::Reschedule
            }
        }
    }
}

fn main() {
    let tick: &'static VirtualTick = Box::leak(Box::new(VirtualTick { now: Cell::new(0) }));
    let timers = TimerSubsystem::<KernelTimer, _, 4>::new(
        FixedTick::new(tick, Quantum { remaining: 4 }),
        SubsystemConfig::default().with_tick_period(Duration::from_ticks(1)),
    );
    timers.init();

    let blink = timers.initialize();
    let watchdog = timers.initialize();
    timers.set_periodic(blink, Duration::from_ticks(3), KernelTimer::Blink { on: false });
    timers.set_oneshot(
        watchdog,
        Duration::from_ticks(20),
        KernelTimer::Watchdog { blink },
    );

    let mut preemptions = 0;
    for now in 1..=24 {
        tick.now.set(now);
        if timers.on_interrupt(Instant::from_ticks(now)).is_reschedule() {
            preemptions += 1;
        }
    }

    let stats = timers.stats();
    println!(
        "{} interrupts, {} callbacks, {} reschedules, blink armed: {}",
        stats.interrupts,
        stats.fired,
        preemptions,
        timers.is_armed(blink)
    );
}
