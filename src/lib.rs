//! `korri-timers` library: the timer subsystem of a small real-time kernel.
//! Any part of the kernel can schedule a callback to run once or repeatedly
//! after a delay; callbacks are dispatched from interrupt context.
//!
//! The crate exposes a sorted, fixed-capacity timer queue, the lifecycle API
//! that arms and cancels timers, the interrupt-time dispatcher, and the
//! platform seams (clock, hardware timer, scheduler hook) it consumes.
#![cfg_attr(not(test), no_std)]
//==================================================================================
/// Callback contract and the control handle given to firing callbacks.
pub mod callback;
/// Run-time configuration of the subsystem.
pub mod config;
/// Value types shared by every component (handles, hints, statistics).
pub mod core;
/// Interrupt-time drain of due timers.
pub mod dispatch;
/// Lifecycle errors (invalid handle, double arm, pool exhaustion...).
pub mod error;
/// Arming, cancelling and releasing timers.
pub mod lifecycle;
/// Interfaces consumed from the platform and the hardware timer strategies.
pub mod platform;
/// Ordered pending set backed by a fixed slot pool.
pub mod queue;
/// Process-wide, critical-section guarded entry point.
pub mod subsystem;
//==================================================================================

pub use crate::callback::{FnCallback, TimerCallback, TimerControl};
pub use crate::config::SubsystemConfig;
pub use crate::core::{HandlerReturn, TimerId, TimerStats};
pub use crate::error::TimerError;
pub use crate::lifecycle::Timers;
pub use crate::subsystem::TimerSubsystem;
