//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Time: timers and the frame loop behind the `Scheduler` trait
//! - Input: keyboard and touch-button mapping
//! - Browser timers (`setInterval`, `requestAnimationFrame`) on wasm32

pub mod input;
pub mod time;

#[cfg(target_arch = "wasm32")]
pub mod browser;

pub use input::{InputAction, TOUCH_BUTTONS, action_for_key_down, action_for_key_up};
pub use time::{Scheduler, TimerId, TimerKind, VirtualClock};
