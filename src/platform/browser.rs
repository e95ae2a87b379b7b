//! Browser timers behind the [`Scheduler`] trait
//!
//! Repeating timers use `setInterval`, one-shot timers use `setTimeout`, and
//! frames use `requestAnimationFrame`. The JS callbacks only forward
//! `(TimerId, TimerKind)` to a dispatch function; all state lives with the
//! controller.

use std::collections::HashMap;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::Window;

use super::time::{Scheduler, TimerId, TimerKind};

/// Called from JS whenever a timer fires
pub type Dispatch = Rc<dyn Fn(TimerId, TimerKind)>;

#[derive(Clone, Copy)]
enum Handle {
    Interval(i32),
    Timeout(i32),
    AnimationFrame(i32),
}

// Held only to keep the JS function alive
#[allow(dead_code)]
enum Callback {
    Plain(Closure<dyn FnMut()>),
    Frame(Closure<dyn FnMut(f64)>),
}

struct Live {
    handle: Option<Handle>,
    once: bool,
    /// Keeps the JS function alive while the timer is armed
    _callback: Callback,
}

pub struct BrowserScheduler {
    window: Window,
    dispatch: Dispatch,
    next_id: u64,
    live: HashMap<TimerId, Live>,
    /// Callbacks that may still be on the JS stack; dropped by `reap`
    retired: Vec<Live>,
}

impl BrowserScheduler {
    pub fn new(window: Window, dispatch: Dispatch) -> Self {
        Self {
            window,
            dispatch,
            next_id: 0,
            live: HashMap::new(),
            retired: Vec::new(),
        }
    }

    /// Drop retired callbacks. Call at the start of each dispatch, before
    /// anything can retire the callback that is currently running.
    pub fn reap(&mut self) {
        self.retired.clear();
    }

    /// Bookkeeping for a fire: one-shot timers are finished once they run
    pub fn fired(&mut self, id: TimerId) {
        if self.live.get(&id).is_some_and(|l| l.once) {
            if let Some(live) = self.live.remove(&id) {
                self.retired.push(live);
            }
        }
    }

    fn alloc_id(&mut self) -> TimerId {
        self.next_id += 1;
        TimerId(self.next_id)
    }

    fn plain_callback(&self, id: TimerId, kind: TimerKind) -> Closure<dyn FnMut()> {
        let dispatch = self.dispatch.clone();
        Closure::new(move || dispatch(id, kind))
    }

    fn arm(&mut self, id: TimerId, handle: Result<Handle, JsValue>, once: bool, cb: Callback) {
        let handle = match handle {
            Ok(h) => Some(h),
            Err(e) => {
                log::error!("Failed to arm timer {:?}: {:?}", id, e);
                None
            }
        };
        self.live.insert(
            id,
            Live {
                handle,
                once,
                _callback: cb,
            },
        );
    }
}

impl Scheduler for BrowserScheduler {
    fn schedule_repeating(&mut self, period_ms: f64, kind: TimerKind) -> TimerId {
        let id = self.alloc_id();
        let cb = self.plain_callback(id, kind);
        let handle = self
            .window
            .set_interval_with_callback_and_timeout_and_arguments_0(
                cb.as_ref().unchecked_ref(),
                period_ms.round().max(1.0) as i32,
            )
            .map(Handle::Interval);
        self.arm(id, handle, false, Callback::Plain(cb));
        id
    }

    fn schedule_once(&mut self, delay_ms: f64, kind: TimerKind) -> TimerId {
        let id = self.alloc_id();
        if kind == TimerKind::Frame {
            let dispatch = self.dispatch.clone();
            let cb = Closure::<dyn FnMut(f64)>::new(move |_time: f64| dispatch(id, kind));
            let handle = self
                .window
                .request_animation_frame(cb.as_ref().unchecked_ref())
                .map(Handle::AnimationFrame);
            self.arm(id, handle, true, Callback::Frame(cb));
        } else {
            let cb = self.plain_callback(id, kind);
            let handle = self
                .window
                .set_timeout_with_callback_and_timeout_and_arguments_0(
                    cb.as_ref().unchecked_ref(),
                    delay_ms.round().max(0.0) as i32,
                )
                .map(Handle::Timeout);
            self.arm(id, handle, true, Callback::Plain(cb));
        }
        id
    }

    fn cancel(&mut self, id: TimerId) {
        let Some(live) = self.live.remove(&id) else {
            return;
        };
        match live.handle {
            Some(Handle::Interval(h)) => self.window.clear_interval_with_handle(h),
            Some(Handle::Timeout(h)) => self.window.clear_timeout_with_handle(h),
            Some(Handle::AnimationFrame(h)) => {
                let _ = self.window.cancel_animation_frame(h);
            }
            None => {}
        }
        self.retired.push(live);
    }
}
