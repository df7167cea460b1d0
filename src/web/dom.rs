// Owned handles over browser callbacks. Each one keeps its closure alive and
// unregisters it when dropped, so dropping the handle is the cancellation.

use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Event, EventTarget, Window};

pub fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no global `window` exists"))
}

// Milliseconds on the same clock as requestAnimationFrame timestamps
pub fn now(window: &Window) -> f64 {
    window
        .performance()
        .map(|performance| performance.now())
        .unwrap_or_else(js_sys::Date::now)
}

pub struct EventListener {
    target: EventTarget,
    event_type: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl EventListener {
    pub fn new<F>(target: &EventTarget, event_type: &'static str, handler: F) -> Result<Self, JsValue>
    where
        F: FnMut(Event) + 'static,
    {
        let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        target.add_event_listener_with_callback(event_type, callback.as_ref().unchecked_ref())?;
        Ok(EventListener {
            target: target.clone(),
            event_type,
            callback,
        })
    }
}

impl Drop for EventListener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event_type, self.callback.as_ref().unchecked_ref());
    }
}

struct FrameState {
    handle: Option<i32>,
    callback: Option<Closure<dyn FnMut(f64)>>,
}

// requestAnimationFrame loop. `on_frame` gets the frame timestamp and
// returns whether to keep going.
pub struct AnimationLoop {
    window: Window,
    state: Rc<RefCell<FrameState>>,
}

impl AnimationLoop {
    pub fn start<F>(window: &Window, mut on_frame: F) -> Result<Self, JsValue>
    where
        F: FnMut(f64) -> bool + 'static,
    {
        let state = Rc::new(RefCell::new(FrameState {
            handle: None,
            callback: None,
        }));
        let weak = Rc::downgrade(&state);
        let win = window.clone();
        let callback = Closure::wrap(Box::new(move |timestamp: f64| {
            if let Some(state) = weak.upgrade() {
                state.borrow_mut().handle = None;
            }
            if !on_frame(timestamp) {
                return;
            }
            if let Some(state) = weak.upgrade() {
                if let Err(err) = request_frame(&win, &state) {
                    warn!("could not schedule the next frame: {:?}", err);
                }
            }
        }) as Box<dyn FnMut(f64)>);
        state.borrow_mut().callback = Some(callback);
        request_frame(window, &state)?;

        Ok(AnimationLoop {
            window: window.clone(),
            state,
        })
    }

    pub fn stop(&self) {
        if let Some(handle) = self.state.borrow_mut().handle.take() {
            let _ = self.window.cancel_animation_frame(handle);
        }
    }
}

impl Drop for AnimationLoop {
    fn drop(&mut self) {
        self.stop();
        self.state.borrow_mut().callback = None;
    }
}

fn request_frame(window: &Window, state: &Rc<RefCell<FrameState>>) -> Result<(), JsValue> {
    let mut state = state.borrow_mut();
    let handle = match state.callback.as_ref() {
        Some(callback) => window.request_animation_frame(callback.as_ref().unchecked_ref())?,
        None => return Ok(()),
    };
    state.handle = Some(handle);
    Ok(())
}

struct TimeoutState {
    handle: Option<i32>,
    callback: Option<Closure<dyn FnMut()>>,
}

// A single pending setTimeout that can re-arm itself. `on_fire` returns
// the delay until the next fire, or None to stay idle.
pub struct TimeoutTask {
    window: Window,
    state: Rc<RefCell<TimeoutState>>,
}

impl TimeoutTask {
    pub fn new<F>(window: &Window, mut on_fire: F) -> Self
    where
        F: FnMut() -> Option<f64> + 'static,
    {
        let state = Rc::new(RefCell::new(TimeoutState {
            handle: None,
            callback: None,
        }));
        let weak = Rc::downgrade(&state);
        let win = window.clone();
        let callback = Closure::wrap(Box::new(move || {
            if let Some(state) = weak.upgrade() {
                state.borrow_mut().handle = None;
            }
            let next = on_fire();
            if let (Some(delay_ms), Some(state)) = (next, weak.upgrade()) {
                if let Err(err) = set_timeout(&win, &state, delay_ms) {
                    warn!("could not schedule the next spawn: {:?}", err);
                }
            }
        }) as Box<dyn FnMut()>);
        state.borrow_mut().callback = Some(callback);

        TimeoutTask {
            window: window.clone(),
            state,
        }
    }

    // Replaces any pending fire
    pub fn arm(&self, delay_ms: f64) -> Result<(), JsValue> {
        set_timeout(&self.window, &self.state, delay_ms)
    }

    pub fn cancel(&self) {
        if let Some(handle) = self.state.borrow_mut().handle.take() {
            self.window.clear_timeout_with_handle(handle);
        }
    }
}

impl Drop for TimeoutTask {
    fn drop(&mut self) {
        self.cancel();
        self.state.borrow_mut().callback = None;
    }
}

fn set_timeout(window: &Window, state: &Rc<RefCell<TimeoutState>>, delay_ms: f64) -> Result<(), JsValue> {
    let mut state = state.borrow_mut();
    if let Some(handle) = state.handle.take() {
        window.clear_timeout_with_handle(handle);
    }
    let delay = delay_ms.max(0.0).ceil().min(i32::MAX as f64) as i32;
    let handle = match state.callback.as_ref() {
        Some(callback) => window.set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            delay,
        )?,
        None => return Ok(()),
    };
    state.handle = Some(handle);
    Ok(())
}
