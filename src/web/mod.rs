// Browser bindings: a canvas effect handle and a magnetic button handle.
// Everything here is glue; the behavior lives in the driver and magnetic modules.

pub mod canvas;
pub mod dom;

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Event, HtmlCanvasElement, HtmlElement, MouseEvent, Window};

use crate::config::{EffectConfig, EmitterConfig};
use crate::driver::{DriverState, FrameDriver};
use crate::magnetic::MagneticButton;
use crate::utils::Timer;
use vecmath::Vector2;

use self::canvas::CanvasSurface;
use self::dom::{AnimationLoop, EventListener, TimeoutTask};

// Effect settings, starting from a named preset. Overrides apply to every
// emitter of the effect.
#[wasm_bindgen]
#[derive(Clone)]
pub struct EffectOptions {
    config: EffectConfig,
}

#[wasm_bindgen]
impl EffectOptions {
    #[wasm_bindgen(constructor)]
    pub fn new(preset: &str) -> Result<EffectOptions, JsValue> {
        EffectConfig::preset(preset)
            .map(|config| EffectOptions { config })
            .ok_or_else(|| JsValue::from_str(&format!("unknown effect preset `{}`", preset)))
    }

    pub fn set_cap(&mut self, cap: u32) {
        self.map(|e| e.with_cap(cap as usize));
    }

    // A negative lifetime makes particles live forever
    pub fn set_lifetime_ms(&mut self, lifetime_ms: f64) {
        let lifetime = if lifetime_ms < 0.0 { None } else { Some(lifetime_ms) };
        self.map(|e| e.with_lifetime_ms(lifetime));
    }

    pub fn set_size_range(&mut self, min: f64, max: f64) {
        self.map(|e| e.with_size(min, max));
    }

    pub fn set_opacity_range(&mut self, min: f64, max: f64) {
        self.map(|e| e.with_opacity(min, max));
    }

    pub fn set_spawn_interval_ms(&mut self, min: f64, max: f64) {
        self.map(|e| e.with_spawn_interval_ms(min, max));
    }

    pub fn set_pointer_glow(&mut self, enabled: bool) {
        if !enabled {
            self.config.pointer_glow = None;
        } else if self.config.pointer_glow.is_none() {
            self.config.pointer_glow = Some(Default::default());
        }
    }
}

impl EffectOptions {
    fn map<F>(&mut self, f: F)
    where
        F: Fn(EmitterConfig) -> EmitterConfig,
    {
        self.config = self.config.clone().map_emitters(f);
    }

    pub fn config(&self) -> &EffectConfig {
        &self.config
    }
}

pub type SharedDriver = Rc<RefCell<FrameDriver<CanvasSurface>>>;

// A particle effect running on a full-viewport canvas.
#[wasm_bindgen]
pub struct CosmicEffect {
    window: Window,
    canvas: HtmlCanvasElement,
    driver: SharedDriver,
    profiling: Rc<Cell<bool>>,
    frames: Option<AnimationLoop>,
    spawns: Option<TimeoutTask>,
    listeners: Vec<EventListener>,
}

#[wasm_bindgen]
impl CosmicEffect {
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, preset: &str) -> Result<CosmicEffect, JsValue> {
        let options = EffectOptions::new(preset)?;
        CosmicEffect::with_options(canvas, &options)
    }

    pub fn with_options(canvas: HtmlCanvasElement, options: &EffectOptions) -> Result<CosmicEffect, JsValue> {
        let window = dom::window()?;
        let driver = FrameDriver::new(options.config.clone(), Box::new(rand::thread_rng()));
        Ok(CosmicEffect {
            window,
            canvas,
            driver: Rc::new(RefCell::new(driver)),
            profiling: Rc::new(Cell::new(false)),
            frames: None,
            spawns: None,
            listeners: Vec::new(),
        })
    }

    // Looks the canvas up by element id.
    pub fn from_canvas_id(id: &str, preset: &str) -> Result<CosmicEffect, JsValue> {
        let document = dom::window()?
            .document()
            .ok_or_else(|| JsValue::from_str("window has no document"))?;
        let canvas = document
            .get_element_by_id(id)
            .ok_or_else(|| JsValue::from_str(&format!("no element with id `{}`", id)))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| JsValue::from_str(&format!("element `{}` is not a canvas", id)))?;
        CosmicEffect::new(canvas, preset)
    }

    pub fn cosmic_dust(canvas: HtmlCanvasElement) -> Result<CosmicEffect, JsValue> {
        CosmicEffect::new(canvas, "cosmic-dust")
    }

    pub fn cursor_trail(canvas: HtmlCanvasElement) -> Result<CosmicEffect, JsValue> {
        CosmicEffect::new(canvas, "cursor-trail")
    }

    pub fn shooting_star(canvas: HtmlCanvasElement) -> Result<CosmicEffect, JsValue> {
        CosmicEffect::new(canvas, "shooting-star")
    }

    pub fn space_background(canvas: HtmlCanvasElement) -> Result<CosmicEffect, JsValue> {
        CosmicEffect::new(canvas, "space-background")
    }

    // Sizes the canvas, seeds the particles and starts the frame loop.
    // Returns false, leaving the effect idle, when the canvas has no 2D
    // context to draw with.
    pub fn start(&mut self) -> Result<bool, JsValue> {
        if self.driver.borrow().state() != DriverState::Idle {
            return Ok(self.is_running());
        }
        let surface = canvas::context_2d(&self.canvas).map(CanvasSurface::new);
        if surface.is_none() {
            warn!("canvas has no 2d context, effect not started");
            return Ok(false);
        }
        let bounds = canvas::fit_to_viewport(&self.window, &self.canvas);
        let now = dom::now(&self.window);
        let driver = self.driver.clone();
        let started = driver
            .borrow_mut()
            .start_with(surface, bounds, now, |running| self.attach(running.next_timer_delay(now)));
        match started {
            Ok(true) => {}
            Ok(false) => return Ok(false),
            Err(err) => {
                warn!("effect failed to start: {:?}", err);
                self.release();
                return Err(err);
            }
        }

        log!(
            "effect started on {}x{} canvas with {} particles",
            bounds.width,
            bounds.height,
            self.particle_count()
        );
        Ok(true)
    }

    // Stops the frame loop and timers and removes the listeners. The last
    // drawn frame stays on the canvas.
    pub fn dispose(&mut self) {
        self.release();
        self.driver.borrow_mut().dispose();
    }

    pub fn is_running(&self) -> bool {
        self.driver.borrow().is_running()
    }

    pub fn particle_count(&self) -> usize {
        self.driver.borrow().particle_count()
    }

    // Wraps every frame in a console timer.
    pub fn set_profiling(&mut self, enabled: bool) {
        self.profiling.set(enabled);
    }
}

impl CosmicEffect {
    pub fn driver(&self) -> &SharedDriver {
        &self.driver
    }

    // Hooks a freshly started driver up to the page: input listeners, the
    // frame loop and the first spawn timeout
    fn attach(&mut self, first_spawn: Option<f64>) -> Result<(), JsValue> {
        self.listen()?;
        self.frames = Some(self.frame_loop()?);
        let spawns = self.spawn_task();
        if let Some(delay) = first_spawn {
            spawns.arm(delay)?;
        }
        self.spawns = Some(spawns);
        Ok(())
    }

    fn release(&mut self) {
        self.listeners.clear();
        self.frames = None;
        self.spawns = None;
    }

    fn frame_loop(&self) -> Result<AnimationLoop, JsValue> {
        let driver = Rc::downgrade(&self.driver);
        let profiling = self.profiling.clone();
        AnimationLoop::start(&self.window, move |timestamp| {
            let driver = match driver.upgrade() {
                Some(driver) => driver,
                None => return false,
            };
            let mut driver = driver.borrow_mut();
            let _timer = if profiling.get() {
                Some(Timer::new("CosmicEffect::frame"))
            } else {
                None
            };
            match driver.frame(timestamp) {
                Ok(drawn) => drawn,
                Err(err) => {
                    warn!("frame failed: {:?}", err);
                    driver.is_running()
                }
            }
        })
    }

    fn spawn_task(&self) -> TimeoutTask {
        let driver = Rc::downgrade(&self.driver);
        let window = self.window.clone();
        TimeoutTask::new(&self.window, move || {
            let driver = driver.upgrade()?;
            let next = driver.borrow_mut().timer_fired(dom::now(&window));
            next
        })
    }

    fn listen(&mut self) -> Result<(), JsValue> {
        let driver = Rc::downgrade(&self.driver);
        let window = self.window.clone();
        let target = self.canvas.clone();
        let on_move = EventListener::new(&self.window, "mousemove", move |event: Event| {
            let event = match event.dyn_into::<MouseEvent>() {
                Ok(event) => event,
                Err(_) => return,
            };
            if let Some(driver) = driver.upgrade() {
                let rect = target.get_bounding_client_rect();
                let x = event.client_x() as f64 - rect.left();
                let y = event.client_y() as f64 - rect.top();
                driver.borrow_mut().pointer_moved(x, y, dom::now(&window));
            }
        })?;
        self.listeners.push(on_move);

        if let Some(body) = self.window.document().and_then(|d| d.body()) {
            let driver = Rc::downgrade(&self.driver);
            let on_leave = EventListener::new(&body, "mouseleave", move |_event: Event| {
                if let Some(driver) = driver.upgrade() {
                    driver.borrow_mut().pointer_left();
                }
            })?;
            self.listeners.push(on_leave);
        }

        let driver = Rc::downgrade(&self.driver);
        let window = self.window.clone();
        let target = self.canvas.clone();
        let on_resize = EventListener::new(&self.window, "resize", move |_event: Event| {
            if let Some(driver) = driver.upgrade() {
                let mut driver = driver.borrow_mut();
                if !driver.is_running() {
                    return;
                }
                let bounds = canvas::fit_to_viewport(&window, &target);
                driver.resize(bounds, dom::now(&window));
            }
        })?;
        self.listeners.push(on_resize);
        Ok(())
    }
}

fn element_center(element: &HtmlElement) -> Vector2<f64> {
    let rect = element.get_bounding_client_rect();
    [rect.left() + rect.width() / 2.0, rect.top() + rect.height() / 2.0]
}

// Makes an element lean toward the pointer when it comes near.
#[wasm_bindgen(js_name = MagneticButton)]
pub struct MagneticElement {
    element: HtmlElement,
    button: Rc<RefCell<MagneticButton>>,
    frames: Option<AnimationLoop>,
    listeners: Vec<EventListener>,
}

#[wasm_bindgen(js_class = MagneticButton)]
impl MagneticElement {
    pub fn attach(element: HtmlElement) -> Result<MagneticElement, JsValue> {
        let window = dom::window()?;
        let button = Rc::new(RefCell::new(MagneticButton::new(element_center(&element))));
        let mut listeners = Vec::with_capacity(3);

        let (state, el) = (button.clone(), element.clone());
        listeners.push(EventListener::new(&window, "mousemove", move |event: Event| {
            let event = match event.dyn_into::<MouseEvent>() {
                Ok(event) => event,
                Err(_) => return,
            };
            let mut button = state.borrow_mut();
            // The measured rect already includes the current translation
            let [cx, cy] = element_center(&el);
            let [ox, oy] = button.offset();
            button.move_to([cx - ox, cy - oy]);
            button.pointer_moved(event.client_x() as f64, event.client_y() as f64);
        })?);

        let state = button.clone();
        listeners.push(EventListener::new(&element, "mouseenter", move |_event: Event| {
            state.borrow_mut().pointer_entered();
        })?);

        let state = button.clone();
        listeners.push(EventListener::new(&element, "mouseleave", move |_event: Event| {
            state.borrow_mut().pointer_left();
        })?);

        let (state, el) = (button.clone(), element.clone());
        let mut last: Option<f64> = None;
        let frames = AnimationLoop::start(&window, move |timestamp| {
            let dt = last.map_or(0.0, |last| ((timestamp - last) / 1000.0).max(0.0).min(0.1));
            last = Some(timestamp);
            let transform = state.borrow_mut().advance(dt);
            if let Some(transform) = transform {
                if let Err(err) = el.style().set_property("transform", &transform) {
                    warn!("could not move magnetic element: {:?}", err);
                }
            }
            true
        })?;

        Ok(MagneticElement {
            element,
            button,
            frames: Some(frames),
            listeners,
        })
    }

    pub fn is_hovered(&self) -> bool {
        self.button.borrow().is_hovered
    }

    // Detaches every listener and puts the element back where it was.
    pub fn dispose(&mut self) {
        self.listeners.clear();
        self.frames = None;
        self.button.borrow_mut().detach();
        if let Err(err) = self.element.style().remove_property("transform") {
            warn!("could not reset magnetic element: {:?}", err);
        }
    }
}
