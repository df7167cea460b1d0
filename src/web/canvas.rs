// Helpers for getting a 2D context off a canvas and drawing particles on it

use std::f64::consts::PI;
use vecmath::Vector2;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasGradient, CanvasRenderingContext2d, HtmlCanvasElement, Window};

use crate::color::Color;
use crate::renderer::{ColorStop, Surface};
use crate::Bounds;

// None when the canvas already holds another kind of context
pub fn context_2d(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
    canvas
        .get_context("2d")
        .ok()
        .flatten()?
        .dyn_into::<CanvasRenderingContext2d>()
        .ok()
}

// Sizes the canvas backing store to the viewport and returns the new bounds.
pub fn fit_to_viewport(window: &Window, canvas: &HtmlCanvasElement) -> Bounds {
    let width = window
        .inner_width()
        .ok()
        .and_then(|w| w.as_f64())
        .unwrap_or_else(|| canvas.width() as f64);
    let height = window
        .inner_height()
        .ok()
        .and_then(|h| h.as_f64())
        .unwrap_or_else(|| canvas.height() as f64);
    let bounds = Bounds::new(width, height);
    canvas.set_width(bounds.width as u32);
    canvas.set_height(bounds.height as u32);
    bounds
}

pub struct CanvasSurface {
    context: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(context: CanvasRenderingContext2d) -> CanvasSurface {
        CanvasSurface { context }
    }

    fn circle(&self, center: Vector2<f64>, radius: f64) -> Result<(), JsValue> {
        self.context.begin_path();
        self.context.arc(center[0], center[1], radius, 0.0, 2.0 * PI)?;
        self.context.fill();
        Ok(())
    }
}

fn add_stops(gradient: &CanvasGradient, stops: &[ColorStop]) -> Result<(), JsValue> {
    for stop in stops {
        let offset = stop.offset.max(0.0).min(1.0) as f32;
        gradient.add_color_stop(offset, &stop.color.to_css(stop.alpha))?;
    }
    Ok(())
}

impl Surface for CanvasSurface {
    type Error = JsValue;

    fn clear(&mut self, bounds: Bounds) -> Result<(), JsValue> {
        self.context.clear_rect(0.0, 0.0, bounds.width, bounds.height);
        Ok(())
    }

    fn radial_glow(
        &mut self,
        center: Vector2<f64>,
        radius: f64,
        stops: &[ColorStop],
    ) -> Result<(), JsValue> {
        if radius.is_nan() || radius <= 0.0 {
            return Ok(());
        }
        let gradient = self
            .context
            .create_radial_gradient(center[0], center[1], 0.0, center[0], center[1], radius)?;
        add_stops(&gradient, stops)?;
        #[allow(deprecated)]
        self.context.set_fill_style(&gradient);
        self.circle(center, radius)
    }

    fn disc(
        &mut self,
        center: Vector2<f64>,
        radius: f64,
        color: Color,
        alpha: f64,
    ) -> Result<(), JsValue> {
        if radius.is_nan() || radius <= 0.0 {
            return Ok(());
        }
        #[allow(deprecated)]
        self.context.set_fill_style(&JsValue::from_str(&color.to_css(alpha)));
        self.circle(center, radius)
    }

    fn streak(
        &mut self,
        head: Vector2<f64>,
        tail: Vector2<f64>,
        width: f64,
        stops: &[ColorStop],
    ) -> Result<(), JsValue> {
        let gradient = self
            .context
            .create_linear_gradient(head[0], head[1], tail[0], tail[1]);
        add_stops(&gradient, stops)?;
        #[allow(deprecated)]
        self.context.set_stroke_style(&gradient);
        self.context.set_line_width(width);
        self.context.set_line_cap("round");
        self.context.begin_path();
        self.context.move_to(head[0], head[1]);
        self.context.line_to(tail[0], tail[1]);
        self.context.stroke();
        Ok(())
    }
}
