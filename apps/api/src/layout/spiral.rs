//! Outward spiral search order.
//!
//! An Archimedean spiral `r = a·θ` with `a = step / 2π`, so successive turns are `step`
//! pixels apart. The angular increment keeps consecutive samples about `step` pixels
//! apart along the curve. The x axis is stretched by the canvas aspect ratio so the
//! spiral fills a rectangle instead of a square.
//!
//! The walk ends once the spiral has grown past the canvas corners, after `budget`
//! distinct samples, or after `iteration_limit` raw steps, whichever comes first. The
//! last bound matters on large canvases with a small step, where many raw steps round
//! to the same pixel.
//!
//! Angles are `f64`. At a 4096 px canvas the angle reaches ~18 000 rad while the
//! increment shrinks to ~1/2900 rad, which an `f32` can no longer add.

use std::f64::consts::{SQRT_2, TAU};

pub struct Spiral {
    step: f64,
    a: f64,
    aspect: f64,
    theta: f64,
    max_radius: f64,
    budget: usize,
    emitted: usize,
    iteration_limit: usize,
    iterations: usize,
    last: Option<(i32, i32)>,
}

impl Spiral {
    /// Spiral over a `width × height` canvas sampling every `step` pixels.
    pub fn new(width: u32, height: u32, step: u32) -> Self {
        let step_px = step.max(1);
        let step = step_px as f64;
        let (w, h) = (width.max(1) as f64, height.max(1) as f64);
        // In unstretched units the canvas spans ±h/2 vertically and ±h/2 horizontally.
        let max_radius = (h / 2.0) * SQRT_2 + step;
        Self {
            step,
            a: step / TAU,
            aspect: w / h,
            theta: 0.0,
            max_radius,
            budget: search_budget(width, height, step_px),
            emitted: 0,
            iteration_limit: iteration_limit(max_radius, step),
            iterations: 0,
            last: None,
        }
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    pub fn iteration_limit(&self) -> usize {
        self.iteration_limit
    }
}

/// Maximum number of samples for a canvas: proportional to its area.
pub fn search_budget(width: u32, height: u32, step: u32) -> usize {
    let step = step.max(1) as usize;
    2 * width as usize * height as usize / (step * step) + 1
}

/// Raw steps needed to reach `max_radius`: the final angle `max_radius / a` divided by
/// the smallest increment `step / max_radius`.
fn iteration_limit(max_radius: f64, step: f64) -> usize {
    (TAU * max_radius * max_radius / (step * step)).ceil() as usize + 1
}

impl Iterator for Spiral {
    /// Offset from the canvas center, in pixels.
    type Item = (i32, i32);

    fn next(&mut self) -> Option<(i32, i32)> {
        while self.emitted < self.budget && self.iterations < self.iteration_limit {
            self.iterations += 1;
            let r = self.a * self.theta;
            if r > self.max_radius {
                return None;
            }
            let point = (
                (r * self.theta.cos() * self.aspect).round() as i32,
                (r * self.theta.sin()).round() as i32,
            );
            self.theta += self.step / r.max(self.step);
            if self.last != Some(point) {
                self.last = Some(point);
                self.emitted += 1;
                return Some(point);
            }
        }
        None
    }
}
