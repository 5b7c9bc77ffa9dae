//! Per-worker render context for wireframe part images.
//!
//! Each worker owns its own context instead of sharing process-global
//! display state. Rendering is always offscreen; the headless flag is
//! recorded so batch runs on machines without a display behave the
//! same as interactive ones.

use std::path::Path;

use image::{Rgba, RgbaImage};
use nalgebra::Point3;
use tracing::debug;

use crate::error::RenderError;

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const LINE: Rgba<u8> = Rgba([40, 40, 60, 255]);
const MARGIN: f64 = 0.08;

/// Offscreen renderer producing isometric wireframe PNGs.
#[derive(Debug, Clone)]
pub struct RenderContext {
    width: u32,
    height: u32,
    headless: bool,
}

impl RenderContext {
    pub fn new(headless: bool) -> Self {
        debug!(headless, "render context initialized");
        Self {
            width: 512,
            height: 512,
            headless,
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn is_headless(&self) -> bool {
        self.headless
    }

    /// Render vertices and edge segments as an isometric wireframe.
    /// Shapes without geometry produce a blank canvas.
    pub fn render_wireframe(
        &self,
        vertices: &[Point3<f64>],
        segments: &[(usize, usize)],
    ) -> RgbaImage {
        let mut canvas = RgbaImage::from_pixel(self.width, self.height, BACKGROUND);
        if vertices.is_empty() {
            return canvas;
        }

        let projected: Vec<(f64, f64)> = vertices.iter().map(|p| project(p)).collect();
        let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
        let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for &(x, y) in &projected {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        let span = (max_x - min_x).max(max_y - min_y).max(1e-9);
        let usable = 1.0 - 2.0 * MARGIN;
        let scale = usable * f64::from(self.width.min(self.height)) / span;
        let to_pixel = |(x, y): (f64, f64)| {
            let px = MARGIN * f64::from(self.width) + (x - min_x) * scale;
            // Flip y so +y points up in the output.
            let py = f64::from(self.height) - (MARGIN * f64::from(self.height) + (y - min_y) * scale);
            (px, py)
        };

        for &(a, b) in segments {
            if a >= projected.len() || b >= projected.len() {
                continue;
            }
            draw_line(&mut canvas, to_pixel(projected[a]), to_pixel(projected[b]));
        }
        // Mark vertices so point-only shapes still show something.
        for &p in &projected {
            let (px, py) = to_pixel(p);
            plot(&mut canvas, px.round() as i64, py.round() as i64);
        }
        canvas
    }

    /// Render and write a PNG in one step.
    pub fn save_wireframe(
        &self,
        vertices: &[Point3<f64>],
        segments: &[(usize, usize)],
        path: &Path,
    ) -> Result<(), RenderError> {
        let canvas = self.render_wireframe(vertices, segments);
        canvas.save(path)?;
        Ok(())
    }
}

/// Isometric projection onto the view plane.
fn project(p: &Point3<f64>) -> (f64, f64) {
    let sqrt3_2 = 3.0f64.sqrt() / 2.0;
    let x = (p.x - p.z) * sqrt3_2;
    let y = p.y + (p.x + p.z) * 0.5;
    (x, y)
}

fn plot(canvas: &mut RgbaImage, x: i64, y: i64) {
    if x >= 0 && y >= 0 && (x as u32) < canvas.width() && (y as u32) < canvas.height() {
        canvas.put_pixel(x as u32, y as u32, LINE);
    }
}

/// Bresenham line between two pixel positions.
fn draw_line(canvas: &mut RgbaImage, from: (f64, f64), to: (f64, f64)) {
    let (mut x0, mut y0) = (from.0.round() as i64, from.1.round() as i64);
    let (x1, y1) = (to.0.round() as i64, to.1.round() as i64);
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        plot(canvas, x0, y0);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
