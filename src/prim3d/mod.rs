//! Rasterization of screen space primitives into a [`Framebuffer`](crate::Framebuffer).

pub mod line;
pub mod scanline;

pub use line::draw_line_parametric;
pub use scanline::{fill_triangle, Shading};

use crate::{
    clip::ndc_to_screen,
    color::Color,
    vec::Vec2,
    Vertex,
};

/// A vertex after the perspective divide, snapped to the pixel grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenVertex {
    /// Whole pixel coordinates.
    pub pos: Vec2,
    /// Post-divide depth.
    pub z: f32,
    /// Pre-divide `w`.
    pub w: f32,
    pub uv: Vec2,
    pub color: Color,
}

impl ScreenVertex {
    /// `ndc` must already be divided by `w`.
    pub fn from_ndc(ndc: &Vertex, width: usize, height: usize) -> Self {
        ScreenVertex {
            pos: ndc_to_screen(ndc.position.xy(), width, height),
            z: ndc.position.z,
            w: ndc.position.w,
            uv: ndc.uv,
            color: ndc.color,
        }
    }

    pub fn x(&self) -> i32 {
        self.pos.x as i32
    }

    pub fn y(&self) -> i32 {
        self.pos.y as i32
    }
}
