pub mod buf;
pub mod clip;
pub mod color;
pub mod config;
pub mod math;
pub mod mesh;
pub mod pipeline;
pub mod prim3d;
pub mod sampler;
pub mod shaders;
pub mod texture;
pub mod vec;

use color::{lerp_color, Color, WHITE};
use math::lerp;
use vec::{Vec2, Vec3, Vec4};

pub use buf::Framebuffer;
pub use pipeline::{CullingMode, Metrics, Pipeline, RenderMode};
pub use shaders::{PixelShader, RenderContext, VertexShader};

/// Below this `|w|` a vertex is treated as lying on the camera plane and is not divided.
pub const MIN_W: f32 = 1e-6;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
    pub position: Vec4,
    pub normal: Vec3,
    pub uv: Vec2,
    pub color: Color,
}

impl Default for Vertex {
    fn default() -> Self {
        Vertex {
            position: Vec4::from([0., 0., 0., 1.]),
            normal: Vec3::zero(),
            uv: Vec2::zero(),
            color: WHITE,
        }
    }
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3, uv: Vec2, color: Color) -> Self {
        Vertex {
            position: position.to_hom(),
            normal,
            uv,
            color,
        }
    }

    /// Linear interpolation of every attribute. Colors come out opaque.
    pub fn lerp(&self, other: &Vertex, ratio: f32) -> Vertex {
        Vertex {
            position: self.position + (other.position - self.position) * ratio,
            normal: self.normal + (other.normal - self.normal) * ratio,
            uv: Vec2::from([
                lerp(self.uv.x, other.uv.x, ratio),
                lerp(self.uv.y, other.uv.y, ratio),
            ]),
            color: lerp_color(self.color, other.color, ratio),
        }
    }

    /// Divides `x`, `y` and `z` by `w`, leaving `w` in place for perspective correction.
    /// Returns `false`, without touching the vertex, when `w` is too close to zero.
    pub fn perspective_divide(&mut self) -> bool {
        let w = self.position.w;
        if w.abs() < MIN_W {
            return false;
        }
        let inv_w = 1. / w;
        self.position.x *= inv_w;
        self.position.y *= inv_w;
        self.position.z *= inv_w;
        true
    }
}

/// A rasterized fragment on its way to the pixel shader.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Texel {
    pub x: i32,
    pub y: i32,
    /// Post-divide depth, as tested against the depth buffer.
    pub depth: f32,
    /// Pre-divide `w`, the view space distance.
    pub w: f32,
    pub uv: Vec2,
    pub color: Color,
    pub mip_level: f32,
}

/// Resolves an index buffer into triangles. Trailing indices that do not make up a full
/// triangle, and triangles with an out of range index, are skipped.
pub fn triangles_iter<'a>(
    vertices: &'a [Vertex],
    indices: &'a [u32],
) -> impl Iterator<Item = [&'a Vertex; 3]> + 'a {
    indices.chunks_exact(3).filter_map(|tri| {
        Some([
            vertices.get(tri[0] as usize)?,
            vertices.get(tri[1] as usize)?,
            vertices.get(tri[2] as usize)?,
        ])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn divide_skips_degenerate_w() {
        let mut v = Vertex {
            position: Vec4::from([2., 4., 1., 2.]),
            ..Vertex::default()
        };
        assert!(v.perspective_divide());
        assert_eq!(v.position.to_array(), [1., 2., 0.5, 2.]);

        let mut v = Vertex {
            position: Vec4::from([2., 4., 1., 0.]),
            ..Vertex::default()
        };
        assert!(!v.perspective_divide());
        assert_eq!(v.position.to_array(), [2., 4., 1., 0.]);
    }

    #[test]
    fn triangle_iteration_ignores_bad_indices() {
        let verts = [Vertex::default(); 3];
        assert_eq!(triangles_iter(&verts, &[0, 1, 2, 2, 1]).count(), 1);
        assert_eq!(triangles_iter(&verts, &[0, 1, 3]).count(), 0);
    }
}
