use crate::{
    color::Color,
    math::perspective,
    sampler::{TextureEdge, TextureFilter},
    vec::{Mat4x4, Vec3},
    Texel, Vertex,
};

pub mod lit;
pub mod textured;

pub use lit::{LitVertexShader, MvpVertexShader};
pub use textured::TexturedPixelShader;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionalLight {
    pub direction: Vec3,
    pub color: Color,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Color,
    /// Distance at which the light has faded out completely.
    pub radius: f32,
}

/// Everything the shaders and the rasterizer read while drawing. Nothing in here is validated.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderContext {
    pub world: Mat4x4,
    pub view: Mat4x4,
    pub projection: Mat4x4,
    pub directional_light: DirectionalLight,
    pub point_light: PointLight,
    pub ambient: f32,
    pub texture_filter: TextureFilter,
    pub texture_edge: TextureEdge,
    pub max_mip_level: usize,
    pub near: f32,
    pub far: f32,
    pub camera_forward: Vec3,
}

impl Default for RenderContext {
    fn default() -> Self {
        let (near, far) = (0.1, 100.);
        RenderContext {
            world: Mat4x4::identity(),
            view: Mat4x4::identity(),
            projection: perspective(720., 500., 90., near, far),
            directional_light: DirectionalLight {
                direction: Vec3::from([-0.577, -0.577, 0.577]),
                color: 0xffc0_c0f0,
            },
            point_light: PointLight {
                position: Vec3::from([-1., 0.5, 1.]),
                color: 0xffff_ff00,
                radius: 10.,
            },
            ambient: 0.3,
            texture_filter: TextureFilter::default(),
            texture_edge: TextureEdge::default(),
            max_mip_level: 0,
            near,
            far,
            camera_forward: Vec3::from([0., 0., 1.]),
        }
    }
}

/// Runs once per vertex per draw call, turning a local space vertex into clip space.
pub trait VertexShader {
    fn apply(&self, ctx: &RenderContext, vertex: &mut Vertex);
}

/// Runs once per fragment that survived rasterization and decides its final color.
pub trait PixelShader {
    fn shade(&self, ctx: &RenderContext, texel: &Texel, color: &mut Color);

    /// Whether the shader reads from a texture, in which case the rasterizer modulates its
    /// output with the interpolated vertex lighting.
    fn samples_texture(&self) -> bool {
        false
    }
}

impl<F> VertexShader for F
where
    F: Fn(&RenderContext, &mut Vertex),
{
    fn apply(&self, ctx: &RenderContext, vertex: &mut Vertex) {
        self(ctx, vertex)
    }
}

impl<F> PixelShader for F
where
    F: Fn(&RenderContext, &Texel, &mut Color),
{
    fn shade(&self, ctx: &RenderContext, texel: &Texel, color: &mut Color) {
        self(ctx, texel, color)
    }
}

/// Paints every fragment with the same color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SolidColor(pub Color);

impl PixelShader for SolidColor {
    fn shade(&self, _ctx: &RenderContext, _texel: &Texel, color: &mut Color) {
        *color = self.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{BLUE, RED};

    #[test]
    fn closures_are_shaders() {
        let ctx = RenderContext::default();
        let bump = |_: &RenderContext, v: &mut Vertex| v.position.x += 1.;
        let mut v = Vertex::default();
        bump.apply(&ctx, &mut v);
        assert_eq!(v.position.x, 1.);

        let blue = |_: &RenderContext, _: &Texel, c: &mut Color| *c = BLUE;
        let texel = Texel {
            x: 0,
            y: 0,
            depth: 0.,
            w: 1.,
            uv: crate::vec::Vec2::zero(),
            color: RED,
            mip_level: 0.,
        };
        let mut color = RED;
        blue.shade(&ctx, &texel, &mut color);
        assert_eq!(color, BLUE);
        assert!(!blue.samples_texture());

        SolidColor(RED).shade(&ctx, &texel, &mut color);
        assert_eq!(color, RED);
    }
}
