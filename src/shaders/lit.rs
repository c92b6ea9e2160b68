use crate::{
    color::{lerp_color, BLACK},
    math::clamp01,
    shaders::{RenderContext, VertexShader},
    vec::Mat4x4,
    Vertex,
};

/// Transforms into clip space and bakes per-vertex lighting into [`Vertex::color`].
///
/// The directional light contributes by the angle between the normal and the light direction.
/// The point light adds the ambient term on top of its own angle term and fades linearly until
/// its radius.
#[derive(Clone, Copy, Debug, Default)]
pub struct LitVertexShader;

impl VertexShader for LitVertexShader {
    fn apply(&self, ctx: &RenderContext, vertex: &mut Vertex) {
        let world_pos = vertex.position * ctx.world;
        let normal = (vertex.normal * ctx.world.normal_matrix()).normalized();

        let sun = ctx.directional_light;
        let sun_ratio = clamp01((-sun.direction).normalized().dot(normal));
        let lit = lerp_color(BLACK, sun.color, sun_ratio);

        let point = ctx.point_light;
        let displacement = point.position - world_pos.xyz();
        let ratio = clamp01(clamp01(displacement.normalized().dot(normal)) + ctx.ambient);
        let attenuation = if point.radius > 0. {
            1. - clamp01(displacement.mag() / point.radius)
        } else {
            0.
        };

        vertex.color = lerp_color(lit, point.color, attenuation * ratio);
        vertex.normal = normal;
        vertex.position = world_pos * ctx.view * ctx.projection;
    }
}

/// Plain world, view, projection transform. Colors and normals pass through untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct MvpVertexShader;

impl MvpVertexShader {
    pub fn transform(ctx: &RenderContext) -> Mat4x4 {
        ctx.world * ctx.view * ctx.projection
    }
}

impl VertexShader for MvpVertexShader {
    fn apply(&self, ctx: &RenderContext, vertex: &mut Vertex) {
        vertex.position = vertex.position * Self::transform(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        color::{blue, red, WHITE},
        shaders::{DirectionalLight, PointLight},
        vec::{Vec2, Vec3},
    };

    fn context() -> RenderContext {
        RenderContext {
            projection: Mat4x4::identity(),
            directional_light: DirectionalLight {
                direction: Vec3::from([0., 0., 1.]),
                color: WHITE,
            },
            point_light: PointLight {
                position: Vec3::from([0., 0., -100.]),
                color: 0xffff_0000,
                radius: 1.,
            },
            ambient: 0.,
            ..RenderContext::default()
        }
    }

    fn facing(normal: [f32; 3]) -> Vertex {
        Vertex::new(Vec3::zero(), Vec3::from(normal), Vec2::zero(), BLACK)
    }

    #[test]
    fn directional_light_follows_the_normal() {
        let ctx = context();
        let mut toward = facing([0., 0., -1.]);
        LitVertexShader.apply(&ctx, &mut toward);
        assert_eq!(toward.color, WHITE);

        let mut away = facing([0., 0., 1.]);
        LitVertexShader.apply(&ctx, &mut away);
        assert_eq!(away.color, BLACK);
    }

    #[test]
    fn point_light_fades_with_distance() {
        let mut ctx = context();
        ctx.directional_light.color = BLACK;
        ctx.point_light.position = Vec3::from([0., 0., -0.5]);
        ctx.point_light.radius = 1.;

        let mut v = facing([0., 0., -1.]);
        LitVertexShader.apply(&ctx, &mut v);
        // Half way to the radius with the normal facing the light.
        assert!((red(v.color) as i32 - 127).abs() <= 1);
        assert_eq!(blue(v.color), 0);

        ctx.point_light.radius = 0.;
        let mut v = facing([0., 0., -1.]);
        LitVertexShader.apply(&ctx, &mut v);
        assert_eq!(v.color, BLACK);
    }

    #[test]
    fn normals_stay_perpendicular_under_uneven_scale() {
        let ctx = RenderContext {
            world: Vec3::from([2., 1., 1.]).to_scale(),
            ..context()
        };
        // The plane x + y = 0 holds the tangent (1, -1, 0).
        let mut v = facing([1., 1., 0.]);
        LitVertexShader.apply(&ctx, &mut v);
        let tangent = Vec3::from([2., -1., 0.]);
        assert!(v.normal.dot(tangent).abs() < 1e-6);
        assert!((v.normal.mag() - 1.).abs() < 1e-6);
        assert!(v.normal.x > 0. && v.normal.y > 0.);
    }

    #[test]
    fn mvp_only_moves_the_position() {
        let ctx = RenderContext {
            world: Vec3::from([1., 2., 3.]).to_translation(),
            projection: Mat4x4::identity(),
            ..RenderContext::default()
        };
        let mut v = facing([0., 1., 0.]);
        MvpVertexShader.apply(&ctx, &mut v);
        assert_eq!(v.position.to_array(), [1., 2., 3., 1.]);
        assert_eq!(v.normal.to_array(), [0., 1., 0.]);
        assert_eq!(v.color, BLACK);
    }
}
