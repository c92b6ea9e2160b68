//! Edge walking triangle fill.
//!
//! Every scanline starts on the long edge `ca` and walks towards the opposite edges. Pixels still
//! outside edge `ab` (negative `β`) are skipped, pixels inside are shaded, and the first pixel past
//! the far edge ends the scanline.

use crate::{
    buf::Framebuffer,
    color::{berp_color, berp_color_perspective, modulate_colors, Color},
    math::{barycentric, barycentric_distances, berp, implicit_line, is_inside, lerp, remap},
    shaders::{PixelShader, RenderContext},
    vec::{Vec2, Vec3},
    Texel,
};

use super::ScreenVertex;

/// How a filled triangle picks its fragment colors.
#[derive(Clone, Copy)]
pub enum Shading<'s> {
    /// Perspective-correct interpolation of the vertex colors. No pixel shader runs.
    VertexColor,
    /// The pixel shader decides, starting from the interpolated vertex color. Shaders that sample
    /// a texture get their output modulated by that color.
    Shader(Option<&'s dyn PixelShader>),
}

/// Reorders the vertices so that `a` is the topmost and `c` the bottommost. Ties keep the
/// earlier vertex first.
fn sort_by_y(tri: [ScreenVertex; 3]) -> [ScreenVertex; 3] {
    let [mut a, mut b, mut c] = tri;
    let min_y = a.pos.y.min(b.pos.y).min(c.pos.y);
    if a.pos.y != min_y {
        if b.pos.y == min_y {
            std::mem::swap(&mut a, &mut b);
        } else {
            std::mem::swap(&mut a, &mut c);
        }
    }
    if b.pos.y > c.pos.y {
        std::mem::swap(&mut b, &mut c);
    }
    [a, b, c]
}

/// Fills a screen space triangle. Returns the number of fragments that passed the depth test, or
/// `None` when the triangle has no area.
pub fn fill_triangle(
    fb: &mut Framebuffer,
    ctx: &RenderContext,
    shading: Shading,
    tri: [ScreenVertex; 3],
) -> Option<usize> {
    let [a, b, c] = sort_by_y(tri);

    let dist = barycentric_distances(a.pos, b.pos, c.pos);
    if dist.x == 0. || dist.y == 0. || dist.z == 0. {
        return None;
    }

    let dir = if implicit_line(c.pos, a.pos, b.pos) > 0. { 1 } else { -1 };
    let (width, height) = (fb.width() as i32, fb.height() as i32);
    let long_edge_dy = c.pos.y - a.pos.y;
    let mut written = 0;

    for y in a.y().max(0)..=c.y().min(height - 1) {
        let ratio = (y as f32 - a.pos.y) / long_edge_dy;
        let mut x = lerp(a.pos.x, c.pos.x, ratio).round() as i32;

        loop {
            if x < 0 || x >= width {
                // Off the side we're heading towards: nothing left on this scanline.
                if (x < 0) == (dir < 0) {
                    break;
                }
                x = x.clamp(0, width - 1);
            }

            let w = barycentric(a.pos, b.pos, c.pos, dist, Vec2::from([x as f32, y as f32]));
            if w.y < 0. {
                x += dir;
            } else if is_inside(w) {
                let (depth, color) = shade_fragment(ctx, shading, [&a, &b, &c], w, x, y);
                if fb.write_pixel(x, y, depth, color) {
                    written += 1;
                }
                x += dir;
            } else {
                break;
            }
        }
    }

    Some(written)
}

fn shade_fragment(
    ctx: &RenderContext,
    shading: Shading,
    [a, b, c]: [&ScreenVertex; 3],
    w: Vec3,
    x: i32,
    y: i32,
) -> (f32, Color) {
    let depth = berp(a.z, b.z, c.z, w);
    let inv_w = Vec3::from([1. / a.w, 1. / b.w, 1. / c.w]);

    let color = match shading {
        Shading::VertexColor => berp_color_perspective(a.color, b.color, c.color, w, inv_w),
        Shading::Shader(shader) => {
            let lighting = berp_color(a.color, b.color, c.color, w);
            let Some(shader) = shader else {
                return (depth, lighting);
            };

            let inv_w_interp = berp(inv_w.x, inv_w.y, inv_w.z, w);
            let correct = |v0: f32, v1: f32, v2: f32| {
                berp(v0 * inv_w.x, v1 * inv_w.y, v2 * inv_w.z, w) / inv_w_interp
            };
            let view_w = berp(a.w, b.w, c.w, w);
            let max_level = ctx.max_mip_level as f32;
            let mip_level =
                remap(view_w, ctx.near..ctx.far, 0.0..max_level).clamp(0., max_level);

            let texel = Texel {
                x,
                y,
                depth,
                w: view_w,
                uv: Vec2::from([
                    correct(a.uv.x, b.uv.x, c.uv.x),
                    correct(a.uv.y, b.uv.y, c.uv.y),
                ]),
                color: lighting,
                mip_level,
            };

            let mut color = lighting;
            shader.shade(ctx, &texel, &mut color);
            if shader.samples_texture() {
                modulate_colors(color, lighting)
            } else {
                color
            }
        }
    };

    (depth, color)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{green, red, BLACK, RED, WHITE};
    use std::cell::{Cell, RefCell};

    fn sv(x: f32, y: f32, z: f32) -> ScreenVertex {
        ScreenVertex {
            pos: Vec2::from([x, y]),
            z,
            w: 1.,
            uv: Vec2::zero(),
            color: RED,
        }
    }

    fn painted(fb: &Framebuffer) -> Vec<(usize, usize)> {
        let mut ret = Vec::new();
        for y in 0..fb.height() {
            for x in 0..fb.width() {
                if fb.pixel(x, y) != Some(BLACK) {
                    ret.push((x, y));
                }
            }
        }
        ret
    }

    #[test]
    fn sorting_keeps_ties_in_order() {
        let [a, b, c] = sort_by_y([sv(0., 2., 0.), sv(2., 2., 0.), sv(1., 0., 0.)]);
        assert_eq!((a.x(), a.y()), (1, 0));
        assert_eq!((b.x(), b.y()), (2, 2));
        assert_eq!((c.x(), c.y()), (0, 2));
    }

    #[test]
    fn fills_a_small_triangle() {
        let mut fb = Framebuffer::new(4, 4).unwrap();
        let ctx = RenderContext::default();
        let tri = [sv(0., 2., 0.5), sv(2., 2., 0.5), sv(1., 0., 0.5)];
        let written = fill_triangle(&mut fb, &ctx, Shading::Shader(None), tri);
        assert_eq!(written, Some(5));
        assert_eq!(painted(&fb), [(1, 0), (1, 1), (0, 2), (1, 2), (2, 2)]);
        assert_eq!(fb.pixel(1, 1), Some(RED));
    }

    #[test]
    fn zero_area_is_skipped() {
        let mut fb = Framebuffer::new(4, 4).unwrap();
        let ctx = RenderContext::default();
        let tri = [sv(0., 0., 0.5), sv(1., 1., 0.5), sv(2., 2., 0.5)];
        assert_eq!(fill_triangle(&mut fb, &ctx, Shading::VertexColor, tri), None);
        assert!(painted(&fb).is_empty());
    }

    #[test]
    fn oversized_triangle_is_clamped_to_screen() {
        let mut fb = Framebuffer::new(8, 6).unwrap();
        let ctx = RenderContext::default();
        let tri = [sv(-50., -40., 0.5), sv(90., -30., 0.5), sv(4., 80., 0.5)];
        let written = fill_triangle(&mut fb, &ctx, Shading::VertexColor, tri);
        assert_eq!(written, Some(48));
        assert_eq!(painted(&fb).len(), 48);
    }

    /// Every pixel whose center has barycentrics inside the triangle.
    fn covered_pixels(tri: [ScreenVertex; 3], width: usize, height: usize) -> Vec<(usize, usize)> {
        let [a, b, c] = sort_by_y(tri);
        let dist = barycentric_distances(a.pos, b.pos, c.pos);
        let mut ret = Vec::new();
        for y in 0..height {
            for x in 0..width {
                let t = Vec2::from([x as f32, y as f32]);
                if is_inside(barycentric(a.pos, b.pos, c.pos, dist, t)) {
                    ret.push((x, y));
                }
            }
        }
        ret
    }

    #[test]
    fn fill_matches_pixel_coverage() {
        let tris = [
            [(-5., 21.), (-5., 20.), (16., 14.)],
            [(3., 1.), (22., 9.), (0., 23.)],
            [(30., -4.), (-6., 12.), (17., 27.)],
            [(11., 2.), (12., 21.), (10., 9.)],
        ];
        for tri in tris {
            let mut fb = Framebuffer::new(24, 24).unwrap();
            let ctx = RenderContext::default();
            let tri = tri.map(|(x, y)| sv(x, y, 0.5));
            fill_triangle(&mut fb, &ctx, Shading::VertexColor, tri);
            assert_eq!(painted(&fb), covered_pixels(tri, 24, 24), "{:?}", tri.map(|v| v.pos));
        }
    }

    #[test]
    fn pixel_shader_sees_each_fragment_once() {
        let mut fb = Framebuffer::new(16, 16).unwrap();
        let ctx = RenderContext::default();
        let seen = RefCell::new(Vec::new());
        let shader = |_: &RenderContext, texel: &Texel, color: &mut Color| {
            seen.borrow_mut().push((texel.x, texel.y));
            *color = WHITE;
        };
        let tri = [sv(1., 1., 0.2), sv(14., 3., 0.2), sv(6., 13., 0.2)];
        let written = fill_triangle(&mut fb, &ctx, Shading::Shader(Some(&shader)), tri);

        let mut seen = seen.into_inner();
        assert_eq!(written, Some(seen.len()));
        let len = seen.len();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), len);
        assert!(fb.pixels().iter().all(|&c| c == WHITE || c == BLACK));
    }

    #[test]
    fn uv_interpolation_is_perspective_correct() {
        let mut fb = Framebuffer::new(3, 3).unwrap();
        let ctx = RenderContext::default();
        let uvs = RefCell::new(Vec::new());
        let shader = |_: &RenderContext, texel: &Texel, _: &mut Color| {
            uvs.borrow_mut().push((texel.x, texel.y, texel.uv.x));
        };
        let mut near = sv(0., 0., 0.5);
        let mut far = sv(2., 0., 0.5);
        let mut bottom = sv(0., 2., 0.5);
        far.w = 3.;
        far.uv = Vec2::from([1., 0.]);
        near.uv = Vec2::from([0., 0.]);
        bottom.uv = Vec2::from([0., 0.]);
        fill_triangle(&mut fb, &ctx, Shading::Shader(Some(&shader)), [near, far, bottom]);

        let uvs = uvs.into_inner();
        let &(_, _, mid) = uvs
            .iter()
            .find(|&&(x, y, _)| (x, y) == (1, 0))
            .expect("midpoint of the top edge is covered");
        // Half way in screen space is only a quarter of the way in texture space.
        assert!((mid - 0.25).abs() < 1e-5, "{mid}");
    }

    #[test]
    fn mip_level_follows_view_distance() {
        let mut fb = Framebuffer::new(4, 4).unwrap();
        let ctx = RenderContext {
            near: 1.,
            far: 5.,
            max_mip_level: 4,
            ..RenderContext::default()
        };
        let levels = RefCell::new(Vec::new());
        let shader = |_: &RenderContext, texel: &Texel, _: &mut Color| {
            levels.borrow_mut().push(texel.mip_level);
        };
        let tri = [sv(0., 0., 0.5), sv(3., 0., 0.5), sv(0., 3., 0.5)].map(|mut v| {
            v.w = 3.;
            v
        });
        fill_triangle(&mut fb, &ctx, Shading::Shader(Some(&shader)), tri);

        let levels = levels.into_inner();
        assert!(!levels.is_empty());
        assert!(levels.iter().all(|&l| (l - 2.).abs() < 1e-5), "{levels:?}");

        let far_away = tri.map(|mut v| {
            v.w = 50.;
            v
        });
        let mut fb = Framebuffer::new(4, 4).unwrap();
        let clamped = Cell::new(0.);
        let shader =
            |_: &RenderContext, texel: &Texel, _: &mut Color| clamped.set(texel.mip_level);
        fill_triangle(&mut fb, &ctx, Shading::Shader(Some(&shader)), far_away);
        assert_eq!(clamped.get(), 4.);
    }

    #[test]
    fn vertex_colors_are_perspective_correct() {
        let mut fb = Framebuffer::new(3, 3).unwrap();
        let ctx = RenderContext::default();
        let mut near = sv(0., 0., 0.5);
        let mut far = sv(2., 0., 0.5);
        let mut bottom = sv(0., 2., 0.5);
        near.color = BLACK;
        bottom.color = BLACK;
        far.color = RED;
        far.w = 3.;
        fill_triangle(&mut fb, &ctx, Shading::VertexColor, [near, far, bottom]);

        let mid = fb.pixel(1, 0).expect("in bounds");
        // A quarter of full red, where affine interpolation would give half.
        assert!((red(mid) as i32 - 64).abs() <= 1, "{mid:#010x}");
        assert_eq!(green(mid), 0);
        assert_eq!(fb.pixel(2, 0), Some(RED));
    }
}
