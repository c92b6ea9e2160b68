use crate::{
    buf::Framebuffer,
    color::lerp_color,
    math::lerp,
    shaders::{PixelShader, RenderContext},
    vec::Vec2,
    Texel,
};

use super::ScreenVertex;

/// Parametric line stepping along the dominant axis, both endpoints included. Depth, color and
/// UV are interpolated linearly. Returns how many pixels were written.
pub fn draw_line_parametric(
    fb: &mut Framebuffer,
    ctx: &RenderContext,
    shader: Option<&dyn PixelShader>,
    start: ScreenVertex,
    end: ScreenVertex,
) -> usize {
    let (dx, dy) = (end.x() - start.x(), end.y() - start.y());
    let x_major = dx.abs() >= dy.abs();
    let (steps, major_dir) = if x_major {
        (dx.abs(), dx.signum())
    } else {
        (dy.abs(), dy.signum())
    };
    // Nearest pixel on the minor axis, ties broken towards the end of the line.
    let minor_forward = if x_major { dy >= 0 } else { dx >= 0 };
    let round_minor = |v: f32| {
        if minor_forward {
            (v + 0.5).floor() as i32
        } else {
            (v - 0.5).ceil() as i32
        }
    };

    let mut written = 0;
    for step in 0..=steps {
        let ratio = if steps == 0 { 0. } else { step as f32 / steps as f32 };
        let (x, y) = if x_major {
            let y = lerp(start.pos.y, end.pos.y, ratio);
            (start.x() + step * major_dir, round_minor(y))
        } else {
            let x = lerp(start.pos.x, end.pos.x, ratio);
            (round_minor(x), start.y() + step * major_dir)
        };

        let depth = lerp(start.z, end.z, ratio);
        let mut color = lerp_color(start.color, end.color, ratio);
        if let Some(shader) = shader {
            let texel = Texel {
                x,
                y,
                depth,
                w: lerp(start.w, end.w, ratio),
                uv: Vec2::from([
                    lerp(start.uv.x, end.uv.x, ratio),
                    lerp(start.uv.y, end.uv.y, ratio),
                ]),
                color,
                mip_level: 0.,
            };
            shader.shade(ctx, &texel, &mut color);
        }

        if fb.write_pixel(x, y, depth, color) {
            written += 1;
        }
    }
    written
}
