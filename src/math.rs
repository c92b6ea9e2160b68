use std::ops::Range;

use crate::vec::{Mat4x4, Vec2, Vec3};

#[inline(always)]
pub fn lerp(start: f32, end: f32, ratio: f32) -> f32 {
    start + (end - start) * ratio
}

/// Barycentric interpolation of three values with weights `w`.
#[inline(always)]
pub fn berp(v0: f32, v1: f32, v2: f32, w: Vec3) -> f32 {
    v0 * w.x + v1 * w.y + v2 * w.z
}

#[inline(always)]
pub fn clamp01(value: f32) -> f32 {
    value.clamp(0., 1.)
}

pub fn remap(val: f32, range: Range<f32>, dest: Range<f32>) -> f32 {
    dest.start + (dest.end - dest.start) * (val - range.start) / (range.end - range.start)
}

pub fn degrees_to_radians(degrees: f32) -> f32 {
    degrees * std::f32::consts::PI / 180.
}

pub fn radians_to_degrees(radians: f32) -> f32 {
    radians * 180. / std::f32::consts::PI
}

/// Evaluates the implicit equation of the line through `p1` and `p2` at `t`.
///
/// The result is the signed area of the parallelogram spanned by `p2 - p1` and `t - p1`. Its sign
/// tells on which side of the line `t` lies and its magnitude grows with the distance to the line.
/// For a triangle ABC, `implicit_line(A, B, C)` is twice its signed area.
#[inline(always)]
pub fn implicit_line(p1: Vec2, p2: Vec2, t: Vec2) -> f32 {
    (p1.y - p2.y) * t.x + (p2.x - p1.x) * t.y + p1.x * p2.y - p1.y * p2.x
}

/// Per-vertex normalizers for [`barycentric`]: the implicit line through the opposite edge,
/// evaluated at the vertex itself. Any zero component means the triangle is degenerate.
pub fn barycentric_distances(a: Vec2, b: Vec2, c: Vec2) -> Vec3 {
    Vec3::from([
        implicit_line(b, c, a),
        implicit_line(c, a, b),
        implicit_line(a, b, c),
    ])
}

/// Barycentric coordinates of `t` in the triangle `abc`, `dist` being
/// [`barycentric_distances(a, b, c)`](barycentric_distances).
pub fn barycentric(a: Vec2, b: Vec2, c: Vec2, dist: Vec3, t: Vec2) -> Vec3 {
    Vec3::from([
        implicit_line(b, c, t) / dist.x,
        implicit_line(c, a, t) / dist.y,
        implicit_line(a, b, t) / dist.z,
    ])
}

pub fn is_inside(w: Vec3) -> bool {
    let unit = 0.0..=1.0;
    unit.contains(&w.x) && unit.contains(&w.y) && unit.contains(&w.z)
}

/// Left-handed perspective projection for row vectors. Depth after the divide goes from 0 at
/// `near` to 1 at `far`, and the clip space `w` holds the view space `z`.
pub fn perspective(width: f32, height: f32, fovy_degrees: f32, near: f32, far: f32) -> Mat4x4 {
    let y_scale = 1. / (degrees_to_radians(fovy_degrees) / 2.).tan();
    let x_scale = y_scale * height / width;
    let depth = far / (far - near);

    let mut ret = Mat4x4::zero();
    ret[(0, 0)] = x_scale;
    ret[(1, 1)] = y_scale;
    ret[(2, 2)] = depth;
    ret[(2, 3)] = 1.;
    ret[(3, 2)] = -near * depth;
    ret
}
