//! Packed 32-bit ARGB colors (alpha in the top byte) and the arithmetic the rasterizer does on them.

use crate::math::{berp, lerp};
use crate::vec::Vec3;

pub type Color = u32;

pub const ALPHA_CHANNEL: Color = 0xff00_0000;
pub const RED_CHANNEL: Color = 0x00ff_0000;
pub const GREEN_CHANNEL: Color = 0x0000_ff00;
pub const BLUE_CHANNEL: Color = 0x0000_00ff;

pub const BLACK: Color = ALPHA_CHANNEL;
pub const RED: Color = RED_CHANNEL | ALPHA_CHANNEL;
pub const GREEN: Color = GREEN_CHANNEL | ALPHA_CHANNEL;
pub const BLUE: Color = BLUE_CHANNEL | ALPHA_CHANNEL;
pub const WHITE: Color = RED | GREEN | BLUE;

#[inline(always)]
pub fn alpha(color: Color) -> u32 {
    color >> 24
}

#[inline(always)]
pub fn red(color: Color) -> u32 {
    (color >> 16) & 0xff
}

#[inline(always)]
pub fn green(color: Color) -> u32 {
    (color >> 8) & 0xff
}

#[inline(always)]
pub fn blue(color: Color) -> u32 {
    color & 0xff
}

#[inline(always)]
pub fn from_argb(a: u32, r: u32, g: u32, b: u32) -> Color {
    (a.min(255) << 24) | (r.min(255) << 16) | (g.min(255) << 8) | b.min(255)
}

#[inline(always)]
fn channels(color: Color) -> [f32; 4] {
    [alpha(color), red(color), green(color), blue(color)].map(|chan| chan as f32)
}

#[inline(always)]
fn to_channel(value: f32) -> u32 {
    value.clamp(0., 255.) as u32
}

#[inline(always)]
fn round_channel(value: f32) -> u32 {
    to_channel(value.round())
}

pub fn is_opaque(color: Color) -> bool {
    color & ALPHA_CHANNEL == ALPHA_CHANNEL
}

/// Interpolates the red, green and blue channels. The result is always fully opaque.
pub fn lerp_color(start: Color, end: Color, ratio: f32) -> Color {
    let [_, r0, g0, b0] = channels(start);
    let [_, r1, g1, b1] = channels(end);
    from_argb(
        255,
        to_channel(lerp(r0, r1, ratio)),
        to_channel(lerp(g0, g1, ratio)),
        to_channel(lerp(b0, b1, ratio)),
    )
}

/// Alpha-over blending of `src` onto `dst`. All four channels, alpha included, are mixed by
/// `src`'s alpha.
pub fn blend_color(dst: Color, src: Color) -> Color {
    let factor = alpha(src) as f32 / 255.;
    let dst = channels(dst);
    let src = channels(src);
    let [a, r, g, b] = [0, 1, 2, 3].map(|i| to_channel(lerp(dst[i], src[i], factor)));
    from_argb(a, r, g, b)
}

/// Per-channel saturating sum.
pub fn add_color(lhs: Color, rhs: Color) -> Color {
    from_argb(
        alpha(lhs) + alpha(rhs),
        red(lhs) + red(rhs),
        green(lhs) + green(rhs),
        blue(lhs) + blue(rhs),
    )
}

/// Per-channel product with every channel normalized to `[0, 1]`.
pub fn modulate_colors(lhs: Color, rhs: Color) -> Color {
    let lhs = channels(lhs);
    let rhs = channels(rhs);
    let [a, r, g, b] = [0, 1, 2, 3].map(|i| to_channel(lhs[i] * rhs[i] / 255.));
    from_argb(a, r, g, b)
}

/// Barycentric interpolation of three colors. Channels are rounded and clamped, alpha is opaque.
pub fn berp_color(c0: Color, c1: Color, c2: Color, w: Vec3) -> Color {
    let [_, r0, g0, b0] = channels(c0);
    let [_, r1, g1, b1] = channels(c1);
    let [_, r2, g2, b2] = channels(c2);
    from_argb(
        255,
        round_channel(berp(r0, r1, r2, w)),
        round_channel(berp(g0, g1, g2, w)),
        round_channel(berp(b0, b1, b2, w)),
    )
}

/// Perspective-correct version of [`berp_color`]: every vertex color is weighted by the
/// vertex's `1/w`, and the sum is divided by the interpolated `1/w`.
pub fn berp_color_perspective(c0: Color, c1: Color, c2: Color, w: Vec3, inv_w: Vec3) -> Color {
    let inv_w_interp = berp(inv_w.x, inv_w.y, inv_w.z, w);
    if inv_w_interp == 0. {
        return berp_color(c0, c1, c2, w);
    }
    let scale = 1. / inv_w_interp;
    let [_, r0, g0, b0] = channels(c0);
    let [_, r1, g1, b1] = channels(c1);
    let [_, r2, g2, b2] = channels(c2);
    let chan = |v0: f32, v1: f32, v2: f32| {
        round_channel(berp(v0 * inv_w.x, v1 * inv_w.y, v2 * inv_w.z, w) * scale)
    };
    from_argb(255, chan(r0, r1, r2), chan(g0, g1, g2), chan(b0, b1, b2))
}

/// Swizzles a texel stored as `0xBBGGRRAA` into `0xAARRGGBB`.
pub fn bgra_to_argb(bgra: u32) -> Color {
    let red = (bgra & 0x0000_ff00) << 8;
    let green = (bgra & 0x00ff_0000) >> 8;
    let blue = (bgra & 0xff00_0000) >> 24;
    let alpha = (bgra & 0x0000_00ff) << 24;
    alpha | red | green | blue
}

/// Unpacks into the byte order image encoders expect.
pub fn to_rgba_bytes(color: Color) -> [u8; 4] {
    [red(color), green(color), blue(color), alpha(color)].map(|chan| chan as u8)
}

pub fn from_rgba_bytes([r, g, b, a]: [u8; 4]) -> Color {
    from_argb(a as u32, r as u32, g as u32, b as u32)
}
