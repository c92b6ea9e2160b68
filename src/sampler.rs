//! Mip chains and the three texture filters.

use rayon::prelude::*;
use serde::Deserialize;

use crate::{
    color::{lerp_color, Color, BLACK},
    texture::Texture,
    vec::Vec2,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextureFilter {
    #[default]
    Nearest,
    Bilinear,
    Trilinear,
}

/// What happens to texel coordinates that fall outside the texture.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextureEdge {
    /// The row major index is taken modulo the pixel count, so running off the right edge
    /// continues on the next row.
    #[default]
    Wrap,
    Clamp,
}

/// A base texture followed by successively halved copies of it.
#[derive(Clone, Debug)]
pub struct MipChain {
    levels: Vec<Texture<Color>>,
}

impl MipChain {
    pub fn build(base: Texture<Color>) -> Self {
        let (base_width, base_height) = (base.width(), base.height());
        let mut levels = vec![base];

        while let Some(prev) = levels.last() {
            if prev.width() <= 1 || prev.height() <= 1 {
                break;
            }
            let Some(next) = downsample(prev) else { break };
            levels.push(next);
        }

        log::debug!(
            "built mip chain for {base_width}x{base_height} texture with {} levels",
            levels.len()
        );
        MipChain { levels }
    }

    pub fn levels(&self) -> &[Texture<Color>] {
        &self.levels
    }

    pub fn max_level(&self) -> usize {
        self.levels.len() - 1
    }

    /// The requested level, or the smallest one if `level` is past the end.
    pub fn level(&self, level: usize) -> &Texture<Color> {
        &self.levels[level.min(self.max_level())]
    }

    pub fn sample(&self, uv: Vec2, level: f32, filter: TextureFilter, edge: TextureEdge) -> Color {
        let level = level.max(0.);
        let base = self.level(level as usize);
        match filter {
            TextureFilter::Nearest => sample_nearest(base, uv, edge),
            TextureFilter::Bilinear => sample_bilinear(base, uv, edge),
            TextureFilter::Trilinear => {
                let coarser = self.level(level as usize + 1);
                lerp_color(
                    sample_bilinear(base, uv, edge),
                    sample_bilinear(coarser, uv, edge),
                    level.fract(),
                )
            }
        }
    }
}

/// 2x2 box filter of `src` into a texture half its size.
fn downsample(src: &Texture<Color>) -> Option<Texture<Color>> {
    let (src_width, len) = (src.width(), src.len());
    let mut dst = Texture::filled(src_width / 2, src.height() / 2, BLACK).ok()?;
    let dst_width = dst.width();
    let src = src.as_slice();

    dst.as_slice_mut()
        .par_chunks_mut(dst_width)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, texel) in row.iter_mut().enumerate() {
                let pos = 2 * y * src_width + 2 * x;
                let next = (pos + 1) % len;
                let bottom = (pos + src_width) % len;
                let diagonal = (bottom + 1) % len;

                let top = lerp_color(src[pos], src[next], 0.5);
                let low = lerp_color(src[bottom], src[diagonal], 0.5);
                *texel = lerp_color(top, low, 0.5);
            }
        });

    Some(dst)
}

fn texel(tex: &Texture<Color>, x: i64, y: i64, edge: TextureEdge) -> Color {
    let (width, height) = (tex.width() as i64, tex.height() as i64);
    let index = match edge {
        TextureEdge::Wrap => {
            // Coordinates can be anywhere in `i64`, reduce them before combining.
            let len = tex.len() as i64;
            (y.rem_euclid(len) * width % len + x.rem_euclid(len)) % len
        }
        TextureEdge::Clamp => y.clamp(0, height - 1) * width + x.clamp(0, width - 1),
    };
    tex.as_slice()[index as usize]
}

fn texel_coords(tex: &Texture<Color>, uv: Vec2) -> (f32, f32) {
    (uv.x * tex.width() as f32, uv.y * tex.height() as f32)
}

pub fn sample_nearest(tex: &Texture<Color>, uv: Vec2, edge: TextureEdge) -> Color {
    let (u, v) = texel_coords(tex, uv);
    texel(tex, u as i64, v as i64, edge)
}

pub fn sample_bilinear(tex: &Texture<Color>, uv: Vec2, edge: TextureEdge) -> Color {
    let (u, v) = texel_coords(tex, uv);
    let (x, y) = (u as i64, v as i64);
    let (x1, y1) = (x.saturating_add(1), y.saturating_add(1));
    let (u_ratio, v_ratio) = (u - x as f32, v - y as f32);

    let top = lerp_color(texel(tex, x, y, edge), texel(tex, x1, y, edge), u_ratio);
    let bottom = lerp_color(texel(tex, x, y1, edge), texel(tex, x1, y1, edge), u_ratio);
    lerp_color(top, bottom, v_ratio)
}
