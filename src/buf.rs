use crate::{
    color::{self, blend_color, Color, BLACK},
    texture::{Texture, TextureError},
};

/// Depth of a freshly cleared depth buffer.
pub const FAR_DEPTH: f32 = 1.0;

/// The color and depth buffers that every draw call ends up writing into.
#[derive(Clone, Debug)]
pub struct Framebuffer {
    color: Texture<Color>,
    depth: Texture<f32>,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Result<Self, TextureError> {
        Ok(Framebuffer {
            color: Texture::filled(width, height, BLACK)?,
            depth: Texture::filled(width, height, FAR_DEPTH)?,
        })
    }

    pub fn width(&self) -> usize {
        self.color.width()
    }

    pub fn height(&self) -> usize {
        self.color.height()
    }

    pub fn clear(&mut self, color: Color) {
        self.color.fill(color);
        self.depth.fill(FAR_DEPTH);
    }

    /// Depth tested write of a single fragment. Returns whether anything was written.
    ///
    /// Fragments outside the buffer are dropped. A fragment passes when its depth is not
    /// farther than the stored one, so a NaN depth never passes. Colors that are not fully
    /// opaque are blended over the stored color.
    pub fn write_pixel(&mut self, x: i32, y: i32, depth: f32, color: Color) -> bool {
        if x < 0 || y < 0 || x as usize >= self.width() || y as usize >= self.height() {
            return false;
        }
        let pos = (x as usize, y as usize);

        let stored = &mut self.depth[pos];
        if !(depth <= *stored) {
            return false;
        }
        *stored = depth;

        let dst = &mut self.color[pos];
        *dst = if color::is_opaque(color) {
            color
        } else {
            blend_color(*dst, color)
        };
        true
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Color> {
        self.color.get(x, y).copied()
    }

    pub fn depth_at(&self, x: usize, y: usize) -> Option<f32> {
        self.depth.get(x, y).copied()
    }

    /// Row major ARGB pixels.
    pub fn pixels(&self) -> &[Color] {
        self.color.as_slice()
    }

    /// The color buffer as tightly packed RGBA8, ready for an image encoder.
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        self.pixels()
            .iter()
            .flat_map(|&c| color::to_rgba_bytes(c))
            .collect()
    }
}
