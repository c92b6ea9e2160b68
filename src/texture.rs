use std::{
    ops::{Index, IndexMut},
    path::Path,
};

use anyhow::Context;
use thiserror::Error;

use crate::color::{self, Color};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TextureError {
    #[error("texture dimensions must be non-zero, got {width}x{height}")]
    ZeroSized { width: usize, height: usize },
    #[error("a {width}x{height} texture got {len} pixels")]
    SizeMismatch {
        width: usize,
        height: usize,
        len: usize,
    },
}

/// A row major, owned 2D grid. Pixel `(x, y)` lives at `y * width + x`.
#[derive(Clone, Debug, PartialEq)]
pub struct Texture<T> {
    width: usize,
    height: usize,
    storage: Box<[T]>,
}

impl<T> Texture<T> {
    pub fn from_vec(width: usize, height: usize, pixels: Vec<T>) -> Result<Self, TextureError> {
        if width == 0 || height == 0 {
            return Err(TextureError::ZeroSized { width, height });
        }
        if pixels.len() != width * height {
            return Err(TextureError::SizeMismatch {
                width,
                height,
                len: pixels.len(),
            });
        }
        Ok(Texture {
            width,
            height,
            storage: pixels.into_boxed_slice(),
        })
    }

    pub fn filled(width: usize, height: usize, value: T) -> Result<Self, TextureError>
    where
        T: Clone,
    {
        Self::from_vec(width, height, vec![value; width * height])
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    pub fn get(&self, x: usize, y: usize) -> Option<&T> {
        if x < self.width && y < self.height {
            self.storage.get(y * self.width + x)
        } else {
            None
        }
    }

    pub fn as_slice(&self) -> &[T] {
        &self.storage
    }

    pub fn as_slice_mut(&mut self) -> &mut [T] {
        &mut self.storage
    }

    pub fn fill(&mut self, value: T)
    where
        T: Clone,
    {
        self.storage.fill(value);
    }
}

impl Texture<Color> {
    /// Decodes an image file (PNG or JPEG) into ARGB pixels.
    pub fn from_image(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let img = image::open(path)
            .with_context(|| format!("failed to decode texture {}", path.display()))?
            .into_rgba8();
        let (width, height) = img.dimensions();
        let pixels = img.pixels().map(|px| color::from_rgba_bytes(px.0)).collect();
        let texture = Texture::from_vec(width as usize, height as usize, pixels)
            .with_context(|| format!("texture {} has no pixels", path.display()))?;
        log::debug!("loaded texture {} ({width}x{height})", path.display());
        Ok(texture)
    }

    /// Builds a texture from raw pixels laid out as `0xBBGGRRAA` words.
    pub fn from_bgra(width: usize, height: usize, pixels: &[u32]) -> Result<Self, TextureError> {
        Texture::from_vec(width, height, pixels.iter().copied().map(color::bgra_to_argb).collect())
    }
}

impl<T> Index<(usize, usize)> for Texture<T> {
    type Output = T;

    fn index(&self, (x, y): (usize, usize)) -> &T {
        assert!(x < self.width && y < self.height, "texture index ({x}, {y}) out of bounds");
        &self.storage[y * self.width + x]
    }
}

impl<T> IndexMut<(usize, usize)> for Texture<T> {
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut T {
        assert!(x < self.width && y < self.height, "texture index ({x}, {y}) out of bounds");
        &mut self.storage[y * self.width + x]
    }
}
