use crate::{
    color::Color,
    sampler::MipChain,
    shaders::{PixelShader, RenderContext},
    Texel,
};

/// Samples a mip chain at the fragment's UV, using the context's filter and edge mode.
#[derive(Clone, Copy, Debug)]
pub struct TexturedPixelShader<'a> {
    mips: &'a MipChain,
}

impl<'a> TexturedPixelShader<'a> {
    pub fn new(mips: &'a MipChain) -> Self {
        TexturedPixelShader { mips }
    }
}

impl<'a> PixelShader for TexturedPixelShader<'a> {
    fn shade(&self, ctx: &RenderContext, texel: &Texel, color: &mut Color) {
        *color = self
            .mips
            .sample(texel.uv, texel.mip_level, ctx.texture_filter, ctx.texture_edge);
    }

    fn samples_texture(&self) -> bool {
        true
    }
}
