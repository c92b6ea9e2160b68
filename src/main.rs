use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use rasterpipe::{
    color::Color,
    config::Scene,
    mesh::{grid_lines, Mesh},
    sampler::MipChain,
    shaders::{LitVertexShader, MvpVertexShader, TexturedPixelShader},
    texture::Texture,
    vec::Mat4x4,
    Framebuffer, Pipeline, RenderContext,
};

const GRID_COLOR: Color = 0xff5a_5a5a;
const GRID_HALF_CELLS: i32 = 5;

/// Renders a single frame of a scene into a PNG file.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Scene description in TOML. Defaults are used for everything when omitted.
    #[arg(short, long)]
    scene: Option<PathBuf>,

    #[arg(short, long, default_value = "frame.png")]
    output: PathBuf,

    /// Log debug messages.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let scene = match &args.scene {
        Some(path) => Scene::load_toml(path)?,
        None => Scene::default(),
    };
    let rendering = scene.rendering;

    let mut fb = Framebuffer::new(rendering.width, rendering.height)
        .context("invalid framebuffer size")?;
    fb.clear(rendering.clear_color);

    let mips = match &scene.texture {
        Some(texture) => Some(MipChain::build(Texture::from_image(&texture.path)?)),
        None => None,
    };
    let mesh = match scene.model.as_ref().and_then(|model| model.path.as_ref()) {
        Some(path) => Mesh::load_obj(path)?,
        None => Mesh::cube(),
    };

    let ctx = scene.render_context(mips.as_ref().map_or(0, MipChain::max_level));

    if rendering.grid {
        let grid_ctx = RenderContext {
            world: Mat4x4::identity(),
            ..ctx.clone()
        };
        let mut pipeline = Pipeline::new(&mut fb, &grid_ctx).with_vertex_shader(&MvpVertexShader);
        for [start, end] in grid_lines(GRID_HALF_CELLS, 1., GRID_COLOR) {
            pipeline.draw_line(&start, &end);
        }
        log::debug!("grid {}", pipeline.metrics());
    }

    let textured = mips.as_ref().map(TexturedPixelShader::new);
    let mut pipeline = Pipeline::new(&mut fb, &ctx)
        .with_vertex_shader(&LitVertexShader)
        .with_mode(rendering.mode)
        .with_culling(rendering.cull_mode)
        .with_outline(rendering.outline_color)
        .with_normals(rendering.show_normals);
    if let Some(shader) = &textured {
        pipeline = pipeline.with_pixel_shader(shader);
    }
    let visible = pipeline.draw_indexed(&mesh.vertices, &mesh.indices);
    log::debug!("{visible} of {} triangles in front of the camera", mesh.indices.len() / 3);
    log::info!("{}", pipeline.metrics());

    image::save_buffer(
        &args.output,
        &fb.to_rgba_bytes(),
        fb.width() as u32,
        fb.height() as u32,
        image::ColorType::Rgba8,
    )
    .with_context(|| format!("failed to write {:?}", args.output))?;
    log::info!("wrote {:?}", args.output);

    Ok(())
}
