use serde::Deserialize;

use crate::{
    buf::Framebuffer,
    clip::{clip_line_ndc, clip_line_near, clip_triangle_near, NearClip},
    color::{Color, RED},
    prim3d::{draw_line_parametric, fill_triangle, ScreenVertex, Shading},
    shaders::{PixelShader, RenderContext, SolidColor, VertexShader},
    triangles_iter, Vertex,
};

/// Length of the debug normal lines, in local space units.
const NORMAL_LENGTH: f32 = 0.15;
/// Outline overlays are pulled this fraction of their depth towards the camera.
const OUTLINE_DEPTH_PULL: f32 = 0.25;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderMode {
    /// Triangle edges only.
    Wireframe,
    /// Filled triangles colored by the pixel shader.
    #[default]
    Textured,
    /// Filled triangles colored by the interpolated vertex lighting.
    Shaded,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CullingMode {
    FrontFace,
    #[default]
    BackFace,
    Disabled,
}

impl CullingMode {
    /// `facing` is the dot product of the triangle normal with the camera forward vector.
    fn culls(self, facing: f32) -> bool {
        match self {
            CullingMode::BackFace => facing >= 0.,
            CullingMode::FrontFace => facing <= 0.,
            CullingMode::Disabled => false,
        }
    }
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metrics {
    pub triangles_drawn: usize,
    pub backfaces_culled: usize,
    pub near_culled: usize,
    pub triangles_split: usize,
    pub degenerate: usize,
    pub lines_drawn: usize,
    pub fragments_written: usize,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

impl std::fmt::Display for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let &Metrics {
            triangles_drawn,
            backfaces_culled,
            near_culled,
            triangles_split,
            degenerate,
            lines_drawn,
            fragments_written,
        } = self;
        writeln!(f, "render metrics:")?;
        writeln!(f, "\ttriangles drawn: {triangles_drawn}")?;
        writeln!(f, "\tbackfaces culled: {backfaces_culled}")?;
        writeln!(f, "\tnear plane culled: {near_culled}")?;
        writeln!(f, "\tsplit by near plane: {triangles_split}")?;
        writeln!(f, "\tdegenerate: {degenerate}")?;
        writeln!(f, "\tlines drawn: {lines_drawn}")?;
        write!(f, "\tfragments written: {fragments_written}")
    }
}

/// Draws points, lines and triangles given in local space into a framebuffer.
///
/// The pipeline borrows everything it needs for its whole lifetime: the framebuffer mutably,
/// the render context and shaders immutably. Vertices passed to the draw calls are copied and
/// never modified.
pub struct Pipeline<'a> {
    fb: &'a mut Framebuffer,
    ctx: &'a RenderContext,
    vertex_shader: Option<&'a dyn VertexShader>,
    pixel_shader: Option<&'a dyn PixelShader>,
    mode: RenderMode,
    culling_mode: CullingMode,
    outline: Option<Color>,
    show_normals: bool,
    metrics: Metrics,
}

impl<'a> Pipeline<'a> {
    pub fn new(fb: &'a mut Framebuffer, ctx: &'a RenderContext) -> Self {
        Pipeline {
            fb,
            ctx,
            vertex_shader: None,
            pixel_shader: None,
            mode: RenderMode::default(),
            culling_mode: CullingMode::default(),
            outline: None,
            show_normals: false,
            metrics: Metrics::new(),
        }
    }

    pub fn with_vertex_shader(mut self, shader: &'a dyn VertexShader) -> Self {
        self.vertex_shader = Some(shader);
        self
    }

    pub fn with_pixel_shader(mut self, shader: &'a dyn PixelShader) -> Self {
        self.pixel_shader = Some(shader);
        self
    }

    pub fn with_mode(mut self, mode: RenderMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_culling(mut self, culling_mode: CullingMode) -> Self {
        self.culling_mode = culling_mode;
        self
    }

    /// Re-draws the edges of every filled triangle in `color`.
    pub fn with_outline(mut self, color: Option<Color>) -> Self {
        self.outline = color;
        self
    }

    /// Draws a short red line along every triangle vertex normal.
    pub fn with_normals(mut self, show_normals: bool) -> Self {
        self.show_normals = show_normals;
        self
    }

    pub fn metrics(&self) -> Metrics {
        self.metrics
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &*self.fb
    }

    fn transform(&self, vertex: &Vertex) -> Vertex {
        let mut vertex = *vertex;
        if let Some(shader) = self.vertex_shader {
            shader.apply(self.ctx, &mut vertex);
        }
        vertex
    }

    fn to_screen(&self, ndc: &Vertex) -> ScreenVertex {
        ScreenVertex::from_ndc(ndc, self.fb.width(), self.fb.height())
    }

    pub fn draw_point(&mut self, point: &Vertex) -> bool {
        let mut vertex = self.transform(point);
        if vertex.position.z < 0. || !vertex.perspective_divide() {
            self.metrics.near_culled += 1;
            return false;
        }

        let screen = self.to_screen(&vertex);
        let written = draw_line_parametric(self.fb, self.ctx, self.pixel_shader, screen, screen);
        self.metrics.fragments_written += written;
        written > 0
    }

    /// Draws a line between two local space vertices. Returns `false` when nothing of it was
    /// left after clipping.
    pub fn draw_line(&mut self, start: &Vertex, end: &Vertex) -> bool {
        let (start, end) = (self.transform(start), self.transform(end));
        self.draw_line_clip(start, end, self.pixel_shader)
    }

    fn draw_line_clip(
        &mut self,
        mut start: Vertex,
        mut end: Vertex,
        shader: Option<&dyn PixelShader>,
    ) -> bool {
        if !clip_line_near(&mut start, &mut end) {
            self.metrics.near_culled += 1;
            return false;
        }
        if !(start.perspective_divide() && end.perspective_divide()) {
            self.metrics.degenerate += 1;
            return false;
        }
        self.draw_line_ndc(start, end, shader)
    }

    fn draw_line_ndc(
        &mut self,
        mut start: Vertex,
        mut end: Vertex,
        shader: Option<&dyn PixelShader>,
    ) -> bool {
        if !clip_line_ndc(&mut start, &mut end) {
            return false;
        }
        let (start, end) = (self.to_screen(&start), self.to_screen(&end));
        self.metrics.fragments_written += draw_line_parametric(self.fb, self.ctx, shader, start, end);
        self.metrics.lines_drawn += 1;
        true
    }

    /// Divides a clip space triangle and applies face culling. `None` if it is not visible.
    fn project(&mut self, tri: [Vertex; 3]) -> Option<[Vertex; 3]> {
        let mut tri = tri;
        if !tri.iter_mut().all(|v| v.perspective_divide()) {
            self.metrics.degenerate += 1;
            return None;
        }

        let [a, b, c] = tri.map(|v| v.position.xyz());
        let facing = (a - b).cross(a - c).dot(self.ctx.camera_forward);
        if self.culling_mode.culls(facing) {
            self.metrics.backfaces_culled += 1;
            return None;
        }
        Some(tri)
    }

    fn outline_ndc(&mut self, [a, b, c]: [Vertex; 3], shader: Option<&dyn PixelShader>) {
        self.draw_line_ndc(a, b, shader);
        self.draw_line_ndc(b, c, shader);
        self.draw_line_ndc(c, a, shader);
    }

    fn fill_ndc(&mut self, tri: [Vertex; 3]) {
        let shading = match self.mode {
            RenderMode::Shaded => Shading::VertexColor,
            _ => Shading::Shader(self.pixel_shader),
        };
        let screen = tri.each_ref().map(|v| self.to_screen(v));
        match fill_triangle(self.fb, self.ctx, shading, screen) {
            Some(written) => {
                self.metrics.triangles_drawn += 1;
                self.metrics.fragments_written += written;
            }
            None => self.metrics.degenerate += 1,
        }

        if let Some(color) = self.outline {
            let closer = tri.map(|mut v| {
                v.position.z -= v.position.z * OUTLINE_DEPTH_PULL;
                v
            });
            self.outline_ndc(closer, Some(&SolidColor(color)));
        }
    }

    /// Runs the near clip and hands every surviving piece to `draw`.
    fn clip_near(&mut self, tri: [Vertex; 3], mut draw: impl FnMut(&mut Self, [Vertex; 3])) -> bool {
        let clipped = clip_triangle_near(tri);
        match clipped {
            NearClip::Culled => {
                self.metrics.near_culled += 1;
                return false;
            }
            NearClip::Split(_) => self.metrics.triangles_split += 1,
            NearClip::One(_) => {}
        }
        for &piece in clipped.triangles() {
            draw(self, piece);
        }
        true
    }

    /// Draws a local space triangle according to the render mode. Returns `false` when it was
    /// entirely behind the near plane.
    pub fn draw_triangle(&mut self, a: &Vertex, b: &Vertex, c: &Vertex) -> bool {
        let tri = [a, b, c].map(|v| self.transform(v));
        let drawn = match self.mode {
            RenderMode::Wireframe => self.outline_clip(tri),
            RenderMode::Textured | RenderMode::Shaded => self.clip_near(tri, |this, piece| {
                if let Some(tri) = this.project(piece) {
                    this.fill_ndc(tri);
                }
            }),
        };

        if self.show_normals {
            for (v, base) in [a, b, c].into_iter().zip(tri) {
                let mut tip = *v;
                tip.position = v.position + (v.normal * NORMAL_LENGTH).to_dir();
                let tip = self.transform(&tip);
                self.draw_line_clip(base, tip, Some(&SolidColor(RED)));
            }
        }
        drawn
    }

    fn outline_clip(&mut self, tri: [Vertex; 3]) -> bool {
        self.clip_near(tri, |this, piece| {
            if let Some(tri) = this.project(piece) {
                let shader = this.pixel_shader;
                this.outline_ndc(tri, shader);
            }
        })
    }

    /// Draws the edges of a local space triangle, with the same clipping and culling as a fill.
    pub fn draw_triangle_outline(&mut self, a: &Vertex, b: &Vertex, c: &Vertex) -> bool {
        let tri = [a, b, c].map(|v| self.transform(v));
        self.outline_clip(tri)
    }

    /// Draws every full triangle of `indices`. Returns how many were not rejected by the near
    /// plane.
    pub fn draw_indexed(&mut self, vertices: &[Vertex], indices: &[u32]) -> usize {
        let mut drawn = 0;
        for [a, b, c] in triangles_iter(vertices, indices) {
            if self.draw_triangle(a, b, c) {
                drawn += 1;
            }
        }
        drawn
    }

    pub fn draw_indexed_outlines(&mut self, vertices: &[Vertex], indices: &[u32]) -> usize {
        let mut drawn = 0;
        for [a, b, c] in triangles_iter(vertices, indices) {
            if self.draw_triangle_outline(a, b, c) {
                drawn += 1;
            }
        }
        drawn
    }
}
