use rasterpipe::{
    color::{Color, BLACK, BLUE, GREEN, RED},
    mesh::Mesh,
    shaders::{DirectionalLight, LitVertexShader, PointLight},
    vec::{Mat4x4, Vec2, Vec3, Vec4},
    CullingMode, Framebuffer, Pipeline, RenderContext, Vertex,
};

fn ndc(x: f32, y: f32, z: f32, color: Color) -> Vertex {
    Vertex {
        position: Vec4::from([x, y, z, 1.]),
        color,
        ..Vertex::default()
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

fn draw_ndc_triangle(fb: &mut Framebuffer, ctx: &RenderContext, z: f32, color: Color) -> usize {
    let tri = [
        ndc(-0.5, -0.5, z, color),
        ndc(0.5, -0.5, z, color),
        ndc(0., 0.5, z, color),
    ];
    let mut pipeline = Pipeline::new(fb, ctx).with_culling(CullingMode::Disabled);
    pipeline.draw_triangle(&tri[0], &tri[1], &tri[2]);
    pipeline.metrics().fragments_written
}

#[test]
fn small_triangle_covers_expected_pixels() {
    let ctx = RenderContext::default();
    let mut fb = Framebuffer::new(4, 4).unwrap();

    assert_eq!(draw_ndc_triangle(&mut fb, &ctx, 0.5, RED), 5);
    assert_eq!(painted(&fb), [(1, 0), (1, 1), (0, 2), (1, 2), (2, 2)]);
    for (x, y) in painted(&fb) {
        assert_eq!(fb.pixel(x, y), Some(RED));
        assert!((fb.depth_at(x, y).unwrap() - 0.5).abs() < 1e-6);
    }
}

#[test]
fn depth_test_keeps_the_nearest_fragment() {
    let ctx = RenderContext::default();
    let mut fb = Framebuffer::new(4, 4).unwrap();
    draw_ndc_triangle(&mut fb, &ctx, 0.5, RED);
    let before = fb.pixels().to_vec();

    assert_eq!(draw_ndc_triangle(&mut fb, &ctx, 0.8, BLUE), 0);
    assert_eq!(fb.pixels(), &before[..]);

    assert_eq!(draw_ndc_triangle(&mut fb, &ctx, 0.5, GREEN), 5);
    assert_eq!(fb.pixel(1, 1), Some(GREEN));

    assert_eq!(draw_ndc_triangle(&mut fb, &ctx, 0.2, BLUE), 5);
    assert!((fb.depth_at(1, 1).unwrap() - 0.2).abs() < 1e-6);
}

/// A lit triangle two units in front of the camera, facing it.
fn facing_triangle() -> [Vertex; 3] {
    let normal = Vec3::from([0., 0., -1.]);
    [[-1., -1.], [1., -1.], [0., 1.]].map(|[x, y]| {
        Vertex::new(Vec3::from([x, y, 2.]), normal, Vec2::zero(), BLACK)
    })
}

fn render_lit(ctx: &RenderContext) -> Vec<Color> {
    let mut fb = Framebuffer::new(24, 24).unwrap();
    let [a, b, c] = facing_triangle();
    let mut pipeline = Pipeline::new(&mut fb, ctx)
        .with_vertex_shader(&LitVertexShader)
        .with_culling(CullingMode::Disabled);
    assert!(pipeline.draw_triangle(&a, &b, &c));
    assert_eq!(pipeline.metrics().triangles_drawn, 1);
    fb.pixels().to_vec()
}

#[test]
fn frames_depend_only_on_their_context() {
    let warm = RenderContext::default();
    let cold = RenderContext {
        directional_light: DirectionalLight {
            direction: Vec3::from([0., 0., 1.]),
            color: BLUE,
        },
        point_light: PointLight {
            radius: 0.,
            ..warm.point_light
        },
        ..RenderContext::default()
    };

    let first = render_lit(&warm);
    let other = render_lit(&cold);
    assert_ne!(first, other);
    assert_eq!(render_lit(&warm), first);

    // No point light and a light shining straight at the face: pure blue.
    let center = 12 * 24 + 12;
    assert_eq!(other[center], BLUE);
}

#[test]
fn cube_shows_a_single_face_head_on() {
    let cube = Mesh::cube();
    let ctx = RenderContext {
        world: Vec3::from([0., 0., 3.]).to_translation(),
        view: Mat4x4::identity(),
        ..RenderContext::default()
    };
    let mut fb = Framebuffer::new(32, 32).unwrap();
    let mut pipeline = Pipeline::new(&mut fb, &ctx).with_vertex_shader(&LitVertexShader);

    assert_eq!(pipeline.draw_indexed(&cube.vertices, &cube.indices), 12);
    let metrics = pipeline.metrics();
    assert_eq!(metrics.triangles_drawn, 2);
    assert_eq!(metrics.backfaces_culled, 10);
    assert_eq!(metrics.near_culled, 0);
    assert!(metrics.fragments_written > 0);
    assert_ne!(fb.pixel(15, 15), Some(BLACK));
    assert_eq!(fb.pixel(0, 0), Some(BLACK));
}

#[test]
fn camera_inside_geometry_splits_at_the_near_plane() {
    let ctx = RenderContext {
        world: Mat4x4::identity(),
        view: Mat4x4::identity(),
        ..RenderContext::default()
    };
    let normal = Vec3::from([0., 1., 0.]);
    // A floor stretching from behind the camera to far in front of it.
    let floor = [[-2., 10.], [2., 10.], [0., -2.]]
        .map(|[x, z]| Vertex::new(Vec3::from([x, -1., z]), normal, Vec2::zero(), BLACK));

    let mut fb = Framebuffer::new(32, 32).unwrap();
    let mut pipeline = Pipeline::new(&mut fb, &ctx)
        .with_vertex_shader(&LitVertexShader)
        .with_culling(CullingMode::Disabled);
    assert!(pipeline.draw_triangle(&floor[0], &floor[1], &floor[2]));
    assert_eq!(pipeline.metrics().triangles_split, 1);
    assert_eq!(pipeline.metrics().triangles_drawn, 2);
    assert!(fb.pixels().iter().any(|&c| c != BLACK));
}
